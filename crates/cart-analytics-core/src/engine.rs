use crate::analysis::association::{
    resolve_miner, AssociationRule, IncidenceMatrix, MinerCapability, MiningParams,
};
use crate::analysis::derive::derive_sales;
use crate::analysis::{self, SalesSummary};
use crate::config::AppConfig;
use crate::error::Error;
use crate::progress::ProgressReporter;
use crate::report::{self, console, rules_csv};
use crate::storage::Database;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// What happened to the association step. None of these abort the run.
#[derive(Debug, Clone, PartialEq)]
pub enum AssociationOutcome {
    Mined {
        rules: Vec<AssociationRule>,
        csv_path: PathBuf,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
    },
}

pub struct AnalysisEngine {
    config: AppConfig,
    miner: MinerCapability,
    output_dir: PathBuf,
}

#[derive(Debug)]
pub struct AnalysisReport {
    pub load_duration: Duration,
    pub aggregate_duration: Duration,
    pub render_duration: Duration,
    pub mining_duration: Duration,
    pub records_loaded: usize,
    pub summary: SalesSummary,
    pub association: AssociationOutcome,
    /// Every file written, in manifest order.
    pub artifacts: Vec<PathBuf>,
    /// Console summaries followed by the manifest.
    pub console: String,
}

impl AnalysisEngine {
    /// The association miner is resolved here, once, from the mining config.
    pub fn new(config: AppConfig) -> Self {
        let miner = resolve_miner(&config.mining);
        let output_dir = PathBuf::from(&config.output_dir);
        Self {
            config,
            miner,
            output_dir,
        }
    }

    pub fn with_miner(mut self, miner: MinerCapability) -> Self {
        self.miner = miner;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the full analysis pipeline:
    /// 1. Load closed-cart sales through the storage join
    /// 2. Derive per-row fields and compute every aggregation
    /// 3. Render charts and the performance spreadsheet
    /// 4. Mine association rules when a miner is available
    /// 5. Assemble console summaries and the artifact manifest
    pub fn run(
        &self,
        db: &mut Database,
        reporter: &dyn ProgressReporter,
    ) -> Result<AnalysisReport, Error> {
        // Phase 1: Load
        info!("Loading closed-cart sales...");
        reporter.on_load_start();
        let load_start = Instant::now();
        let records = db.load_closed_sales()?;
        let load_duration = load_start.elapsed();
        reporter.on_load_complete(records.len(), load_duration.as_secs_f64());
        debug!(
            "Load completed in {:.2}s: {} sale records",
            load_duration.as_secs_f64(),
            records.len()
        );

        // Phase 2: Aggregate
        info!("Aggregating sales...");
        reporter.on_aggregate_start();
        let aggregate_start = Instant::now();
        let sales = derive_sales(&records);
        let summary = analysis::summarize(&sales, &self.config.analysis);
        let aggregate_duration = aggregate_start.elapsed();
        reporter.on_aggregate_complete(
            summary.product_performance.len(),
            aggregate_duration.as_secs_f64(),
        );
        debug!(
            "Aggregation completed in {:.2}s: {} products, {} days with sales",
            aggregate_duration.as_secs_f64(),
            summary.product_performance.len(),
            summary.daily_sales.len()
        );

        // Phase 3: Render
        info!("Writing charts to {}...", self.output_dir.display());
        reporter.on_render_start();
        let render_start = Instant::now();
        let mut artifacts = report::write_artifacts(&summary, &self.output_dir, reporter)?;
        let render_duration = render_start.elapsed();
        reporter.on_render_complete(artifacts.len(), render_duration.as_secs_f64());

        // Phase 4: Mine
        let mining_start = Instant::now();
        let association = self.mine(&IncidenceMatrix::from_sales(&sales), reporter);
        let mining_duration = mining_start.elapsed();
        if let AssociationOutcome::Mined { csv_path, .. } = &association {
            artifacts.push(csv_path.clone());
        }

        let console = console::render_console(
            &summary,
            &association,
            self.config.analysis.top_rules,
            &artifacts,
        );

        Ok(AnalysisReport {
            load_duration,
            aggregate_duration,
            render_duration,
            mining_duration,
            records_loaded: records.len(),
            summary,
            association,
            artifacts,
            console,
        })
    }

    fn mine(
        &self,
        matrix: &IncidenceMatrix,
        reporter: &dyn ProgressReporter,
    ) -> AssociationOutcome {
        let miner = match &self.miner {
            MinerCapability::Available(miner) => miner,
            MinerCapability::Unavailable { reason } => {
                warn!("Skipping association rules: {}", reason);
                reporter.on_mining_skipped(reason);
                return AssociationOutcome::Skipped {
                    reason: reason.clone(),
                };
            }
        };

        info!(
            "Mining association rules with {} over {} carts and {} products...",
            miner.name(),
            matrix.cart_count(),
            matrix.product_count()
        );
        reporter.on_mining_start(matrix.cart_count(), matrix.product_count());
        let start = Instant::now();

        let params = MiningParams::from(&self.config.mining);
        let csv_path = self.output_dir.join(report::ASSOCIATION_RULES_CSV);
        let result = miner.mine(matrix, &params).and_then(|rules| {
            rules_csv::write_rules(&rules, &csv_path)?;
            Ok(rules)
        });

        match result {
            Ok(rules) => {
                reporter.on_mining_complete(rules.len(), start.elapsed().as_secs_f64());
                debug!(
                    "Mining completed in {:.2}s: {} rules",
                    start.elapsed().as_secs_f64(),
                    rules.len()
                );
                AssociationOutcome::Mined { rules, csv_path }
            }
            Err(e) => {
                error!("Could not generate association rules: {}", e);
                reporter.on_mining_failed(&e.to_string());
                AssociationOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}
