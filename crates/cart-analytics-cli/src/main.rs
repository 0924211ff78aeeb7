mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process;

use anyhow::Context;
use cart_analytics_core::analysis::association::MinerCapability;
use cart_analytics_core::seed::{self, SeedPlan};
use cart_analytics_core::{AnalysisEngine, AppConfig, Database};
use clap::{CommandFactory, Parser};
use colored::*;
use commands::{AnalyzeArgs, Cli, Commands, SeedArgs};
use dotenv::dotenv;
use progress::CliReporter;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match cart_analytics_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            process::exit(1);
        }
    };

    let args = Cli::parse();

    match args.command {
        Some(Commands::Analyze(analyze)) => {
            if let Err(err) = run_analyze(&config, &analyze) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::Seed(seed_args)) => {
            if let Err(err) = run_seed(&config, &seed_args) {
                error!("Error: {:#}", err);
                process::exit(1);
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
        }
        Some(Commands::TruncateDb) => {
            match prompt_confirm(
                "Are you SURE you want to COMPLETELY DELETE the Database?",
                Some(false),
            ) {
                Ok(true) => match Database::open(&config.database_url) {
                    Ok(mut db) => match db.truncate_all() {
                        Ok(rows) => println!("All tables truncated ({} rows deleted)", rows),
                        Err(e) => error!("Error truncating database: {}", e),
                    },
                    Err(e) => error!("Error opening database: {}", e),
                },
                _ => {
                    process::exit(0);
                }
            }
        }
        None => {
            let _ = Cli::command().print_long_help();
        }
    }

    Ok(())
}

fn run_analyze(config: &AppConfig, args: &AnalyzeArgs) -> anyhow::Result<()> {
    let mut db = Database::open(&config.database_url)
        .with_context(|| format!("opening database '{}'", config.database_url))?;

    let mut engine = AnalysisEngine::new(config.clone());
    if let Some(dir) = &args.output_dir {
        engine = engine.with_output_dir(dir);
    }
    if args.skip_association {
        engine = engine.with_miner(MinerCapability::unavailable(
            "association mining skipped on the command line",
        ));
    }

    let reporter = CliReporter::new();
    let report = engine.run(&mut db, &reporter)?;
    db.close();

    println!("{}", report.console);

    info!(
        "Load: {}, Aggregate: {}, Render: {}, Mining: {}",
        format!("{:.2}s", report.load_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.aggregate_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.render_duration.as_secs_f64()).green(),
        format!("{:.2}s", report.mining_duration.as_secs_f64()).green(),
    );
    info!(
        "{} sale records, {} products, {} artifacts",
        format!("{}", report.records_loaded).cyan(),
        format!("{}", report.summary.product_performance.len()).cyan(),
        format!("{}", report.artifacts.len()).cyan(),
    );

    Ok(())
}

fn run_seed(config: &AppConfig, args: &SeedArgs) -> anyhow::Result<()> {
    let mut plan = SeedPlan::from(&config.seed);
    if let Some(users) = args.users {
        plan.users = users;
    }
    if let Some(carts) = args.carts {
        plan.carts = carts;
    }
    if let Some(items) = args.items_per_cart {
        plan.items_per_cart = items;
    }
    if let Some(days) = args.days {
        plan.days = days;
    }
    if args.rng_seed.is_some() {
        plan.rng_seed = args.rng_seed;
    }

    let mut db = Database::open(&config.database_url)
        .with_context(|| format!("opening database '{}'", config.database_url))?;
    let summary = seed::seed_database(&mut db, &plan)?;
    let counts = db.count_rows()?;
    db.close();

    info!(
        "Seeded {} users, {} carts ({} closed), {} cart items",
        format!("{}", summary.users).green(),
        format!("{}", summary.carts).green(),
        format!("{}", summary.closed_carts).green(),
        format!("{}", summary.cart_items).green(),
    );
    info!(
        "Database now holds {} users, {} carts, {} cart items",
        counts.users, counts.carts, counts.cart_items
    );

    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
