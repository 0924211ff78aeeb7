use cart_analytics_core::ProgressReporter;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// CLI progress reporter: one spinner per pipeline stage, replaced by a
/// check line when the stage completes.
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn done(message: String) {
    eprintln!("  {} {}", "✓".green(), message);
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(old) = guard.take() {
                old.finish_and_clear();
            }
            *guard = Some(pb);
        }
    }

    fn finish_bar(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(pb) = guard.take() {
                pb.finish_and_clear();
            }
        }
    }

    fn set_message(&self, message: String) {
        if let Ok(guard) = self.bar.lock() {
            if let Some(pb) = guard.as_ref() {
                pb.set_message(message);
            }
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_load_start(&self) {
        self.set_bar(spinner("Loading closed-cart sales..."));
    }

    fn on_load_complete(&self, rows: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!("Load complete: {} sale records in {:.2}s", rows, duration_secs));
    }

    fn on_aggregate_start(&self) {
        self.set_bar(spinner("Aggregating sales..."));
    }

    fn on_aggregate_complete(&self, products: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Aggregation complete: {} products in {:.2}s",
            products, duration_secs
        ));
    }

    fn on_render_start(&self) {
        self.set_bar(spinner("Rendering charts..."));
    }

    fn on_artifact_written(&self, file_name: &str) {
        self.set_message(format!("Rendering charts... wrote {}", file_name));
    }

    fn on_render_complete(&self, artifacts: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Render complete: {} artifacts in {:.2}s",
            artifacts, duration_secs
        ));
    }

    fn on_mining_start(&self, carts: usize, products: usize) {
        self.set_bar(spinner(&format!(
            "Mining association rules over {} carts and {} products...",
            carts, products
        )));
    }

    fn on_mining_complete(&self, rules: usize, duration_secs: f64) {
        self.finish_bar();
        done(format!(
            "Mining complete: {} rules in {:.2}s",
            rules, duration_secs
        ));
    }

    fn on_mining_skipped(&self, reason: &str) {
        self.finish_bar();
        eprintln!("  {} Association mining skipped: {}", "-".yellow(), reason);
    }

    fn on_mining_failed(&self, error: &str) {
        self.finish_bar();
        eprintln!("  {} Association mining failed: {}", "✗".red(), error);
    }
}
