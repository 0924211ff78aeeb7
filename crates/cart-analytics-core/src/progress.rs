/// Trait for reporting analysis progress.
///
/// The CLI implements it with indicatif spinners; tests and library callers use
/// `SilentReporter`. All methods have default no-op implementations.
pub trait ProgressReporter {
    fn on_load_start(&self) {}
    fn on_load_complete(&self, _rows: usize, _duration_secs: f64) {}
    fn on_aggregate_start(&self) {}
    fn on_aggregate_complete(&self, _products: usize, _duration_secs: f64) {}
    fn on_mining_start(&self, _carts: usize, _products: usize) {}
    fn on_mining_complete(&self, _rules: usize, _duration_secs: f64) {}
    fn on_mining_skipped(&self, _reason: &str) {}
    fn on_mining_failed(&self, _error: &str) {}
    fn on_render_start(&self) {}
    fn on_artifact_written(&self, _file_name: &str) {}
    fn on_render_complete(&self, _artifacts: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
