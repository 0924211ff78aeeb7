pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod progress;
pub mod report;
pub mod seed;
pub mod storage;

pub use config::AppConfig;
pub use engine::{AnalysisEngine, AnalysisReport, AssociationOutcome};
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use storage::Database;
