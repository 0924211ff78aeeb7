use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Chart rendering error: {0}")]
    Chart(String),

    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Association mining error: {0}")]
    Mining(String),
}
