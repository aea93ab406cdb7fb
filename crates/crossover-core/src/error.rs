//! Error types for the crossover backtesting system.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Insufficient data: {bars} bars available, more than {required} required")]
    InsufficientData { bars: usize, required: usize },

    #[error("Invalid order sizing: {0}")]
    InvalidSizing(String),

    #[error("Invalid price series: {0}")]
    InvalidSeries(String),

    #[error("No completed backtest run to report on")]
    NoCompletedRun,

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration file error: {0}")]
    ConfigFile(#[from] config::ConfigError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
