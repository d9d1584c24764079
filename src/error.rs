//! Error types for voltage-spikes

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for voltage-spikes
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Signal is empty")]
    EmptySignal,

    #[error("Signal too short: need more than {required} samples, got {actual}")]
    SignalTooShort { required: usize, actual: usize },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error(
        "Ragged dataset: expected {expected} samples per recording, {} has {actual}",
        .source_path.display()
    )]
    RaggedDataset {
        expected: usize,
        actual: usize,
        source_path: PathBuf,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for voltage-spikes operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}
