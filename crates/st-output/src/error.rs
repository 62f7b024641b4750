//! Error types for st-output.

use st_network::NetworkError;
use thiserror::Error;

/// Errors that can occur when writing or reading simulation output.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("rebuilding the street network failed: {0}")]
    Network(#[from] NetworkError),

    #[error("no network snapshot at or before step {0}")]
    MissingSnapshot(u64),

    #[error("traffic load of step {0} was not saved")]
    MissingLoad(u64),

    #[error("malformed output data: {0}")]
    Format(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
