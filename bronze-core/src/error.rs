//! Error types for Bronze core.
//!
//! Check failures are never errors: they are recorded as
//! [`CheckResult`](crate::CheckResult)s. `BronzeError` covers the boundary
//! failures around a run, such as bad configuration or an unwritable report.

use std::io;

use thiserror::Error;

/// Error type for Bronze core operations.
#[derive(Debug, Error)]
pub enum BronzeError {
    /// An underlying I/O error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A report could not be serialized.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration value was present but invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// A catch-all error with a message.
    #[error("{0}")]
    Other(String),
}

/// Convenience result type for Bronze core.
pub type Result<T> = std::result::Result<T, BronzeError>;
