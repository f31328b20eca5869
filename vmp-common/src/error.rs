//! Common error types for VMP

use thiserror::Error;

/// Common result type for VMP operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the VMP player core
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog fetch or decode error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Track selection error (missing interval or candidates)
    #[error("Selection error: {0}")]
    Selection(String),

    /// Media transfer error
    #[error("Download error: {0}")]
    Download(String),

    /// Operation was cancelled before completing
    #[error("operation cancelled")]
    Cancelled,

    /// Operation did not complete within its deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
