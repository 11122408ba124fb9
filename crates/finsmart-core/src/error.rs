//! Error types for FinSmart

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Bad numeric ranges, mismatched sums, malformed identifiers.
    /// Reported straight back to the caller and never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    /// Failure reported by an external delivery collaborator (SMS gateway).
    #[error("Delivery error: {0}")]
    Delivery(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
