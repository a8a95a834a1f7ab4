//! Error types for pizarra

use thiserror::Error;

/// Errors raised outside the aggregation path (config, cache, sources, history).
///
/// Aggregation itself never returns one of these to its caller; a failed fetch
/// is downgraded to a [`crate::services::FetchDiagnostic`] and logged.
#[derive(Error, Debug)]
pub enum PizarraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Connect failure, timeout or non-2xx status
    #[error("Transport error: {0}")]
    Transport(String),

    /// Payload could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("History error: {0}")]
    History(String),

    #[error("Inflation error: {0}")]
    Inflation(String),
}

impl From<reqwest::Error> for PizarraError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PizarraError::Decode(err.to_string())
        } else {
            PizarraError::Transport(err.to_string())
        }
    }
}

impl From<simd_json::Error> for PizarraError {
    fn from(err: simd_json::Error) -> Self {
        PizarraError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PizarraError>;
