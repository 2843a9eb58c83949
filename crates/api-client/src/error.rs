use core_types::CoreError;
use thiserror::Error;

/// Failure to obtain a usable price table. Never retried.
#[derive(Error, Debug)]
pub enum DataRetrievalError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Provider returned HTTP {status} for '{instrument}'")]
    Status { instrument: String, status: u16 },

    #[error("Provider error for '{instrument}' [{code}]: {description}")]
    Provider {
        instrument: String,
        code: String,
        description: String,
    },

    #[error("Failed to deserialize the provider response: {0}")]
    Deserialization(String),

    #[error("No price data returned for '{0}'")]
    NoData(String),

    #[error("Invalid data from provider: {0}")]
    InvalidData(String),

    #[error("Failed to align price series: {0}")]
    Alignment(#[from] CoreError),
}
