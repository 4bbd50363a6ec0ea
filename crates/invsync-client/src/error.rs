//! Error types for the inventory store client

use thiserror::Error;

/// Errors that can occur when talking to the inventory store
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// API key cannot be sent as a header
    #[error("Invalid API key: {0}")]
    InvalidApiKey(String),

    /// API returned an error status
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },
}

/// Result type for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
