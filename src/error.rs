//! Error types for the MediQ gateway

use thiserror::Error;

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Completion backend could not be reached (network/transport failure)
    #[error("completion backend unreachable: {0}")]
    BackendUnavailable(String),

    /// Completion backend answered with a non-success status.
    /// The body is kept for diagnostics only and is never shown to users.
    #[error("completion backend error: {status} - {body}")]
    BackendError {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body as received
        body: String,
    },

    /// Completion backend answered 2xx but the payload lacks generated text
    #[error("malformed completion response: {0}")]
    MalformedResponse(String),

    /// Telegram Bot API error (transport or delivery)
    #[error("channel error: {0}")]
    Channel(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
