//! Error types for the Rihla backend client.

use rihla_core::RihlaError;
use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Error, Debug)]
pub enum ServerClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Backend returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Authentication required but no token available
    #[error("Authentication required")]
    AuthRequired,

    /// Authentication failed (invalid credentials or expired token)
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    /// Invalid backend URL
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse backend response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Backend is offline or unreachable
    #[error("Backend unreachable: {0}")]
    ServerUnreachable(String),

    /// Request was superseded or aborted before completing
    #[error("Request cancelled")]
    Cancelled,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for backend client operations.
pub type Result<T> = std::result::Result<T, ServerClientError>;

impl From<ServerClientError> for RihlaError {
    fn from(err: ServerClientError) -> Self {
        match err {
            ServerClientError::Request(e) => RihlaError::Network(e.to_string()),
            ServerClientError::ServerUnreachable(msg) => RihlaError::Network(msg),
            ServerClientError::ServerError { status, message } => {
                RihlaError::Backend { status, message }
            }
            ServerClientError::AuthRequired => RihlaError::AuthRequired,
            ServerClientError::AuthFailed(msg) => RihlaError::Auth(msg),
            ServerClientError::InvalidUrl(msg) => RihlaError::InvalidInput(msg),
            ServerClientError::ParseError(msg) => RihlaError::Other(msg),
            ServerClientError::Cancelled => RihlaError::Cancelled,
            ServerClientError::Io(e) => RihlaError::Io(e),
        }
    }
}
