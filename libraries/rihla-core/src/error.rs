/// Core error types for the Rihla client
use thiserror::Error;

/// Result type alias using `RihlaError`
pub type Result<T> = std::result::Result<T, RihlaError>;

/// Core error type for the Rihla client
#[derive(Error, Debug)]
pub enum RihlaError {
    /// Backend returned an error response
    #[error("Backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    /// Network-level failure (connect, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// Authentication required but no session available
    #[error("Authentication required")]
    AuthRequired,

    /// Authentication or role query failed
    #[error("Auth error: {0}")]
    Auth(String),

    /// Operation was superseded or aborted before completing.
    ///
    /// This is the soft-cancel class: callers reset loading state silently
    /// and never surface it to the user.
    #[error("Operation cancelled")]
    Cancelled,

    /// Entity not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RihlaError {
    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create an auth error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether this error is a soft cancellation rather than a real failure.
    ///
    /// Cancellations reset loading state without being stored or reported.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
