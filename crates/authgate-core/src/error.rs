// Error types for the storage and domain layer

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the domain and storage layer
#[derive(Debug, Error)]
pub enum Error {
    /// A required field was missing or empty
    #[error("{0} missing")]
    MissingField(&'static str),

    /// A user with the same email already exists
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// Password hashing failed
    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    /// Reading or writing a persisted collection failed
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),

    /// Serializing or deserializing a persisted collection failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A blocking task (password hashing) panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl Error {
    /// Whether the error was caused by bad input rather than the store
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::MissingField(_) | Error::DuplicateEmail(_))
    }
}
