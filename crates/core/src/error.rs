// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Index error: {0}")]
    Index(#[from] crate::port::IndexError),

    #[error("Storage error: {0}")]
    Store(#[from] crate::port::StoreError),

    #[error("Boundary error: {0}")]
    Boundary(#[from] crate::port::BoundaryError),

    #[error("Retry exhausted: {0}")]
    Retry(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Deadline exceeded after {0:?}")]
    DeadlineExceeded(std::time::Duration),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Wrap an exhausted retry, preserving the attempt count in the message
    pub fn from_retry<E: std::fmt::Display>(err: crate::application::retry::RetryError<E>) -> Self {
        match err {
            crate::application::retry::RetryError::Cancelled => AppError::Cancelled,
            other => AppError::Retry(other.to_string()),
        }
    }
}
