// Central Error Type for the Application

use thiserror::Error;

/// Application-level error type
///
/// Only option rejection reaches callers; failures inside a probe run end up
/// in its result event.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    #[error("Invalid options for '{command}': {reason}")]
    InvalidOptions { command: String, reason: String },
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
