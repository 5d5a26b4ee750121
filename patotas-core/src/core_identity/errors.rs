//! Identity provider errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("An account already exists for {0}")]
    Conflict(String),

    #[error("Session not found or expired")]
    SessionNotFound,

    #[error("Identity storage error: {0}")]
    Storage(String),
}

impl From<rusqlite::Error> for IdentityError {
    fn from(err: rusqlite::Error) -> Self {
        IdentityError::Storage(err.to_string())
    }
}

impl From<r2d2::Error> for IdentityError {
    fn from(err: r2d2::Error) -> Self {
        IdentityError::Storage(err.to_string())
    }
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        IdentityError::Storage(format!("Task join error: {}", err))
    }
}
