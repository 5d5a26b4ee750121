//! Patota operation errors

use super::store::StoreError;
use std::fmt;
use thiserror::Error;

/// What a failed lookup was looking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Missing {
    /// No Patota owns the redeemed invite code
    InviteCode,
    /// No Patota has this id
    Patota(String),
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Missing::InviteCode => write!(f, "invalid or unknown invite code"),
            Missing::Patota(id) => write!(f, "patota {}", id),
        }
    }
}

#[derive(Debug, Error)]
pub enum PatotaError {
    /// Input rejected before reaching the store
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(Missing),

    /// The store's row-level policy refused the write
    #[error("Permission denied: {0}")]
    Authorization(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl PatotaError {
    pub fn unknown_invite_code() -> Self {
        PatotaError::NotFound(Missing::InviteCode)
    }

    pub fn unknown_patota(id: impl fmt::Display) -> Self {
        PatotaError::NotFound(Missing::Patota(id.to_string()))
    }
}

impl From<StoreError> for PatotaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PermissionDenied(reason) => PatotaError::Authorization(reason),
            other => PatotaError::Store(other.to_string()),
        }
    }
}
