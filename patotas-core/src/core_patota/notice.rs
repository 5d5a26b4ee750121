//! User-facing notices
//!
//! Every failed operation maps to exactly one notice. Successful joins and
//! creations have notices too, so the CLI and HTTP layers word things the
//! same way.

use super::errors::{Missing, PatotaError};
use super::membership::JoinOutcome;
use super::patota::Patota;
use crate::core_identity::IdentityError;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserNotice {
    pub severity: Severity,
    pub title: String,
    pub description: String,
}

impl UserNotice {
    fn new(severity: Severity, title: &str, description: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.to_string(),
            description: description.into(),
        }
    }

    pub fn created(patota: &Patota) -> Self {
        Self::new(
            Severity::Success,
            "Patota created",
            format!(
                "\"{}\" is ready. Share invite code {} to bring people in.",
                patota.name, patota.invite_code
            ),
        )
    }

    pub fn joined(outcome: &JoinOutcome) -> Self {
        match outcome {
            JoinOutcome::Joined(p) => Self::new(
                Severity::Success,
                "Welcome to the Patota!",
                format!("You are now a member of \"{}\".", p.name),
            ),
            JoinOutcome::AlreadyMember(p) => Self::new(
                Severity::Info,
                "Already a member",
                format!("You are already a member of \"{}\".", p.name),
            ),
        }
    }

    pub fn signed_out() -> Self {
        Self::new(Severity::Info, "Signed out", "See you soon!")
    }
}

impl From<&PatotaError> for UserNotice {
    fn from(err: &PatotaError) -> Self {
        match err {
            PatotaError::Validation(reason) => Self::new(Severity::Error, "Invalid input", reason.clone()),
            PatotaError::NotFound(Missing::InviteCode) => Self::new(
                Severity::Error,
                "Invalid code",
                "Invite code is invalid or the patota was not found.",
            ),
            PatotaError::NotFound(Missing::Patota(_)) => Self::new(
                Severity::Error,
                "Patota not found",
                "This patota does not exist or is no longer available.",
            ),
            PatotaError::Authorization(_) => Self::new(
                Severity::Error,
                "Permission error",
                "You do not have permission to do that.",
            ),
            PatotaError::Store(_) => Self::new(
                Severity::Error,
                "Something went wrong",
                "The request could not be completed. Please try again.",
            ),
        }
    }
}

impl From<&IdentityError> for UserNotice {
    fn from(err: &IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredentials => Self::new(
                Severity::Error,
                "Sign-in failed",
                "Invalid email or password.",
            ),
            IdentityError::Validation(reason) => {
                Self::new(Severity::Error, "Sign-up failed", reason.clone())
            }
            IdentityError::Conflict(_) => Self::new(
                Severity::Error,
                "Sign-up failed",
                "An account with this email already exists.",
            ),
            IdentityError::SessionNotFound => Self::new(
                Severity::Error,
                "Not signed in",
                "You need to be signed in to do that.",
            ),
            IdentityError::Storage(_) => Self::new(
                Severity::Error,
                "Something went wrong",
                "The request could not be completed. Please try again.",
            ),
        }
    }
}
