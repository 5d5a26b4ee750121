//! Identity and session values

use crate::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub display_name: String,
}

/// Opaque bearer token for a live session
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn generate() -> Self {
        SessionToken(uuid::Uuid::new_v4().simple().to_string())
    }

    pub fn new(raw: impl Into<String>) -> Self {
        SessionToken(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Tokens are credentials; keep them out of logs.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// A signed-in identity. Patota operations take `&Session`, so they can only
/// be invoked on behalf of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: SessionToken,
    pub identity: Identity,
    pub created_at: Timestamp,
}

impl Session {
    pub fn user_id(&self) -> &UserId {
        &self.identity.user_id
    }
}

/// Kinds of session change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionEvent {
    SignedIn,
    SignedOut,
}

/// Notification published to subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub event: SessionEvent,
    pub identity: Identity,
}
