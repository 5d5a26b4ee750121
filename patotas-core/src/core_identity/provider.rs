//! Identity provider contracts

use super::{Identity, IdentityError, Session, SessionChange, SessionToken};
use crate::types::UserId;
use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::broadcast;

/// Authentication and session management
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Look up a live session by token
    async fn current_session(&self, token: &SessionToken) -> Option<Session>;

    /// Authenticate and open a session
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, IdentityError>;

    /// Register a new account. Does not sign in.
    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: &str,
    ) -> Result<Identity, IdentityError>;

    /// Close a session
    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError>;

    /// Receive sign-in and sign-out notifications
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;
}

/// Display-name lookup used by the roster projection
#[async_trait]
pub trait IdentityDirectory: Send + Sync {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, IdentityError>;
}
