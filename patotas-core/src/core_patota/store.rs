//! Persistence contract for patotas and memberships
//!
//! Writes carry the acting user so implementations can enforce the
//! row-level policies in [`super::policy`] the same way a hosted store would.

use super::invite::InviteCode;
use super::patota::{Membership, Patota, Role};
use super::types::PatotaId;
use crate::types::UserId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Row-level policy denied the write: {0}")]
    PermissionDenied(String),

    #[error("Invite code already in use")]
    DuplicateInviteCode,

    #[error("Membership already exists")]
    DuplicateMembership,

    #[error("Store backend failure: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(err: r2d2::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(err: tokio::task::JoinError) -> Self {
        StoreError::Backend(format!("Task join error: {}", err))
    }
}

#[async_trait]
pub trait PatotaStore: Send + Sync {
    /// Insert a Patota together with its creator's Administrator membership.
    /// Both rows are written or neither is.
    async fn insert_patota(&self, actor: &UserId, patota: &Patota) -> Result<(), StoreError>;

    async fn get_patota(&self, id: &PatotaId) -> Result<Option<Patota>, StoreError>;

    async fn find_patota_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Patota>, StoreError>;

    async fn get_membership(
        &self,
        patota_id: &PatotaId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, StoreError>;

    async fn insert_membership(
        &self,
        actor: &UserId,
        membership: &Membership,
    ) -> Result<(), StoreError>;

    /// Memberships of one Patota in join order
    async fn list_memberships(&self, patota_id: &PatotaId) -> Result<Vec<Membership>, StoreError>;

    /// Patotas a user belongs to, oldest first, with the user's role in each
    async fn list_user_patotas(&self, user_id: &UserId) -> Result<Vec<(Patota, Role)>, StoreError>;
}
