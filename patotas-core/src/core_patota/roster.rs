//! Roster projection: members with display names, ranked by score

use super::errors::PatotaError;
use super::patota::Role;
use super::store::PatotaStore;
use super::types::PatotaId;
use crate::core_identity::IdentityDirectory;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

/// Shown when a member's identity can no longer be resolved
pub const NAME_UNAVAILABLE: &str = "Name unavailable";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub user_id: UserId,
    pub display_name: String,
    pub role: Role,
    pub score: i64,
}

pub struct RosterProjection {
    store: Arc<dyn PatotaStore>,
    directory: Arc<dyn IdentityDirectory>,
}

impl RosterProjection {
    pub fn new(store: Arc<dyn PatotaStore>, directory: Arc<dyn IdentityDirectory>) -> Self {
        Self { store, directory }
    }

    /// Members ordered by score, highest first. Equal scores keep join order.
    pub async fn list_members(&self, patota_id: &PatotaId) -> Result<Vec<RosterEntry>, PatotaError> {
        let memberships = self.store.list_memberships(patota_id).await?;

        let mut entries = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let display_name = match self.directory.display_name(&membership.user_id).await {
                Ok(Some(name)) => name,
                Ok(None) => {
                    warn!(user_id = %membership.user_id, "Member has no identity record");
                    NAME_UNAVAILABLE.to_string()
                }
                Err(e) => return Err(PatotaError::Store(e.to_string())),
            };

            entries.push(RosterEntry {
                user_id: membership.user_id,
                display_name,
                role: membership.role,
                score: membership.score,
            });
        }

        // sort_by is stable
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        Ok(entries)
    }
}
