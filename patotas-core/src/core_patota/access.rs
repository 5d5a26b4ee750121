//! Access gate for a single Patota

use super::errors::PatotaError;
use super::patota::{is_administrator, Patota, Role};
use super::store::PatotaStore;
use super::types::PatotaId;
use crate::core_identity::Session;
use crate::metrics::{record_outcome, ACCESS_CHECKS};
use std::sync::Arc;
use tracing::debug;

/// What the caller may do with a Patota
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted { patota: Patota, role: Role },
    /// The caller is not a member
    Denied,
}

impl Access {
    pub fn role(&self) -> Option<Role> {
        match self {
            Access::Granted { role, .. } => Some(*role),
            Access::Denied => None,
        }
    }

    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted { .. })
    }

    /// Only Administrators see the invite code
    pub fn can_view_invite_code(&self) -> bool {
        self.role().is_some_and(is_administrator)
    }
}

pub struct AccessGate {
    store: Arc<dyn PatotaStore>,
}

impl AccessGate {
    pub fn new(store: Arc<dyn PatotaStore>) -> Self {
        Self { store }
    }

    /// Decide whether the caller may enter the Patota, and with which role.
    ///
    /// A missing Patota is an error; a missing membership is `Access::Denied`.
    pub async fn resolve_access(
        &self,
        session: &Session,
        patota_id: &PatotaId,
    ) -> Result<Access, PatotaError> {
        let patota = self
            .store
            .get_patota(patota_id)
            .await?
            .ok_or_else(|| PatotaError::unknown_patota(patota_id))?;

        let access = match self.store.get_membership(patota_id, session.user_id()).await? {
            Some(membership) => Access::Granted {
                patota,
                role: membership.role,
            },
            None => Access::Denied,
        };

        let outcome = match access.role() {
            Some(Role::Administrator) => "administrator",
            Some(Role::Member) => "member",
            None => "denied",
        };
        debug!(patota_id = %patota_id, user_id = %session.user_id(), outcome, "Resolved access");
        record_outcome(ACCESS_CHECKS, outcome);

        Ok(access)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InviteConfig, PatotaConfig};
    use crate::core_patota::errors::Missing;
    use crate::core_patota::membership::MembershipService;
    use crate::core_patota::storage::MemoryPatotaStore;
    use crate::test_utils::session_for;

    #[tokio::test]
    async fn test_roles_and_denial() {
        let store: Arc<dyn PatotaStore> = Arc::new(MemoryPatotaStore::new());
        let membership =
            MembershipService::new(store.clone(), InviteConfig::default(), PatotaConfig::default());
        let gate = AccessGate::new(store);

        let alice = session_for("alice", "Alice");
        let bob = session_for("bob", "Bob");
        let carol = session_for("carol", "Carol");

        let patota = membership.create_patota(&alice, "Team A", None).await.unwrap();
        membership
            .redeem_invite_code(&bob, patota.invite_code.as_str())
            .await
            .unwrap();

        let admin = gate.resolve_access(&alice, &patota.id).await.unwrap();
        assert_eq!(admin.role(), Some(Role::Administrator));
        assert!(admin.can_view_invite_code());

        let member = gate.resolve_access(&bob, &patota.id).await.unwrap();
        assert_eq!(member.role(), Some(Role::Member));
        assert!(!member.can_view_invite_code());

        let outsider = gate.resolve_access(&carol, &patota.id).await.unwrap();
        assert_eq!(outsider, Access::Denied);
        assert!(!outsider.can_view_invite_code());
    }

    #[tokio::test]
    async fn test_missing_patota_is_not_found() {
        let gate = AccessGate::new(Arc::new(MemoryPatotaStore::new()));
        let result = gate
            .resolve_access(&session_for("alice", "Alice"), &PatotaId::generate())
            .await;
        assert!(matches!(result, Err(PatotaError::NotFound(Missing::Patota(_)))));
    }
}
