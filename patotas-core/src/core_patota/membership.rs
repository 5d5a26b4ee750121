//! Creating patotas, redeeming invite codes and listing a user's patotas

use super::errors::PatotaError;
use super::invite::{InviteCode, InviteCodeError};
use super::patota::{Membership, Patota, PatotaSummary};
use super::store::{PatotaStore, StoreError};
use crate::config::{InviteConfig, PatotaConfig};
use crate::core_identity::Session;
use crate::metrics::{record_counter, record_outcome, INVITE_REDEMPTIONS, PATOTAS_CREATED};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a successful redemption
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(Patota),
    /// The user was already in the Patota; nothing changed
    AlreadyMember(Patota),
}

impl JoinOutcome {
    pub fn patota(&self) -> &Patota {
        match self {
            JoinOutcome::Joined(p) | JoinOutcome::AlreadyMember(p) => p,
        }
    }

    pub fn is_new_membership(&self) -> bool {
        matches!(self, JoinOutcome::Joined(_))
    }
}

pub struct MembershipService {
    store: Arc<dyn PatotaStore>,
    invite: InviteConfig,
    rules: PatotaConfig,
}

impl MembershipService {
    pub fn new(store: Arc<dyn PatotaStore>, invite: InviteConfig, rules: PatotaConfig) -> Self {
        Self {
            store,
            invite,
            rules,
        }
    }

    /// Create a Patota with the caller as its Administrator.
    ///
    /// The name is trimmed and must be non-empty and at most
    /// `max_name_length` characters. A blank description is stored as none.
    pub async fn create_patota(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Patota, PatotaError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PatotaError::Validation("Patota name cannot be empty".to_string()));
        }
        if name.chars().count() > self.rules.max_name_length {
            return Err(PatotaError::Validation(format!(
                "Patota name cannot exceed {} characters",
                self.rules.max_name_length
            )));
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);

        let creator = session.user_id();
        for attempt in 1..=self.invite.max_generation_attempts {
            let patota = Patota::new(
                name.to_string(),
                description.clone(),
                InviteCode::generate(self.invite.code_length),
                creator.clone(),
            );

            match self.store.insert_patota(creator, &patota).await {
                Ok(()) => {
                    info!(patota_id = %patota.id, user_id = %creator, "Patota created");
                    record_counter(PATOTAS_CREATED);
                    return Ok(patota);
                }
                Err(StoreError::DuplicateInviteCode) => {
                    warn!(attempt, "Invite code collision, generating another");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(PatotaError::Store(format!(
            "could not generate a unique invite code after {} attempts",
            self.invite.max_generation_attempts
        )))
    }

    /// Join the Patota that owns `raw_code`.
    ///
    /// Codes are matched case-insensitively after trimming. Redeeming a code
    /// for a Patota the caller already belongs to is a success that changes
    /// nothing, including when a concurrent redemption wins the insert.
    pub async fn redeem_invite_code(
        &self,
        session: &Session,
        raw_code: &str,
    ) -> Result<JoinOutcome, PatotaError> {
        let code = match InviteCode::parse(raw_code) {
            Ok(code) => code,
            Err(InviteCodeError::Empty) => {
                record_outcome(INVITE_REDEMPTIONS, "invalid");
                return Err(PatotaError::Validation("Invite code cannot be empty".to_string()));
            }
            Err(InviteCodeError::Malformed) => {
                record_outcome(INVITE_REDEMPTIONS, "unknown");
                return Err(PatotaError::unknown_invite_code());
            }
        };

        let Some(patota) = self.store.find_patota_by_invite_code(&code).await? else {
            record_outcome(INVITE_REDEMPTIONS, "unknown");
            return Err(PatotaError::unknown_invite_code());
        };

        let user_id = session.user_id();
        if self.store.get_membership(&patota.id, user_id).await?.is_some() {
            record_outcome(INVITE_REDEMPTIONS, "already_member");
            return Ok(JoinOutcome::AlreadyMember(patota));
        }

        let membership = Membership::member(patota.id, user_id.clone());
        match self.store.insert_membership(user_id, &membership).await {
            Ok(()) => {
                info!(patota_id = %patota.id, user_id = %user_id, "Joined patota");
                record_outcome(INVITE_REDEMPTIONS, "joined");
                Ok(JoinOutcome::Joined(patota))
            }
            Err(StoreError::DuplicateMembership) => {
                record_outcome(INVITE_REDEMPTIONS, "already_member");
                Ok(JoinOutcome::AlreadyMember(patota))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Every Patota the caller belongs to, oldest first
    pub async fn list_my_patotas(&self, session: &Session) -> Result<Vec<PatotaSummary>, PatotaError> {
        let rows = self.store.list_user_patotas(session.user_id()).await?;
        Ok(rows
            .into_iter()
            .map(|(patota, role)| PatotaSummary::new(patota, role))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_patota::patota::Role;
    use crate::core_patota::storage::MemoryPatotaStore;
    use crate::test_utils::session_for;

    fn service(store: &MemoryPatotaStore) -> MembershipService {
        MembershipService::new(
            Arc::new(store.clone()),
            InviteConfig::default(),
            PatotaConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_create_trims_and_drops_blank_description() {
        let store = MemoryPatotaStore::new();
        let alice = session_for("alice", "Alice");

        let patota = service(&store)
            .create_patota(&alice, "  Team A  ", Some("   "))
            .await
            .unwrap();

        assert_eq!(patota.name, "Team A");
        assert_eq!(patota.description, None);
        assert_eq!(patota.invite_code.as_str().len(), InviteConfig::default().code_length);
    }

    #[tokio::test]
    async fn test_create_rejects_bad_names() {
        let store = MemoryPatotaStore::new();
        let service = service(&store);
        let alice = session_for("alice", "Alice");

        let empty = service.create_patota(&alice, "   ", None).await;
        assert!(matches!(empty, Err(PatotaError::Validation(_))));

        let long = "x".repeat(PatotaConfig::default().max_name_length + 1);
        let too_long = service.create_patota(&alice, &long, None).await;
        assert!(matches!(too_long, Err(PatotaError::Validation(_))));

        assert!(service.list_my_patotas(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_surfaces_store_failure() {
        let store = MemoryPatotaStore::new();
        store.fail_next(StoreError::Backend("connection reset".into()));

        let result = service(&store)
            .create_patota(&session_for("alice", "Alice"), "Team A", None)
            .await;
        assert!(matches!(result, Err(PatotaError::Store(_))));
    }

    #[tokio::test]
    async fn test_create_retries_after_code_collision() {
        let store = MemoryPatotaStore::new();
        store.fail_next(StoreError::DuplicateInviteCode);

        let patota = service(&store)
            .create_patota(&session_for("alice", "Alice"), "Team A", None)
            .await
            .unwrap();
        assert_eq!(patota.name, "Team A");
    }

    #[tokio::test]
    async fn test_create_gives_up_after_max_attempts() {
        let store = MemoryPatotaStore::new();
        let invite = InviteConfig {
            max_generation_attempts: 1,
            ..InviteConfig::default()
        };
        let service = MembershipService::new(Arc::new(store.clone()), invite, PatotaConfig::default());
        store.fail_next(StoreError::DuplicateInviteCode);

        let result = service
            .create_patota(&session_for("alice", "Alice"), "Team A", None)
            .await;
        assert!(matches!(result, Err(PatotaError::Store(_))));
    }

    #[tokio::test]
    async fn test_redeem_joins_then_reports_already_member() {
        let store = MemoryPatotaStore::new();
        let service = service(&store);
        let alice = session_for("alice", "Alice");
        let bob = session_for("bob", "Bob");

        let patota = service.create_patota(&alice, "Team A", None).await.unwrap();
        let lower = patota.invite_code.as_str().to_lowercase();

        let first = service.redeem_invite_code(&bob, &lower).await.unwrap();
        assert_eq!(first, JoinOutcome::Joined(patota.clone()));

        let second = service.redeem_invite_code(&bob, patota.invite_code.as_str()).await.unwrap();
        assert_eq!(second, JoinOutcome::AlreadyMember(patota.clone()));

        let creator = service.redeem_invite_code(&alice, patota.invite_code.as_str()).await.unwrap();
        assert!(!creator.is_new_membership());

        let bobs = service.list_my_patotas(&bob).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert_eq!(bobs[0].role, Role::Member);
    }

    #[tokio::test]
    async fn test_redeem_insert_conflict_is_already_member() {
        let store = MemoryPatotaStore::new();
        let service = service(&store);
        let alice = session_for("alice", "Alice");
        let bob = session_for("bob", "Bob");
        let patota = service.create_patota(&alice, "Team A", None).await.unwrap();

        store.set_stale_membership_reads(true);
        service.redeem_invite_code(&bob, patota.invite_code.as_str()).await.unwrap();
        let again = service.redeem_invite_code(&bob, patota.invite_code.as_str()).await.unwrap();

        assert_eq!(again, JoinOutcome::AlreadyMember(patota));
    }

    #[tokio::test]
    async fn test_redeem_rejects_empty_and_unknown_codes() {
        let store = MemoryPatotaStore::new();
        let service = service(&store);
        let bob = session_for("bob", "Bob");

        assert!(matches!(
            service.redeem_invite_code(&bob, "   ").await,
            Err(PatotaError::Validation(_))
        ));
        assert!(matches!(
            service.redeem_invite_code(&bob, "ZZZZZZ").await,
            Err(PatotaError::NotFound(_))
        ));
        assert!(matches!(
            service.redeem_invite_code(&bob, "AB-12").await,
            Err(PatotaError::NotFound(_))
        ));
    }
}
