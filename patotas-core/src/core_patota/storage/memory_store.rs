//! In-memory store
//!
//! Same contract and policies as the SQL store. Used by tests, with hooks to
//! inject failures and to simulate a lagging membership read.

use super::super::invite::InviteCode;
use super::super::patota::{Membership, Patota, Role};
use super::super::policy::{check_membership_insert, check_patota_insert};
use super::super::store::{PatotaStore, StoreError};
use super::super::types::PatotaId;
use crate::types::UserId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    /// Insertion order doubles as creation order
    patotas: Vec<Patota>,
    memberships: Vec<Membership>,
}

#[derive(Clone, Default)]
pub struct MemoryPatotaStore {
    tables: Arc<RwLock<Tables>>,
    next_failure: Arc<Mutex<Option<StoreError>>>,
    stale_membership_reads: Arc<AtomicBool>,
}

impl MemoryPatotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call fail with `err`
    pub fn fail_next(&self, err: StoreError) {
        if let Ok(mut slot) = self.next_failure.lock() {
            *slot = Some(err);
        }
    }

    /// When enabled, `get_membership` always reports no membership
    pub fn set_stale_membership_reads(&self, enabled: bool) {
        self.stale_membership_reads.store(enabled, Ordering::SeqCst);
    }

    fn take_failure(&self) -> Result<(), StoreError> {
        let injected = self.next_failure.lock().ok().and_then(|mut slot| slot.take());
        match injected {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PatotaStore for MemoryPatotaStore {
    async fn insert_patota(&self, actor: &UserId, patota: &Patota) -> Result<(), StoreError> {
        self.take_failure()?;
        check_patota_insert(actor, patota)?;

        let mut tables = self.tables.write().await;
        if tables.patotas.iter().any(|p| p.invite_code == patota.invite_code) {
            return Err(StoreError::DuplicateInviteCode);
        }
        if tables.patotas.iter().any(|p| p.id == patota.id) {
            return Err(StoreError::Backend(format!("duplicate patota id {}", patota.id)));
        }

        tables.patotas.push(patota.clone());
        tables.memberships.push(patota.creator_membership());
        Ok(())
    }

    async fn get_patota(&self, id: &PatotaId) -> Result<Option<Patota>, StoreError> {
        self.take_failure()?;
        let tables = self.tables.read().await;
        Ok(tables.patotas.iter().find(|p| &p.id == id).cloned())
    }

    async fn find_patota_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Patota>, StoreError> {
        self.take_failure()?;
        let tables = self.tables.read().await;
        Ok(tables.patotas.iter().find(|p| &p.invite_code == code).cloned())
    }

    async fn get_membership(
        &self,
        patota_id: &PatotaId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, StoreError> {
        self.take_failure()?;
        if self.stale_membership_reads.load(Ordering::SeqCst) {
            return Ok(None);
        }

        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .find(|m| &m.patota_id == patota_id && &m.user_id == user_id)
            .cloned())
    }

    async fn insert_membership(
        &self,
        actor: &UserId,
        membership: &Membership,
    ) -> Result<(), StoreError> {
        self.take_failure()?;

        let mut tables = self.tables.write().await;
        let patota = tables
            .patotas
            .iter()
            .find(|p| p.id == membership.patota_id)
            .ok_or_else(|| {
                StoreError::PermissionDenied(format!(
                    "patota {} does not exist",
                    membership.patota_id
                ))
            })?;
        check_membership_insert(actor, membership, patota)?;

        if tables
            .memberships
            .iter()
            .any(|m| m.patota_id == membership.patota_id && m.user_id == membership.user_id)
        {
            return Err(StoreError::DuplicateMembership);
        }

        tables.memberships.push(membership.clone());
        Ok(())
    }

    async fn list_memberships(&self, patota_id: &PatotaId) -> Result<Vec<Membership>, StoreError> {
        self.take_failure()?;
        let tables = self.tables.read().await;
        Ok(tables
            .memberships
            .iter()
            .filter(|m| &m.patota_id == patota_id)
            .cloned()
            .collect())
    }

    async fn list_user_patotas(&self, user_id: &UserId) -> Result<Vec<(Patota, Role)>, StoreError> {
        self.take_failure()?;
        let tables = self.tables.read().await;

        Ok(tables
            .patotas
            .iter()
            .filter_map(|p| {
                tables
                    .memberships
                    .iter()
                    .find(|m| m.patota_id == p.id && &m.user_id == user_id)
                    .map(|m| (p.clone(), m.role))
            })
            .collect())
    }
}
