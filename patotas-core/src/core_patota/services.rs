//! Bundle of the patota services sharing one store

use super::access::AccessGate;
use super::membership::MembershipService;
use super::roster::RosterProjection;
use super::store::PatotaStore;
use crate::config::Config;
use crate::core_identity::IdentityDirectory;
use std::sync::Arc;

pub struct PatotaServices {
    pub membership: MembershipService,
    pub access: AccessGate,
    pub roster: RosterProjection,
}

impl PatotaServices {
    pub fn new(
        store: Arc<dyn PatotaStore>,
        directory: Arc<dyn IdentityDirectory>,
        config: &Config,
    ) -> Self {
        Self {
            membership: MembershipService::new(
                store.clone(),
                config.invite.clone(),
                config.patota.clone(),
            ),
            access: AccessGate::new(store.clone()),
            roster: RosterProjection::new(store, directory),
        }
    }
}
