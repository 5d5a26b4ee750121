//! Shared state for request handlers

use patotas_core::config::Config;
use patotas_core::core_identity::{IdentityProvider, LocalIdentityProvider};
use patotas_core::core_patota::{PatotaServices, PatotaSqlStore, PatotaStore};
use patotas_core::storage::open_pool;
use std::sync::Arc;

/// Server state shared across requests
pub struct AppState {
    pub identity: Arc<dyn IdentityProvider>,
    pub patotas: PatotaServices,
}

impl AppState {
    pub fn new(
        identity: Arc<LocalIdentityProvider>,
        store: Arc<dyn PatotaStore>,
        config: &Config,
    ) -> Self {
        Self {
            patotas: PatotaServices::new(store, identity.clone(), config),
            identity,
        }
    }

    /// Open the configured database and wire the SQL-backed services
    pub fn open(config: &Config) -> anyhow::Result<Self> {
        let pool = open_pool(&config.store)?;
        let identity = Arc::new(LocalIdentityProvider::new(pool.clone(), &config.identity)?);
        Ok(Self::new(identity, Arc::new(PatotaSqlStore::new(pool)), config))
    }
}
