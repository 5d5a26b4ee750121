//! Test fixtures for identities, sessions and patotas

use crate::config::{Config, IdentityConfig};
use crate::core_identity::{Identity, IdentityProvider, LocalIdentityProvider, Session, SessionToken};
use crate::core_patota::{InviteCode, Patota, PatotaServices, PatotaSqlStore, PatotaStore};
use crate::storage::{memory_pool, DbPool};
use crate::types::{Timestamp, UserId};
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;

/// Password used by every fixture account
pub const TEST_PASSWORD: &str = "correct-horse";

/// Identity settings with a cheap password hash
pub fn fast_identity_config() -> IdentityConfig {
    IdentityConfig {
        min_password_length: 6,
        password_hash_memory_kib: 64,
        password_hash_iterations: 1,
        session_ttl: Duration::from_secs(60 * 60),
    }
}

/// Default config with [`fast_identity_config`]
pub fn test_config() -> Config {
    Config {
        identity: fast_identity_config(),
        ..Config::default()
    }
}

/// A session that was never issued by a provider
pub fn session_for(user_id: &str, display_name: &str) -> Session {
    Session {
        token: SessionToken::generate(),
        identity: Identity {
            user_id: UserId::new(user_id),
            email: format!("{}@example.com", user_id),
            display_name: display_name.to_string(),
        },
        created_at: Timestamp::now(),
    }
}

/// Builder for Patota values that bypass the membership service
pub struct TestPatotaBuilder {
    name: String,
    description: Option<String>,
    invite_code: Option<InviteCode>,
    created_by: UserId,
}

impl TestPatotaBuilder {
    pub fn new() -> Self {
        Self {
            name: "Team A".to_string(),
            description: None,
            invite_code: None,
            created_by: UserId::new("alice"),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_code(mut self, code: &str) -> Self {
        self.invite_code = InviteCode::parse(code).ok();
        self
    }

    pub fn with_creator(mut self, creator: UserId) -> Self {
        self.created_by = creator;
        self
    }

    pub fn build(self) -> Patota {
        Patota::new(
            self.name,
            self.description,
            self.invite_code.unwrap_or_else(|| InviteCode::generate(6)),
            self.created_by,
        )
    }
}

impl Default for TestPatotaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity provider, SQL store and services over one in-memory database
pub struct TestWorld {
    pub config: Config,
    pub identity: Arc<LocalIdentityProvider>,
    pub store: Arc<dyn PatotaStore>,
    pub services: PatotaServices,
}

impl TestWorld {
    pub fn new() -> Self {
        Self::with_pool(test_config(), memory_pool().expect("in-memory database"))
    }

    /// Identity provider and SQL store sharing `pool`
    pub fn with_pool(config: Config, pool: DbPool) -> Self {
        let identity = Arc::new(
            LocalIdentityProvider::new(pool.clone(), &config.identity).expect("identity provider"),
        );
        Self::with_store(config, identity, Arc::new(PatotaSqlStore::new(pool)))
    }

    pub fn with_store(
        config: Config,
        identity: Arc<LocalIdentityProvider>,
        store: Arc<dyn PatotaStore>,
    ) -> Self {
        let services = PatotaServices::new(store.clone(), identity.clone(), &config);
        Self {
            config,
            identity,
            store,
            services,
        }
    }

    /// Register an account and sign it in
    pub async fn sign_up_and_in(&self, email: &str, display_name: &str) -> Session {
        let password = SecretString::new(TEST_PASSWORD.to_string());
        self.identity
            .sign_up(email, &password, display_name)
            .await
            .expect("sign up");
        self.identity.sign_in(email, &password).await.expect("sign in")
    }
}

impl Default for TestWorld {
    fn default() -> Self {
        Self::new()
    }
}
