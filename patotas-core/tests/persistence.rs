//! Data written through one pool is visible after reopening the database

use patotas_core::config::StoreConfig;
use patotas_core::core_identity::{IdentityProvider, LocalIdentityProvider};
use patotas_core::core_patota::{PatotaServices, PatotaSqlStore, Role};
use patotas_core::storage::open_pool;
use patotas_core::test_utils::{test_config, TEST_PASSWORD};
use secrecy::SecretString;
use std::sync::Arc;
use tempfile::TempDir;

fn store_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        database_path: dir.path().join("nested").join("patotas.db"),
        pool_size: 2,
    }
}

#[tokio::test]
async fn test_patotas_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config();
    let password = SecretString::new(TEST_PASSWORD.to_string());

    let patota_id = {
        let pool = open_pool(&store_config(&dir)).unwrap();
        let identity = Arc::new(LocalIdentityProvider::new(pool.clone(), &config.identity).unwrap());
        let services = PatotaServices::new(
            Arc::new(PatotaSqlStore::new(pool)),
            identity.clone(),
            &config,
        );

        identity
            .sign_up("alice@example.com", &password, "Alice")
            .await
            .unwrap();
        let session = identity.sign_in("alice@example.com", &password).await.unwrap();
        services
            .membership
            .create_patota(&session, "Team A", None)
            .await
            .unwrap()
            .id
    };

    let pool = open_pool(&store_config(&dir)).unwrap();
    let identity = Arc::new(LocalIdentityProvider::new(pool.clone(), &config.identity).unwrap());
    let services = PatotaServices::new(Arc::new(PatotaSqlStore::new(pool)), identity.clone(), &config);

    // Sessions are in memory only; the account itself persists.
    let session = identity.sign_in("alice@example.com", &password).await.unwrap();
    let access = services.access.resolve_access(&session, &patota_id).await.unwrap();
    assert_eq!(access.role(), Some(Role::Administrator));

    let roster = services.roster.list_members(&patota_id).await.unwrap();
    assert_eq!(roster.len(), 1);
    assert_eq!(roster[0].display_name, "Alice");
}
