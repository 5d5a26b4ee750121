//! Database migrations for users, patotas and memberships
//!
//! Each migration is applied atomically and tracked in the schema_version table.

use super::DbPool;
use crate::types::Timestamp;
use rusqlite::params;
use tracing::info;

/// Current schema version
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Migration descriptor
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub up_sql: &'static str,
}

/// All available migrations in order
pub fn get_migrations() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "Identity provider users",
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS users (
                    id TEXT PRIMARY KEY,                    -- UserId (UUID)
                    email TEXT NOT NULL UNIQUE,             -- lower-cased
                    display_name TEXT NOT NULL,
                    password_hash TEXT NOT NULL,            -- argon2 PHC string
                    created_at INTEGER NOT NULL
                );
            "#,
        },
        Migration {
            version: 2,
            description: "Patotas and memberships",
            up_sql: r#"
                CREATE TABLE IF NOT EXISTS patotas (
                    id TEXT PRIMARY KEY,                    -- PatotaId (UUID)
                    name TEXT NOT NULL CHECK(length(name) > 0),
                    description TEXT,
                    invite_code TEXT NOT NULL UNIQUE,       -- always uppercase
                    created_by TEXT NOT NULL,               -- UserId
                    created_at INTEGER NOT NULL
                );

                CREATE INDEX IF NOT EXISTS idx_patotas_created_by ON patotas(created_by);

                CREATE TABLE IF NOT EXISTS patota_members (
                    patota_id TEXT NOT NULL,
                    user_id TEXT NOT NULL,
                    role TEXT NOT NULL CHECK(role IN ('Administrator', 'Member')),
                    score INTEGER NOT NULL DEFAULT 0,
                    joined_at INTEGER NOT NULL,
                    PRIMARY KEY (patota_id, user_id),
                    FOREIGN KEY (patota_id) REFERENCES patotas(id) ON DELETE CASCADE
                );

                CREATE INDEX IF NOT EXISTS idx_patota_members_user ON patota_members(user_id);
            "#,
        },
    ]
}

/// Get current schema version from database
fn get_current_version(pool: &DbPool) -> Result<i32, super::DatabaseError> {
    let conn = pool.get()?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn.query_row(
        "SELECT MAX(version) FROM schema_version",
        [],
        |row| row.get(0),
    )?;

    Ok(version.unwrap_or(0))
}

/// Run all pending migrations
pub fn migrate(pool: &DbPool) -> Result<(), super::DatabaseError> {
    let current_version = get_current_version(pool)?;

    let pending: Vec<_> = get_migrations()
        .into_iter()
        .filter(|m| m.version > current_version)
        .collect();

    if pending.is_empty() {
        return Ok(());
    }

    let conn = pool.get()?;

    for migration in pending {
        let tx = conn.unchecked_transaction()?;

        tx.execute_batch(migration.up_sql)?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?, ?)",
            params![migration.version, Timestamp::now().to_sql()],
        )?;

        tx.commit()?;

        info!(
            version = migration.version,
            description = migration.description,
            "Applied schema migration"
        );
    }

    Ok(())
}

/// Get the latest migration version available
pub fn get_latest_version() -> i32 {
    get_migrations().iter().map(|m| m.version).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;

    fn setup_test_pool() -> DbPool {
        let manager = SqliteConnectionManager::memory()
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
        Pool::builder().max_size(1).build(manager).expect("Failed to create pool")
    }

    #[test]
    fn test_initial_migration() {
        let pool = setup_test_pool();
        migrate(&pool).expect("Migration failed");

        let conn = pool.get().unwrap();
        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(tables.contains(&"users".to_string()));
        assert!(tables.contains(&"patotas".to_string()));
        assert!(tables.contains(&"patota_members".to_string()));
    }

    #[test]
    fn test_idempotent_migrations() {
        let pool = setup_test_pool();

        migrate(&pool).expect("First migration failed");
        migrate(&pool).expect("Second migration failed");

        let version = get_current_version(&pool).expect("Failed to get version");
        assert_eq!(version, CURRENT_SCHEMA_VERSION);
        assert_eq!(get_latest_version(), CURRENT_SCHEMA_VERSION);
    }

    #[test]
    fn test_membership_primary_key_rejects_duplicates() {
        let pool = setup_test_pool();
        migrate(&pool).unwrap();
        let conn = pool.get().unwrap();

        conn.execute(
            "INSERT INTO patotas (id, name, invite_code, created_by, created_at)
             VALUES ('p1', 'Team A', 'X1Y2Z3', 'alice', 0)",
            [],
        )
        .unwrap();

        let insert = "INSERT INTO patota_members (patota_id, user_id, role, joined_at)
                      VALUES ('p1', 'bob', 'Member', 0)";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }

    #[test]
    fn test_role_check_constraint() {
        let pool = setup_test_pool();
        migrate(&pool).unwrap();
        let conn = pool.get().unwrap();

        conn.execute(
            "INSERT INTO patotas (id, name, invite_code, created_by, created_at)
             VALUES ('p1', 'Team A', 'X1Y2Z3', 'alice', 0)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO patota_members (patota_id, user_id, role, joined_at)
             VALUES ('p1', 'bob', 'Owner', 0)",
            [],
        );
        assert!(result.is_err());
    }
}
