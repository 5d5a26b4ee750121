//! SQLite storage plumbing shared by the identity and patota stores
//!
//! Owns pool construction and the versioned schema migrations.

pub mod migrations;

pub use migrations::{migrate, CURRENT_SCHEMA_VERSION};

use crate::config::StoreConfig;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use thiserror::Error;

/// Connection pool used by every SQL store
pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// True when SQLite rejected a write on a UNIQUE or PRIMARY KEY constraint
pub(crate) fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(e, _) => matches!(
            e.extended_code,
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        ),
        _ => false,
    }
}

fn configure(conn: &mut rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA busy_timeout = 5000;")
}

/// Open (creating if needed) the on-disk database and run pending migrations
pub fn open_pool(config: &StoreConfig) -> Result<DbPool, DatabaseError> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(&config.database_path).with_init(configure);
    let pool = Pool::builder().max_size(config.pool_size).build(manager)?;

    migrate(&pool)?;
    Ok(pool)
}

/// Single-connection in-memory database, migrated
///
/// Every in-memory connection is its own database, so the pool is capped at
/// one connection. Callers must not hold a connection across another `get`.
pub fn memory_pool() -> Result<DbPool, DatabaseError> {
    let manager = SqliteConnectionManager::memory().with_init(configure);
    let pool = Pool::builder().max_size(1).build(manager)?;

    migrate(&pool)?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_pool_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            database_path: dir.path().join("nested").join("patotas.db"),
            pool_size: 2,
        };

        let pool = open_pool(&config).unwrap();
        assert!(config.database_path.exists());

        let conn = pool.get().unwrap();
        let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
        assert_eq!(fk, 1);
    }

    #[test]
    fn test_memory_pool_is_migrated() {
        let pool = memory_pool().unwrap();
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'patotas'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }
}
