//! SQL-based storage for patotas and memberships

use super::super::invite::InviteCode;
use super::super::patota::{Membership, Patota, Role};
use super::super::policy::{check_membership_insert, check_patota_insert};
use super::super::store::{PatotaStore, StoreError};
use super::super::types::PatotaId;
use crate::storage::{is_unique_violation, DbPool};
use crate::types::{Timestamp, UserId};
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::str::FromStr;
use tracing::debug;

const PATOTA_COLUMNS: &str = "p.id, p.name, p.description, p.invite_code, p.created_by, p.created_at";

/// SQLite-backed [`PatotaStore`]
///
/// Expects a pool that has already been migrated (see [`crate::storage::open_pool`]).
#[derive(Clone)]
pub struct PatotaSqlStore {
    pool: DbPool,
}

impl PatotaSqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conversion_error(column: usize, message: String) -> rusqlite::Error {
        rusqlite::Error::FromSqlConversionFailure(
            column,
            rusqlite::types::Type::Text,
            message.into(),
        )
    }

    fn row_to_patota(row: &Row<'_>) -> rusqlite::Result<Patota> {
        let id: String = row.get(0)?;
        let code: String = row.get(3)?;

        Ok(Patota {
            id: PatotaId::from_str(&id).map_err(|e| Self::conversion_error(0, e.to_string()))?,
            name: row.get(1)?,
            description: row.get(2)?,
            invite_code: InviteCode::parse(&code)
                .map_err(|e| Self::conversion_error(3, e.to_string()))?,
            created_by: UserId::new(row.get::<_, String>(4)?),
            created_at: Timestamp::from_sql(row.get(5)?),
        })
    }

    fn row_to_role(row: &Row<'_>, column: usize) -> rusqlite::Result<Role> {
        let role: String = row.get(column)?;
        Role::from_str(&role).map_err(|e| Self::conversion_error(column, e))
    }

    fn row_to_membership(row: &Row<'_>) -> rusqlite::Result<Membership> {
        let patota_id: String = row.get(0)?;

        Ok(Membership {
            patota_id: PatotaId::from_str(&patota_id)
                .map_err(|e| Self::conversion_error(0, e.to_string()))?,
            user_id: UserId::new(row.get::<_, String>(1)?),
            role: Self::row_to_role(row, 2)?,
            score: row.get(3)?,
            joined_at: Timestamp::from_sql(row.get(4)?),
        })
    }

    fn load_patota(conn: &Connection, id: &PatotaId) -> Result<Option<Patota>, StoreError> {
        let sql = format!("SELECT {} FROM patotas p WHERE p.id = ?", PATOTA_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id.to_string()], Self::row_to_patota)
            .optional()?)
    }

    fn write_membership(conn: &Connection, membership: &Membership) -> Result<(), rusqlite::Error> {
        conn.execute(
            "INSERT INTO patota_members (patota_id, user_id, role, score, joined_at)
             VALUES (?, ?, ?, ?, ?)",
            params![
                membership.patota_id.to_string(),
                membership.user_id.as_str(),
                membership.role.as_str(),
                membership.score,
                membership.joined_at.to_sql(),
            ],
        )?;
        Ok(())
    }

    /// Run `op` with a pooled connection on the blocking thread pool
    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T, StoreError> + Send + 'static,
    {
        let pool = self.pool.clone();

        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get()?;
            op(&mut *conn)
        })
        .await?
    }
}

#[async_trait]
impl PatotaStore for PatotaSqlStore {
    async fn insert_patota(&self, actor: &UserId, patota: &Patota) -> Result<(), StoreError> {
        check_patota_insert(actor, patota)?;
        let patota = patota.clone();

        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            tx.execute(
                "INSERT INTO patotas (id, name, description, invite_code, created_by, created_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
                params![
                    patota.id.to_string(),
                    &patota.name,
                    &patota.description,
                    patota.invite_code.as_str(),
                    patota.created_by.as_str(),
                    patota.created_at.to_sql(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) && e.to_string().contains("patotas.invite_code") {
                    StoreError::DuplicateInviteCode
                } else {
                    StoreError::from(e)
                }
            })?;

            Self::write_membership(&tx, &patota.creator_membership())?;

            // Dropping `tx` on any error above rolls both rows back.
            tx.commit()?;

            debug!(patota_id = %patota.id, "Inserted patota");
            Ok(())
        })
        .await
    }

    async fn get_patota(&self, id: &PatotaId) -> Result<Option<Patota>, StoreError> {
        let id = *id;
        self.with_connection(move |conn| Self::load_patota(conn, &id)).await
    }

    async fn find_patota_by_invite_code(
        &self,
        code: &InviteCode,
    ) -> Result<Option<Patota>, StoreError> {
        let code = code.clone();

        self.with_connection(move |conn| {
            let sql = format!("SELECT {} FROM patotas p WHERE p.invite_code = ?", PATOTA_COLUMNS);
            Ok(conn
                .query_row(&sql, params![code.as_str()], Self::row_to_patota)
                .optional()?)
        })
        .await
    }

    async fn get_membership(
        &self,
        patota_id: &PatotaId,
        user_id: &UserId,
    ) -> Result<Option<Membership>, StoreError> {
        let patota_id = *patota_id;
        let user_id = user_id.clone();

        self.with_connection(move |conn| {
            Ok(conn
                .query_row(
                    "SELECT patota_id, user_id, role, score, joined_at
                     FROM patota_members WHERE patota_id = ? AND user_id = ?",
                    params![patota_id.to_string(), user_id.as_str()],
                    Self::row_to_membership,
                )
                .optional()?)
        })
        .await
    }

    async fn insert_membership(
        &self,
        actor: &UserId,
        membership: &Membership,
    ) -> Result<(), StoreError> {
        let actor = actor.clone();
        let membership = membership.clone();

        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let patota = Self::load_patota(&tx, &membership.patota_id)?.ok_or_else(|| {
                StoreError::PermissionDenied(format!(
                    "patota {} does not exist",
                    membership.patota_id
                ))
            })?;
            check_membership_insert(&actor, &membership, &patota)?;

            Self::write_membership(&tx, &membership).map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::DuplicateMembership
                } else {
                    StoreError::from(e)
                }
            })?;
            tx.commit()?;

            debug!(patota_id = %membership.patota_id, user_id = %membership.user_id, "Inserted membership");
            Ok(())
        })
        .await
    }

    async fn list_memberships(&self, patota_id: &PatotaId) -> Result<Vec<Membership>, StoreError> {
        let patota_id = *patota_id;

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT patota_id, user_id, role, score, joined_at
                 FROM patota_members WHERE patota_id = ?
                 ORDER BY joined_at, rowid",
            )?;

            let memberships = stmt
                .query_map(params![patota_id.to_string()], Self::row_to_membership)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(memberships)
        })
        .await
    }

    async fn list_user_patotas(&self, user_id: &UserId) -> Result<Vec<(Patota, Role)>, StoreError> {
        let user_id = user_id.clone();

        self.with_connection(move |conn| {
            let sql = format!(
                "SELECT {}, m.role FROM patotas p
                 JOIN patota_members m ON m.patota_id = p.id
                 WHERE m.user_id = ?
                 ORDER BY p.created_at, p.rowid",
                PATOTA_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;

            let rows = stmt
                .query_map(params![user_id.as_str()], |row| {
                    Ok((Self::row_to_patota(row)?, Self::row_to_role(row, 6)?))
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await
    }
}
