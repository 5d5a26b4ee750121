//! Local identity provider backed by the `users` table
//!
//! Passwords are stored as argon2id PHC strings. Sessions live in memory,
//! expire after `identity.session_ttl` and do not survive a restart. Password
//! hashing and SQL run on the blocking thread pool.

use super::validation::{check_password, normalize_display_name, normalize_email};
use super::{
    Identity, IdentityDirectory, IdentityError, IdentityProvider, Session, SessionChange,
    SessionEvent, SessionToken,
};
use crate::config::IdentityConfig;
use crate::metrics::{record_outcome, SIGN_INS};
use crate::storage::{is_unique_violation, DbPool};
use crate::types::{Timestamp, UserId};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Outcome of checking an email/password pair against the `users` table
enum Credentials {
    UnknownEmail,
    Rejected(UserId),
    Accepted(Identity),
}

pub struct LocalIdentityProvider {
    pool: DbPool,
    sessions: Arc<RwLock<HashMap<SessionToken, Session>>>,
    events: broadcast::Sender<SessionChange>,
    hasher: Argon2<'static>,
    min_password_length: usize,
    session_ttl: Duration,
}

impl LocalIdentityProvider {
    pub fn new(pool: DbPool, config: &IdentityConfig) -> Result<Self, IdentityError> {
        let params = Params::new(
            config.password_hash_memory_kib,
            config.password_hash_iterations,
            Params::DEFAULT_P_COST,
            None,
        )
        .map_err(|e| IdentityError::Validation(format!("invalid password hash parameters: {}", e)))?;

        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            pool,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            events,
            hasher: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            min_password_length: config.min_password_length,
            session_ttl: config.session_ttl,
        })
    }

    /// Number of live sessions, expired ones included until the next sweep
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop every expired session, returning how many were removed
    pub async fn sweep_expired_sessions(&self) -> usize {
        let now = Timestamp::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));

        let removed = before - sessions.len();
        if removed > 0 {
            debug!(removed, "Swept expired sessions");
        }
        removed
    }

    fn is_expired(&self, session: &Session, now: Timestamp) -> bool {
        let age = now.as_millis().saturating_sub(session.created_at.as_millis());
        u128::from(age) >= self.session_ttl.as_millis()
    }

    fn hash_password(hasher: &Argon2<'_>, password: &SecretString) -> Result<String, IdentityError> {
        let salt = SaltString::generate(&mut OsRng);
        hasher
            .hash_password(password.expose_secret().as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| IdentityError::Storage(format!("password hashing failed: {}", e)))
    }

    fn verify_password(
        hasher: &Argon2<'_>,
        password: &SecretString,
        stored: &str,
    ) -> Result<(), IdentityError> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| IdentityError::Storage(format!("invalid stored password hash: {}", e)))?;

        hasher
            .verify_password(password.expose_secret().as_bytes(), &parsed)
            .map_err(|_| IdentityError::InvalidCredentials)
    }

    fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<(Identity, String)>, IdentityError> {
        let conn = pool.get()?;

        let row = conn
            .query_row(
                "SELECT id, email, display_name, password_hash FROM users WHERE email = ?",
                params![email],
                |row| {
                    Ok((
                        Identity {
                            user_id: UserId::new(row.get::<_, String>(0)?),
                            email: row.get(1)?,
                            display_name: row.get(2)?,
                        },
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        Ok(row)
    }

    async fn check_credentials(
        &self,
        email: String,
        password: &SecretString,
    ) -> Result<Credentials, IdentityError> {
        let pool = self.pool.clone();
        let hasher = self.hasher.clone();
        let password = password.clone();

        tokio::task::spawn_blocking(move || -> Result<Credentials, IdentityError> {
            let Some((identity, stored_hash)) = Self::find_by_email(&pool, &email)? else {
                return Ok(Credentials::UnknownEmail);
            };

            match Self::verify_password(&hasher, &password, &stored_hash) {
                Ok(()) => Ok(Credentials::Accepted(identity)),
                Err(IdentityError::InvalidCredentials) => Ok(Credentials::Rejected(identity.user_id)),
                Err(e) => Err(e),
            }
        })
        .await?
    }

    fn publish(&self, event: SessionEvent, identity: &Identity) {
        // No subscribers is fine.
        let _ = self.events.send(SessionChange {
            event,
            identity: identity.clone(),
        });
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn current_session(&self, token: &SessionToken) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;

        if self.is_expired(&session, Timestamp::now()) {
            self.sessions.write().await.remove(token);
            debug!(user_id = %session.identity.user_id, "Session expired");
            return None;
        }
        Some(session)
    }

    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session, IdentityError> {
        let email = email.trim().to_lowercase();

        let identity = match self.check_credentials(email, password).await? {
            Credentials::Accepted(identity) => identity,
            Credentials::UnknownEmail => {
                debug!("Sign-in for unknown email");
                record_outcome(SIGN_INS, "rejected");
                return Err(IdentityError::InvalidCredentials);
            }
            Credentials::Rejected(user_id) => {
                warn!(user_id = %user_id, "Sign-in rejected");
                record_outcome(SIGN_INS, "rejected");
                return Err(IdentityError::InvalidCredentials);
            }
        };

        self.sweep_expired_sessions().await;

        let session = Session {
            token: SessionToken::generate(),
            identity: identity.clone(),
            created_at: Timestamp::now(),
        };

        self.sessions
            .write()
            .await
            .insert(session.token.clone(), session.clone());

        info!(user_id = %identity.user_id, "Signed in");
        record_outcome(SIGN_INS, "accepted");
        self.publish(SessionEvent::SignedIn, &identity);

        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &SecretString,
        display_name: &str,
    ) -> Result<Identity, IdentityError> {
        let email = normalize_email(email)?;
        check_password(password.expose_secret(), self.min_password_length)?;
        let display_name = normalize_display_name(display_name)?;

        let identity = Identity {
            user_id: UserId::generate(),
            email,
            display_name,
        };

        let pool = self.pool.clone();
        let hasher = self.hasher.clone();
        let password = password.clone();
        let row = identity.clone();

        tokio::task::spawn_blocking(move || -> Result<(), IdentityError> {
            let password_hash = Self::hash_password(&hasher, &password)?;

            let conn = pool.get()?;
            conn.execute(
                "INSERT INTO users (id, email, display_name, password_hash, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                params![
                    row.user_id.as_str(),
                    &row.email,
                    &row.display_name,
                    password_hash,
                    Timestamp::now().to_sql(),
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    IdentityError::Conflict(row.email.clone())
                } else {
                    IdentityError::from(e)
                }
            })?;

            Ok(())
        })
        .await??;

        info!(user_id = %identity.user_id, "Account created");
        Ok(identity)
    }

    async fn sign_out(&self, token: &SessionToken) -> Result<(), IdentityError> {
        let session = self
            .sessions
            .write()
            .await
            .remove(token)
            .ok_or(IdentityError::SessionNotFound)?;

        info!(user_id = %session.identity.user_id, "Signed out");
        self.publish(SessionEvent::SignedOut, &session.identity);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.events.subscribe()
    }
}

#[async_trait]
impl IdentityDirectory for LocalIdentityProvider {
    async fn display_name(&self, user_id: &UserId) -> Result<Option<String>, IdentityError> {
        let pool = self.pool.clone();
        let user_id = user_id.clone();

        tokio::task::spawn_blocking(move || -> Result<Option<String>, IdentityError> {
            let conn = pool.get()?;
            let name = conn
                .query_row(
                    "SELECT display_name FROM users WHERE id = ?",
                    params![user_id.as_str()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(name)
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory_pool;
    use crate::test_utils::fast_identity_config;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(memory_pool().unwrap(), &fast_identity_config()).unwrap()
    }

    fn provider_with_ttl(session_ttl: Duration) -> LocalIdentityProvider {
        let config = IdentityConfig {
            session_ttl,
            ..fast_identity_config()
        };
        LocalIdentityProvider::new(memory_pool().unwrap(), &config).unwrap()
    }

    fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string())
    }

    #[tokio::test]
    async fn test_sign_up_then_sign_in() {
        let provider = provider();
        let identity = provider
            .sign_up("Ana@Example.com", &secret("hunter22"), " Ana ")
            .await
            .unwrap();

        assert_eq!(identity.email, "ana@example.com");
        assert_eq!(identity.display_name, "Ana");

        let session = provider.sign_in("ana@example.com", &secret("hunter22")).await.unwrap();
        assert_eq!(session.identity, identity);
        assert_eq!(provider.current_session(&session.token).await, Some(session));
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let provider = provider();
        provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        let result = provider.sign_up("ANA@example.com", &secret("other-pass"), "Ana 2").await;
        assert!(matches!(result, Err(IdentityError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email_look_the_same() {
        let provider = provider();
        provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        let wrong = provider.sign_in("ana@example.com", &secret("hunter23")).await;
        let unknown = provider.sign_in("bob@example.com", &secret("hunter22")).await;

        assert!(matches!(wrong, Err(IdentityError::InvalidCredentials)));
        assert!(matches!(unknown, Err(IdentityError::InvalidCredentials)));
        assert_eq!(provider.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_short_password_rejected() {
        let provider = provider();
        let result = provider.sign_up("ana@example.com", &secret("abc"), "Ana").await;
        assert!(matches!(result, Err(IdentityError::Validation(_))));
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_sign_out() {
        let provider = provider();
        let mut events = provider.subscribe();
        provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        let session = provider.sign_in("ana@example.com", &secret("hunter22")).await.unwrap();
        provider.sign_out(&session.token).await.unwrap();

        let first = events.recv().await.unwrap();
        let second = events.recv().await.unwrap();
        assert_eq!(first.event, SessionEvent::SignedIn);
        assert_eq!(second.event, SessionEvent::SignedOut);
        assert_eq!(second.identity, session.identity);
        assert!(provider.current_session(&session.token).await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_unknown_token() {
        let provider = provider();
        let result = provider.sign_out(&SessionToken::new("nope")).await;
        assert!(matches!(result, Err(IdentityError::SessionNotFound)));
    }

    #[tokio::test]
    async fn test_display_name_lookup() {
        let provider = provider();
        let identity = provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        assert_eq!(provider.display_name(&identity.user_id).await.unwrap(), Some("Ana".to_string()));
        assert_eq!(provider.display_name(&UserId::new("ghost")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_session_is_dropped() {
        let provider = provider_with_ttl(Duration::from_millis(250));
        provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        let session = provider.sign_in("ana@example.com", &secret("hunter22")).await.unwrap();
        assert!(provider.current_session(&session.token).await.is_some());

        tokio::time::sleep(Duration::from_millis(400)).await;

        assert!(provider.current_session(&session.token).await.is_none());
        assert_eq!(provider.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_sign_in_sweeps_expired_sessions() {
        let provider = provider_with_ttl(Duration::from_millis(250));
        provider.sign_up("ana@example.com", &secret("hunter22"), "Ana").await.unwrap();

        for _ in 0..3 {
            provider.sign_in("ana@example.com", &secret("hunter22")).await.unwrap();
        }
        assert_eq!(provider.session_count().await, 3);

        tokio::time::sleep(Duration::from_millis(400)).await;

        let fresh = provider.sign_in("ana@example.com", &secret("hunter22")).await.unwrap();
        assert_eq!(provider.session_count().await, 1);
        assert_eq!(provider.current_session(&fresh.token).await, Some(fresh));
    }

    #[tokio::test]
    async fn test_lookup_yields_while_waiting_for_a_connection() {
        let pool = memory_pool().unwrap();
        let provider = LocalIdentityProvider::new(pool.clone(), &fast_identity_config()).unwrap();
        let held = pool.get().unwrap();
        let user = UserId::new("ghost");

        let (name, ()) = tokio::join!(
            provider.display_name(&user),
            async move { drop(held) },
        );
        assert_eq!(name.unwrap(), None);
    }
}
