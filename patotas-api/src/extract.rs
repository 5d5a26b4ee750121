//! Bearer-token session extractor

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use patotas_core::core_identity::{Session, SessionToken};
use std::sync::Arc;

/// The caller's live session. Rejects with 401 when absent.
pub struct CurrentSession(pub Session);

pub(crate) fn bearer_token(parts: &Parts) -> Option<SessionToken> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(SessionToken::new)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthenticated)?;
        state
            .identity
            .current_session(&token)
            .await
            .map(CurrentSession)
            .ok_or(ApiError::Unauthenticated)
    }
}
