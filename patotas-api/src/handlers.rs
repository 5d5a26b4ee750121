//! HTTP API handlers

use crate::error::{ApiError, ApiResult};
use crate::extract::CurrentSession;
use crate::state::AppState;
use crate::types::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use patotas_core::core_patota::{Access, PatotaError, PatotaId, PatotaSummary, RosterEntry};
use secrecy::SecretString;
use std::sync::Arc;

fn parse_patota_id(raw: &str) -> ApiResult<PatotaId> {
    raw.parse()
        .map_err(|_| ApiError::from(PatotaError::unknown_patota(raw)))
}

// ============================================================================
// Auth Handlers
// ============================================================================

/// POST /auth/sign-up
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<(StatusCode, Json<IdentityResponse>)> {
    let identity = state
        .identity
        .sign_up(&req.email, &SecretString::new(req.password), &req.display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(IdentityResponse::from(&identity))))
}

/// POST /auth/sign-in
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<SignInResponse>> {
    let session = state
        .identity
        .sign_in(&req.email, &SecretString::new(req.password))
        .await?;

    Ok(Json(SignInResponse {
        token: session.token.as_str().to_string(),
        identity: IdentityResponse::from(&session.identity),
    }))
}

/// POST /auth/sign-out
pub async fn sign_out(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<StatusCode> {
    state.identity.sign_out(&session.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/session
pub async fn current_session(CurrentSession(session): CurrentSession) -> Json<IdentityResponse> {
    Json(IdentityResponse::from(&session.identity))
}

// ============================================================================
// Patota Handlers
// ============================================================================

/// GET /patotas - Patotas the caller belongs to
pub async fn list_patotas(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> ApiResult<Json<Vec<PatotaSummary>>> {
    let patotas = state.patotas.membership.list_my_patotas(&session).await?;
    Ok(Json(patotas))
}

/// POST /patotas - Create a Patota; the caller becomes its Administrator
pub async fn create_patota(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<CreatePatotaRequest>,
) -> ApiResult<(StatusCode, Json<PatotaResponse>)> {
    let patota = state
        .patotas
        .membership
        .create_patota(&session, &req.name, req.description.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(PatotaResponse::new(&patota, true))))
}

/// POST /patotas/join - Redeem an invite code
pub async fn join_patota(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Json(req): Json<JoinPatotaRequest>,
) -> ApiResult<Json<JoinPatotaResponse>> {
    let outcome = state
        .patotas
        .membership
        .redeem_invite_code(&session, &req.invite_code)
        .await?;

    Ok(Json(JoinPatotaResponse {
        patota: PatotaResponse::new(outcome.patota(), false),
        already_member: !outcome.is_new_membership(),
    }))
}

/// GET /patotas/:id - Patota details; the invite code is shown to Administrators only
pub async fn get_patota(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<Json<PatotaDetailResponse>> {
    let patota_id = parse_patota_id(&id)?;
    let access = state.patotas.access.resolve_access(&session, &patota_id).await?;

    let show_code = access.can_view_invite_code();
    match access {
        Access::Granted { patota, role } => Ok(Json(PatotaDetailResponse {
            patota: PatotaResponse::new(&patota, show_code),
            role,
            is_administrator: role.is_administrator(),
        })),
        Access::Denied => Err(ApiError::AccessDenied),
    }
}

/// GET /patotas/:id/members - Roster, members only
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<RosterEntry>>> {
    let patota_id = parse_patota_id(&id)?;
    let access = state.patotas.access.resolve_access(&session, &patota_id).await?;
    if !access.is_granted() {
        return Err(ApiError::AccessDenied);
    }

    let roster = state.patotas.roster.list_members(&patota_id).await?;
    Ok(Json(roster))
}
