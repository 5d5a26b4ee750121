//! API routes definition

use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Auth routes
        .route("/auth/sign-up", post(handlers::sign_up))
        .route("/auth/sign-in", post(handlers::sign_in))
        .route("/auth/sign-out", post(handlers::sign_out))
        .route("/auth/session", get(handlers::current_session))
        // Patota routes
        .route("/patotas", get(handlers::list_patotas).post(handlers::create_patota))
        .route("/patotas/join", post(handlers::join_patota))
        .route("/patotas/:id", get(handlers::get_patota))
        .route("/patotas/:id/members", get(handlers::list_members))
        .with_state(state)
}
