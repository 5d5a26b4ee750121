//! HTTP API for Patotas
//!
//! A JSON API over the core services. Requests authenticate with a bearer
//! token obtained from `POST /auth/sign-in`.

pub mod error;
pub mod events;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod shutdown;
pub mod state;
pub mod types;

pub use error::ApiError;
pub use routes::build_router;
pub use shutdown::Shutdown;
pub use state::AppState;
