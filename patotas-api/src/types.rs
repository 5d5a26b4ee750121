//! Request/Response types for the HTTP API

use patotas_core::core_identity::Identity;
use patotas_core::core_patota::{Patota, Role};
use serde::{Deserialize, Serialize};

// ============================================================================
// Auth Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityResponse {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

impl From<&Identity> for IdentityResponse {
    fn from(identity: &Identity) -> Self {
        Self {
            user_id: identity.user_id.to_string(),
            email: identity.email.clone(),
            display_name: identity.display_name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub identity: IdentityResponse,
}

// ============================================================================
// Patota Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePatotaRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinPatotaRequest {
    pub invite_code: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatotaResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Only present for Administrators
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_code: Option<String>,
    pub created_at: u64,
}

impl PatotaResponse {
    pub fn new(patota: &Patota, show_invite_code: bool) -> Self {
        Self {
            id: patota.id.to_string(),
            name: patota.name.clone(),
            description: patota.description.clone(),
            invite_code: show_invite_code.then(|| patota.invite_code.to_string()),
            created_at: patota.created_at.as_millis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinPatotaResponse {
    pub patota: PatotaResponse,
    pub already_member: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatotaDetailResponse {
    pub patota: PatotaResponse,
    pub role: Role,
    pub is_administrator: bool,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub title: String,
    pub description: String,
}
