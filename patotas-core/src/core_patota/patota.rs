//! Patota data structures

use super::invite::InviteCode;
use super::types::PatotaId;
use crate::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A Patota is a named group of users joined through a shared invite code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patota {
    /// Unique identifier
    pub id: PatotaId,

    /// Human-readable name, never empty
    pub name: String,

    /// Optional description
    pub description: Option<String>,

    /// Code other users redeem to join
    pub invite_code: InviteCode,

    /// User who created the Patota
    pub created_by: UserId,

    /// When the Patota was created
    pub created_at: Timestamp,
}

impl Patota {
    /// Create a new Patota owned by `created_by`
    pub fn new(
        name: String,
        description: Option<String>,
        invite_code: InviteCode,
        created_by: UserId,
    ) -> Self {
        Patota {
            id: PatotaId::generate(),
            name,
            description,
            invite_code,
            created_by,
            created_at: Timestamp::now(),
        }
    }

    /// Administrator membership for the creator, stamped with the creation time
    pub fn creator_membership(&self) -> Membership {
        Membership {
            patota_id: self.id,
            user_id: self.created_by.clone(),
            role: Role::Administrator,
            score: 0,
            joined_at: self.created_at,
        }
    }
}

/// Roles inside a Patota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Creator of the Patota; may see and share the invite code
    Administrator,
    /// Joined through an invite code
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "Administrator",
            Role::Member => "Member",
        }
    }

    pub fn is_administrator(&self) -> bool {
        is_administrator(*self)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Administrator" => Ok(Role::Administrator),
            "Member" => Ok(Role::Member),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// True only for the Administrator role
pub fn is_administrator(role: Role) -> bool {
    matches!(role, Role::Administrator)
}

/// A user's membership in one Patota
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub patota_id: PatotaId,
    pub user_id: UserId,
    pub role: Role,
    /// Ranking score shown on the roster
    pub score: i64,
    pub joined_at: Timestamp,
}

impl Membership {
    /// A fresh Member row with a zero score
    pub fn member(patota_id: PatotaId, user_id: UserId) -> Self {
        Membership {
            patota_id,
            user_id,
            role: Role::Member,
            score: 0,
            joined_at: Timestamp::now(),
        }
    }
}

/// One entry of "my patotas"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatotaSummary {
    pub id: PatotaId,
    pub name: String,
    pub description: Option<String>,
    pub role: Role,
}

impl PatotaSummary {
    pub fn new(patota: Patota, role: Role) -> Self {
        PatotaSummary {
            id: patota.id,
            name: patota.name,
            description: patota.description,
            role,
        }
    }
}
