//! Identifier types for patotas

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a Patota, generated server-side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PatotaId(pub Uuid);

impl PatotaId {
    /// Create a new random PatotaId
    pub fn generate() -> Self {
        PatotaId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for PatotaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PatotaId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(PatotaId)
    }
}

impl From<Uuid> for PatotaId {
    fn from(id: Uuid) -> Self {
        PatotaId(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patota_id_generation() {
        assert_ne!(PatotaId::generate(), PatotaId::generate());
    }

    #[test]
    fn test_patota_id_parses_its_display() {
        let id = PatotaId::generate();
        let parsed: PatotaId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<PatotaId>().is_err());
    }
}
