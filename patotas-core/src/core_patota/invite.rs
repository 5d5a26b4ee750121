//! Invite codes
//!
//! Codes are short uppercase alphanumeric tokens. Parsing trims and
//! upper-cases its input, so "x1y2z3" and "X1Y2Z3" name the same code.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A normalized invite code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InviteCodeError {
    #[error("Invite code cannot be empty")]
    Empty,

    #[error("Invite codes only contain letters and digits")]
    Malformed,
}

impl InviteCode {
    /// Generate a random code of `len` characters
    pub fn generate(len: usize) -> Self {
        let mut rng = rand::rng();
        let code = (0..len)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();
        InviteCode(code)
    }

    /// Normalize user input into a code
    pub fn parse(raw: &str) -> Result<Self, InviteCodeError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(InviteCodeError::Empty);
        }
        if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InviteCodeError::Malformed);
        }
        Ok(InviteCode(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InviteCode {
    type Error = InviteCodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        InviteCode::parse(&value)
    }
}

impl From<InviteCode> for String {
    fn from(code: InviteCode) -> Self {
        code.0
    }
}
