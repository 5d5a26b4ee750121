//! Sign-up input validation

use super::IdentityError;

/// Trim and lower-case an email, checking its basic shape
pub fn normalize_email(raw: &str) -> Result<String, IdentityError> {
    let email = raw.trim().to_lowercase();
    let mut parts = email.split('@');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(IdentityError::Validation(format!("'{}' is not a valid email address", raw.trim()))),
    }
}

pub fn check_password(password: &str, min_length: usize) -> Result<(), IdentityError> {
    if password.chars().count() < min_length {
        return Err(IdentityError::Validation(format!(
            "password must be at least {} characters",
            min_length
        )));
    }
    Ok(())
}

pub fn normalize_display_name(raw: &str) -> Result<String, IdentityError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(IdentityError::Validation("display name cannot be empty".to_string()));
    }
    Ok(name.to_string())
}
