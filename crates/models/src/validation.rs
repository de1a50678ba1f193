//! Pure input validation helpers shared by services and handlers.

use crate::client::{STATUS_ACTIVE, STATUS_INACTIVE};
use crate::errors::ModelError;

pub const MIN_PASSWORD_LEN: usize = 6;

/// Accepts `local@domain.tld` shapes: exactly one `@`, no whitespace,
/// non-empty local part, and a dot inside the domain.
pub fn validate_email(email: &str) -> Result<(), ModelError> {
    let email = email.trim();
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation("invalid email".into()));
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() => {
            let mut dot = domain.split('.');
            match (dot.next(), dot.next()) {
                (Some(host), Some(tld)) if !host.is_empty() && !tld.is_empty() => Ok(()),
                _ => Err(ModelError::Validation("invalid email".into())),
            }
        }
        _ => Err(ModelError::Validation("invalid email".into())),
    }
}

pub fn validate_password(password: &str) -> Result<(), ModelError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ModelError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// Strict status parse: `active`/`ACTIVE`/`Inactive`... are normalized
/// upward; anything else is `None` (callers decide drop vs reject).
pub fn parse_status(input: &str) -> Option<&'static str> {
    match input.trim().to_ascii_uppercase().as_str() {
        "ACTIVE" => Some(STATUS_ACTIVE),
        "INACTIVE" => Some(STATUS_INACTIVE),
        _ => None,
    }
}

/// Lenient status parse used by import: only an explicit INACTIVE marks a
/// row inactive, everything else (including absent) defaults to ACTIVE.
pub fn status_or_active(input: Option<&str>) -> &'static str {
    match input.map(|s| s.trim().to_ascii_uppercase()) {
        Some(s) if s == "INACTIVE" => STATUS_INACTIVE,
        _ => STATUS_ACTIVE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_accepts_plain_addresses() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("a.b+c@sub.example.org").is_ok());
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        for bad in ["", "no-at.example.com", "two@@example.com", "user@nodot", "sp ace@example.com", "@example.com"] {
            assert!(validate_email(bad).is_err(), "accepted: {bad}");
        }
    }

    #[test]
    fn password_minimum_length_is_six() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
    }

    #[test]
    fn status_parse_normalizes_case() {
        assert_eq!(parse_status("active"), Some(STATUS_ACTIVE));
        assert_eq!(parse_status("Inactive"), Some(STATUS_INACTIVE));
        assert_eq!(parse_status("bogus"), None);
    }

    #[test]
    fn import_status_defaults_to_active() {
        assert_eq!(status_or_active(None), STATUS_ACTIVE);
        assert_eq!(status_or_active(Some("whatever")), STATUS_ACTIVE);
        assert_eq!(status_or_active(Some("inactive")), STATUS_INACTIVE);
    }
}
