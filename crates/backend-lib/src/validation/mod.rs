// ============================
// crates/backend-lib/src/validation/mod.rs
// ============================
//! Request payload validation.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// Common validation constants
const MIN_PASSWORD_LENGTH: usize = 6;
const MAX_PASSWORD_LENGTH: usize = 128;
const MAX_NAME_LENGTH: usize = 255;
const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit
const MAX_PHONE_LENGTH: usize = 20;
const MAX_URL_LENGTH: usize = 255;

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Invalid avatar URL: {0}")]
    InvalidAvatarUrl(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate a login email
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if email.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email must not be empty".to_string(),
        ));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email must be at most {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Email format is invalid".to_string(),
        ));
    }

    Ok(email)
}

/// Validate a password
pub fn validate_password(password: &str) -> ValidationResult<&str> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }

    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::InvalidPassword(format!(
            "Password must be at most {MAX_PASSWORD_LENGTH} characters"
        )));
    }

    Ok(password)
}

/// Validate a first/last name field
pub fn validate_name(name: &str) -> ValidationResult<&str> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidName(
            "Name must not be empty".to_string(),
        ));
    }

    if name.len() > MAX_NAME_LENGTH {
        return Err(ValidationError::InvalidName(format!(
            "Name must be at most {MAX_NAME_LENGTH} characters"
        )));
    }

    Ok(name)
}

/// Validate an optional phone number
pub fn validate_phone_number(phone: &str) -> ValidationResult<&str> {
    if phone.len() > MAX_PHONE_LENGTH {
        return Err(ValidationError::InvalidPhoneNumber(format!(
            "Phone number must be at most {MAX_PHONE_LENGTH} characters"
        )));
    }

    Ok(phone)
}

/// Validate an optional avatar URL
pub fn validate_avatar_url(url: &str) -> ValidationResult<&str> {
    if url.len() > MAX_URL_LENGTH {
        return Err(ValidationError::InvalidAvatarUrl(format!(
            "Avatar URL must be at most {MAX_URL_LENGTH} characters"
        )));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@sub.domain.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("missing@tld").is_err());
        assert!(validate_email("@x.com").is_err());

        let long_local = "a".repeat(MAX_EMAIL_LENGTH);
        assert!(validate_email(&format!("{long_local}@x.com")).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("123456").is_ok());

        assert!(validate_password("short").is_err());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"n".repeat(MAX_NAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_optional_fields() {
        assert!(validate_phone_number("+61 400 000 000").is_ok());
        assert!(validate_phone_number(&"1".repeat(MAX_PHONE_LENGTH + 1)).is_err());

        assert!(validate_avatar_url("https://cdn.example.com/a.png").is_ok());
        assert!(validate_avatar_url(&"u".repeat(MAX_URL_LENGTH + 1)).is_err());
    }
}
