//! Input validation run before a request leaves the client.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_EMAIL_LEN: usize = 255;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

static TIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9](:[0-5][0-9])?$").expect("time pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Request bodies that can be checked locally.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

impl Validate for serde_json::Value {
    fn validate(&self) -> Result<(), ValidationError> {
        Ok(())
    }
}

impl<T: Validate> Validate for [T] {
    fn validate(&self) -> Result<(), ValidationError> {
        self.iter().try_for_each(Validate::validate)
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), ValidationError> {
        self.as_slice().validate()
    }
}

pub fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be empty"));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::new("email", "too long"));
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::new("email", "invalid format"));
    }
    Ok(())
}

pub fn validate_new_password(field: &'static str, password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at least {MIN_PASSWORD_LEN} characters long"),
        ));
    }
    Ok(())
}

/// `HH:MM` or `HH:MM:SS`.
pub fn validate_time(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if !TIME_PATTERN.is_match(value) {
        return Err(ValidationError::new(field, "expected HH:MM"));
    }
    Ok(())
}

pub fn validate_id(field: &'static str, id: i64) -> Result<(), ValidationError> {
    if id <= 0 {
        return Err(ValidationError::new(field, "must be a positive id"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn patterns_compile() {
        Lazy::force(&EMAIL_PATTERN);
        Lazy::force(&TIME_PATTERN);
    }

    #[test]
    fn email_format() {
        assert!(validate_email("admin@clinica.test").is_ok());
        assert!(validate_email("dr.lopez+citas@hospital.com.mx").is_ok());

        let err = validate_email("not-an-email").unwrap_err();
        assert_eq!(err.field, "email");
        assert!(validate_email("a@b").is_err());

        let long = format!("{}@clinic.test", "a".repeat(MAX_EMAIL_LEN));
        assert_eq!(validate_email(&long).unwrap_err().reason, "too long");
    }

    #[test]
    fn password_length_counts_characters() {
        assert!(validate_new_password("password", "Seguro123").is_ok());
        assert!(validate_new_password("password", "corta").is_err());
        assert!(validate_new_password("password", "ñandú-ñu").is_ok());
    }

    #[test]
    fn time_format() {
        assert!(validate_time("appointmentTime", "09:30").is_ok());
        assert!(validate_time("appointmentTime", "23:59:59").is_ok());
        assert!(validate_time("appointmentTime", "24:00").is_err());
        assert!(validate_time("appointmentTime", "9:30").is_err());
    }

    #[test]
    fn blank_values_are_rejected() {
        assert!(require("firstName", "Ana").is_ok());
        assert_eq!(
            require("firstName", "   ").unwrap_err().to_string(),
            "invalid firstName: must not be empty"
        );
    }

    #[test]
    fn ids_must_be_positive() {
        assert!(validate_id("patientId", 3).is_ok());
        assert!(validate_id("patientId", 0).is_err());
    }
}
