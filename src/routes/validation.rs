//! Declarative request validation
//!
//! Each endpoint declares its rule set up front; failures are collected into
//! field-level errors and returned before any storage access happens.

use crate::types::{ApiError, FieldError};

/// Collects field validation failures for one request
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field must be non-empty (ignoring whitespace)
    pub fn require(mut self, field: &str, value: &str, message: &str) -> Self {
        if value.trim().is_empty() {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Field must be a syntactically plausible email address
    pub fn email(mut self, field: &str, value: &str, message: &str) -> Self {
        if !is_valid_email(value) {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Field must be at least `min` characters
    pub fn min_length(mut self, field: &str, value: &str, min: usize, message: &str) -> Self {
        if value.chars().count() < min {
            self.errors.push(FieldError::new(field, message));
        }
        self
    }

    /// Fail with the collected errors, or pass
    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.errors))
        }
    }
}

/// Shape check only: one `@`, non-empty local part, dotted domain, no
/// whitespace. Deliverability is the mail server's problem.
fn is_valid_email(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_catches_empty_and_whitespace() {
        let err = Validator::new()
            .require("name", "", "Name is required")
            .require("text", "   ", "Text is required")
            .finish()
            .unwrap_err();

        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].field.as_deref(), Some("name"));
                assert_eq!(errors[0].message, "Name is required");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_all_rules_pass() {
        Validator::new()
            .require("name", "Ada", "Name is required")
            .email("email", "ada@example.com", "Please enter a valid email")
            .min_length("password", "secret1", 6, "too short")
            .finish()
            .unwrap();
    }

    #[test]
    fn test_min_length() {
        let err = Validator::new()
            .min_length(
                "password",
                "12345",
                6,
                "Please enter a password with 6 or more characters",
            )
            .finish()
            .unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(
                    errors[0].message,
                    "Please enter a password with 6 or more characters"
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("a@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("plainstring"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("a@nodot"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a b@x.com"));
        assert!(!is_valid_email("a@b@x.com"));
    }
}
