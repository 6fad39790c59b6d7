//! Error types for the devconnect API
//!
//! A single error enum covers the whole request pipeline. Each variant maps
//! to an HTTP status and a JSON body shape: validation failures render as an
//! `errors` array, everything else as a `message`. Lookup misses are rendered
//! as HTTP 400, matching the wire contract the frontend was built against.

use hyper::StatusCode;
use serde::Serialize;

/// A single field-level validation failure, rendered in the `errors` array.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// A failure not tied to a specific field (e.g. "User already exists").
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }
}

/// Main error type for API operations
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Field validation failed; no storage access was attempted.
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    /// Missing or invalid token.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated identity does not own the resource.
    #[error("User not authorized")]
    Forbidden,

    /// Keyed lookup miss. Carries the client-facing message verbatim.
    #[error("{0}")]
    NotFound(String),

    /// State conflict (e.g. liking a post twice).
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Convert error to HTTP status code.
    ///
    /// NotFound and Conflict map to 400 rather than their textbook codes;
    /// the client distinguishes them by message.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::NotFound(_)
            | Self::Conflict(_)
            | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) | Self::Forbidden => StatusCode::UNAUTHORIZED,
            Self::Database(_)
            | Self::Config(_)
            | Self::Auth(_)
            | Self::Upstream(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the underlying cause should be logged rather than surfaced.
    pub fn is_server_fault(&self) -> bool {
        self.status_code() == StatusCode::INTERNAL_SERVER_ERROR
    }

    /// JSON body for this error.
    ///
    /// Server faults always surface the generic "Server error" message; the
    /// real cause goes to the log, never to the client.
    pub fn to_body(&self) -> serde_json::Value {
        match self {
            Self::Validation(errors) => serde_json::json!({ "errors": errors }),
            other if other.is_server_fault() => {
                serde_json::json!({ "message": "Server error" })
            }
            other => serde_json::json!({ "message": other.to_string() }),
        }
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("JSON error: {}", err))
    }
}

impl From<hyper::Error> for ApiError {
    fn from(err: hyper::Error) -> Self {
        Self::Internal(format!("HTTP error: {}", err))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        Self::Upstream(err.to_string())
    }
}

/// Result type alias for API operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_400() {
        let err = ApiError::NotFound("Post not found".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_body(), serde_json::json!({ "message": "Post not found" }));
    }

    #[test]
    fn test_forbidden_is_401() {
        let err = ApiError::Forbidden;
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            err.to_body(),
            serde_json::json!({ "message": "User not authorized" })
        );
    }

    #[test]
    fn test_validation_renders_errors_array() {
        let err = ApiError::Validation(vec![
            FieldError::new("name", "Name is required"),
            FieldError::message_only("User already exists"),
        ]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = err.to_body();
        let errors = body.get("errors").and_then(|e| e.as_array()).unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0]["field"], "name");
        assert_eq!(errors[1]["message"], "User already exists");
        assert!(errors[1].get("field").is_none());
    }

    #[test]
    fn test_server_fault_hides_cause() {
        let err = ApiError::Database("connection reset by peer".into());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body(), serde_json::json!({ "message": "Server error" }));
    }
}
