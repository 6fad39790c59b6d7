//! HTTP routes for devconnect-api
//!
//! Shared response plumbing lives here; each route family gets its own
//! module with a `handle_*_request` dispatcher the server calls by path
//! prefix.

pub mod auth_routes;
pub mod health;
pub mod posts;
pub mod profile;
pub mod users;
pub mod validation;

pub use auth_routes::handle_auth_request;
pub use health::{health_check, version_info};
pub use posts::handle_posts_request;
pub use profile::handle_profile_request;
pub use users::handle_users_request;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::types::ApiError;

pub type BoxBody = http_body_util::combinators::BoxBody<Bytes, hyper::Error>;

/// Requests larger than this are rejected before JSON parsing
const MAX_BODY_BYTES: usize = 16 * 1024;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub(crate) fn full_body(data: impl Into<Bytes>) -> BoxBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

pub(crate) fn empty_body() -> BoxBody {
    Full::new(Bytes::new())
        .map_err(|never| match never {})
        .boxed()
}

/// Serialize a value as a JSON response with CORS headers
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<BoxBody> {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());

    Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, x-auth-token")
        .body(full_body(json))
        .unwrap()
}

/// Render an error as its JSON body. Server faults log the cause and
/// surface only the generic message.
pub(crate) fn error_response(err: ApiError) -> Response<BoxBody> {
    if err.is_server_fault() {
        error!("{}", err);
    }
    json_response(err.status_code(), &err.to_body())
}

/// Collapse a handler result into a response
pub(crate) fn respond(result: Result<Response<BoxBody>, ApiError>) -> Response<BoxBody> {
    result.unwrap_or_else(error_response)
}

pub(crate) fn cors_preflight() -> Response<BoxBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Access-Control-Allow-Origin", "*")
        .header("Access-Control-Allow-Methods", "GET, POST, PUT, DELETE, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type, x-auth-token")
        .header("Access-Control-Max-Age", "86400")
        .body(empty_body())
        .unwrap()
}

pub(crate) fn not_found_response(path: &str) -> Response<BoxBody> {
    json_response(
        StatusCode::NOT_FOUND,
        &MessageResponse::new(format!("Not found: {}", path)),
    )
}

pub(crate) fn method_not_allowed() -> Response<BoxBody> {
    json_response(
        StatusCode::METHOD_NOT_ALLOWED,
        &MessageResponse::new("Method not allowed"),
    )
}

/// Read and deserialize a JSON request body
pub(crate) async fn parse_json_body<T: for<'de> Deserialize<'de>>(
    req: Request<hyper::body::Incoming>,
) -> Result<T, ApiError> {
    let body = req
        .collect()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read body: {}", e)))?;

    let bytes = body.to_bytes();
    if bytes.len() > MAX_BODY_BYTES {
        return Err(ApiError::BadRequest("Request body too large".into()));
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| ApiError::BadRequest(format!("Invalid JSON body: {}", e)))
}

/// Route paths may carry a trailing slash; normalize before matching
pub(crate) fn normalize_path(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path("/api/auth/"), "/api/auth");
        assert_eq!(normalize_path("/api/auth"), "/api/auth");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_method_not_allowed_status() {
        assert_eq!(method_not_allowed().status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
