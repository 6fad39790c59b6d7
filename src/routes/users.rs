//! Registration routes
//!
//! POST /api/users creates an identity and returns a signed token. The
//! avatar URL is derived from the email at registration time.

use bson::doc;
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;

use crate::auth::hash_password;
use crate::db::mongo::is_duplicate_key_error;
use crate::db::schemas::{UserDoc, USER_COLLECTION};
use crate::routes::validation::Validator;
use crate::routes::{
    json_response, method_not_allowed, normalize_path, not_found_response, parse_json_body,
    respond, BoxBody,
};
use crate::server::AppState;
use crate::types::{ApiError, FieldError};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public view of a user; the password hash never leaves the schema layer.
#[derive(Debug, Serialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub avatar: String,
}

impl UserView {
    pub fn from_doc(doc: &UserDoc) -> Self {
        Self {
            id: doc._id.map(|id| id.to_hex()).unwrap_or_default(),
            name: doc.name.clone(),
            email: doc.email.clone(),
            avatar: doc.avatar.clone(),
        }
    }
}

/// Gravatar-style avatar URL for an email address
pub fn gravatar_url(email: &str) -> String {
    let digest = Sha256::digest(email.trim().to_lowercase().as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

/// Route /api/users requests
pub async fn handle_users_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = normalize_path(req.uri().path()).to_string();
    let method = req.method().clone();

    match (&method, path.as_str()) {
        (&Method::POST, "/api/users") => respond(handle_register(req, state).await),
        (_, "/api/users") => method_not_allowed(),
        _ => not_found_response(&path),
    }
}

/// POST /api/users
///
/// Flow:
/// 1. Validate name, email shape, password length
/// 2. Reject duplicate emails
/// 3. Hash password, derive avatar, store the identity
/// 4. Return a signed token embedding the new identity id
async fn handle_register(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let body: RegisterRequest = parse_json_body(req).await?;

    Validator::new()
        .require("name", &body.name, "Name is required")
        .email("email", &body.email, "Please enter a valid email")
        .min_length(
            "password",
            &body.password,
            6,
            "Please enter a password with 6 or more characters",
        )
        .finish()?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;

    if users
        .find_one(doc! { "email": &body.email })
        .await?
        .is_some()
    {
        return Err(user_exists());
    }

    let avatar = gravatar_url(&body.email);
    let password_hash = hash_password(&body.password)?;
    let user = UserDoc::new(body.name, body.email.clone(), avatar, password_hash);

    let id = match users.insert_one(user).await {
        Ok(id) => id,
        // Concurrent registration with the same email loses to the unique index
        Err(e) if is_duplicate_key_error(&e) => return Err(user_exists()),
        Err(e) => return Err(e),
    };

    info!("Registered new user: {}", body.email);

    let token = state.jwt.generate_token(&id.to_hex())?;
    Ok(json_response(StatusCode::OK, &TokenResponse { token }))
}

fn user_exists() -> ApiError {
    ApiError::Validation(vec![FieldError::message_only("User already exists")])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gravatar_url_normalizes_email() {
        let a = gravatar_url("Ada@Example.COM");
        let b = gravatar_url("  ada@example.com  ");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
        assert!(a.ends_with("?s=200&r=pg&d=mm"));
    }

    #[test]
    fn test_gravatar_url_differs_per_email() {
        assert_ne!(gravatar_url("a@x.com"), gravatar_url("b@x.com"));
    }
}
