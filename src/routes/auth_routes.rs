//! Session routes
//!
//! - POST /api/auth/login - authenticate and get a token
//! - POST /api/auth/      - return the current identity sans password

use bson::doc;
use hyper::{body::Incoming, Method, Request, Response, StatusCode};
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

use crate::auth::{authenticate, verify_password};
use crate::db::schemas::{UserDoc, USER_COLLECTION};
use crate::routes::users::{TokenResponse, UserView};
use crate::routes::validation::Validator;
use crate::routes::{
    json_response, method_not_allowed, normalize_path, not_found_response, parse_json_body,
    respond, BoxBody,
};
use crate::server::AppState;
use crate::types::{ApiError, FieldError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Route /api/auth requests
pub async fn handle_auth_request(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Response<BoxBody> {
    let path = normalize_path(req.uri().path()).to_string();
    let method = req.method().clone();

    match (&method, path.as_str()) {
        (&Method::POST, "/api/auth") => respond(handle_current_user(req, state).await),
        (&Method::POST, "/api/auth/login") => respond(handle_login(req, state).await),
        (_, "/api/auth") | (_, "/api/auth/login") => method_not_allowed(),
        _ => not_found_response(&path),
    }
}

/// POST /api/auth/
///
/// Returns the identity decoded from the token, password hash omitted.
async fn handle_current_user(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let auth = authenticate(req.headers(), &state.jwt)?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    let user = users
        .find_one(doc! { "_id": auth.user_id })
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(json_response(StatusCode::OK, &UserView::from_doc(&user)))
}

/// POST /api/auth/login
///
/// Flow:
/// 1. Validate email shape and password presence
/// 2. Look up the user by email
/// 3. Verify the password against the stored hash
/// 4. Return a fresh signed token
///
/// Unknown email and wrong password are indistinguishable to the client.
async fn handle_login(
    req: Request<Incoming>,
    state: Arc<AppState>,
) -> Result<Response<BoxBody>, ApiError> {
    let body: LoginRequest = parse_json_body(req).await?;

    Validator::new()
        .email("email", &body.email, "Please enter a valid email")
        .require("password", &body.password, "Please enter password")
        .finish()?;

    let users = state.mongo.collection::<UserDoc>(USER_COLLECTION).await?;
    let user = users
        .find_one(doc! { "email": &body.email })
        .await?
        .ok_or_else(invalid_credentials)?;

    if !verify_password(&body.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let user_id = user
        ._id
        .ok_or_else(|| ApiError::Internal("User document missing _id".into()))?;

    info!("Login: {}", body.email);

    let token = state.jwt.generate_token(&user_id.to_hex())?;
    Ok(json_response(StatusCode::OK, &TokenResponse { token }))
}

// Spelling is part of the wire contract; clients match on it.
fn invalid_credentials() -> ApiError {
    ApiError::Validation(vec![FieldError::message_only("Invalid Credientials")])
}
