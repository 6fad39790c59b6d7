//! Request-level authentication gate
//!
//! Every protected handler calls [`authenticate`] before doing anything else:
//! header extraction, then token verification, then the decoded identity is
//! handed to the handler. Auth failures are never retried; the client must
//! re-login.

use bson::oid::ObjectId;
use hyper::HeaderMap;

use crate::auth::jwt::JwtValidator;
use crate::types::ApiError;

/// Request header carrying the raw signed token
pub const AUTH_HEADER: &str = "x-auth-token";

/// The authenticated identity attached to a request
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Identity id decoded from the token
    pub user_id: ObjectId,
}

/// Extract and verify the token from request headers.
///
/// - Missing header: 401 "No token, authorization denied"
/// - Expired, malformed, or wrong-signature token: 401 "Token is not valid"
pub fn authenticate(headers: &HeaderMap, jwt: &JwtValidator) -> Result<AuthUser, ApiError> {
    let token = headers
        .get(AUTH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        return Err(ApiError::Unauthenticated(
            "No token, authorization denied".into(),
        ));
    };

    let result = jwt.verify_token(token);
    let claims = match result.claims {
        Some(claims) if result.valid => claims,
        _ => return Err(ApiError::Unauthenticated("Token is not valid".into())),
    };

    // The id was hex-encoded at issuance; anything else is a forged token
    let user_id = ObjectId::parse_str(&claims.user_id)
        .map_err(|_| ApiError::Unauthenticated("Token is not valid".into()))?;

    Ok(AuthUser { user_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    fn test_jwt() -> JwtValidator {
        JwtValidator::new(
            "test-secret-that-is-at-least-32-characters-long".into(),
            3600,
        )
        .unwrap()
    }

    fn headers_with_token(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTH_HEADER, HeaderValue::from_str(token).unwrap());
        headers
    }

    #[test]
    fn test_missing_token_denied() {
        let err = authenticate(&HeaderMap::new(), &test_jwt()).unwrap_err();
        match err {
            ApiError::Unauthenticated(msg) => {
                assert_eq!(msg, "No token, authorization denied")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_empty_token_denied() {
        let err = authenticate(&headers_with_token("  "), &test_jwt()).unwrap_err();
        match err {
            ApiError::Unauthenticated(msg) => {
                assert_eq!(msg, "No token, authorization denied")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_garbage_token_invalid() {
        let err = authenticate(&headers_with_token("garbage"), &test_jwt()).unwrap_err();
        match err {
            ApiError::Unauthenticated(msg) => assert_eq!(msg, "Token is not valid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_valid_token_round_trip() {
        let jwt = test_jwt();
        let id = ObjectId::new();
        let token = jwt.generate_token(&id.to_hex()).unwrap();

        let auth = authenticate(&headers_with_token(&token), &jwt).unwrap();
        assert_eq!(auth.user_id, id);
    }

    #[test]
    fn test_wrong_secret_token_invalid() {
        let other = JwtValidator::new(
            "different-secret-that-is-at-least-32-characters".into(),
            3600,
        )
        .unwrap();
        let token = other.generate_token(&ObjectId::new().to_hex()).unwrap();

        let err = authenticate(&headers_with_token(&token), &test_jwt()).unwrap_err();
        match err {
            ApiError::Unauthenticated(msg) => assert_eq!(msg, "Token is not valid"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
