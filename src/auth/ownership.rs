//! Ownership guard
//!
//! The single place where "does the caller own this resource" is decided.
//! Applied before destructive operations on owned resources, never on reads.

use bson::oid::ObjectId;

use crate::auth::gate::AuthUser;
use crate::types::ApiError;

/// Authorize a mutation iff the recorded owner matches the authenticated
/// identity; otherwise 401 "User not authorized".
pub fn ensure_owner(owner: &ObjectId, auth: &AuthUser) -> Result<(), ApiError> {
    if *owner == auth.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_authorized() {
        let id = ObjectId::new();
        let auth = AuthUser { user_id: id };
        assert!(ensure_owner(&id, &auth).is_ok());
    }

    #[test]
    fn test_non_owner_forbidden() {
        let auth = AuthUser {
            user_id: ObjectId::new(),
        };
        let err = ensure_owner(&ObjectId::new(), &auth).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        assert_eq!(err.to_string(), "User not authorized");
    }
}
