//! Authentication and authorization for devconnect-api
//!
//! Provides:
//! - JWT token generation and validation
//! - Request-level auth gate (token header -> authenticated identity)
//! - Ownership guard for owner-only mutations
//! - Password hashing with Argon2

pub mod gate;
pub mod jwt;
pub mod ownership;
pub mod password;

pub use gate::{authenticate, AuthUser, AUTH_HEADER};
pub use jwt::{Claims, JwtValidator, TokenValidationResult};
pub use ownership::ensure_owner;
pub use password::{hash_password, verify_password};
