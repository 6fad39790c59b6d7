//! Database schemas for devconnect-api
//!
//! Explicit typed documents for users, profiles, and posts. Required versus
//! optional fields are enforced here and at the route boundary, not by the
//! store.

mod metadata;
mod post;
mod profile;
mod user;

pub use metadata::Metadata;
pub use post::{Comment, Like, PostDoc, POST_COLLECTION};
pub use profile::{Education, Experience, ProfileDoc, SocialLinks, PROFILE_COLLECTION};
pub use user::{UserDoc, USER_COLLECTION};
