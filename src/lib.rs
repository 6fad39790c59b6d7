//! devconnect-api - REST backend for a developer social network
//!
//! Identities register and log in for signed bearer tokens, maintain a
//! developer profile (experience, education, social links, GitHub repos),
//! and publish posts others can like and comment on. Persistence is
//! MongoDB; every handler is a plain async function dispatched by path.

pub mod auth;
pub mod config;
pub mod db;
pub mod routes;
pub mod server;
pub mod services;
pub mod types;

pub use config::Args;
pub use server::{run, AppState};
pub use types::{ApiError, Result};
