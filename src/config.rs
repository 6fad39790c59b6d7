//! Configuration for devconnect-api
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::net::SocketAddr;

/// devconnect-api - REST backend for a developer social network
#[derive(Parser, Debug, Clone)]
#[command(name = "devconnect")]
#[command(about = "REST backend for a developer social network")]
pub struct Args {
    /// Address to listen on
    #[arg(long, env = "LISTEN", default_value = "0.0.0.0:8000")]
    pub listen: SocketAddr,

    /// MongoDB connection URI
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    pub mongodb_uri: String,

    /// MongoDB database name
    #[arg(long, env = "MONGODB_DB", default_value = "devconnect")]
    pub mongodb_db: String,

    /// JWT secret for token signing (required)
    #[arg(long, env = "JWT_SECRET")]
    pub jwt_secret: Option<String>,

    /// JWT token expiry in seconds
    #[arg(long, env = "JWT_EXPIRY_SECONDS", default_value = "3600")]
    pub jwt_expiry_seconds: u64,

    /// GitHub client id for the repo lookup proxy (optional)
    #[arg(long, env = "GITHUB_CLIENT_ID")]
    pub github_client_id: Option<String>,

    /// GitHub client secret for the repo lookup proxy (optional)
    #[arg(long, env = "GITHUB_CLIENT_SECRET")]
    pub github_client_secret: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Validate configuration. A missing or weak signing secret is fatal at
    /// startup, never per-request.
    pub fn validate(&self) -> Result<(), String> {
        match self.jwt_secret.as_deref() {
            None => Err("JWT_SECRET is required".to_string()),
            Some(s) if s.len() < 32 => {
                Err("JWT_SECRET must be at least 32 characters".to_string())
            }
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> Args {
        Args::parse_from(["devconnect"])
    }

    #[test]
    fn test_missing_secret_rejected() {
        let mut args = base_args();
        args.jwt_secret = None;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_short_secret_rejected() {
        let mut args = base_args();
        args.jwt_secret = Some("short".into());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_valid_secret_accepted() {
        let mut args = base_args();
        args.jwt_secret = Some("a-signing-secret-of-at-least-32-chars".into());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_default_listen_port() {
        let args = base_args();
        assert_eq!(args.listen.port(), 8000);
        assert_eq!(args.jwt_expiry_seconds, 3600);
    }
}
