//! devconnect-api - REST backend for a developer social network

use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use devconnect::{auth::JwtValidator, config::Args, db::MongoClient, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing/logging
    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("devconnect={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Validate configuration
    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    // Print startup banner
    info!("======================================");
    info!("  devconnect-api");
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Database: {}", args.mongodb_db);
    info!("Token expiry: {}s", args.jwt_expiry_seconds);
    info!(
        "GitHub proxy: {}",
        if args.github_client_id.is_some() {
            "authenticated"
        } else {
            "unauthenticated"
        }
    );
    info!("======================================");

    // Connect to MongoDB
    let mongo = match MongoClient::new(&args.mongodb_uri, &args.mongodb_db).await {
        Ok(client) => client,
        Err(e) => {
            error!("MongoDB connection failed: {}", e);
            std::process::exit(1);
        }
    };

    // Build the token validator; validate() already vetted the secret
    let secret = args.jwt_secret.clone().unwrap_or_default();
    let jwt = match JwtValidator::new(secret, args.jwt_expiry_seconds) {
        Ok(jwt) => jwt,
        Err(e) => {
            error!("Token configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Create application state
    let state = Arc::new(server::AppState::new(args, mongo, jwt));

    // Run the server
    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
