//! HTTP server implementation
//!
//! Uses hyper http1 with TokioIo for async handling. One task per
//! connection; all shared state sits behind an Arc.

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::auth::JwtValidator;
use crate::config::Args;
use crate::db::MongoClient;
use crate::routes::{self, cors_preflight, full_body, not_found_response, BoxBody};
use crate::services::GithubClient;
use crate::types::ApiError;

/// Shared application state
pub struct AppState {
    pub args: Args,
    pub mongo: MongoClient,
    pub jwt: JwtValidator,
    pub github: GithubClient,
}

impl AppState {
    pub fn new(args: Args, mongo: MongoClient, jwt: JwtValidator) -> Self {
        let github = GithubClient::new(
            args.github_client_id.clone(),
            args.github_client_secret.clone(),
        );
        Self {
            args,
            mongo,
            jwt,
            github,
        }
    }
}

/// Start the HTTP server
pub async fn run(state: Arc<AppState>) -> Result<(), ApiError> {
    let listener = TcpListener::bind(state.args.listen).await?;

    info!("Listening on {}", state.args.listen);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                tokio::spawn(async move {
                    let io = TokioIo::new(stream);

                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { handle_request(state, addr, req).await }
                    });

                    if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                        error!("Error serving connection from {}: {:?}", addr, err);
                    }
                });
            }
            Err(e) => {
                error!("Error accepting connection: {:?}", e);
            }
        }
    }
}

/// Route incoming HTTP requests by path prefix
async fn handle_request(
    state: Arc<AppState>,
    addr: SocketAddr,
    req: Request<Incoming>,
) -> Result<Response<BoxBody>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    info!("[{}] {} {}", addr, method, path);

    if method == Method::OPTIONS {
        return Ok(cors_preflight());
    }

    // Route families consume the request
    if path.starts_with("/api/users") {
        return Ok(routes::handle_users_request(req, state).await);
    }
    if path.starts_with("/api/auth") {
        return Ok(routes::handle_auth_request(req, state).await);
    }
    if path.starts_with("/api/profile") {
        return Ok(routes::handle_profile_request(req, state).await);
    }
    if path.starts_with("/api/posts") {
        return Ok(routes::handle_posts_request(req, state).await);
    }

    let response = match (method, path.as_str()) {
        (Method::GET, "/") => Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "text/plain")
            .body(full_body("Api running"))
            .unwrap(),

        (Method::GET, "/health") | (Method::GET, "/healthz") => routes::health_check(),

        (Method::GET, "/version") => routes::version_info(),

        _ => not_found_response(&path),
    };

    Ok(response)
}
