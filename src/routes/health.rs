//! Liveness and build-info endpoints

use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::routes::{json_response, BoxBody};

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    version: &'static str,
    commit: &'static str,
    built_at: &'static str,
}

/// GET /health and /healthz
pub fn health_check() -> Response<BoxBody> {
    json_response(StatusCode::OK, &HealthResponse { status: "ok" })
}

/// GET /version
pub fn version_info() -> Response<BoxBody> {
    json_response(
        StatusCode::OK,
        &VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
            commit: env!("GIT_COMMIT_SHORT"),
            built_at: env!("BUILD_TIMESTAMP"),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_is_ok() {
        let res = health_check();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[test]
    fn test_version_reports_package_version() {
        let res = version_info();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
