//! GitHub repository lookup proxy
//!
//! Fetches a user's five most recent public repositories and passes the
//! upstream JSON through unchanged. Client credentials come from
//! configuration at startup; without them the call still works against the
//! unauthenticated rate limit.

use reqwest::StatusCode;
use tracing::warn;

use crate::types::ApiError;

const GITHUB_API_BASE: &str = "https://api.github.com";

/// Client for the GitHub repos listing API
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl GithubClient {
    /// Create a client with optional API credentials
    pub fn new(client_id: Option<String>, client_secret: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            // GitHub rejects requests without a User-Agent
            .user_agent("devconnect-api")
            .build()
            .unwrap_or_default();

        Self {
            http,
            client_id,
            client_secret,
        }
    }

    /// Build the repos listing URL for a username
    fn repos_url(&self, username: &str) -> String {
        let mut url = format!(
            "{}/users/{}/repos?per_page=5&sort=created:asc",
            GITHUB_API_BASE, username
        );
        if let (Some(id), Some(secret)) = (&self.client_id, &self.client_secret) {
            url.push_str(&format!("&client_id={}&client_secret={}", id, secret));
        }
        url
    }

    /// Fetch the user's repositories as raw JSON.
    ///
    /// An unknown username (or any non-success upstream status) is reported
    /// as a lookup miss, not an upstream fault.
    pub async fn repos(&self, username: &str) -> Result<serde_json::Value, ApiError> {
        if username.is_empty() || username.contains('/') || username.contains('?') {
            return Err(ApiError::NotFound("No Github profile found".into()));
        }

        let response = self.http.get(self.repos_url(username)).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound("No Github profile found".into()));
        }
        if !response.status().is_success() {
            warn!("GitHub API returned {} for user {}", response.status(), username);
            return Err(ApiError::NotFound("No Github profile found".into()));
        }

        Ok(response.json::<serde_json::Value>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_url_without_credentials() {
        let client = GithubClient::new(None, None);
        assert_eq!(
            client.repos_url("octocat"),
            "https://api.github.com/users/octocat/repos?per_page=5&sort=created:asc"
        );
    }

    #[test]
    fn test_repos_url_with_credentials() {
        let client = GithubClient::new(Some("id123".into()), Some("sec456".into()));
        let url = client.repos_url("octocat");
        assert!(url.contains("client_id=id123"));
        assert!(url.contains("client_secret=sec456"));
    }

    #[tokio::test]
    async fn test_malformed_username_rejected() {
        let client = GithubClient::new(None, None);
        let err = client.repos("a/b").await.unwrap_err();
        assert_eq!(err.to_string(), "No Github profile found");

        let err = client.repos("").await.unwrap_err();
        assert_eq!(err.to_string(), "No Github profile found");
    }
}
