//! External service clients

pub mod github;

pub use github::GithubClient;
