pub mod client;
pub mod types;

pub use client::GitHubClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::pr::PullRequest;
use types::GithubCommitCompare;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid GitHub API URL: {0}")]
    InvalidUrl(String),

    #[error("Access token is not a valid header value: {0}")]
    InvalidToken(#[from] reqwest::header::InvalidHeaderValue),

    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to decode {resource} response: {source}")]
    Decode {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The three read-only GitHub operations the report is built from.
///
/// Implemented by [`GitHubClient`] over HTTP. The cache, the fetcher and the
/// comparator only see this trait, and share one instance across tasks.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// One page of open pull requests. `page` is 0-based; the request uses
    /// `page + 1`.
    async fn open_pull_requests(&self, page: u32) -> Result<Vec<PullRequest>, ApiError>;

    /// SHA of the latest commit on `branch`.
    async fn branch_head(&self, branch: &str) -> Result<String, ApiError>;

    /// Compare `base...head`. The order is significant.
    async fn compare_commits(&self, base: &str, head: &str) -> Result<GithubCommitCompare, ApiError>;
}
