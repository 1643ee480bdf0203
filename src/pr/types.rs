use chrono::{DateTime, Utc};

use crate::github::types::GithubPullRequest;

/// An open pull request as reported by one page of the listing endpoint.
///
/// The SHAs are the values GitHub reported at list time; the head SHA is
/// re-resolved through the branch cache before comparing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Global GitHub identifier
    pub id: u64,
    /// PR number (e.g., 42)
    pub number: u64,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Source branch name
    pub head_ref: String,
    pub head_sha: String,
    /// Target branch name
    pub base_ref: String,
    pub base_sha: String,
}

impl PullRequest {
    /// Display form used in the report, e.g. `#42`.
    pub fn display_id(&self) -> String {
        format!("#{}", self.number)
    }
}

impl From<GithubPullRequest> for PullRequest {
    fn from(pr: GithubPullRequest) -> Self {
        PullRequest {
            id: pr.id,
            number: pr.number,
            title: pr.title,
            created_at: pr.created_at,
            head_ref: pr.head.ref_name,
            head_sha: pr.head.sha,
            base_ref: pr.base.ref_name,
            base_sha: pr.base.sha,
        }
    }
}
