use chrono::{DateTime, Utc};
use std::fmt;

use crate::pr::PullRequest;

/// Same layout as `date` on Unix, e.g. `Wed Jan  1 00:00:00 UTC 2020`.
pub const CREATED_AT_FORMAT: &str = "%a %b %e %H:%M:%S UTC %Y";

/// One line of the divergence table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// PR number
    pub number: u64,
    /// Head branch name
    pub head_ref: String,
    /// Base branch name
    pub base_ref: String,
    /// `total_commits` of the `base...head` comparison
    pub commit_diff: u64,
    pub created_at: Option<DateTime<Utc>>,
}

impl ReportRow {
    pub fn new(pr: &PullRequest, commit_diff: u64) -> Self {
        Self {
            number: pr.number,
            head_ref: pr.head_ref.clone(),
            base_ref: pr.base_ref.clone(),
            commit_diff,
            created_at: pr.created_at,
        }
    }

    pub fn created_at_display(&self) -> String {
        self.created_at
            .map(|ts| ts.format(CREATED_AT_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

impl fmt::Display for ReportRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} | {} | {} | {} | {}",
            self.number,
            self.head_ref,
            self.base_ref,
            self.commit_diff,
            self.created_at_display()
        )
    }
}
