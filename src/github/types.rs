//! Wire types for the GitHub REST v3 responses this tool reads.
//!
//! Decoding is lenient: every field defaults when absent and unknown fields
//! are ignored, so schema additions on GitHub's side never break a run.
//! See <https://docs.github.com/en/rest/pulls/pulls> and
//! <https://docs.github.com/en/rest/commits/commits#compare-two-commits>.

// Mirrors the API schema; most fields are decoded but never read.
#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubUser {
    pub login: String,
    pub id: u64,
    pub node_id: String,
    pub avatar_url: String,
    pub url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub site_admin: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubLabel {
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub default: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubMilestone {
    pub url: String,
    pub html_url: String,
    pub id: u64,
    pub number: u64,
    pub state: String,
    pub title: String,
    pub description: Option<String>,
    pub creator: Option<GithubUser>,
    pub open_issues: u64,
    pub closed_issues: u64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub due_on: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubTeam {
    pub id: u64,
    pub node_id: String,
    pub url: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub privacy: String,
    pub permission: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubPermissions {
    pub admin: bool,
    pub push: bool,
    pub pull: bool,
}

/// Repository object as embedded in pull request refs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubRepo {
    pub id: u64,
    pub node_id: String,
    pub name: String,
    pub full_name: String,
    pub owner: Option<GithubUser>,
    pub private: bool,
    pub html_url: String,
    pub description: Option<String>,
    pub fork: bool,
    pub url: String,
    pub default_branch: String,
    pub archived: bool,
    pub open_issues_count: u64,
    pub topics: Vec<String>,
    pub permissions: Option<GithubPermissions>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The `head` / `base` side of a pull request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubPullRequestRef {
    pub label: String,
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
    pub user: Option<GithubUser>,
    pub repo: Option<GithubRepo>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubPullRequest {
    pub url: String,
    pub id: u64,
    pub node_id: String,
    pub html_url: String,
    pub number: u64,
    pub state: String,
    pub locked: bool,
    pub title: String,
    pub user: Option<GithubUser>,
    pub body: Option<String>,
    pub labels: Vec<GithubLabel>,
    pub milestone: Option<GithubMilestone>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub merge_commit_sha: Option<String>,
    pub assignees: Vec<GithubUser>,
    pub requested_reviewers: Vec<GithubUser>,
    pub requested_teams: Vec<GithubTeam>,
    pub head: GithubPullRequestRef,
    pub base: GithubPullRequestRef,
    pub author_association: String,
    pub draft: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubCommitAuthor {
    pub name: String,
    pub email: String,
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubCommitDetail {
    pub author: Option<GithubCommitAuthor>,
    pub committer: Option<GithubCommitAuthor>,
    pub message: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubCommit {
    pub url: String,
    pub sha: String,
    pub node_id: String,
    pub commit: GithubCommitDetail,
    pub author: Option<GithubUser>,
    pub committer: Option<GithubUser>,
}

/// Subset of <https://docs.github.com/en/rest/branches/branches#get-a-branch>.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubBranch {
    pub name: String,
    pub commit: GithubCommit,
    pub protected: bool,
}

/// Response of `GET /repos/{owner}/{repo}/compare/{base}...{head}`.
///
/// `commits` and `files` are intentionally not decoded; only the counters
/// are needed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GithubCommitCompare {
    pub url: String,
    pub html_url: String,
    pub permalink_url: String,
    pub diff_url: String,
    pub patch_url: String,
    pub base_commit: Option<GithubCommit>,
    pub merge_base_commit: Option<GithubCommit>,
    pub status: String,
    pub ahead_by: u64,
    pub behind_by: u64,
    pub total_commits: u64,
}
