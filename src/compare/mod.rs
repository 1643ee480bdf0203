use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::cache::BranchCommitCache;
use crate::github::{ApiError, GitHubApi};
use crate::pr::{self, PullRequest};
use crate::report::ReportRow;

#[derive(Debug, Error)]
pub enum CompareError {
    #[error("Failed to resolve head commit of default branch {branch}: {source}")]
    DefaultBranch {
        branch: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to fetch open pull requests: {0}")]
    Fetch(#[source] ApiError),

    #[error("Failed to resolve head commit of {branch} for PR #{number}: {source}")]
    HeadCommit {
        number: u64,
        branch: String,
        #[source]
        source: ApiError,
    },

    #[error("Failed to compare commits for PR #{number}: {source}")]
    Compare {
        number: u64,
        #[source]
        source: ApiError,
    },

    #[error("Comparison task did not complete: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Outcome of the parallel comparison phase.
///
/// `rows` holds every comparison that succeeded, in pull request fetch order.
/// `failure` is the first failure observed, in completion order.
#[derive(Debug)]
pub struct CompareRun {
    pub rows: Vec<ReportRow>,
    pub failure: Option<CompareError>,
}

impl CompareRun {
    pub fn into_result(self) -> Result<Vec<ReportRow>, CompareError> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.rows),
        }
    }
}

/// Drives one report run against a repository.
///
/// Owns the branch commit cache for the lifetime of the run; both the cache
/// and every comparison task share the same API handle.
pub struct Comparator {
    api: Arc<dyn GitHubApi>,
    cache: Arc<BranchCommitCache>,
}

impl Comparator {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        let cache = Arc::new(BranchCommitCache::new(Arc::clone(&api)));
        Self { api, cache }
    }

    /// Resolve the default branch, fetch all open pull requests and compare
    /// each one against its base.
    ///
    /// Errors from the sequential setup are returned as `Err`. Errors from
    /// the comparisons only show up in [`CompareRun::failure`], after every
    /// task has finished.
    pub async fn run(&self, default_branch: &str) -> Result<CompareRun, CompareError> {
        let default_sha = self
            .cache
            .last_commit(default_branch)
            .await
            .map_err(|source| CompareError::DefaultBranch {
                branch: default_branch.to_string(),
                source,
            })?;
        info!(branch = %default_branch, sha = %default_sha, "resolved default branch");

        let pull_requests = pr::fetch_all_open_pull_requests(self.api.as_ref())
            .await
            .map_err(CompareError::Fetch)?;
        info!(count = pull_requests.len(), "fetched open pull requests");

        let run = self.compare_all(pull_requests).await;
        debug!(
            rows = run.rows.len(),
            branches = self.cache.resolved_count(),
            "comparison phase finished"
        );
        Ok(run)
    }

    /// Spawn one task per pull request and wait for all of them.
    async fn compare_all(&self, pull_requests: Vec<PullRequest>) -> CompareRun {
        let total = pull_requests.len();
        let mut tasks = JoinSet::new();
        for (index, pull_request) in pull_requests.into_iter().enumerate() {
            let api = Arc::clone(&self.api);
            let cache = Arc::clone(&self.cache);
            let span = info_span!(
                "compare",
                pr = %pull_request.display_id(),
                id = pull_request.id,
                title = %pull_request.title
            );
            tasks.spawn(
                async move {
                    let row = compare_one(api.as_ref(), &cache, &pull_request).await;
                    (index, row)
                }
                .instrument(span),
            );
        }

        let mut slots: Vec<Option<ReportRow>> = vec![None; total];
        let mut failure = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(CompareError::from).and_then(|(index, row)| {
                row.map(|row| (index, row))
            });
            match outcome {
                Ok((index, row)) => slots[index] = Some(row),
                Err(err) => {
                    warn!(error = %err, "comparison failed");
                    failure.get_or_insert(err);
                }
            }
        }

        CompareRun {
            rows: slots.into_iter().flatten().collect(),
            failure,
        }
    }
}

/// Resolve the head branch through the cache, then compare the recorded base
/// SHA against it.
async fn compare_one(
    api: &dyn GitHubApi,
    cache: &BranchCommitCache,
    pull_request: &PullRequest,
) -> Result<ReportRow, CompareError> {
    let head_sha = cache
        .last_commit(&pull_request.head_ref)
        .await
        .map_err(|source| CompareError::HeadCommit {
            number: pull_request.number,
            branch: pull_request.head_ref.clone(),
            source,
        })?;
    if head_sha != pull_request.head_sha {
        debug!(listed = %pull_request.head_sha, current = %head_sha, "head moved since listing");
    }

    let comparison = api
        .compare_commits(&pull_request.base_sha, &head_sha)
        .await
        .map_err(|source| CompareError::Compare {
            number: pull_request.number,
            source,
        })?;
    debug!(
        status = %comparison.status,
        ahead_by = comparison.ahead_by,
        behind_by = comparison.behind_by,
        total_commits = comparison.total_commits,
        "compared commits"
    );

    Ok(ReportRow::new(pull_request, comparison.total_commits))
}
