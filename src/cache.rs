use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::github::{ApiError, GitHubApi};

/// Read-through cache from branch name to its head commit SHA.
///
/// Entries are never invalidated: the first resolved SHA for a branch is used
/// for the rest of the run. Each branch gets its own `OnceCell`, so concurrent
/// lookups of the same branch share one network call while different
/// branches resolve independently. The map lock is never held across an
/// await.
pub struct BranchCommitCache {
    api: Arc<dyn GitHubApi>,
    entries: Mutex<HashMap<String, Arc<OnceCell<String>>>>,
}

impl BranchCommitCache {
    pub fn new(api: Arc<dyn GitHubApi>) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Head commit SHA of `branch`, fetched from GitHub on first use.
    ///
    /// A failed fetch leaves the entry empty and returns the error.
    #[instrument(skip(self))]
    pub async fn last_commit(&self, branch: &str) -> Result<String, ApiError> {
        let cell = self.cell(branch);
        let sha = cell
            .get_or_try_init(|| async {
                debug!("cache miss, fetching branch head");
                self.api.branch_head(branch).await
            })
            .await?;
        Ok(sha.clone())
    }

    /// Cached SHA for `branch` without triggering a fetch.
    #[cfg(test)]
    pub fn cached(&self, branch: &str) -> Option<String> {
        self.lock()
            .get(branch)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of branches with a resolved SHA.
    pub fn resolved_count(&self) -> usize {
        self.lock().values().filter(|cell| cell.initialized()).count()
    }

    fn cell(&self, branch: &str) -> Arc<OnceCell<String>> {
        let mut entries = self.lock();
        Arc::clone(entries.entry(branch.to_string()).or_default())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<OnceCell<String>>>> {
        // The map is only mutated by inserting empty cells, so a poisoned
        // lock still guards a consistent map.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
