pub mod types;

pub use types::PullRequest;

use tracing::{debug, instrument};

use crate::github::{ApiError, GitHubApi};

/// Fetch every open pull request, one page at a time.
///
/// Pages are requested strictly in order starting from the first, and the
/// loop stops at the first empty page. There is no page cap: an API that
/// never returns an empty page keeps this running.
#[instrument(skip(api))]
pub async fn fetch_all_open_pull_requests(api: &dyn GitHubApi) -> Result<Vec<PullRequest>, ApiError> {
    let mut pull_requests = Vec::new();
    let mut page = 0;
    loop {
        let batch = api.open_pull_requests(page).await?;
        debug!(page = page + 1, count = batch.len(), "fetched pull request page");
        if batch.is_empty() {
            break;
        }
        pull_requests.extend(batch);
        page += 1;
    }
    Ok(pull_requests)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::GithubCommitCompare;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves canned pages and records which pages were asked for.
    struct PagedStub {
        pages: Vec<Vec<PullRequest>>,
        requested: Mutex<Vec<u32>>,
        fail_on: Option<u32>,
    }

    impl PagedStub {
        fn new(page_sizes: &[u64]) -> Self {
            let mut number = 0;
            let pages: Vec<Vec<PullRequest>> = page_sizes
                .iter()
                .map(|&size| {
                    (0..size)
                        .map(|_| {
                            number += 1;
                            test_pull_request(number)
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            Self {
                pages,
                requested: Mutex::new(Vec::new()),
                fail_on: None,
            }
        }
    }

    #[async_trait]
    impl GitHubApi for PagedStub {
        async fn open_pull_requests(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
            self.requested.lock().unwrap().push(page);
            if self.fail_on == Some(page) {
                return Err(ApiError::InvalidUrl("page unavailable".to_string()));
            }
            Ok(self.pages.get(page as usize).cloned().unwrap_or_default())
        }

        async fn branch_head(&self, _branch: &str) -> Result<String, ApiError> {
            unreachable!("fetcher never resolves branches")
        }

        async fn compare_commits(&self, _base: &str, _head: &str) -> Result<GithubCommitCompare, ApiError> {
            unreachable!("fetcher never compares")
        }
    }

    /// Helper to create a minimal PullRequest for testing.
    fn test_pull_request(number: u64) -> PullRequest {
        PullRequest {
            id: number * 100,
            number,
            title: format!("PR {number}"),
            created_at: None,
            head_ref: format!("branch-{number}"),
            head_sha: format!("head-{number}"),
            base_ref: "master".to_string(),
            base_sha: "base".to_string(),
        }
    }

    #[tokio::test]
    async fn test_pages_concatenate_in_order_until_empty() {
        let stub = PagedStub::new(&[3, 2, 0]);
        let prs = fetch_all_open_pull_requests(&stub).await.unwrap();

        let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
        assert_eq!(*stub.requested.lock().unwrap(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_first_page() {
        let stub = PagedStub::new(&[]);
        let prs = fetch_all_open_pull_requests(&stub).await.unwrap();
        assert!(prs.is_empty());
        assert_eq!(stub.requested.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_page_error_aborts_fetch() {
        let mut stub = PagedStub::new(&[3, 2, 0]);
        stub.fail_on = Some(1);
        let result = fetch_all_open_pull_requests(&stub).await;
        assert!(result.is_err());
        assert_eq!(*stub.requested.lock().unwrap(), vec![0, 1]);
    }
}
