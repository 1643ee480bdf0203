use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Request, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::types::{GithubBranch, GithubCommitCompare, GithubPullRequest};
use super::{ApiError, GitHubApi};
use crate::pr::PullRequest;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// HTTP gateway to a single repository.
///
/// Holds one pooled `reqwest::Client`; clone the surrounding `Arc` rather than
/// the client when sharing between tasks.
#[derive(Debug)]
pub struct GitHubClient {
    http: reqwest::Client,
    repo_url: String,
    authorization: HeaderValue,
}

impl GitHubClient {
    /// Build a client for `{api_url}/repos/{owner}/{repo}`.
    ///
    /// Fails on an unparsable base URL or a token that cannot be sent as a
    /// header; both are startup errors.
    pub fn new(api_url: &str, owner: &str, repo: &str, token: &str) -> Result<Self, ApiError> {
        let base = Url::parse(api_url).map_err(|err| ApiError::InvalidUrl(format!("{api_url}: {err}")))?;
        let repo_url = format!("{}/repos/{}/{}", base.as_str().trim_end_matches('/'), owner, repo);
        Url::parse(&repo_url).map_err(|err| ApiError::InvalidUrl(format!("{repo_url}: {err}")))?;

        let mut authorization = HeaderValue::from_str(&format!("token {token}"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            repo_url,
            authorization,
        })
    }

    /// `GET /pulls?state=open&page={page + 1}`
    pub fn open_pull_requests_request(&self, page: u32) -> Result<Request, ApiError> {
        self.get(format!("{}/pulls?state=open&page={}", self.repo_url, page + 1))
    }

    /// `GET /branches/{branch}`
    ///
    /// Each `/`-separated part of the name is percent-encoded, so `#`, `?`
    /// and `%` stay in the path instead of starting a fragment or query.
    pub fn branch_request(&self, branch: &str) -> Result<Request, ApiError> {
        self.get_segments(&["branches"], branch.split('/'))
    }

    /// `GET /compare/{base}...{head}`
    pub fn compare_request(&self, base: &str, head: &str) -> Result<Request, ApiError> {
        self.get_segments(&["compare"], [format!("{base}...{head}").as_str()])
    }

    /// Attach the `Authorization: token ...` header and send.
    ///
    /// Non-2xx statuses are returned as [`ApiError::Request`].
    pub async fn execute(&self, mut request: Request) -> Result<Response, ApiError> {
        request
            .headers_mut()
            .insert(AUTHORIZATION, self.authorization.clone());
        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.http.execute(request).await?.error_for_status()?;
        Ok(response)
    }

    fn get(&self, url: String) -> Result<Request, ApiError> {
        let url = Url::parse(&url).map_err(|err| ApiError::InvalidUrl(format!("{url}: {err}")))?;
        Ok(Request::new(Method::GET, url))
    }

    /// GET below the repository URL, appending `fixed` as-is and encoding
    /// every segment of `encoded`.
    fn get_segments<'a>(
        &self,
        fixed: &[&str],
        encoded: impl IntoIterator<Item = &'a str>,
    ) -> Result<Request, ApiError> {
        let mut url = Url::parse(&self.repo_url)
            .map_err(|err| ApiError::InvalidUrl(format!("{}: {err}", self.repo_url)))?;
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(format!("{} cannot be a base URL", self.repo_url)))?
            .extend(fixed.iter().copied())
            .extend(encoded);
        Ok(Request::new(Method::GET, url))
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        request: Request,
        resource: &'static str,
    ) -> Result<T, ApiError> {
        let body = self.execute(request).await?.bytes().await?;
        debug!(resource, body_bytes = body.len(), "received response");
        serde_json::from_slice(&body).map_err(|source| ApiError::Decode { resource, source })
    }
}

#[async_trait]
impl GitHubApi for GitHubClient {
    #[instrument(skip(self))]
    async fn open_pull_requests(&self, page: u32) -> Result<Vec<PullRequest>, ApiError> {
        let request = self.open_pull_requests_request(page)?;
        let pulls: Vec<GithubPullRequest> = self.fetch_json(request, "pull request list").await?;
        Ok(pulls.into_iter().map(PullRequest::from).collect())
    }

    #[instrument(skip(self))]
    async fn branch_head(&self, branch: &str) -> Result<String, ApiError> {
        let request = self.branch_request(branch)?;
        let branch: GithubBranch = self.fetch_json(request, "branch").await?;
        Ok(branch.commit.sha)
    }

    #[instrument(skip(self))]
    async fn compare_commits(&self, base: &str, head: &str) -> Result<GithubCommitCompare, ApiError> {
        let request = self.compare_request(base, head)?;
        self.fetch_json(request, "commit comparison").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&server.uri(), "o", "r", "t").unwrap()
    }

    #[test]
    fn test_compare_request_keeps_base_head_order() {
        let client = GitHubClient::new(DEFAULT_API_URL, "o", "r", "t").unwrap();
        let request = client.compare_request("base123", "head456").unwrap();
        assert_eq!(request.method(), Method::GET);
        assert!(request.url().path().ends_with("/compare/base123...head456"));
        assert!(!request.url().path().contains("head456...base123"));
    }

    #[test]
    fn test_open_pull_requests_request_is_one_based() {
        let client = GitHubClient::new(DEFAULT_API_URL, "o", "r", "t").unwrap();
        let request = client.open_pull_requests_request(0).unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.github.com/repos/o/r/pulls?state=open&page=1"
        );
    }

    #[test]
    fn test_branch_request_path() {
        let client = GitHubClient::new("https://ghe.example.com/api/v3/", "o", "r", "t").unwrap();
        let request = client.branch_request("master").unwrap();
        assert_eq!(request.url().path(), "/api/v3/repos/o/r/branches/master");
    }

    #[test]
    fn test_branch_request_encodes_reserved_characters() {
        let client = GitHubClient::new(DEFAULT_API_URL, "o", "r", "t").unwrap();

        let request = client.branch_request("fix#12").unwrap();
        assert_eq!(request.url().path(), "/repos/o/r/branches/fix%2312");
        assert_eq!(request.url().fragment(), None);

        let request = client.branch_request("wip?draft").unwrap();
        assert_eq!(request.url().path(), "/repos/o/r/branches/wip%3Fdraft");
        assert_eq!(request.url().query(), None);

        let request = client.branch_request("100%done").unwrap();
        assert_eq!(request.url().path(), "/repos/o/r/branches/100%25done");
    }

    #[test]
    fn test_branch_request_keeps_slashes() {
        let client = GitHubClient::new(DEFAULT_API_URL, "o", "r", "t").unwrap();
        let request = client.branch_request("release/1.0").unwrap();
        assert_eq!(request.url().path(), "/repos/o/r/branches/release/1.0");
    }

    #[tokio::test]
    async fn test_branch_head_with_hash_in_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/branches/fix"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "commit": { "sha": "wrong" }
            })))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path_regex("^/repos/o/r/branches/fix(%23|#)12$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "commit": { "sha": "right" }
            })))
            .mount(&server)
            .await;

        let sha = client_for(&server).branch_head("fix#12").await.unwrap();
        assert_eq!(sha, "right");
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let err = GitHubClient::new("not a url", "o", "r", "t").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        let err = GitHubClient::new(DEFAULT_API_URL, "o", "r", "bad\ntoken").unwrap_err();
        assert!(matches!(err, ApiError::InvalidToken(_)));
    }

    #[tokio::test]
    async fn test_execute_sends_token_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/branches/master"))
            .and(header("authorization", "token t"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "master",
                "commit": { "sha": "aaa" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let sha = client_for(&server).branch_head("master").await.unwrap();
        assert_eq!(sha, "aaa");
    }

    #[tokio::test]
    async fn test_open_pull_requests_decodes_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls"))
            .and(query_param("state", "open"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "number": 3, "head": { "ref": "a", "sha": "1" }, "base": { "ref": "master", "sha": "0" } },
                { "number": 4, "head": { "ref": "b", "sha": "2" }, "base": { "ref": "master", "sha": "0" } }
            ])))
            .mount(&server)
            .await;

        let prs = client_for(&server).open_pull_requests(1).await.unwrap();
        let numbers: Vec<u64> = prs.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![3, 4]);
    }

    #[tokio::test]
    async fn test_non_array_page_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/pulls"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "unexpected"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).open_pull_requests(0).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { resource: "pull request list", .. }));
    }

    #[tokio::test]
    async fn test_error_status_is_request_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/compare/aaa...bbb"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client_for(&server).compare_commits("aaa", "bbb").await.unwrap_err();
        assert!(matches!(err, ApiError::Request(_)));
    }

    #[tokio::test]
    async fn test_compare_commits_hits_three_dot_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/o/r/compare/base123...head456"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "diverged",
                "ahead_by": 2,
                "behind_by": 1,
                "total_commits": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let compare = client_for(&server).compare_commits("base123", "head456").await.unwrap();
        assert_eq!(compare.total_commits, 2);
        assert_eq!(compare.behind_by, 1);
    }
}
