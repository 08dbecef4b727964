//! remote::github
//!
//! GitHub gateway implementation using the REST API v3.
//!
//! # Endpoints
//!
//! - `GET /repos/{vendor}/{package}/contents/{path}?ref={reference}` for
//!   existence checks, single-path lookups, and raw downloads
//! - `GET /repos/{vendor}/{package}/git/trees/{reference}?recursive=1` for
//!   the full tree listing
//! - `GET /repos/{vendor}/{package}/commits?sha={branch}&path={path}` for
//!   per-path history (all pages are followed)
//!
//! # Authentication
//!
//! Credentials are fixed when the gateway is built and attached to every
//! request. Without credentials requests are anonymous, which works for
//! public repositories under a lower rate limit.
//!
//! # Rate Limiting
//!
//! Returns `RemoteError::RateLimited` on HTTP 429. There is no automatic
//! retry (caller's responsibility).
//!
//! # Example
//!
//! ```ignore
//! use hubtree::core::types::RepoName;
//! use hubtree::remote::github::{Credentials, GitHubRemote};
//!
//! let remote = GitHubRemote::new(
//!     RepoName::new("octocat/hello-world")?,
//!     Some(Credentials::Token("ghp_xxx".into())),
//! )
//! .with_reference("main");
//!
//! let listing = remote.list_tree_recursive().await?;
//! ```

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use super::traits::{
    CommitHistory, CommitRecord, RawEntry, RemoteError, RemoteRepository, ShowPathResult,
    TreeListing,
};
use crate::core::config::{ConfigError, Settings};
use crate::core::types::RepoName;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default GitHub web URL.
pub const DEFAULT_WEB_BASE: &str = "https://github.com";

/// User-Agent header value for API requests.
const USER_AGENT_VALUE: &str = "hubtree";

/// Media type for JSON responses.
const JSON_MEDIA_TYPE: &str = "application/vnd.github+json";

/// Media type for raw file downloads.
const RAW_MEDIA_TYPE: &str = "application/vnd.github.raw";

/// Page size for commit listings (GitHub maximum).
const COMMITS_PER_PAGE: usize = 100;

/// Credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Personal access token or app token, sent as a bearer token.
    Token(String),
    /// HTTP basic authentication.
    Basic { username: String, password: String },
}

// Custom Debug to avoid exposing secrets
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
            Credentials::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// GitHub gateway.
///
/// One instance is bound to one repository, one snapshot reference, and
/// one branch for history queries.
pub struct GitHubRemote {
    /// HTTP client for making requests
    client: Client,
    /// Credentials resolved at construction
    credentials: Option<Credentials>,
    /// Repository (vendor/package)
    repo: RepoName,
    /// Snapshot reference for tree and contents
    reference: String,
    /// Branch for commit history
    branch: String,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

impl std::fmt::Debug for GitHubRemote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRemote")
            .field("has_credentials", &self.credentials.is_some())
            .field("repo", &self.repo)
            .field("reference", &self.reference)
            .field("branch", &self.branch)
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubRemote {
    /// Create a gateway for `repo` at `HEAD`, history on `master`.
    pub fn new(repo: RepoName, credentials: Option<Credentials>) -> Self {
        Self {
            client: Client::new(),
            credentials,
            repo,
            reference: crate::core::config::schema::DEFAULT_REFERENCE.to_string(),
            branch: crate::core::config::schema::DEFAULT_BRANCH.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Create a gateway from validated settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the settings don't validate.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        settings.validate()?;
        Ok(Self::new(settings.repo_name()?, settings.credentials())
            .with_reference(settings.reference())
            .with_branch(settings.branch())
            .with_api_base(settings.api_base()))
    }

    /// Use a different API base URL (e.g., `https://github.example.com/api/v3`).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Read tree and contents at this branch, tag, or SHA.
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    /// Query commit history on this branch.
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn repo(&self) -> &RepoName {
        &self.repo
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Build common headers for API requests.
    fn headers(accept: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers
    }

    /// Start a GET request with headers and credentials attached.
    fn get(&self, url: &str, accept: &'static str) -> RequestBuilder {
        let request = self.client.get(url).headers(Self::headers(accept));
        match &self.credentials {
            Some(Credentials::Token(token)) => request.bearer_auth(token),
            Some(Credentials::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            None => request,
        }
    }

    /// Build URL for a repository endpoint.
    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.api_base,
            self.repo.vendor(),
            self.repo.package(),
            path
        )
    }

    /// Build URL for the contents endpoint of a path.
    ///
    /// Each path segment is percent-encoded, so `#`, `?` and `%` in file
    /// names stay part of the path.
    fn contents_url(&self, path: &str) -> Result<Url, RemoteError> {
        let base = self.repo_url("contents");
        let mut url =
            Url::parse(&base).map_err(|e| RemoteError::InvalidUrl(format!("{}: {}", base, e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::InvalidUrl(base.clone()))?
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }

    /// Send a request, mapping transport failures.
    async fn send(request: RequestBuilder) -> Result<Response, RemoteError> {
        request
            .send()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, RemoteError> {
        let status = response.status();

        if status.is_success() {
            response
                .json()
                .await
                .map_err(|e| RemoteError::InvalidResponse(format!("failed to parse response: {}", e)))
        } else {
            self.handle_error_response(response, status).await
        }
    }

    /// Handle an error response from the API.
    async fn handle_error_response<T>(
        &self,
        response: Response,
        status: StatusCode,
    ) -> Result<T, RemoteError> {
        // Try to get error message from body
        let message = match response.json::<GitHubErrorResponse>().await {
            Ok(err) => err.message,
            Err(_) => "Unknown error".to_string(),
        };

        Err(match status {
            StatusCode::UNAUTHORIZED => RemoteError::AuthFailed("Invalid or expired token".into()),
            StatusCode::FORBIDDEN => {
                RemoteError::AuthFailed(format!("Permission denied: {}", message))
            }
            StatusCode::NOT_FOUND => RemoteError::NotFound(message),
            StatusCode::TOO_MANY_REQUESTS => RemoteError::RateLimited,
            _ if status.is_server_error() => RemoteError::ApiError {
                status: status.as_u16(),
                message: format!("GitHub server error: {}", message),
            },
            _ => RemoteError::ApiError {
                status: status.as_u16(),
                message,
            },
        })
    }

    /// Fetch one page of commits for a path.
    async fn commits_page(&self, path: &str, page: usize) -> Result<Vec<GitHubCommit>, RemoteError> {
        let url = self.repo_url("commits");
        let per_page = COMMITS_PER_PAGE.to_string();
        let page = page.to_string();
        let request = self.get(&url, JSON_MEDIA_TYPE).query(&[
            ("sha", self.branch.as_str()),
            ("path", path),
            ("per_page", per_page.as_str()),
            ("page", page.as_str()),
        ]);

        let response = Self::send(request).await?;
        self.handle_response(response).await
    }
}

#[async_trait]
impl RemoteRepository for GitHubRemote {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn exists(&self, path: &str) -> Result<bool, RemoteError> {
        let url = self.contents_url(path)?;
        tracing::debug!(path, "checking existence");

        let request = self
            .get(url.as_str(), JSON_MEDIA_TYPE)
            .query(&[("ref", self.reference.as_str())]);
        let response = Self::send(request).await?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            self.handle_error_response(response, status).await
        }
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>, RemoteError> {
        let url = self.contents_url(path)?;
        tracing::debug!(path, "downloading file");

        let request = self
            .get(url.as_str(), RAW_MEDIA_TYPE)
            .query(&[("ref", self.reference.as_str())]);
        let response = Self::send(request).await?;

        let status = response.status();
        if !status.is_success() {
            return self.handle_error_response(response, status).await;
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| RemoteError::NetworkError(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn show_path(&self, path: &str) -> Result<ShowPathResult, RemoteError> {
        let url = self.contents_url(path)?;
        tracing::debug!(path, "showing path");

        let request = self
            .get(url.as_str(), JSON_MEDIA_TYPE)
            .query(&[("ref", self.reference.as_str())]);
        let response = Self::send(request).await?;
        let body: serde_json::Value = self.handle_response(response).await?;

        show_path_result(body)
    }

    async fn list_tree_recursive(&self) -> Result<TreeListing, RemoteError> {
        let url = self.repo_url(&format!("git/trees/{}", self.reference));
        tracing::debug!(reference = %self.reference, "listing tree");

        let request = self
            .get(&url, JSON_MEDIA_TYPE)
            .query(&[("recursive", "1")]);
        let response = Self::send(request).await?;
        self.handle_response(response).await
    }

    async fn commits_for_path(&self, path: &str) -> Result<CommitHistory, RemoteError> {
        tracing::debug!(path, branch = %self.branch, "fetching commit history");

        let mut records = Vec::new();
        let mut page = 1;
        loop {
            let commits = self.commits_page(path, page).await?;
            let count = commits.len();
            for commit in commits {
                records.push(commit.try_into()?);
            }
            if count < COMMITS_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(CommitHistory::new(records))
    }
}

/// Fold the object-vs-array shape of a contents response into a result.
fn show_path_result(body: serde_json::Value) -> Result<ShowPathResult, RemoteError> {
    match body {
        serde_json::Value::Array(_) => Ok(ShowPathResult::DirectoryHint),
        value @ serde_json::Value::Object(_) => {
            let entry: RawEntry = serde_json::from_value(value)
                .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
            Ok(ShowPathResult::File(entry))
        }
        other => Err(RemoteError::InvalidResponse(format!(
            "expected object or array from contents API, got {}",
            other
        ))),
    }
}

// --------------------------------------------------------------------------
// Wire types
// --------------------------------------------------------------------------

/// GitHub error response format.
#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

/// GitHub commit list item (subset).
#[derive(Deserialize)]
struct GitHubCommit {
    sha: String,
    commit: GitHubCommitDetail,
}

#[derive(Deserialize)]
struct GitHubCommitDetail {
    committer: Option<GitHubSignature>,
}

#[derive(Deserialize)]
struct GitHubSignature {
    date: String,
}

impl TryFrom<GitHubCommit> for CommitRecord {
    type Error = RemoteError;

    fn try_from(gh: GitHubCommit) -> Result<Self, Self::Error> {
        let committer = gh.commit.committer.ok_or_else(|| {
            RemoteError::InvalidResponse(format!("commit {} has no committer", gh.sha))
        })?;

        Ok(CommitRecord {
            sha: gh.sha,
            committer_date: committer.date,
        })
    }
}
