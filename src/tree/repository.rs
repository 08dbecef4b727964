//! tree::repository
//!
//! The repository tree facade.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::Semaphore;

use super::cache::FillOnceCache;
use super::error::TreeError;
use super::filter::filter_tree;
use super::mime::{self, DIRECTORY_MIME};
use super::normalize::{normalize_entries, normalize_entry};
use super::timestamp::{commit_timestamp, directory_timestamp};
use crate::core::config::schema::{DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_REFERENCE};
use crate::core::config::{ConfigError, Settings};
use crate::core::paths::normalize_path;
use crate::core::types::{
    DirectoryMetadata, EntryKind, Links, Metadata, RepoName, TimestampPolicy, TreeEntry,
};
use crate::remote::github::{GitHubRemote, DEFAULT_API_BASE, DEFAULT_WEB_BASE};
use crate::remote::{CommitHistory, RawEntry, RemoteRepository, ShowPathResult};

/// Repository binding used to build URLs and pick the timestamp policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeOptions {
    pub repo: RepoName,
    /// Branch, tag, or SHA the tree is read at.
    pub reference: String,
    pub api_base: String,
    pub web_base: String,
    pub timestamp_policy: TimestampPolicy,
    /// Cap on commit-history requests in flight at once.
    pub max_concurrent_requests: usize,
}

impl TreeOptions {
    /// Options for `repo` at `HEAD` on the public GitHub hosts.
    pub fn new(repo: RepoName) -> Self {
        Self {
            repo,
            reference: DEFAULT_REFERENCE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            web_base: DEFAULT_WEB_BASE.to_string(),
            timestamp_policy: TimestampPolicy::default(),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self {
            repo: settings.repo_name()?,
            reference: settings.reference().to_string(),
            api_base: settings.api_base().to_string(),
            web_base: settings.web_base().to_string(),
            timestamp_policy: settings.timestamp_policy(),
            max_concurrent_requests: settings.max_concurrent_requests(),
        })
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = reference.into();
        self
    }

    pub fn with_timestamp_policy(mut self, policy: TimestampPolicy) -> Self {
        self.timestamp_policy = policy;
        self
    }

    /// Zero is treated as one.
    pub fn with_max_concurrent_requests(mut self, limit: usize) -> Self {
        self.max_concurrent_requests = limit.max(1);
        self
    }

    fn request_limit(&self) -> usize {
        self.max_concurrent_requests.max(1)
    }

    /// API contents URL of a normalized path.
    pub fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}?ref={}",
            self.api_base.trim_end_matches('/'),
            self.repo.vendor(),
            self.repo.package(),
            path,
            self.reference
        )
    }

    /// Web URL of a normalized path.
    pub fn html_url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}/blob/{}/{}",
            self.web_base.trim_end_matches('/'),
            self.repo.vendor(),
            self.repo.package(),
            self.reference,
            path
        )
    }
}

/// Read-only view of one repository at one reference.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and may run
/// concurrently. Metadata and commit histories are cached for the
/// lifetime of the instance and never invalidated.
pub struct RepositoryTree {
    remote: Arc<dyn RemoteRepository>,
    options: TreeOptions,
    metadata: FillOnceCache<Metadata>,
    commits: FillOnceCache<Arc<CommitHistory>>,
    /// One permit per commit-history request in flight.
    permits: Semaphore,
}

impl std::fmt::Debug for RepositoryTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositoryTree")
            .field("remote", &self.remote.name())
            .field("options", &self.options)
            .field("cached_metadata", &self.metadata.len())
            .field("cached_histories", &self.commits.len())
            .finish()
    }
}

impl RepositoryTree {
    pub fn new(remote: Arc<dyn RemoteRepository>, options: TreeOptions) -> Self {
        let permits = Semaphore::new(options.request_limit());
        Self {
            remote,
            options,
            permits,
            metadata: FillOnceCache::new(),
            commits: FillOnceCache::new(),
        }
    }

    /// Bind a GitHub repository from validated settings.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        let remote = GitHubRemote::from_settings(settings)?;
        let options = TreeOptions::from_settings(settings)?;
        Ok(Self::new(Arc::new(remote), options))
    }

    pub fn options(&self) -> &TreeOptions {
        &self.options
    }

    /// Whether the path exists at the reference.
    pub async fn exists(&self, path: &str) -> Result<bool, TreeError> {
        let path = normalize_path(path);
        Ok(self.remote.exists(path).await?)
    }

    /// Raw contents of a file.
    pub async fn get_file_contents(&self, path: &str) -> Result<Vec<u8>, TreeError> {
        let path = normalize_path(path);
        self.remote
            .download(path)
            .await
            .map_err(|e| TreeError::from_remote(path, e))
    }

    /// Unix time of the oldest commit touching the path.
    pub async fn get_created_timestamp(&self, path: &str) -> Result<i64, TreeError> {
        let path = normalize_path(path);
        let history = self.history(path).await?;
        let commit = history
            .oldest()
            .ok_or_else(|| TreeError::NoCommitHistory(path.to_string()))?;
        commit_timestamp(path, commit)
    }

    /// Unix time of the newest commit touching the path.
    pub async fn get_last_updated_timestamp(&self, path: &str) -> Result<i64, TreeError> {
        let path = normalize_path(path);
        let history = self.history(path).await?;
        let commit = history
            .newest()
            .ok_or_else(|| TreeError::NoCommitHistory(path.to_string()))?;
        commit_timestamp(path, commit)
    }

    /// File timestamp under the configured policy.
    pub async fn get_timestamp(&self, path: &str) -> Result<i64, TreeError> {
        match self.options.timestamp_policy {
            TimestampPolicy::Created => self.get_created_timestamp(path).await,
            TimestampPolicy::LastUpdated => self.get_last_updated_timestamp(path).await,
        }
    }

    /// Metadata of a single path.
    ///
    /// A missing path yields [`Metadata::NotFound`], which is cached like
    /// any other answer. File metadata carries no timestamp; directory
    /// metadata carries the aggregated one.
    pub async fn get_metadata(&self, path: &str) -> Result<Metadata, TreeError> {
        let path = normalize_path(path);
        self.metadata
            .get_or_try_fetch(path, || self.fetch_metadata(path))
            .await
    }

    /// Entries under `path`, direct children only unless `recursive`.
    ///
    /// Every entry has its timestamp filled: files from their own history,
    /// directories by aggregation over the whole tree. Entries of unknown
    /// type keep an empty timestamp.
    pub async fn get_directory_contents(
        &self,
        path: &str,
        recursive: bool,
    ) -> Result<Vec<TreeEntry>, TreeError> {
        let path = normalize_path(path);
        let tree = self.full_tree().await?;

        let selected: Vec<TreeEntry> = filter_tree(&tree, path, recursive)
            .into_iter()
            .cloned()
            .collect();

        let tree = &tree;
        let limit = self.options.request_limit();
        let filled = selected.into_iter().map(|mut entry| async move {
            entry.timestamp = match entry.kind {
                EntryKind::File => Some(self.get_timestamp(&entry.path).await?),
                EntryKind::Directory => Some(
                    directory_timestamp(tree, &entry.path, limit, |file| async move {
                        self.get_timestamp(&file).await
                    })
                    .await?,
                ),
                EntryKind::Unknown(_) => None,
            };
            Ok::<_, TreeError>(entry)
        });

        stream::iter(filled).buffered(limit).try_collect().await
    }

    /// MIME type of a path, `"directory"` for directories.
    ///
    /// Uses the extension when it is known, otherwise downloads the file
    /// and inspects its contents.
    pub async fn guess_mime_type(&self, path: &str) -> Result<&'static str, TreeError> {
        let path = normalize_path(path);
        match self.get_metadata(path).await? {
            Metadata::NotFound => return Err(TreeError::NotFound(path.to_string())),
            metadata if metadata.is_directory() => return Ok(DIRECTORY_MIME),
            _ => {}
        }

        if let Some(mime) = mime::from_extension(path) {
            return Ok(mime);
        }

        let contents = self.get_file_contents(path).await?;
        Ok(mime::sniff(&contents))
    }

    /// Commit history of a path, through the cache.
    async fn history(&self, path: &str) -> Result<Arc<CommitHistory>, TreeError> {
        self.commits
            .get_or_try_fetch(path, || async {
                tracing::debug!(path, "commit history cache miss");
                // Never closed, so acquiring cannot fail.
                let _permit = self.permits.acquire().await.ok();
                self.remote
                    .commits_for_path(path)
                    .await
                    .map(Arc::new)
                    .map_err(|e| TreeError::from_remote(path, e))
            })
            .await
    }

    /// Whole tree at the reference, normalized.
    async fn full_tree(&self) -> Result<Vec<TreeEntry>, TreeError> {
        let listing = self.remote.list_tree_recursive().await?;
        if listing.truncated {
            tracing::warn!(
                repo = %self.options.repo,
                entries = listing.entries.len(),
                "tree listing truncated by the remote"
            );
        }
        Ok(normalize_entries(&listing.entries))
    }

    async fn fetch_metadata(&self, path: &str) -> Result<Metadata, TreeError> {
        tracing::debug!(path, "metadata cache miss");
        let found = match self.remote.show_path(path).await {
            Ok(found) => found,
            Err(e) if e.is_not_found() => return Ok(Metadata::NotFound),
            Err(e) => return Err(e.into()),
        };

        match found {
            ShowPathResult::File(raw) => Ok(Metadata::File(file_entry(path, raw))),
            ShowPathResult::DirectoryHint => {
                Ok(Metadata::Directory(self.directory_metadata(path).await?))
            }
        }
    }

    async fn directory_metadata(&self, path: &str) -> Result<DirectoryMetadata, TreeError> {
        let tree = self.full_tree().await?;
        let limit = self.options.request_limit();
        let timestamp = directory_timestamp(&tree, path, limit, |file| async move {
            self.get_timestamp(&file).await
        })
        .await?;

        let url = self.options.contents_url(path);
        let html_url = self.options.html_url(path);
        let own = tree
            .iter()
            .find(|entry| entry.path == path && entry.kind.is_directory());

        Ok(DirectoryMetadata {
            path: path.to_string(),
            links: Links {
                self_url: url.clone(),
                html: html_url.clone(),
            },
            url,
            html_url,
            name: own.and_then(|entry| entry.name.clone()),
            mode: own.and_then(|entry| entry.mode.clone()),
            sha: own.and_then(|entry| entry.sha.clone()),
            visibility: own.map(|entry| entry.visibility).unwrap_or_default(),
            timestamp,
        })
    }
}

/// Normalize a single-path lookup, keeping the requested path when the
/// remote omits it.
fn file_entry(path: &str, mut raw: RawEntry) -> TreeEntry {
    if raw.path.is_none() {
        raw.path = Some(path.to_string());
    }
    normalize_entry(&raw)
}
