//! core::types
//!
//! Strong types for the uniform file/directory model.
//!
//! # Types
//!
//! - [`RepoName`] - Validated `vendor/package` repository identifier
//! - [`EntryKind`] - File, directory, or an explicit unknown sentinel
//! - [`Visibility`] - Public/private classification from mode bits
//! - [`TreeEntry`] - One normalized node of a repository tree
//! - [`DirectoryMetadata`] - Synthesized entry for a path known to be a directory
//! - [`Metadata`] - Result of a single-path metadata lookup
//! - [`TimestampPolicy`] - Which commit date stands for a file's timestamp
//!
//! # Serialization
//!
//! [`TreeEntry`] and [`Metadata`] serialize to the flat key/value shape that
//! storage adapters expect. Placeholder fields are always present:
//! `contents` and `stream` are `false` (content is fetched lazily), and an
//! uncomputed `timestamp` is `false`. A not-found [`Metadata`] serializes to
//! the bare value `false`.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("repository \"{0}\" should be in the format of \"vendor/package\"")]
    InvalidRepoName(String),
}

/// A validated hosted repository identifier.
///
/// Exactly one `/` separating a non-empty vendor and a non-empty package.
///
/// # Example
///
/// ```
/// use hubtree::core::types::RepoName;
///
/// let name = RepoName::new("octocat/hello-world").unwrap();
/// assert_eq!(name.vendor(), "octocat");
/// assert_eq!(name.package(), "hello-world");
///
/// assert!(RepoName::new("no-slash").is_err());
/// assert!(RepoName::new("/leading").is_err());
/// assert!(RepoName::new("a/b/c").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoName(String);

impl RepoName {
    /// Create a new validated repository name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidRepoName` unless the name is `vendor/package`.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        match name.split_once('/') {
            Some((vendor, package))
                if !vendor.is_empty() && !package.is_empty() && !package.contains('/') =>
            {
                Ok(Self(name))
            }
            _ => Err(TypeError::InvalidRepoName(name)),
        }
    }

    /// The owner part.
    pub fn vendor(&self) -> &str {
        self.0.split_once('/').map(|(v, _)| v).unwrap_or(&self.0)
    }

    /// The repository part.
    pub fn package(&self) -> &str {
        self.0.split_once('/').map(|(_, p)| p).unwrap_or("")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RepoName {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RepoName> for String {
    fn from(name: RepoName) -> Self {
        name.0
    }
}

impl fmt::Display for RepoName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniform entry type.
///
/// Raw `blob` maps to `File`, raw `tree` maps to `Directory`. Anything else
/// (submodule `commit` entries, missing types) is kept as `Unknown` with the
/// raw value so consumers can detect and reject it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    Unknown(Option<String>),
}

impl EntryKind {
    /// Map a raw tree entry type.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw {
            Some("blob") | Some("file") => EntryKind::File,
            Some("tree") | Some("dir") => EntryKind::Directory,
            other => EntryKind::Unknown(other.map(str::to_string)),
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, EntryKind::File)
    }

    pub fn is_directory(&self) -> bool {
        matches!(self, EntryKind::Directory)
    }

    /// The serialized name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Public/private classification of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Public => write!(f, "public"),
            Visibility::Private => write!(f, "private"),
        }
    }
}

/// Which commit of a file's history dates the file.
///
/// `Created` takes the oldest commit, `LastUpdated` the newest. Directory
/// timestamps aggregate the same per-file value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampPolicy {
    #[default]
    Created,
    LastUpdated,
}

/// One normalized node of a repository tree.
///
/// Built by [`crate::tree::normalize`]; never patched field by field
/// afterwards except for `timestamp`, which the aggregator fills in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Repository-root-relative path, normalized.
    pub path: String,
    /// Display name (explicit name, then basename, then path).
    pub name: Option<String>,
    pub kind: EntryKind,
    pub visibility: Visibility,
    /// Raw permission string (e.g. `100644`).
    pub mode: Option<String>,
    /// Size in bytes (files only).
    pub size: Option<u64>,
    /// Content hash.
    pub sha: Option<String>,
    /// Unix timestamp, `None` until computed.
    pub timestamp: Option<i64>,
}

impl Serialize for TreeEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("type", self.kind.as_str())?;
        if let EntryKind::Unknown(raw) = &self.kind {
            map.serialize_entry("raw_type", raw)?;
        }
        map.serialize_entry("visibility", &self.visibility)?;
        if let Some(mode) = &self.mode {
            map.serialize_entry("mode", mode)?;
        }
        if let Some(size) = self.size {
            map.serialize_entry("size", &size)?;
        }
        if let Some(sha) = &self.sha {
            map.serialize_entry("sha", sha)?;
        }
        map.serialize_entry("contents", &false)?;
        map.serialize_entry("stream", &false)?;
        serialize_timestamp(&mut map, self.timestamp)?;
        map.end()
    }
}

/// Links attached to a synthesized directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_url: String,
    pub html: String,
}

/// Synthesized metadata for a path the remote reported as a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryMetadata {
    /// Normalized directory path (`""` for the root).
    pub path: String,
    /// API contents URL.
    pub url: String,
    /// Web URL.
    pub html_url: String,
    pub links: Links,
    /// Merged from the matching tree entry when one exists.
    pub name: Option<String>,
    pub mode: Option<String>,
    pub sha: Option<String>,
    pub visibility: Visibility,
    /// Aggregated over file descendants; `0` when there are none.
    pub timestamp: i64,
}

impl Serialize for DirectoryMetadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("type", EntryKind::Directory.as_str())?;
        map.serialize_entry("path", &self.path)?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("url", &self.url)?;
        map.serialize_entry("html_url", &self.html_url)?;
        map.serialize_entry("_links", &self.links)?;
        if let Some(mode) = &self.mode {
            map.serialize_entry("mode", mode)?;
        }
        if let Some(sha) = &self.sha {
            map.serialize_entry("sha", sha)?;
        }
        map.serialize_entry("visibility", &self.visibility)?;
        map.serialize_entry("contents", &false)?;
        map.serialize_entry("stream", &false)?;
        map.serialize_entry("timestamp", &self.timestamp)?;
        map.end()
    }
}

/// Result of a single-path metadata lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    File(TreeEntry),
    Directory(DirectoryMetadata),
    NotFound,
}

impl Metadata {
    pub fn is_found(&self) -> bool {
        !matches!(self, Metadata::NotFound)
    }

    pub fn is_directory(&self) -> bool {
        match self {
            Metadata::Directory(_) => true,
            Metadata::File(entry) => entry.kind.is_directory(),
            Metadata::NotFound => false,
        }
    }

    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Metadata::File(entry) => Some(entry.visibility),
            Metadata::Directory(dir) => Some(dir.visibility),
            Metadata::NotFound => None,
        }
    }

    pub fn timestamp(&self) -> Option<i64> {
        match self {
            Metadata::File(entry) => entry.timestamp,
            Metadata::Directory(dir) => Some(dir.timestamp),
            Metadata::NotFound => None,
        }
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Metadata::File(entry) => entry.serialize(serializer),
            Metadata::Directory(dir) => dir.serialize(serializer),
            Metadata::NotFound => serializer.serialize_bool(false),
        }
    }
}

fn serialize_timestamp<M: SerializeMap>(map: &mut M, timestamp: Option<i64>) -> Result<(), M::Error> {
    match timestamp {
        Some(ts) => map.serialize_entry("timestamp", &ts),
        None => map.serialize_entry("timestamp", &false),
    }
}
