//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Settings
//!
//! Located at (in order of precedence):
//! 1. `$HUBTREE_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hubtree/config.toml`
//! 3. `~/.hubtree/config.toml`
//!
//! # Validation
//!
//! Values are validated after parsing: the repository must be
//! `vendor/package`, branch and reference must be non-empty, and
//! credentials must be either a token or a username/password pair.

use serde::{Deserialize, Serialize};

use super::ConfigError;
use crate::core::types::{RepoName, TimestampPolicy};
use crate::remote::github::{Credentials, DEFAULT_API_BASE, DEFAULT_WEB_BASE};

/// Default branch used for commit-history queries.
pub const DEFAULT_BRANCH: &str = "master";

/// Default snapshot reference.
pub const DEFAULT_REFERENCE: &str = "HEAD";

/// Default cap on commit-history requests in flight at once.
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 8;

/// Repository binding settings.
///
/// # Example
///
/// ```toml
/// repository = "potherca/flysystem-github"
/// branch = "main"
/// reference = "v1.2.0"
/// timestamp_policy = "created"
/// max_concurrent_requests = 8
///
/// [credentials]
/// token = "ghp_xxx"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Hosted repository as `vendor/package` (required)
    pub repository: Option<String>,

    /// Branch for commit history (default: "master")
    pub branch: Option<String>,

    /// Branch, tag, or SHA to read the tree from (default: "HEAD")
    pub reference: Option<String>,

    /// REST API base URL (GitHub Enterprise installations)
    pub api_base: Option<String>,

    /// Web base URL used in generated links
    pub web_base: Option<String>,

    /// How file and directory timestamps are derived
    pub timestamp_policy: Option<TimestampPolicy>,

    /// Commit-history requests allowed in flight at once (default: 8)
    pub max_concurrent_requests: Option<usize>,

    /// Optional authentication
    pub credentials: Option<CredentialsConfig>,
}

impl Settings {
    /// Settings for a repository with every other value defaulted.
    pub fn for_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            ..Self::default()
        }
    }

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.repo_name()?;

        if let Some(branch) = &self.branch {
            if branch.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "branch cannot be empty".to_string(),
                ));
            }
        }

        if let Some(reference) = &self.reference {
            if reference.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "reference cannot be empty".to_string(),
                ));
            }
        }

        if self.max_concurrent_requests == Some(0) {
            return Err(ConfigError::InvalidValue(
                "max_concurrent_requests must be at least 1".to_string(),
            ));
        }

        if let Some(credentials) = &self.credentials {
            credentials.validate()?;
        }

        Ok(())
    }

    /// The validated repository name.
    pub fn repo_name(&self) -> Result<RepoName, ConfigError> {
        let repository = self
            .repository
            .as_deref()
            .ok_or_else(|| ConfigError::InvalidValue("repository is required".to_string()))?;
        RepoName::new(repository).map_err(|e| ConfigError::InvalidValue(e.to_string()))
    }

    pub fn branch(&self) -> &str {
        self.branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn reference(&self) -> &str {
        self.reference.as_deref().unwrap_or(DEFAULT_REFERENCE)
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/')
    }

    pub fn web_base(&self) -> &str {
        self.web_base
            .as_deref()
            .unwrap_or(DEFAULT_WEB_BASE)
            .trim_end_matches('/')
    }

    pub fn timestamp_policy(&self) -> TimestampPolicy {
        self.timestamp_policy.unwrap_or_default()
    }

    pub fn max_concurrent_requests(&self) -> usize {
        self.max_concurrent_requests
            .unwrap_or(DEFAULT_MAX_CONCURRENT_REQUESTS)
    }

    /// Resolved credentials, if any are configured.
    pub fn credentials(&self) -> Option<Credentials> {
        self.credentials.as_ref().and_then(CredentialsConfig::resolve)
    }
}

/// Authentication settings.
///
/// Either `token`, or `username` together with `password`.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct CredentialsConfig {
    pub token: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

// Custom Debug to avoid exposing secrets
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field("has_token", &self.token.is_some())
            .field("username", &self.username)
            .field("has_password", &self.password.is_some())
            .finish()
    }
}

impl CredentialsConfig {
    /// Validate the credential combination.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.token, &self.username, &self.password) {
            (Some(_), None, None) => Ok(()),
            (None, Some(_), Some(_)) => Ok(()),
            (None, None, None) => Ok(()),
            _ => Err(ConfigError::InvalidValue(
                "credentials must be either a token or a username and password".to_string(),
            )),
        }
    }

    fn resolve(&self) -> Option<Credentials> {
        match (&self.token, &self.username, &self.password) {
            (Some(token), _, _) => Some(Credentials::Token(token.clone())),
            (None, Some(username), Some(password)) => Some(Credentials::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}
