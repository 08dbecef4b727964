//! remote
//!
//! Gateway to the hosted repository (GitHub).
//!
//! # Architecture
//!
//! The `RemoteRepository` trait is the only network boundary of the crate.
//! The tree layer talks to `Arc<dyn RemoteRepository>` and never imports a
//! concrete gateway.
//!
//! # Modules
//!
//! - `traits`: Core `RemoteRepository` trait and wire-level types
//! - [`github`]: GitHub implementation using the REST API
//! - [`mock`]: In-memory implementation for deterministic testing
//!
//! # Example
//!
//! ```ignore
//! use hubtree::core::config::Config;
//! use hubtree::remote::github::GitHubRemote;
//! use hubtree::remote::RemoteRepository;
//!
//! let config = Config::load()?;
//! let remote = GitHubRemote::from_settings(&config.settings)?;
//!
//! if remote.exists("README.md").await? {
//!     let bytes = remote.download("README.md").await?;
//!     println!("{} bytes", bytes.len());
//! }
//! ```

pub mod github;
pub mod mock;
mod traits;

pub use traits::*;
