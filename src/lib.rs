//! Hubtree - A read-only filesystem view of a hosted Git repository
//!
//! Hubtree presents one repository, at one fixed reference, as a tree of
//! files and directories: existence checks, file reads, metadata, listings,
//! MIME types, and commit-derived timestamps. Nothing is ever written back.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`adapter`] - Storage-interface shim (read calls delegate, writes are rejected)
//! - [`tree`] - The facade: filtering, normalization, timestamp aggregation, caching
//! - [`remote`] - Gateway to the hosting service's REST API (GitHub v1)
//! - [`core`] - Domain types, path handling, and configuration
//!
//! # Correctness Invariants
//!
//! Hubtree maintains the following invariants:
//!
//! 1. Paths differing only by surrounding slashes are the same path
//! 2. A cached answer is never replaced and a failure is never cached
//! 3. Concurrent lookups of one path share a single remote fetch
//! 4. Entries of unknown type are reported as unknown, never guessed

pub mod adapter;
pub mod core;
pub mod remote;
pub mod tree;
