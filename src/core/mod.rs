//! core
//!
//! Core domain types, paths, and configuration for Hubtree.
//!
//! # Modules
//!
//! - [`types`] - Strong types: RepoName, TreeEntry, Metadata, etc.
//! - [`paths`] - Repository path normalization
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Schemas are strict and self-describing

pub mod config;
pub mod paths;
pub mod types;
