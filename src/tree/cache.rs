//! tree::cache
//!
//! Per-instance memoization keyed by normalized path.
//!
//! # Semantics
//!
//! - Fill once: the first successful fetch for a key is stored and every
//!   later call returns it without fetching.
//! - Single flight: concurrent callers for the same uncached key share one
//!   fetch; the others wait for its result.
//! - No poisoning: a failed fetch stores nothing, so the next caller
//!   fetches again.
//! - No eviction: entries live as long as the cache. One cache belongs to
//!   one repository binding at one fixed reference, whose data never
//!   changes.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Write-once, single-flight cache.
#[derive(Debug)]
pub struct FillOnceCache<V> {
    /// One cell per key; the map lock is never held across an await.
    slots: Mutex<HashMap<String, Arc<OnceCell<V>>>>,
}

impl<V: Clone> FillOnceCache<V> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Return the cached value for `key`, fetching it on first use.
    pub async fn get_or_try_fetch<F, Fut, E>(&self, key: &str, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = self.slot(key);
        cell.get_or_try_init(fetch).await.cloned()
    }

    /// The cached value for `key`, if filled.
    pub fn get(&self, key: &str) -> Option<V> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).and_then(|cell| cell.get().cloned())
    }

    /// Whether `key` holds a value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of filled keys.
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|cell| cell.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, key: &str) -> Arc<OnceCell<V>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.to_string()).or_default().clone()
    }
}

impl<V: Clone> Default for FillOnceCache<V> {
    fn default() -> Self {
        Self::new()
    }
}
