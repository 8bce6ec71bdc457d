//! Graph caching
//!
//! Building a graph is pure but touches the filesystem through the
//! loader, so callers cache built graphs. Entries are keyed by the
//! root location plus a monotonically increasing invalidation token;
//! any document change bumps the token and every cached graph goes
//! stale at once. Include relationships make finer-grained
//! invalidation error-prone, so coarse is the contract.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::domain::{DocLocation, ResolvedTaskGraph};

/// Monotonically increasing change counter.
///
/// The host bumps it whenever any underlying document changes; readers
/// key cache lookups on the current value.
#[derive(Debug, Default)]
pub struct ModificationTracker(AtomicU64);

impl ModificationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a change and returns the new token.
    pub fn bump(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn current(&self) -> u64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Cache of built graphs keyed by `(root location, token)`.
///
/// At most one entry per root; an entry with a different token is
/// stale and gets replaced. Concurrent builds for the same key may
/// duplicate work; each build only writes to graph instances it owns,
/// so the last writer simply wins.
#[derive(Debug, Default)]
pub struct GraphCache {
    entries: Mutex<HashMap<DocLocation, (u64, Arc<ResolvedTaskGraph>)>>,
}

impl GraphCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached graph for `(root, token)`, building and
    /// storing it when absent or stale.
    pub fn get_or_build(
        &self,
        root: &DocLocation,
        token: u64,
        build: impl FnOnce() -> ResolvedTaskGraph,
    ) -> Arc<ResolvedTaskGraph> {
        if let Some(cached) = self.get(root, token) {
            return cached;
        }

        // Build outside the lock; a racing build for the same key is
        // redundant but harmless.
        let built = Arc::new(build());
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(root.clone(), (token, built.clone()));
        built
    }

    /// Returns the cached graph when present and not stale.
    pub fn get(&self, root: &DocLocation, token: u64) -> Option<Arc<ResolvedTaskGraph>> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries
            .get(root)
            .filter(|(cached_token, _)| *cached_token == token)
            .map(|(_, graph)| graph.clone())
    }

    /// Drops the entry for one root.
    pub fn invalidate(&self, root: &DocLocation) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.remove(root);
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.clear();
    }
}
