//! Namespace-prefixed offline-asset cache.
//!
//! Cached assets are keyed with a namespace prefix so forced logout can
//! purge everything the app wrote without touching unrelated entries.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Key prefix under which the app stores its offline assets
pub const OFFLINE_CACHE_PREFIX: &str = "rihla-offline-";

/// In-memory string-keyed cache purgeable by key prefix
#[derive(Debug, Clone, Default)]
pub struct NamespaceCache {
    entries: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl NamespaceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value under a key
    pub async fn insert(&self, key: impl Into<String>, value: serde_json::Value) {
        let mut entries = self.entries.write().await;
        entries.insert(key.into(), value);
    }

    /// Fetch a value by key
    pub async fn get(&self, key: &str) -> Option<serde_json::Value> {
        let entries = self.entries.read().await;
        entries.get(key).cloned()
    }

    /// Remove every entry whose key starts with the prefix.
    ///
    /// Returns the number of entries removed. Never fails; callers treat
    /// this as best-effort cleanup.
    pub async fn purge_prefix(&self, prefix: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(prefix));
        let purged = before - entries.len();
        if purged > 0 {
            debug!(prefix = %prefix, purged, "Purged cache entries");
        }
        purged
    }

    /// Number of stored entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the cache holds no entries
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
