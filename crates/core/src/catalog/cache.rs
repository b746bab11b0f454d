//! Per-token cache of video listings.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

use crate::cloud::CloudFile;
use crate::metrics;

#[derive(Debug, Clone)]
struct CachedListing {
    fetched_at: Instant,
    files: Vec<CloudFile>,
}

/// Video listings keyed by access token. Expired on read, pruned on write.
#[derive(Debug)]
pub struct VideoCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedListing>>,
}

impl VideoCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached listing for a token, if younger than the TTL.
    pub async fn get(&self, token: &str) -> Option<Vec<CloudFile>> {
        self.lookup_at(token, Instant::now()).await
    }

    /// Store a fresh listing for a token, dropping every expired one.
    pub async fn insert(&self, token: &str, files: Vec<CloudFile>) {
        self.insert_at(token, files, Instant::now()).await
    }

    /// Drop a token's listing.
    pub async fn invalidate(&self, token: &str) {
        self.entries.write().await.remove(token);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    async fn insert_at(&self, token: &str, files: Vec<CloudFile>, now: Instant) {
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| now.saturating_duration_since(entry.fetched_at) < self.ttl);
        entries.insert(
            token.to_string(),
            CachedListing {
                fetched_at: now,
                files,
            },
        );
    }

    async fn lookup_at(&self, token: &str, now: Instant) -> Option<Vec<CloudFile>> {
        let hit = self
            .entries
            .read()
            .await
            .get(token)
            .filter(|entry| now.saturating_duration_since(entry.fetched_at) < self.ttl)
            .map(|entry| entry.files.clone());

        metrics::CATALOG_CACHE_LOOKUPS
            .with_label_values(&[if hit.is_some() { "hit" } else { "miss" }])
            .inc();
        hit
    }
}
