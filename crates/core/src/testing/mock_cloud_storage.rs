//! Mock cloud storage for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::cloud::{CloudError, CloudFile, CloudStorage, PlaybackLink, Transfer};

/// A recorded add_transfer call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedTransfer {
    /// Access token the call was made with.
    pub token: String,
    /// The submitted magnet URI.
    pub magnet_uri: String,
    /// When the call was made.
    pub timestamp: chrono::DateTime<Utc>,
}

/// A queue of snapshots where the last one keeps being served.
#[derive(Debug)]
struct Snapshots<T: Clone> {
    queue: VecDeque<Vec<T>>,
    last: Vec<T>,
}

impl<T: Clone> Snapshots<T> {
    fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            last: Vec::new(),
        }
    }

    fn next(&mut self) -> Vec<T> {
        if let Some(snapshot) = self.queue.pop_front() {
            self.last = snapshot;
        }
        self.last.clone()
    }
}

/// Mock implementation of the CloudStorage trait.
///
/// Listings are scripted as a sequence of snapshots: each call consumes
/// the next one, and once the queue runs dry the last snapshot repeats.
///
/// # Example
///
/// ```rust,ignore
/// let cloud = MockCloudStorage::new();
///
/// // Nothing yet, then the finished file.
/// cloud.push_files(vec![]).await;
/// cloud.push_files(vec![fixtures::cloud_file("f1", "Movie.mkv")]).await;
/// cloud.set_playback_link("f1", fixtures::playback_link("https://cdn/f1")).await;
///
/// // Check what was submitted
/// let added = cloud.added_magnets().await;
/// ```
#[derive(Debug)]
pub struct MockCloudStorage {
    transfers: Arc<RwLock<Snapshots<Transfer>>>,
    files: Arc<RwLock<Snapshots<CloudFile>>>,
    links: Arc<RwLock<HashMap<String, PlaybackLink>>>,
    added: Arc<RwLock<Vec<RecordedTransfer>>>,
    /// If set, every add_transfer call fails with this error.
    add_error: Arc<RwLock<Option<CloudError>>>,
    /// If set, every playback_link call fails with this error.
    playback_error: Arc<RwLock<Option<CloudError>>>,
    /// Failures for specific list_transfers calls, by 0-based call index.
    transfer_failures: Arc<RwLock<HashMap<usize, CloudError>>>,
    /// Failures for specific list_files calls, by 0-based call index.
    file_failures: Arc<RwLock<HashMap<usize, CloudError>>>,
    list_transfers_calls: AtomicUsize,
    list_files_calls: AtomicUsize,
    playback_calls: AtomicUsize,
}

impl Default for MockCloudStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCloudStorage {
    /// Create an empty mock account.
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(RwLock::new(Snapshots::new())),
            files: Arc::new(RwLock::new(Snapshots::new())),
            links: Arc::new(RwLock::new(HashMap::new())),
            added: Arc::new(RwLock::new(Vec::new())),
            add_error: Arc::new(RwLock::new(None)),
            playback_error: Arc::new(RwLock::new(None)),
            transfer_failures: Arc::new(RwLock::new(HashMap::new())),
            file_failures: Arc::new(RwLock::new(HashMap::new())),
            list_transfers_calls: AtomicUsize::new(0),
            list_files_calls: AtomicUsize::new(0),
            playback_calls: AtomicUsize::new(0),
        }
    }

    /// Queue the next transfer listing.
    pub async fn push_transfers(&self, transfers: Vec<Transfer>) {
        self.transfers.write().await.queue.push_back(transfers);
    }

    /// Queue the next file listing.
    pub async fn push_files(&self, files: Vec<CloudFile>) {
        self.files.write().await.queue.push_back(files);
    }

    /// Set the playback link returned for a file.
    pub async fn set_playback_link(&self, file_id: &str, link: PlaybackLink) {
        self.links.write().await.insert(file_id.to_string(), link);
    }

    /// Make every add_transfer call fail.
    pub async fn fail_add_transfer(&self, error: CloudError) {
        *self.add_error.write().await = Some(error);
    }

    /// Make every playback_link call fail.
    pub async fn fail_playback_link(&self, error: CloudError) {
        *self.playback_error.write().await = Some(error);
    }

    /// Make the list_transfers call with this 0-based index fail.
    pub async fn fail_list_transfers_at(&self, call: usize, error: CloudError) {
        self.transfer_failures.write().await.insert(call, error);
    }

    /// Make the list_files call with this 0-based index fail.
    pub async fn fail_list_files_at(&self, call: usize, error: CloudError) {
        self.file_failures.write().await.insert(call, error);
    }

    /// Get all recorded add_transfer calls.
    pub async fn added_transfers(&self) -> Vec<RecordedTransfer> {
        self.added.read().await.clone()
    }

    /// Get the submitted magnet URIs, in order.
    pub async fn added_magnets(&self) -> Vec<String> {
        self.added
            .read()
            .await
            .iter()
            .map(|r| r.magnet_uri.clone())
            .collect()
    }

    pub fn list_transfers_calls(&self) -> usize {
        self.list_transfers_calls.load(Ordering::SeqCst)
    }

    pub fn list_files_calls(&self) -> usize {
        self.list_files_calls.load(Ordering::SeqCst)
    }

    pub fn playback_link_calls(&self) -> usize {
        self.playback_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudStorage for MockCloudStorage {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_transfers(&self, _token: &str) -> Result<Vec<Transfer>, CloudError> {
        let call = self.list_transfers_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.transfer_failures.write().await.remove(&call) {
            return Err(e);
        }
        Ok(self.transfers.write().await.next())
    }

    async fn list_files(&self, _token: &str) -> Result<Vec<CloudFile>, CloudError> {
        let call = self.list_files_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.file_failures.write().await.remove(&call) {
            return Err(e);
        }
        Ok(self.files.write().await.next())
    }

    async fn add_transfer(&self, token: &str, magnet_uri: &str) -> Result<(), CloudError> {
        if let Some(e) = self.add_error.read().await.clone() {
            return Err(e);
        }
        self.added.write().await.push(RecordedTransfer {
            token: token.to_string(),
            magnet_uri: magnet_uri.to_string(),
            timestamp: Utc::now(),
        });
        Ok(())
    }

    async fn playback_link(
        &self,
        _token: &str,
        file_id: &str,
    ) -> Result<Option<PlaybackLink>, CloudError> {
        self.playback_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.playback_error.read().await.clone() {
            return Err(e);
        }
        Ok(self.links.read().await.get(file_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_last_snapshot_repeats() {
        let cloud = MockCloudStorage::new();
        cloud.push_files(vec![]).await;
        cloud
            .push_files(vec![fixtures::cloud_file("f1", "Movie.mkv")])
            .await;

        assert!(cloud.list_files("t").await.unwrap().is_empty());
        assert_eq!(cloud.list_files("t").await.unwrap().len(), 1);
        assert_eq!(cloud.list_files("t").await.unwrap().len(), 1);
        assert_eq!(cloud.list_files_calls(), 3);
    }

    #[tokio::test]
    async fn test_scripted_failure_hits_one_call() {
        let cloud = MockCloudStorage::new();
        cloud.fail_list_transfers_at(1, CloudError::Timeout).await;

        assert!(cloud.list_transfers("t").await.is_ok());
        assert!(cloud.list_transfers("t").await.is_err());
        assert!(cloud.list_transfers("t").await.is_ok());
    }

    #[tokio::test]
    async fn test_add_transfer_records_calls() {
        let cloud = MockCloudStorage::new();
        cloud.add_transfer("t", "magnet:?xt=urn:btih:abc").await.unwrap();

        let added = cloud.added_transfers().await;
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].token, "t");
        assert_eq!(cloud.added_magnets().await, vec!["magnet:?xt=urn:btih:abc"]);
    }

    #[tokio::test]
    async fn test_missing_playback_link_is_none() {
        let cloud = MockCloudStorage::new();
        assert!(cloud.playback_link("t", "nope").await.unwrap().is_none());
        assert_eq!(cloud.playback_link_calls(), 1);
    }
}
