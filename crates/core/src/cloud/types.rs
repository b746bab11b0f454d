//! Types for cloud storage operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during cloud storage operations.
#[derive(Debug, Clone, Error)]
pub enum CloudError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error: {0}")]
    ApiError(String),

    /// The provider answered with an explicit error payload.
    /// Displayed verbatim so callers can surface the provider's own wording.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// A download the provider is still working on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    /// Transfer name as reported by the provider.
    pub name: String,
    /// Download progress (0.0 - 100.0).
    pub progress_percent: f64,
}

impl Transfer {
    /// Whether the provider reports the download as finished.
    pub fn is_complete(&self) -> bool {
        self.progress_percent >= 100.0
    }
}

/// A completed file in the account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudFile {
    /// Provider file identifier.
    pub id: String,
    /// File name, including extension.
    pub name: String,
    /// Folder path the file lives in.
    pub path: String,
    /// File size in bytes.
    pub size_bytes: u64,
}

/// A time-limited URL for playing a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackLink {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Trait for cloud storage backends.
///
/// Every method takes the account's access token; implementations hold no
/// per-account state and always return fresh snapshots.
#[async_trait]
pub trait CloudStorage: Send + Sync {
    /// Backend name for logging/metrics.
    fn name(&self) -> &str;

    /// List transfers that have not yet become files.
    async fn list_transfers(&self, token: &str) -> Result<Vec<Transfer>, CloudError>;

    /// List every video file in the account.
    async fn list_files(&self, token: &str) -> Result<Vec<CloudFile>, CloudError>;

    /// Ask the provider to start downloading a magnet URI.
    async fn add_transfer(&self, token: &str, magnet_uri: &str) -> Result<(), CloudError>;

    /// Get a playback URL for a file. `None` when the provider has no URL for it.
    async fn playback_link(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Option<PlaybackLink>, CloudError>;
}
