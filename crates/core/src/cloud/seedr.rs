//! Seedr cloud storage implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::{try_join_all, BoxFuture, FutureExt};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::CloudConfig;
use crate::metrics::record_external_call;

use super::{CloudError, CloudFile, CloudStorage, PlaybackLink, Transfer};

/// File extensions treated as playable video.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts",
];

/// Seedr client implementation.
pub struct SeedrClient {
    client: Client,
    config: CloudConfig,
}

impl SeedrClient {
    /// Create a new Seedr client.
    pub fn new(config: CloudConfig) -> Result<Self, CloudError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| CloudError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Fetch one folder listing. `None` is the account root.
    async fn fetch_folder(
        &self,
        token: &str,
        folder_id: Option<&str>,
    ) -> Result<FolderListing, CloudError> {
        let url = match folder_id {
            Some(id) => format!("{}/api/folder/{}", self.base_url(), urlencoding::encode(id)),
            None => format!("{}/api/folder", self.base_url()),
        };

        let response = self
            .client
            .get(&url)
            .query(&[("access_token", token)])
            .send()
            .await
            .map_err(map_request_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| CloudError::InvalidResponse(format!("Failed to parse folder: {}", e)))
    }

    /// Call the resource endpoint with a `func` and its form parameters.
    async fn call_resource(
        &self,
        token: &str,
        params: &[(&str, &str)],
    ) -> Result<ResourceResponse, CloudError> {
        let url = format!("{}/oauth_test/resource.php", self.base_url());

        let response = self
            .client
            .post(&url)
            .query(&[("access_token", token)])
            .form(params)
            .send()
            .await
            .map_err(map_request_error)?;

        let body = read_success_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| CloudError::InvalidResponse(format!("Failed to parse response: {}", e)))
    }

    /// Depth-first walk collecting video files below `folder_id`.
    fn collect_videos<'a>(
        &'a self,
        token: &'a str,
        folder_id: Option<String>,
        path: String,
    ) -> BoxFuture<'a, Result<Vec<CloudFile>, CloudError>> {
        async move {
            let listing = self.fetch_folder(token, folder_id.as_deref()).await?;

            let mut videos: Vec<CloudFile> = listing
                .files
                .into_iter()
                .filter(SeedrFile::is_video)
                .map(|f| f.into_cloud_file(&path))
                .collect();

            let nested = listing.folders.into_iter().map(|folder| {
                let child_path = join_path(&path, &folder.name);
                self.collect_videos(token, Some(folder.id.into_string()), child_path)
            });

            for files in try_join_all(nested).await? {
                videos.extend(files);
            }

            Ok(videos)
        }
        .boxed()
    }
}

/// Map a reqwest transport error onto a CloudError.
///
/// The URL is stripped because its query carries the access token.
fn map_request_error(e: reqwest::Error) -> CloudError {
    let e = e.without_url();
    if e.is_timeout() {
        CloudError::Timeout
    } else if e.is_connect() {
        CloudError::ConnectionFailed(e.to_string())
    } else {
        CloudError::ApiError(e.to_string())
    }
}

/// Read the body of a successful response, or turn the status into an error.
async fn read_success_body(response: Response) -> Result<String, CloudError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| CloudError::ApiError(e.without_url().to_string()))?;

    if status.is_success() {
        return Ok(body);
    }

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.error);
    match detail {
        Some(detail) => Err(CloudError::ApiError(format!("HTTP {}: {}", status, detail))),
        None => Err(CloudError::ApiError(format!("HTTP {}", status))),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.ends_with('/') {
        format!("{}{}", parent, name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Seedr sometimes sends ids and numbers as strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Loose {
    Number(serde_json::Number),
    Text(String),
}

impl Loose {
    fn into_string(self) -> String {
        match self {
            Loose::Number(n) => n.to_string(),
            Loose::Text(s) => s,
        }
    }

    fn as_f64(&self) -> f64 {
        match self {
            Loose::Number(n) => n.as_f64().unwrap_or(0.0),
            Loose::Text(s) => s.trim().parse().unwrap_or(0.0),
        }
    }
}

/// Seedr folder listing response.
#[derive(Debug, Deserialize)]
struct FolderListing {
    #[serde(default)]
    folders: Vec<SeedrFolder>,
    #[serde(default)]
    files: Vec<SeedrFile>,
    #[serde(default)]
    torrents: Vec<SeedrTorrent>,
}

#[derive(Debug, Deserialize)]
struct SeedrFolder {
    id: Loose,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SeedrFile {
    folder_file_id: Loose,
    name: String,
    #[serde(default)]
    size: Option<Loose>,
    #[serde(default)]
    play_video: Option<bool>,
}

impl SeedrFile {
    fn is_video(&self) -> bool {
        if self.play_video == Some(true) {
            return true;
        }
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_lowercase();
                VIDEO_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }

    fn into_cloud_file(self, path: &str) -> CloudFile {
        CloudFile {
            id: self.folder_file_id.into_string(),
            name: self.name,
            path: path.to_string(),
            size_bytes: self.size.map(|s| s.as_f64().max(0.0) as u64).unwrap_or(0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SeedrTorrent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    progress: Option<Loose>,
}

impl SeedrTorrent {
    fn into_transfer(self) -> Option<Transfer> {
        let name = self.name.filter(|n| !n.is_empty())?;
        Some(Transfer {
            name,
            progress_percent: self.progress.map(|p| p.as_f64()).unwrap_or(0.0),
        })
    }
}

/// Response from the resource endpoint (`add_torrent`, `fetch_file`).
#[derive(Debug, Deserialize)]
struct ResourceResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

impl ResourceResponse {
    /// Interpret an `add_torrent` answer.
    fn into_add_outcome(self) -> Result<(), CloudError> {
        if let Some(error) = self.error.filter(|e| !e.is_empty()) {
            return Err(CloudError::Rejected(error));
        }
        match self.result {
            Some(serde_json::Value::Bool(true)) => Ok(()),
            Some(serde_json::Value::String(reason)) => Err(CloudError::Rejected(reason)),
            other => Err(CloudError::Rejected(format!(
                "Unexpected add_torrent result: {}",
                other.unwrap_or(serde_json::Value::Null)
            ))),
        }
    }

    fn into_playback_link(self) -> Option<PlaybackLink> {
        let url = self.url.filter(|u| !u.is_empty())?;
        Some(PlaybackLink {
            url,
            name: self.name,
        })
    }
}

#[async_trait]
impl CloudStorage for SeedrClient {
    fn name(&self) -> &str {
        "seedr"
    }

    async fn list_transfers(&self, token: &str) -> Result<Vec<Transfer>, CloudError> {
        let started = Instant::now();
        let result = self.fetch_folder(token, None).await.map(|root| {
            root.torrents
                .into_iter()
                .filter_map(SeedrTorrent::into_transfer)
                .collect::<Vec<_>>()
        });
        record_external_call(self.name(), "list_transfers", started, result.is_ok());

        if let Ok(transfers) = &result {
            debug!(count = transfers.len(), "Listed Seedr transfers");
        }
        result
    }

    async fn list_files(&self, token: &str) -> Result<Vec<CloudFile>, CloudError> {
        let started = Instant::now();
        let result = self.collect_videos(token, None, "/".to_string()).await;
        record_external_call(self.name(), "list_files", started, result.is_ok());

        if let Ok(files) = &result {
            debug!(count = files.len(), "Listed Seedr video files");
        }
        result
    }

    async fn add_transfer(&self, token: &str, magnet_uri: &str) -> Result<(), CloudError> {
        let started = Instant::now();
        let result = self
            .call_resource(
                token,
                &[("func", "add_torrent"), ("torrent_magnet", magnet_uri)],
            )
            .await
            .and_then(ResourceResponse::into_add_outcome);
        record_external_call(self.name(), "add_transfer", started, result.is_ok());

        if let Err(e) = &result {
            warn!(error = %e, "Seedr refused magnet");
        }
        result
    }

    async fn playback_link(
        &self,
        token: &str,
        file_id: &str,
    ) -> Result<Option<PlaybackLink>, CloudError> {
        let started = Instant::now();
        let result = self
            .call_resource(token, &[("func", "fetch_file"), ("folder_file_id", file_id)])
            .await
            .map(ResourceResponse::into_playback_link);
        record_external_call(self.name(), "playback_link", started, result.is_ok());
        result
    }
}
