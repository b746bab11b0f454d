//! Catalog and stream lookups over the cloud account.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::cloud::{CloudError, CloudFile, CloudStorage};
use crate::config::CatalogConfig;

use super::cache::VideoCache;
use super::types::{
    BehaviorHints, CatalogDescriptor, Manifest, MetaPreview, StreamEntry, CATALOG_ID,
    CONTENT_TYPE, ID_PREFIX,
};

/// Build the addon manifest.
pub fn manifest() -> Manifest {
    Manifest {
        id: "org.seedr.stremio".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: "Seedr Cloud Player".to_string(),
        description: "Stream videos from your Seedr cloud storage account".to_string(),
        resources: vec!["catalog".to_string(), "stream".to_string()],
        types: vec![CONTENT_TYPE.to_string()],
        catalogs: vec![CatalogDescriptor {
            content_type: CONTENT_TYPE.to_string(),
            id: CATALOG_ID.to_string(),
            name: "My Seedr Files".to_string(),
        }],
        id_prefixes: vec![ID_PREFIX.to_string()],
        behavior_hints: BehaviorHints {
            configurable: true,
            configuration_required: false,
        },
    }
}

/// Human-readable size using 1024-based units.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["Bytes", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let rounded = format!("{:.2}", value);
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// Strip a trailing `.ext` from a file name.
fn display_title(name: &str) -> &str {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos + 1 < name.len() => &name[..pos],
        _ => name,
    }
}

/// Serves the account's videos as a catalog and resolves catalog items to streams.
pub struct CatalogService {
    cloud: Arc<dyn CloudStorage>,
    cache: Arc<VideoCache>,
    poster_url: String,
}

impl CatalogService {
    /// Create a service with its own cache.
    pub fn new(cloud: Arc<dyn CloudStorage>, config: &CatalogConfig) -> Self {
        let cache = Arc::new(VideoCache::new(Duration::from_secs(config.cache_ttl_secs)));
        Self::with_cache(cloud, cache, config)
    }

    /// Create a service sharing an existing cache.
    pub fn with_cache(
        cloud: Arc<dyn CloudStorage>,
        cache: Arc<VideoCache>,
        config: &CatalogConfig,
    ) -> Self {
        Self {
            cloud,
            cache,
            poster_url: config.poster_url.clone(),
        }
    }

    pub fn cache(&self) -> &Arc<VideoCache> {
        &self.cache
    }

    /// Video files for a token, served from cache while fresh.
    pub async fn videos(&self, token: &str) -> Result<Vec<CloudFile>, CloudError> {
        if let Some(files) = self.cache.get(token).await {
            debug!("Serving {} cached videos", files.len());
            return Ok(files);
        }

        let files = self.cloud.list_files(token).await?;
        self.cache.insert(token, files.clone()).await;
        Ok(files)
    }

    /// Catalog entries. Anything but the addon's own catalog is empty.
    pub async fn catalog(&self, token: &str, content_type: &str, id: &str) -> Vec<MetaPreview> {
        if token.is_empty() || content_type != CONTENT_TYPE || id != CATALOG_ID {
            return Vec::new();
        }

        match self.videos(token).await {
            Ok(files) => {
                let metas: Vec<MetaPreview> = files.iter().map(|f| self.meta_for(f)).collect();
                info!("Returning {} videos from {}", metas.len(), self.cloud.name());
                metas
            }
            Err(e) => {
                warn!("Failed to fetch catalog: {}", e);
                Vec::new()
            }
        }
    }

    /// Streams for a catalog item.
    pub async fn streams(&self, token: &str, content_type: &str, id: &str) -> Vec<StreamEntry> {
        let file_id = match id.strip_prefix(ID_PREFIX) {
            Some(file_id) if !token.is_empty() && content_type == CONTENT_TYPE => file_id,
            _ => return Vec::new(),
        };

        match self.cloud.playback_link(token, file_id).await {
            Ok(Some(link)) => {
                debug!("Stream for file {}", file_id);
                vec![StreamEntry {
                    url: link.url,
                    title: format!("🎬 {}", link.name.as_deref().unwrap_or("Play Video")),
                    name: "Seedr".to_string(),
                }]
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Failed to get stream URL for {}: {}", file_id, e);
                Vec::new()
            }
        }
    }

    fn meta_for(&self, file: &CloudFile) -> MetaPreview {
        MetaPreview {
            id: format!("{}{}", ID_PREFIX, file.id),
            content_type: CONTENT_TYPE.to_string(),
            name: display_title(&file.name).to_string(),
            poster: self.poster_url.clone(),
            description: format!(
                "📁 {}\n📦 Size: {}",
                file.path,
                format_file_size(file.size_bytes)
            ),
            release_info: "Seedr Cloud".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{fixtures, MockCloudStorage};

    fn service(cloud: Arc<MockCloudStorage>) -> CatalogService {
        CatalogService::new(cloud, &CatalogConfig::default())
    }

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(500), "500 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1024 * 1024 * 1024), "1 GB");
        assert_eq!(format_file_size(1_500_000_000), "1.4 GB");
        assert_eq!(format_file_size(1024u64.pow(5) * 3), "3072 TB");
    }

    #[test]
    fn test_display_title() {
        assert_eq!(display_title("Movie.2020.mkv"), "Movie.2020");
        assert_eq!(display_title("Movie"), "Movie");
        assert_eq!(display_title(".hidden"), ".hidden");
    }

    #[test]
    fn test_manifest() {
        let m = manifest();
        assert_eq!(m.id, "org.seedr.stremio");
        assert_eq!(m.catalogs.len(), 1);
        assert_eq!(m.catalogs[0].id, "seedr-files");
        assert_eq!(m.id_prefixes, vec!["seedr:"]);
        assert!(m.behavior_hints.configurable);
    }

    #[tokio::test]
    async fn test_catalog_maps_files() {
        let cloud = Arc::new(MockCloudStorage::new());
        cloud
            .push_files(vec![fixtures::cloud_file_in(
                "42",
                "Movie.2020.mkv",
                "Movies/2020",
                1536,
            )])
            .await;

        let metas = service(cloud).catalog("tok", "other", "seedr-files").await;

        assert_eq!(metas.len(), 1);
        assert_eq!(metas[0].id, "seedr:42");
        assert_eq!(metas[0].name, "Movie.2020");
        assert_eq!(metas[0].description, "📁 Movies/2020\n📦 Size: 1.5 KB");
        assert_eq!(metas[0].release_info, "Seedr Cloud");
    }

    #[tokio::test]
    async fn test_catalog_uses_cache() {
        let cloud = Arc::new(MockCloudStorage::new());
        let service = service(cloud.clone());

        service.catalog("tok", "other", "seedr-files").await;
        service.catalog("tok", "other", "seedr-files").await;
        assert_eq!(cloud.list_files_calls(), 1);

        service.cache().invalidate("tok").await;
        service.catalog("tok", "other", "seedr-files").await;
        assert_eq!(cloud.list_files_calls(), 2);
    }

    #[tokio::test]
    async fn test_catalog_ignores_other_catalogs() {
        let cloud = Arc::new(MockCloudStorage::new());
        let service = service(cloud.clone());

        assert!(service.catalog("tok", "movie", "seedr-files").await.is_empty());
        assert!(service.catalog("tok", "other", "top").await.is_empty());
        assert_eq!(cloud.list_files_calls(), 0);
    }

    #[tokio::test]
    async fn test_catalog_failure_is_empty_and_not_cached() {
        let cloud = Arc::new(MockCloudStorage::new());
        cloud.fail_list_files_at(0, CloudError::Timeout).await;
        let service = service(cloud.clone());

        assert!(service.catalog("tok", "other", "seedr-files").await.is_empty());
        assert!(service.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_streams() {
        let cloud = Arc::new(MockCloudStorage::new());
        cloud
            .set_playback_link("42", fixtures::playback_link("https://cdn.example/42"))
            .await;
        let service = service(cloud);

        let streams = service.streams("tok", "other", "seedr:42").await;
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].url, "https://cdn.example/42");
        assert_eq!(streams[0].title, "🎬 Stream");
        assert_eq!(streams[0].name, "Seedr");

        assert!(service.streams("tok", "other", "seedr:missing").await.is_empty());
        assert!(service.streams("tok", "other", "tt0111161").await.is_empty());
        assert!(service.streams("tok", "movie", "seedr:42").await.is_empty());
    }
}
