//! Testing utilities and mock implementations.
//!
//! Lets the resolver, catalog and HTTP layers be exercised without a real
//! cloud storage account or real timers.
//!
//! # Example
//!
//! ```rust,ignore
//! use cloudplay_core::testing::{fixtures, MockCloudStorage, RecordingSleeper};
//!
//! let cloud = Arc::new(MockCloudStorage::new());
//! cloud.push_files(vec![fixtures::cloud_file("f1", "Movie.2020.mkv")]).await;
//!
//! let engine = ResolutionEngine::new(ResolverConfig::default(), cloud)
//!     .with_sleeper(Arc::new(RecordingSleeper::new()));
//! ```

mod mock_cloud_storage;
mod recording_sleeper;

pub use mock_cloud_storage::{MockCloudStorage, RecordedTransfer};
pub use recording_sleeper::RecordingSleeper;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::cloud::{CloudFile, PlaybackLink, Transfer};
    use crate::resolver::TorrentDescriptor;

    /// Info hash used by fixture descriptors.
    pub const INFO_HASH: &str = "0123456789abcdef0123456789abcdef01234567";

    /// A descriptor with a display name and no trackers.
    pub fn descriptor(display_name: &str) -> TorrentDescriptor {
        TorrentDescriptor::new(INFO_HASH).with_display_name(display_name)
    }

    /// A 1 GiB video file in the account root.
    pub fn cloud_file(id: &str, name: &str) -> CloudFile {
        CloudFile {
            id: id.to_string(),
            name: name.to_string(),
            path: "/".to_string(),
            size_bytes: 1024 * 1024 * 1024,
        }
    }

    /// A file inside a folder, with an explicit size.
    pub fn cloud_file_in(id: &str, name: &str, path: &str, size_bytes: u64) -> CloudFile {
        CloudFile {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            size_bytes,
        }
    }

    /// A transfer at the given progress (0-100).
    pub fn transfer(name: &str, progress_percent: f64) -> Transfer {
        Transfer {
            name: name.to_string(),
            progress_percent,
        }
    }

    /// A named playback link.
    pub fn playback_link(url: &str) -> PlaybackLink {
        PlaybackLink {
            url: url.to_string(),
            name: Some("Stream".to_string()),
        }
    }
}
