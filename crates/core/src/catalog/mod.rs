//! Video catalog and streams for the media player addon.
//!
//! Lists the account's video files as a single catalog and turns catalog
//! items back into playback URLs. Listings are cached per access token.

mod cache;
mod service;
mod types;

pub use cache::VideoCache;
pub use service::{format_file_size, manifest, CatalogService};
pub use types::*;
