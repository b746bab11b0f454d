pub mod catalog;
pub mod cloud;
pub mod config;
pub mod metrics;
pub mod resolver;
pub mod testing;

pub use catalog::{CatalogService, Manifest, VideoCache};
pub use cloud::{CloudError, CloudFile, CloudStorage, PlaybackLink, SeedrClient, Transfer};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use resolver::{
    build_magnet, ResolutionEngine, ResolutionState, ResolveError, ResolverConfig, StreamTarget,
    TorrentDescriptor,
};
