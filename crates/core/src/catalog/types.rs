//! Addon protocol types served to the media player.

use serde::{Deserialize, Serialize};

/// Content type every entry is listed under.
pub const CONTENT_TYPE: &str = "other";

/// The single catalog this addon exposes.
pub const CATALOG_ID: &str = "seedr-files";

/// Prefix for item ids owned by this addon.
pub const ID_PREFIX: &str = "seedr:";

/// Addon manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<String>,
    pub catalogs: Vec<CatalogDescriptor>,
    pub id_prefixes: Vec<String>,
    pub behavior_hints: BehaviorHints,
}

/// A catalog advertised in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogDescriptor {
    #[serde(rename = "type")]
    pub content_type: String,
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub configurable: bool,
    pub configuration_required: bool,
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaPreview {
    pub id: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub name: String,
    pub poster: String,
    pub description: String,
    pub release_info: String,
}

/// A playable stream for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub url: String,
    pub title: String,
    pub name: String,
}

/// Body of a catalog response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogResponse {
    pub metas: Vec<MetaPreview>,
}

/// Body of a stream response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StreamResponse {
    pub streams: Vec<StreamEntry>,
}
