use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::resolver::ResolverConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cloud: CloudConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(std::net::Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    7000
}

/// Seedr API configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CloudConfig {
    /// Seedr base URL (e.g., "https://www.seedr.cc")
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
}

impl Default for CloudConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.seedr.cc".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Catalog listing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// How long a token's video listing stays cached (seconds).
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Poster shown for every catalog entry.
    #[serde(default = "default_poster_url")]
    pub poster_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: default_cache_ttl(),
            poster_url: default_poster_url(),
        }
    }
}

fn default_cache_ttl() -> u64 {
    300 // 5 minutes
}

fn default_poster_url() -> String {
    "https://www.seedr.cc/favicon.ico".to_string()
}

/// Sanitized config for logging and the config endpoint
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub cloud: CloudConfig,
    pub resolver: ResolverConfig,
    pub catalog: SanitizedCatalogConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub cache_ttl_secs: u64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            cloud: config.cloud.clone(),
            resolver: config.resolver.clone(),
            catalog: SanitizedCatalogConfig {
                cache_ttl_secs: config.catalog.cache_ttl_secs,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[cloud]
base_url = "http://localhost:8081"
timeout_secs = 5

[resolver]
max_attempts = 20
poll_interval_ms = 1000
settle_delay_ms = 500

[catalog]
cache_ttl_secs = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.cloud.base_url, "http://localhost:8081");
        assert_eq!(config.cloud.timeout_secs, 5);
        assert_eq!(config.resolver.max_attempts, 20);
        assert_eq!(config.resolver.poll_interval_ms, 1000);
        assert_eq!(config.resolver.settle_delay_ms, 500);
        assert_eq!(config.catalog.cache_ttl_secs, 30);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.cloud.timeout_secs, 30);
        assert_eq!(config.resolver.max_attempts, 100);
        assert_eq!(config.resolver.poll_interval_ms, 3000);
        assert_eq!(config.resolver.settle_delay_ms, 2000);
        assert_eq!(config.catalog.cache_ttl_secs, 300);
        assert_eq!(config.catalog.poster_url, "https://www.seedr.cc/favicon.ico");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let toml = r#"
[cloud]
timeout_secs = 10
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cloud.timeout_secs, 10);
        assert_eq!(config.cloud.base_url, "https://www.seedr.cc");
    }

    #[test]
    fn test_sanitized_config() {
        let config = Config::default();
        let sanitized = SanitizedConfig::from(&config);
        assert_eq!(sanitized.server.port, 7000);
        assert_eq!(sanitized.resolver.max_attempts, 100);
        assert_eq!(sanitized.catalog.cache_ttl_secs, 300);

        let json = serde_json::to_value(&sanitized).unwrap();
        assert!(json["catalog"].get("poster_url").is_none());
    }
}
