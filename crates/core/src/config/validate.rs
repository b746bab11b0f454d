use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Cloud base URL is set and the request timeout is positive
/// - Resolver polls at least once, with a positive interval
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Cloud validation
    if config.cloud.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "cloud.base_url cannot be empty".to_string(),
        ));
    }
    if config.cloud.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "cloud.timeout_secs cannot be 0".to_string(),
        ));
    }

    // Resolver validation
    if config.resolver.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.max_attempts must be at least 1".to_string(),
        ));
    }
    if config.resolver.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "resolver.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    Ok(())
}
