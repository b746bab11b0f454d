//! Resolver configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for the resolution engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum polling iterations before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay between polling iterations (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Extra wait once a transfer reports 100%, before the file
    /// listing is trusted (milliseconds). The provider needs a moment to
    /// move a finished transfer into its folders.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    100 // 100 * 3s = 5 minutes
}

fn default_poll_interval() -> u64 {
    3000 // 3 seconds
}

fn default_settle_delay() -> u64 {
    2000 // 2 seconds
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            poll_interval_ms: default_poll_interval(),
            settle_delay_ms: default_settle_delay(),
        }
    }
}

impl ResolverConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    /// Upper bound on time spent sleeping between polls.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval() * self.max_attempts
    }
}
