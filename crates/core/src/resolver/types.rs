//! Resolution types.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cloud::CloudError;

use super::ResolverConfig;

/// Guidance returned alongside a timeout.
pub const TIMEOUT_GUIDANCE: &str = "The download is taking longer than expected. \
Please check your Seedr downloads and try again.";

/// Errors that end a resolution without a stream.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Polling ran out of attempts. The download may still finish.
    #[error("Download timeout after {attempts} polling attempts")]
    Timeout { attempts: u32 },

    /// The provider failed or refused a request.
    #[error(transparent)]
    Provider(#[from] CloudError),
}

/// The torrent to resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentDescriptor {
    /// BitTorrent info hash (40 hex chars, not validated).
    pub info_hash: String,
    /// Human-readable name; also what cloud files are matched against.
    pub display_name: String,
    /// Tracker announce URLs, in order.
    pub tracker_urls: Vec<String>,
    /// File index within a multi-file torrent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_index: Option<u32>,
}

impl TorrentDescriptor {
    /// Create a descriptor with only an info hash.
    pub fn new(info_hash: impl Into<String>) -> Self {
        Self {
            info_hash: info_hash.into(),
            display_name: String::new(),
            tracker_urls: Vec::new(),
            file_index: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Set the tracker list.
    pub fn with_trackers<I, S>(mut self, trackers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracker_urls = trackers.into_iter().map(Into::into).collect();
        self
    }

    /// Set the file index.
    pub fn with_file_index(mut self, index: u32) -> Self {
        self.file_index = Some(index);
        self
    }
}

/// A playable result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTarget {
    pub playback_url: String,
    pub display_name: String,
}

/// States a resolution moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionState {
    Idle,
    CheckingExisting,
    Submitting,
    Polling,
    Succeeded,
    TimedOut,
    Failed,
}

impl ResolutionState {
    /// Returns the string representation for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionState::Idle => "idle",
            ResolutionState::CheckingExisting => "checking_existing",
            ResolutionState::Submitting => "submitting",
            ResolutionState::Polling => "polling",
            ResolutionState::Succeeded => "succeeded",
            ResolutionState::TimedOut => "timed_out",
            ResolutionState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ResolutionState::Succeeded | ResolutionState::TimedOut | ResolutionState::Failed
        )
    }

    /// Terminal state for a finished resolution.
    pub fn from_result<T>(result: &Result<T, ResolveError>) -> Self {
        match result {
            Ok(_) => ResolutionState::Succeeded,
            Err(ResolveError::Timeout { .. }) => ResolutionState::TimedOut,
            Err(ResolveError::Provider(_)) => ResolutionState::Failed,
        }
    }
}

/// Polling budget for one resolution.
#[derive(Debug, Clone)]
pub struct ResolutionAttempt {
    pub attempts_made: u32,
    pub max_attempts: u32,
    pub poll_interval: Duration,
}

impl ResolutionAttempt {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            attempts_made: 0,
            max_attempts: config.max_attempts,
            poll_interval: config.poll_interval(),
        }
    }

    /// Count one polling iteration.
    pub fn record(&mut self) {
        self.attempts_made += 1;
    }

    /// Whether another iteration is allowed.
    pub fn can_retry(&self) -> bool {
        self.attempts_made < self.max_attempts
    }
}
