//! Torrent-to-stream resolution.
//!
//! Turns a torrent descriptor into a playable URL by letting the cloud
//! storage provider download it:
//! - check whether the title is already transferring or already a file
//! - otherwise submit the magnet
//! - poll (bounded) until a matching video file appears

mod config;
mod engine;
mod magnet;
mod matcher;
mod sleeper;
mod types;

pub use config::ResolverConfig;
pub use engine::{ResolutionEngine, StateCallback};
pub use magnet::{build_magnet, DEFAULT_TRACKERS};
pub use matcher::{FileMatcher, PrefixMatcher, DEFAULT_PREFIX_LEN};
pub use sleeper::{Sleeper, TokioSleeper};
pub use types::{
    ResolutionAttempt, ResolutionState, ResolveError, StreamTarget, TorrentDescriptor,
    TIMEOUT_GUIDANCE,
};
