//! The resolution state machine.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::cloud::{CloudFile, CloudStorage};
use crate::metrics;

use super::config::ResolverConfig;
use super::magnet::build_magnet;
use super::matcher::{FileMatcher, PrefixMatcher};
use super::sleeper::{Sleeper, TokioSleeper};
use super::types::{
    ResolutionAttempt, ResolutionState, ResolveError, StreamTarget, TorrentDescriptor,
};

/// Observer invoked on every state transition.
pub type StateCallback = Arc<dyn Fn(ResolutionState) + Send + Sync>;

/// Resolves torrent descriptors into playable URLs through a cloud provider.
///
/// Holds no per-resolution state, so one engine can serve any number of
/// concurrent resolutions. Concurrent requests for the same torrent are not
/// coalesced; each runs its own check/submit/poll sequence.
pub struct ResolutionEngine {
    config: ResolverConfig,
    cloud: Arc<dyn CloudStorage>,
    matcher: Arc<dyn FileMatcher>,
    sleeper: Arc<dyn Sleeper>,
    on_state: Option<StateCallback>,
}

impl ResolutionEngine {
    /// Create an engine using the prefix matcher and real timers.
    pub fn new(config: ResolverConfig, cloud: Arc<dyn CloudStorage>) -> Self {
        Self {
            config,
            cloud,
            matcher: Arc::new(PrefixMatcher::new()),
            sleeper: Arc::new(TokioSleeper),
            on_state: None,
        }
    }

    /// Replace the name matcher.
    pub fn with_matcher(mut self, matcher: Arc<dyn FileMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replace the sleeper used for poll and settle delays.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Observe state transitions.
    pub fn with_state_callback(mut self, callback: StateCallback) -> Self {
        self.on_state = Some(callback);
        self
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a torrent to a playback URL.
    ///
    /// Dropping the returned future abandons the resolution. Whatever was
    /// already submitted keeps downloading on the provider side.
    pub async fn resolve(
        &self,
        token: &str,
        descriptor: &TorrentDescriptor,
    ) -> Result<StreamTarget, ResolveError> {
        let span = info_span!(
            "resolve",
            resolution_id = %uuid::Uuid::new_v4(),
            info_hash = %descriptor.info_hash,
        );

        async {
            self.transition(ResolutionState::Idle);
            let started = Instant::now();
            let mut attempt = ResolutionAttempt::new(&self.config);

            let result = self.run(token, descriptor, &mut attempt).await;

            let state = ResolutionState::from_result(&result);
            self.transition(state);
            metrics::RESOLUTIONS_TOTAL
                .with_label_values(&[state.as_str()])
                .inc();
            metrics::RESOLUTION_DURATION
                .with_label_values(&[state.as_str()])
                .observe(started.elapsed().as_secs_f64());
            metrics::RESOLUTION_POLL_ATTEMPTS.observe(attempt.attempts_made as f64);

            match &result {
                Ok(target) => info!("Resolved to {}", target.display_name),
                Err(ResolveError::Timeout { attempts }) => {
                    warn!("Gave up after {} polling attempts", attempts)
                }
                Err(e) => warn!("Resolution failed: {}", e),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        token: &str,
        descriptor: &TorrentDescriptor,
        attempt: &mut ResolutionAttempt,
    ) -> Result<StreamTarget, ResolveError> {
        let target = descriptor.display_name.as_str();

        self.transition(ResolutionState::CheckingExisting);
        let transfers = self.cloud.list_transfers(token).await?;
        let in_flight = transfers
            .iter()
            .find(|t| self.matcher.matches(&t.name, target));

        match in_flight {
            Some(transfer) => {
                info!(
                    "Already transferring: {} ({:.1}%)",
                    transfer.name, transfer.progress_percent
                );
            }
            None => {
                let files = self.cloud.list_files(token).await?;
                if let Some(file) = self.find_file(&files, target) {
                    info!("Already in cloud storage: {}", file.name);
                    if let Some(stream) = self.stream_for(token, file).await? {
                        return Ok(stream);
                    }
                    debug!("No playback URL for {}, submitting anyway", file.name);
                }

                self.transition(ResolutionState::Submitting);
                let magnet = build_magnet(descriptor);
                debug!("Submitting magnet: {}", magnet);
                self.cloud.add_transfer(token, &magnet).await?;
                info!("Submitted to {}", self.cloud.name());

                if !self.matcher.can_match(target) {
                    warn!("No name to match against, not polling");
                    return Err(ResolveError::Timeout { attempts: 0 });
                }
            }
        }

        self.transition(ResolutionState::Polling);
        self.poll(token, target, attempt).await
    }

    async fn poll(
        &self,
        token: &str,
        target: &str,
        attempt: &mut ResolutionAttempt,
    ) -> Result<StreamTarget, ResolveError> {
        loop {
            attempt.record();

            match self.cloud.list_transfers(token).await {
                Ok(transfers) => {
                    if let Some(transfer) = transfers
                        .iter()
                        .find(|t| self.matcher.matches(&t.name, target))
                    {
                        debug!(
                            "Progress: {:.1}% (attempt {}/{})",
                            transfer.progress_percent, attempt.attempts_made, attempt.max_attempts
                        );
                        if transfer.is_complete() {
                            self.sleeper.sleep(self.config.settle_delay()).await;
                        }
                    }
                }
                Err(e) => warn!("Failed to list transfers, will retry: {}", e),
            }

            match self.cloud.list_files(token).await {
                Ok(files) => {
                    if let Some(file) = self.find_file(&files, target) {
                        if let Some(stream) = self.stream_for(token, file).await? {
                            return Ok(stream);
                        }
                        debug!("{} has no playback URL yet", file.name);
                    }
                }
                Err(e) => warn!("Failed to list files, will retry: {}", e),
            }

            if !attempt.can_retry() {
                return Err(ResolveError::Timeout {
                    attempts: attempt.attempts_made,
                });
            }
            self.sleeper.sleep(attempt.poll_interval).await;
        }
    }

    fn find_file<'a>(&self, files: &'a [CloudFile], target: &str) -> Option<&'a CloudFile> {
        files.iter().find(|f| self.matcher.matches(&f.name, target))
    }

    async fn stream_for(
        &self,
        token: &str,
        file: &CloudFile,
    ) -> Result<Option<StreamTarget>, ResolveError> {
        let link = self.cloud.playback_link(token, &file.id).await?;
        Ok(link.map(|link| StreamTarget {
            playback_url: link.url,
            display_name: link.name.unwrap_or_else(|| file.name.clone()),
        }))
    }

    fn transition(&self, state: ResolutionState) {
        debug!("State: {}", state.as_str());
        if let Some(callback) = &self.on_state {
            callback(state);
        }
    }
}
