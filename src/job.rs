//! Job handles: one in-flight playback attempt.
//!
//! A job owns a cancellation token and a sequence number. Whatever happens
//! to the collaborator (success, error, cancellation, even a panic) the
//! settle callback runs exactly once, after the collaborator's task ended.

use crate::error::Result;
use crate::types::{EpisodeRef, QualityConfig};
use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// The playback collaborator: pushes one episode into the output sink.
///
/// Implementations must return once `cancel` fires, releasing whatever
/// process or connection they hold.
#[async_trait]
pub trait PlaybackLauncher: Send + Sync {
    async fn play(
        &self,
        episode: &EpisodeRef,
        quality: &QualityConfig,
        cancel: CancellationToken,
    ) -> Result<()>;
}

/// How a job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// The episode played to the end.
    Finished,
    /// Cancellation was requested before the job settled.
    Cancelled,
    /// The collaborator failed to start or died mid-episode.
    Failed(String),
}

/// The single terminal notification of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub seq: u64,
    pub outcome: JobOutcome,
}

/// Handle to a running job.
#[derive(Debug)]
pub struct Job {
    seq: u64,
    title: String,
    cancel: CancellationToken,
}

impl Job {
    /// Launch `episode` on a background task and return immediately.
    ///
    /// `on_settle` is invoked once with the job's [`Settlement`].
    pub fn start<F>(
        seq: u64,
        episode: EpisodeRef,
        quality: QualityConfig,
        launcher: Arc<dyn PlaybackLauncher>,
        on_settle: F,
    ) -> Self
    where
        F: FnOnce(Settlement) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let title = episode.title.clone();

        let token = cancel.clone();
        tokio::spawn(async move {
            let play_token = token.clone();
            let run = tokio::spawn(async move {
                launcher.play(&episode, &quality, play_token).await
            });

            let outcome = match run.await {
                Ok(_) if token.is_cancelled() => JobOutcome::Cancelled,
                Ok(Ok(())) => JobOutcome::Finished,
                Ok(Err(e)) => JobOutcome::Failed(e.to_string()),
                Err(e) => JobOutcome::Failed(format!("playback task aborted: {}", e)),
            };

            if let JobOutcome::Failed(ref reason) = outcome {
                warn!("Job {} failed: {}", seq, reason);
            }
            on_settle(Settlement { seq, outcome });
        });

        Self {
            seq,
            title,
            cancel,
        }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Ask the collaborator to stop.
    ///
    /// Only the first call has an effect; returns whether this call issued
    /// the request.
    pub fn cancel(&self) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        debug!("Cancelling job {} ({})", self.seq, self.title);
        self.cancel.cancel();
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
