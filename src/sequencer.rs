//! The playback sequencer.
//!
//! A single task owns all playback state and consumes one [`Event`] at a
//! time: chat commands, job settlements and timer wake-ups. Nothing else
//! mutates the mode or the position, so a command can never interleave with
//! a half-applied settle.
//!
//! Timers carry a generation number and settlements carry the job's sequence
//! number; anything that no longer matches the current state is dropped.

use crate::catalog::Catalog;
use crate::error::{AppError, Result};
use crate::executor;
use crate::job::{Job, JobOutcome, PlaybackLauncher, Settlement};
use crate::library::CatalogSource;
use crate::outbox::Outbox;
use crate::render;
use crate::types::{EpisodeRef, Mode, Position, QualityConfig};
use log::{debug, error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Inputs to the sequencer loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A line of chat text.
    CommandReceived(String),
    /// The active (or a superseded) job settled.
    JobSettled(Settlement),
    /// A cooldown or jump-settle delay elapsed.
    Wake(u64),
}

/// Delays between jobs.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    /// After a job settles, before the next episode starts.
    pub cooldown: Duration,
    /// After a navigation command's cancelled job settles, before the
    /// replacement starts.
    pub jump_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(1000),
            jump_settle: Duration::from_millis(3000),
        }
    }
}

/// Everything the interpreter and executor read: the catalog, the cursor
/// and the mode.
#[derive(Debug, Clone)]
pub struct PlaybackState {
    pub catalog: Arc<Catalog>,
    pub position: Position,
    pub mode: Mode,
}

impl PlaybackState {
    pub fn current_episodes(&self) -> &[EpisodeRef] {
        self.catalog
            .list_episodes(&self.position.show, &self.position.season)
            .unwrap_or(&[])
    }
}

/// Cloneable sender for feeding commands into a running sequencer.
#[derive(Debug, Clone)]
pub struct SequencerHandle {
    tx: mpsc::UnboundedSender<Event>,
}

impl SequencerHandle {
    /// Queue a chat line. Returns false once the sequencer is gone.
    pub fn command(&self, text: impl Into<String>) -> bool {
        self.tx.send(Event::CommandReceived(text.into())).is_ok()
    }
}

pub struct Sequencer {
    pub(crate) state: PlaybackState,
    pub(crate) source: Arc<dyn CatalogSource>,
    pub(crate) outbox: Outbox,
    launcher: Arc<dyn PlaybackLauncher>,
    quality: QualityConfig,
    timing: Timing,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    active: Option<Job>,
    last_seq: u64,
    episodes_started: u64,
    wake_gen: u64,
}

impl Sequencer {
    /// Create a stopped sequencer positioned at the first episode of the
    /// first show.
    pub fn new(
        catalog: Catalog,
        source: Arc<dyn CatalogSource>,
        launcher: Arc<dyn PlaybackLauncher>,
        quality: QualityConfig,
        timing: Timing,
        outbox: Outbox,
    ) -> Result<Self> {
        let position = catalog.first_position().ok_or(AppError::CatalogEmpty)?;
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Ok(Self {
            state: PlaybackState {
                catalog: Arc::new(catalog),
                position,
                mode: Mode::Stopped,
            },
            source,
            outbox,
            launcher,
            quality,
            timing,
            events_tx,
            events_rx,
            active: None,
            last_seq: 0,
            episodes_started: 0,
            wake_gen: 0,
        })
    }

    pub fn handle(&self) -> SequencerHandle {
        SequencerHandle {
            tx: self.events_tx.clone(),
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn position(&self) -> &Position {
        &self.state.position
    }

    /// Sequence number of the job currently running, if any.
    pub fn active_seq(&self) -> Option<u64> {
        self.active.as_ref().map(Job::seq)
    }

    /// Jobs started so far. Diagnostics only.
    pub fn episodes_started(&self) -> u64 {
        self.episodes_started
    }

    /// Consume events for the lifetime of the process.
    pub async fn run(mut self) {
        info!(
            "Sequencer running at {} ({:?})",
            self.state.position, self.state.mode
        );
        while self.step().await {}
    }

    /// Wait for the next event and apply it. Returns false if the queue closed.
    pub async fn step(&mut self) -> bool {
        match self.events_rx.recv().await {
            Some(event) => {
                self.handle_event(event);
                true
            }
            None => false,
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::CommandReceived(text) => executor::execute(self, &text),
            Event::JobSettled(settlement) => self.on_settled(settlement),
            Event::Wake(generation) => self.on_wake(generation),
        }
    }

    /// `Stopped -> Playing`. Returns false if already playing.
    ///
    /// If a cancelled job is still tearing down, the new job waits for its
    /// settlement.
    pub fn start(&mut self) -> bool {
        if self.state.mode != Mode::Stopped {
            return false;
        }

        self.state.mode = Mode::Playing;
        if self.active.is_none() {
            self.launch();
        } else {
            debug!("Start requested while previous job is settling");
        }
        true
    }

    /// `* -> Stopped`. Returns false if nothing was playing.
    pub fn stop(&mut self) -> bool {
        if self.state.mode == Mode::Stopped {
            return false;
        }

        // Mode first, so the settling job sees Stopped and skips auto-advance
        self.state.mode = Mode::Stopped;
        self.wake_gen += 1;
        if let Some(job) = &self.active {
            job.cancel();
        }
        info!("Stopped at {}", self.state.position);
        true
    }

    /// `* -> Jumping`: cancel whatever is playing and move the cursor.
    ///
    /// The replacement job starts `jump_settle` after the cancelled job
    /// settles, or after `jump_settle` right away when nothing was running.
    pub fn navigate(&mut self, target: Position) {
        self.state.mode = Mode::Jumping;
        self.wake_gen += 1;
        if let Some(job) = &self.active {
            job.cancel();
        }

        info!("Jumping from {} to {}", self.state.position, target);
        self.state.position = target;

        if self.active.is_none() {
            self.schedule_wake(self.timing.jump_settle);
        }
    }

    /// Swap in a freshly built catalog, returning the corrected position if
    /// the old one no longer exists.
    pub fn replace_catalog(&mut self, catalog: Catalog) -> Option<Position> {
        let reset = catalog.reconcile(&self.state.position);
        self.state.catalog = Arc::new(catalog);
        reset
    }

    fn on_settled(&mut self, settlement: Settlement) {
        let Some(job) = self.active.take_if(|job| job.seq() == settlement.seq) else {
            debug!(
                "Ignoring stale settlement of job {} ({:?})",
                settlement.seq, settlement.outcome
            );
            return;
        };

        let cancelled = job.is_cancelled() || settlement.outcome == JobOutcome::Cancelled;
        info!(
            "Job {} ({}) settled: {:?}, mode {:?}",
            settlement.seq,
            job.title(),
            settlement.outcome,
            self.state.mode
        );

        match self.state.mode {
            Mode::Playing => {
                if !cancelled {
                    self.advance();
                }
                self.schedule_wake(self.timing.cooldown);
            }
            Mode::Jumping => self.schedule_wake(self.timing.jump_settle),
            Mode::Stopped => info!("Playback idle at {}", self.state.position),
        }
    }

    fn on_wake(&mut self, generation: u64) {
        if generation != self.wake_gen {
            debug!("Ignoring superseded wake-up {}", generation);
            return;
        }
        if self.active.is_some() {
            warn!("Wake-up while a job is still active, ignoring");
            return;
        }

        match self.state.mode {
            Mode::Stopped => {}
            Mode::Jumping => {
                self.state.mode = Mode::Playing;
                self.launch();
            }
            Mode::Playing => self.launch(),
        }
    }

    fn advance(&mut self) {
        let len = self.state.current_episodes().len();
        if self.state.position.advance(len) {
            info!(
                "Completed {} of {}. Looping back to episode 1.",
                self.state.position.season, self.state.position.show
            );
            self.outbox.send(render::season_complete(&self.state.position));
        }
    }

    fn schedule_wake(&mut self, delay: Duration) {
        self.wake_gen += 1;
        let generation = self.wake_gen;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(Event::Wake(generation));
        });
    }

    fn launch(&mut self) {
        if let Some(job) = &self.active {
            error!("Refusing to start a job while job {} is active", job.seq());
            return;
        }

        let episode = match self.state.current_episodes().get(self.state.position.episode) {
            Some(ep) => ep.clone(),
            None => match self.state.catalog.reconcile(&self.state.position) {
                Some(fixed) => {
                    warn!("Position {} is invalid, resetting to {}", self.state.position, fixed);
                    self.state.position = fixed;
                    match self.state.current_episodes().get(self.state.position.episode) {
                        Some(ep) => ep.clone(),
                        None => {
                            error!("No playable episode, stopping");
                            self.state.mode = Mode::Stopped;
                            return;
                        }
                    }
                }
                None => {
                    error!("No playable episode at {}, stopping", self.state.position);
                    self.state.mode = Mode::Stopped;
                    return;
                }
            },
        };

        self.last_seq += 1;
        self.episodes_started += 1;
        let seq = self.last_seq;
        info!(
            "Starting video {} ({}/{}): {}",
            self.episodes_started,
            self.state.position.episode + 1,
            self.state.current_episodes().len(),
            episode.title
        );
        self.outbox
            .send(render::now_playing(&self.state.catalog, &self.state.position));

        let tx = self.events_tx.clone();
        self.active = Some(Job::start(
            seq,
            episode,
            self.quality.clone(),
            self.launcher.clone(),
            move |settlement| {
                let _ = tx.send(Event::JobSettled(settlement));
            },
        ));
    }
}
