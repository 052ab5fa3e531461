//! Crossfade controller
//!
//! Public entry point for the list UI. A [`PreviewController`] is a cheap,
//! cloneable handle; the work happens in a single controller task that owns
//! the handle registry and the ramp scheduler and processes, in order:
//! - UI commands (play, stop, release, snapshot)
//! - playback start outcomes
//! - ramp ticks
//!
//! # Per-item state machine
//!
//! | state            | play                          | stop                 |
//! |------------------|-------------------------------|----------------------|
//! | Idle / Stopped   | `play()`, ramp In → FadingIn  | no-op                |
//! | FadingIn         | no-op                         | ramp Out → FadingOut |
//! | Playing          | no-op                         | ramp Out → FadingOut |
//! | FadingOut        | ramp In → FadingIn            | no-op                |
//!
//! A completed In ramp moves the handle to Playing. A completed Out ramp
//! pauses the resource, rewinds it (unless configured otherwise) and moves the
//! handle to Stopped.

use super::ramp::{RampProgress, RampScheduler, RampTick};
use super::registry::{AudioHandle, HandleRegistry};
use crate::audio::{AudioBackend, PlaybackError};
use crate::config::FadeSettings;
use crate::report::FailureReporter;
use crate::{Error, Result};
use preview_common::{EventBus, HandleState, ItemId, PreviewEvent, RampDirection};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

/// Point-in-time view of one handle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandleSnapshot {
    pub item_id: ItemId,
    pub state: HandleState,
    /// Ramp level in [0.0, 1.0]
    pub volume: f32,
    /// Direction of the running ramp, if any
    pub ramp: Option<RampDirection>,
}

impl HandleSnapshot {
    fn of(handle: &AudioHandle) -> Self {
        Self {
            item_id: handle.item_id().clone(),
            state: handle.state(),
            volume: handle.volume(),
            ramp: handle.ramp_direction(),
        }
    }
}

enum Command {
    Play {
        item_id: ItemId,
        source_url: String,
    },
    Stop {
        item_id: ItemId,
    },
    ReleaseAll {
        reply: oneshot::Sender<usize>,
    },
    Snapshot {
        item_id: Option<ItemId>,
        reply: oneshot::Sender<Vec<HandleSnapshot>>,
    },
    Shutdown,
}

/// Resolution of one `play()` future
struct PlayOutcome {
    item_id: ItemId,
    attempt: u64,
    result: std::result::Result<(), PlaybackError>,
}

/// Handle to the crossfade controller task
///
/// # Examples
///
/// ```ignore
/// let (controller, task) = PreviewController::spawn(
///     Arc::new(backend),
///     FadeSettings::default(),
///     Arc::new(LogReporter),
///     EventBus::new(256),
/// );
///
/// controller.on_item_hover_enter("artist-1", "https://p.scdn.co/mp3-preview/abc")?;
/// controller.on_item_hover_leave("artist-1")?;
/// controller.on_list_replaced().await?;
/// ```
#[derive(Clone)]
pub struct PreviewController {
    commands: mpsc::UnboundedSender<Command>,
    events: EventBus,
}

impl PreviewController {
    /// Start the controller task on the current tokio runtime
    ///
    /// The task runs until [`shutdown`](Self::shutdown) is called or every
    /// clone of the returned controller is dropped; on exit it releases all
    /// handles.
    pub fn spawn(
        backend: Arc<dyn AudioBackend>,
        settings: FadeSettings,
        reporter: Arc<dyn FailureReporter>,
        events: EventBus,
    ) -> (Self, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let controller_loop = ControllerLoop {
            registry: HandleRegistry::new(backend),
            scheduler: RampScheduler::new(tick_tx, settings.curve),
            settings,
            reporter,
            events: events.clone(),
            commands: command_rx,
            ticks: tick_rx,
            outcome_tx,
            outcomes: outcome_rx,
            next_attempt: 1,
        };

        info!(
            "Preview controller started (fade {:?}, tick {:?}, curve {})",
            settings.fade_duration, settings.tick_interval, settings.curve
        );
        let task = tokio::spawn(controller_loop.run());

        (
            Self {
                commands: command_tx,
                events,
            },
            task,
        )
    }

    /// Fade the item's preview in, creating its handle on first use
    pub fn request_play(
        &self,
        item_id: impl Into<ItemId>,
        source_url: impl Into<String>,
    ) -> Result<()> {
        self.send(Command::Play {
            item_id: item_id.into(),
            source_url: source_url.into(),
        })
    }

    /// Fade the item's preview out; no-op if it is not playing
    pub fn request_stop(&self, item_id: impl Into<ItemId>) -> Result<()> {
        self.send(Command::Stop {
            item_id: item_id.into(),
        })
    }

    /// Release every handle, cancelling all ramps
    ///
    /// Safe to call repeatedly. The controller stays usable: later requests
    /// start from a fresh registry. Returns the number of handles released.
    pub async fn dispose(&self) -> Result<usize> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ReleaseAll { reply })?;
        rx.await.map_err(|_| Error::ControllerClosed)
    }

    /// UI hover-enter on an item card
    pub fn on_item_hover_enter(
        &self,
        item_id: impl Into<ItemId>,
        preview_url: impl Into<String>,
    ) -> Result<()> {
        self.request_play(item_id, preview_url)
    }

    /// UI hover-leave on an item card
    pub fn on_item_hover_leave(&self, item_id: impl Into<ItemId>) -> Result<()> {
        self.request_stop(item_id)
    }

    /// A new item list was loaded; tear down every handle of the old one
    pub async fn on_list_replaced(&self) -> Result<usize> {
        self.dispose().await
    }

    /// Current view of one item's handle
    pub async fn snapshot(&self, item_id: impl Into<ItemId>) -> Result<Option<HandleSnapshot>> {
        let mut snapshots = self.query(Some(item_id.into())).await?;
        Ok(snapshots.pop())
    }

    /// Current view of every handle, ordered by item id
    pub async fn snapshot_all(&self) -> Result<Vec<HandleSnapshot>> {
        self.query(None).await
    }

    /// Subscribe to state-change and failure events
    pub fn subscribe(&self) -> broadcast::Receiver<PreviewEvent> {
        self.events.subscribe()
    }

    /// Stop the controller task after it has processed earlier commands
    pub fn shutdown(&self) -> Result<()> {
        self.send(Command::Shutdown)
    }

    async fn query(&self, item_id: Option<ItemId>) -> Result<Vec<HandleSnapshot>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Snapshot { item_id, reply })?;
        rx.await.map_err(|_| Error::ControllerClosed)
    }

    fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .map_err(|_| Error::ControllerClosed)
    }
}

/// State owned by the controller task
struct ControllerLoop {
    registry: HandleRegistry,
    scheduler: RampScheduler,
    settings: FadeSettings,
    reporter: Arc<dyn FailureReporter>,
    events: EventBus,
    commands: mpsc::UnboundedReceiver<Command>,
    ticks: mpsc::UnboundedReceiver<RampTick>,
    outcome_tx: mpsc::UnboundedSender<PlayOutcome>,
    outcomes: mpsc::UnboundedReceiver<PlayOutcome>,
    /// Source of play attempt numbers; never reused, even across handles
    next_attempt: u64,
}

impl ControllerLoop {
    async fn run(mut self) {
        loop {
            tokio::select! {
                biased;

                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(outcome) = self.outcomes.recv() => self.handle_play_outcome(outcome),
                Some(tick) = self.ticks.recv() => self.handle_tick(tick),
            }
        }

        let released = self.registry.release_all();
        info!("Preview controller stopped ({} handles released)", released);
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Play {
                item_id,
                source_url,
            } => self.request_play(item_id, &source_url),
            Command::Stop { item_id } => self.request_stop(&item_id),
            Command::ReleaseAll { reply } => {
                let released = self.release_all();
                let _ = reply.send(released);
            }
            Command::Snapshot { item_id, reply } => {
                let snapshots = match item_id {
                    Some(id) => self
                        .registry
                        .get(&id)
                        .map(HandleSnapshot::of)
                        .into_iter()
                        .collect(),
                    None => {
                        let mut all: Vec<_> =
                            self.registry.iter().map(HandleSnapshot::of).collect();
                        all.sort_by(|a, b| a.item_id.cmp(&b.item_id));
                        all
                    }
                };
                let _ = reply.send(snapshots);
            }
            // Handled by the select loop
            Command::Shutdown => {}
        }
    }

    fn request_play(&mut self, item_id: ItemId, source_url: &str) {
        let handle = self.registry.get_or_create(&item_id, source_url);

        match handle.state {
            HandleState::Playing | HandleState::FadingIn => {
                trace!("Play {} ignored: already {}", item_id, handle.state);
                return;
            }
            // Resource is still running; just turn the fade around
            HandleState::FadingOut => {}
            HandleState::Idle | HandleState::Stopped => {
                let attempt = self.next_attempt;
                self.next_attempt += 1;
                handle.play_attempt = attempt;
                let start = handle.resource.play();
                let outcome_tx = self.outcome_tx.clone();

                tokio::spawn(async move {
                    let result = start.await;
                    let _ = outcome_tx.send(PlayOutcome {
                        item_id,
                        attempt,
                        result,
                    });
                });
            }
        }

        self.scheduler.start_ramp(
            handle,
            RampDirection::In,
            self.settings.fade_duration,
            self.settings.tick_interval,
        );
        set_state(handle, HandleState::FadingIn, &self.events);
    }

    fn request_stop(&mut self, item_id: &ItemId) {
        let Some(handle) = self.registry.get_mut(item_id) else {
            trace!("Stop {} ignored: no handle", item_id);
            return;
        };

        match handle.state {
            HandleState::Playing | HandleState::FadingIn => {
                self.scheduler.start_ramp(
                    handle,
                    RampDirection::Out,
                    self.settings.fade_duration,
                    self.settings.tick_interval,
                );
                set_state(handle, HandleState::FadingOut, &self.events);
            }
            HandleState::FadingOut | HandleState::Idle | HandleState::Stopped => {
                trace!("Stop {} ignored: already {}", item_id, handle.state);
            }
        }
    }

    fn handle_tick(&mut self, tick: RampTick) {
        let Some(handle) = self.registry.get_mut(&tick.item_id) else {
            trace!("Discarding tick {} for released {}", tick.token, tick.item_id);
            return;
        };

        match self.scheduler.on_tick(handle, tick.token) {
            RampProgress::Stale => {
                trace!("Discarding stale tick {} for {}", tick.token, tick.item_id);
            }
            RampProgress::Advanced(_) => {}
            RampProgress::Completed(RampDirection::In) => {
                set_state(handle, HandleState::Playing, &self.events);
            }
            RampProgress::Completed(RampDirection::Out) => {
                handle.resource.pause();
                if self.settings.reset_position_on_stop {
                    handle.resource.set_position(Duration::ZERO);
                }
                set_state(handle, HandleState::Stopped, &self.events);
            }
        }
    }

    fn handle_play_outcome(&mut self, outcome: PlayOutcome) {
        let Some(handle) = self.registry.get_mut(&outcome.item_id) else {
            trace!("Discarding play outcome for released {}", outcome.item_id);
            return;
        };
        if handle.play_attempt != outcome.attempt {
            trace!(
                "Discarding outcome of superseded play {} for {}",
                outcome.attempt,
                outcome.item_id
            );
            return;
        }

        match outcome.result {
            Ok(()) => debug!("Preview {} started", outcome.item_id),
            Err(PlaybackError::Released) => {
                trace!("Play for {} ended by release", outcome.item_id)
            }
            Err(e) => {
                self.scheduler.cancel_ramp(handle);
                handle.resource.pause();
                self.scheduler.apply_level(handle, 0.0);
                set_state(handle, HandleState::Stopped, &self.events);

                let message = format!("Could not play the preview for {}: {}", outcome.item_id, e);
                warn!("{}", message);
                self.reporter.report_failure(&message);
                self.events.emit_lossy(PreviewEvent::PlaybackFailed {
                    item_id: outcome.item_id,
                    message,
                    timestamp: chrono::Utc::now(),
                });
            }
        }
    }

    fn release_all(&mut self) -> usize {
        let released = self.registry.release_all();
        info!("Released {} preview handles", released);
        self.events.emit_lossy(PreviewEvent::HandlesReleased {
            count: released,
            timestamp: chrono::Utc::now(),
        });
        released
    }
}

/// Move a handle to `new_state`, announcing real changes
fn set_state(handle: &mut AudioHandle, new_state: HandleState, events: &EventBus) {
    let old_state = handle.state;
    if old_state == new_state {
        return;
    }
    handle.state = new_state;

    debug!(
        "{}: {} -> {} at {:.3}",
        handle.item_id(),
        old_state,
        new_state,
        handle.volume
    );
    events.emit_lossy(PreviewEvent::StateChanged {
        item_id: handle.item_id().clone(),
        old_state,
        new_state,
        volume: handle.volume,
        timestamp: chrono::Utc::now(),
    });
}
