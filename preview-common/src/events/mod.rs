//! Event types for the preview event system
//!
//! Provides shared event definitions and the EventBus used to observe the
//! crossfade controller from a UI or a log.

mod preview_types;

pub use preview_types::{HandleState, ItemId, RampDirection};

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Preview event types
///
/// Events are broadcast via EventBus and can be serialized for transmission
/// to a UI layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PreviewEvent {
    /// A handle moved between lifecycle states
    ///
    /// Triggers:
    /// - UI: Toggle the "now previewing" indicator on the item card
    StateChanged {
        /// Item whose handle changed
        item_id: ItemId,
        /// State before the change
        old_state: HandleState,
        /// State after the change
        new_state: HandleState,
        /// Ramp level at the moment of the change
        volume: f32,
        /// When state changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The platform declined or failed to start a preview
    ///
    /// Emitted once per failed start. The handle is already `Stopped`.
    PlaybackFailed {
        /// Item whose preview failed
        item_id: ItemId,
        /// Human-readable failure description
        message: String,
        /// When the failure was observed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Every handle was torn down (list replaced or controller disposed)
    HandlesReleased {
        /// Number of handles released
        count: usize,
        /// When the handles were released
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl PreviewEvent {
    /// Get event type as string (the serde tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            PreviewEvent::StateChanged { .. } => "StateChanged",
            PreviewEvent::PlaybackFailed { .. } => "PlaybackFailed",
            PreviewEvent::HandlesReleased { .. } => "HandlesReleased",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus for preview events
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block the controller)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use preview_common::events::{EventBus, HandleState, PreviewEvent};
///
/// let event_bus = EventBus::new(16);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(PreviewEvent::StateChanged {
///     item_id: "artist-1".into(),
///     old_state: HandleState::Idle,
///     new_state: HandleState::FadingIn,
///     volume: 0.0,
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PreviewEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<PreviewEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: PreviewEvent,
    ) -> Result<usize, broadcast::error::SendError<PreviewEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PreviewEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
