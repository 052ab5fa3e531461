//! Volume ramp scheduling
//!
//! A ramp moves a handle's level from wherever it currently is towards 1.0
//! (`In`) or 0.0 (`Out`) in a fixed number of equal steps, one per timer tick.
//!
//! # Step size
//!
//! ```text
//! steps     = ceil(total_duration / tick_interval)   (at least 1)
//! step_size = (target - start) / steps
//! ```
//!
//! Because `start` is always the handle's *current* level, a ramp that
//! interrupts another one continues from the same point instead of jumping.
//! Every ramp takes the same number of ticks regardless of distance.
//!
//! # Timers and tokens
//!
//! Each ramp gets a fresh token and its own tokio interval task that sends
//! `RampTick { item_id, token }` to the controller loop. Cancelling a ramp
//! aborts the task and drops the operation; a tick that was already queued
//! then fails the token comparison in [`RampScheduler::on_tick`] and is
//! discarded without touching the handle.

use super::registry::AudioHandle;
use preview_common::{FadeCurve, ItemId, RampDirection};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::trace;

/// Identifies one ramp for its whole lifetime; never reused
pub type RampToken = u64;

/// Periodic trigger for one ramp, delivered to the controller loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RampTick {
    pub item_id: ItemId,
    pub token: RampToken,
}

/// Result of feeding one tick to a handle
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampProgress {
    /// Tick belongs to a cancelled or finished ramp; nothing changed
    Stale,
    /// Level moved to the contained value, ramp still running
    Advanced(f32),
    /// Level reached the target exactly; ramp cleared
    Completed(RampDirection),
}

/// One in-flight fade
#[derive(Debug)]
pub struct RampOperation {
    direction: RampDirection,
    start_volume: f32,
    target_volume: f32,
    step_size: f32,
    steps_remaining: u32,
    token: RampToken,
    timer: Option<AbortHandle>,
}

impl RampOperation {
    /// Plan a ramp from `start_volume` in `direction`
    ///
    /// The timer is attached separately so the arithmetic can be exercised
    /// without a runtime.
    pub fn new(
        direction: RampDirection,
        start_volume: f32,
        total_duration: Duration,
        tick_interval: Duration,
        token: RampToken,
    ) -> Self {
        let start_volume = start_volume.clamp(0.0, 1.0);
        let target_volume = direction.target_volume();
        let steps = Self::step_count(total_duration, tick_interval);

        Self {
            direction,
            start_volume,
            target_volume,
            step_size: (target_volume - start_volume) / steps as f32,
            steps_remaining: steps,
            token,
            timer: None,
        }
    }

    /// `ceil(total / tick)`, never less than one step
    pub fn step_count(total_duration: Duration, tick_interval: Duration) -> u32 {
        let total = total_duration.as_micros();
        let tick = tick_interval.as_micros().max(1);
        let steps = total.div_ceil(tick).max(1);
        u32::try_from(steps).unwrap_or(u32::MAX)
    }

    pub fn direction(&self) -> RampDirection {
        self.direction
    }

    pub fn start_volume(&self) -> f32 {
        self.start_volume
    }

    pub fn target_volume(&self) -> f32 {
        self.target_volume
    }

    pub fn step_size(&self) -> f32 {
        self.step_size
    }

    pub fn token(&self) -> RampToken {
        self.token
    }

    /// Compute the level after one more tick
    ///
    /// Returns the new level and whether the ramp has finished. The level
    /// never passes the target; once it is within half a step of it (or the
    /// planned steps are used up) it snaps to the target exactly.
    pub fn advance(&mut self, current: f32) -> (f32, bool) {
        self.steps_remaining = self.steps_remaining.saturating_sub(1);

        let stepped = (current + self.step_size).clamp(0.0, 1.0);
        let bounded = match self.direction {
            RampDirection::In => stepped.min(self.target_volume),
            RampDirection::Out => stepped.max(self.target_volume),
        };

        let tolerance = self.step_size.abs() * 0.5 + f32::EPSILON;
        if self.steps_remaining == 0 || (self.target_volume - bounded).abs() <= tolerance {
            (self.target_volume, true)
        } else {
            (bounded, false)
        }
    }

    fn attach_timer(&mut self, timer: AbortHandle) {
        self.timer = Some(timer);
    }
}

impl Drop for RampOperation {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Starts, cancels and advances ramps on audio handles
pub struct RampScheduler {
    tick_tx: mpsc::UnboundedSender<RampTick>,
    next_token: RampToken,
    curve: FadeCurve,
}

impl RampScheduler {
    /// Ticks for every ramp are sent on `tick_tx`; the level written to a
    /// resource is shaped by `curve`.
    pub fn new(tick_tx: mpsc::UnboundedSender<RampTick>, curve: FadeCurve) -> Self {
        Self {
            tick_tx,
            next_token: 1,
            curve,
        }
    }

    /// Replace any ramp on `handle` with a new one starting at its current level
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_ramp(
        &mut self,
        handle: &mut AudioHandle,
        direction: RampDirection,
        total_duration: Duration,
        tick_interval: Duration,
    ) {
        self.cancel_ramp(handle);

        let token = self.next_token;
        self.next_token += 1;

        let mut ramp = RampOperation::new(
            direction,
            handle.volume,
            total_duration,
            tick_interval,
            token,
        );
        trace!(
            "Ramp {} on {}: {} from {:.3}, step {:.4}",
            token,
            handle.item_id(),
            direction,
            ramp.start_volume(),
            ramp.step_size()
        );

        ramp.attach_timer(self.spawn_timer(handle.item_id().clone(), token, tick_interval));
        handle.active_ramp = Some(ramp);
    }

    /// Drop the active ramp on `handle`, if any
    ///
    /// Idempotent. Once this returns no tick of the cancelled ramp can change
    /// the handle: the timer task is aborted and its token no longer matches.
    pub fn cancel_ramp(&mut self, handle: &mut AudioHandle) -> bool {
        match handle.active_ramp.take() {
            Some(ramp) => {
                trace!("Ramp {} on {} cancelled", ramp.token(), handle.item_id());
                true
            }
            None => false,
        }
    }

    /// Apply one tick to `handle`
    pub fn on_tick(&mut self, handle: &mut AudioHandle, token: RampToken) -> RampProgress {
        let Some(ramp) = handle.active_ramp.as_mut() else {
            return RampProgress::Stale;
        };
        if ramp.token() != token {
            return RampProgress::Stale;
        }

        let (level, completed) = ramp.advance(handle.volume);
        let direction = ramp.direction();
        self.apply_level(handle, level);

        if completed {
            handle.active_ramp = None;
            RampProgress::Completed(direction)
        } else {
            RampProgress::Advanced(level)
        }
    }

    /// Set the handle's level and write the shaped volume to its resource
    pub fn apply_level(&self, handle: &mut AudioHandle, level: f32) {
        let level = level.clamp(0.0, 1.0);
        handle.volume = level;
        handle.resource.set_volume(self.curve.apply(level));
    }

    fn spawn_timer(&self, item_id: ItemId, token: RampToken, period: Duration) -> AbortHandle {
        let tx = self.tick_tx.clone();
        let period = period.max(Duration::from_millis(1));

        let task = tokio::spawn(async move {
            // First tick one period from now, not immediately
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let tick = RampTick {
                    item_id: item_id.clone(),
                    token,
                };
                if tx.send(tick).is_err() {
                    // Controller loop is gone
                    break;
                }
            }
        });

        task.abort_handle()
    }
}
