//! Auto-advance timer and manual navigation over the rotation queue.
//!
//! The controller does not own a spawned timer task. It keeps the deadline
//! of its next tick, and the dashboard loop sleeps until that deadline.
//! Disarming is clearing the deadline, so cancelling is always idempotent.

use crate::queue::RotationQueue;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationState {
    /// No timer armed.
    Idle,
    /// Advancing every tick period.
    Rotating,
}

/// Manual navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Cursor after one step from `cursor` in a queue of `len > 0` items.
    fn step(self, cursor: usize, len: usize) -> usize {
        match self {
            Self::Forward => (cursor + 1) % len,
            Self::Backward => (cursor + len - 1) % len,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RotationController {
    state: RotationState,
    tick_period: Duration,
    next_tick: Option<Instant>,
}

impl RotationController {
    pub fn new(tick_period: Duration) -> Self {
        Self {
            state: RotationState::Idle,
            tick_period,
            next_tick: None,
        }
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// When the next auto-advance is due, if a timer is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_tick
    }

    /// Start rotating when there is more than one item; otherwise stay idle
    /// with no timer.
    pub fn start(&mut self, queue: &RotationQueue, now: Instant) {
        if queue.len() <= 1 {
            self.stop();
            return;
        }
        self.state = RotationState::Rotating;
        self.next_tick = Some(now + self.tick_period);
        debug!(items = queue.len(), period = ?self.tick_period, "rotation started");
    }

    /// Handle an expired tick. Returns `true` when the cursor moved and the
    /// current item must be rendered.
    pub fn on_tick(&mut self, queue: &mut RotationQueue, now: Instant) -> bool {
        if self.state != RotationState::Rotating {
            return false;
        }
        let len = queue.len();
        if len <= 1 {
            self.stop();
            return false;
        }

        queue.set_cursor(Direction::Forward.step(queue.cursor(), len));

        // Keep the original phase; skip ticks missed while the loop was busy.
        let mut next = self.next_tick.unwrap_or(now) + self.tick_period;
        if next <= now {
            next = now + self.tick_period;
        }
        self.next_tick = Some(next);
        true
    }

    /// Step the cursor by hand. A no-op on queues of one item or fewer.
    ///
    /// While rotating, the timer restarts so the next auto-advance is a full
    /// period after this step.
    pub fn advance(
        &mut self,
        queue: &mut RotationQueue,
        direction: Direction,
        now: Instant,
    ) -> bool {
        let len = queue.len();
        if len <= 1 {
            return false;
        }
        queue.set_cursor(direction.step(queue.cursor(), len));
        if self.state == RotationState::Rotating {
            self.next_tick = Some(now + self.tick_period);
        }
        true
    }

    /// Disarm and go idle.
    pub fn stop(&mut self) {
        if self.state == RotationState::Rotating {
            debug!("rotation stopped");
        }
        self.state = RotationState::Idle;
        self.next_tick = None;
    }

    /// Re-evaluate after the queue was rebuilt. The queue has already
    /// re-clamped its cursor. The running timer keeps its phase; a timer is
    /// only armed fresh when rotation becomes possible again.
    pub fn on_rebuild(&mut self, queue: &RotationQueue, now: Instant) {
        match (self.state, queue.len() > 1) {
            (RotationState::Idle, true) => self.start(queue, now),
            (RotationState::Rotating, false) => self.stop(),
            _ => {}
        }
    }
}
