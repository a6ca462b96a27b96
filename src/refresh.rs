//! Background refresh of the card source.
//!
//! The controller owns the auto-refresh flag and poll timer, the long-press
//! gesture that toggles it, and the generation counter that tags every
//! fetch. It never performs I/O itself: callers take a [`FetchTicket`], run
//! the fetch, and hand the result back through [`RefreshController::complete`].

use crate::error::Result;
use crate::gesture::{Gesture, GestureTiming, GestureView, LongPressDetector};
use crate::item::Card;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Refresh timing and defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefreshSettings {
    pub poll_period: Duration,
    pub auto_refresh_default: bool,
    pub gesture: GestureTiming,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_secs(300),
            auto_refresh_default: false,
            gesture: GestureTiming::default(),
        }
    }
}

/// Tag identifying one fetch. Later tickets carry higher generations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(self) -> u64 {
        self.generation
    }
}

/// What to do with a finished fetch.
#[derive(Debug)]
pub enum RefreshOutcome {
    /// Newest result so far; replace the cards with it.
    Apply(Vec<Card>),
    /// A newer fetch already completed; drop this one.
    Stale,
    /// The fetch failed; keep the last good cards.
    Failed,
}

/// Effect of a gesture event on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureAction {
    None,
    /// Short press: fetch once now.
    RefreshNow,
    /// Long press: auto-refresh flipped to the carried value.
    Toggled(bool),
}

#[derive(Debug, Clone)]
pub struct RefreshController {
    enabled: bool,
    poll_period: Duration,
    next_poll: Option<Instant>,
    source_available: bool,
    gesture: LongPressDetector,
    next_generation: u64,
    applied_generation: u64,
    applied_photo_generation: u64,
}

impl RefreshController {
    /// Create a controller with auto-refresh set to the configured default.
    /// The poll timer is not armed until [`set_auto_refresh`](Self::set_auto_refresh).
    ///
    /// Without a remote source the flag still toggles but no poll timer is
    /// ever armed.
    pub fn new(settings: RefreshSettings, source_available: bool) -> Self {
        Self {
            enabled: settings.auto_refresh_default,
            poll_period: settings.poll_period,
            next_poll: None,
            source_available,
            gesture: LongPressDetector::new(settings.gesture),
            next_generation: 0,
            applied_generation: 0,
            applied_photo_generation: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn poll_period(&self) -> Duration {
        self.poll_period
    }

    pub fn next_poll_deadline(&self) -> Option<Instant> {
        self.next_poll
    }

    /// Set the auto-refresh flag. The old timer is always cleared first, so
    /// enabling twice leaves exactly one timer armed.
    pub fn set_auto_refresh(&mut self, enabled: bool, now: Instant) {
        self.enabled = enabled;
        self.next_poll = None;
        if enabled && self.source_available {
            self.next_poll = Some(now + self.poll_period);
        }
        debug!(enabled, armed = self.next_poll.is_some(), "auto-refresh set");
    }

    /// Flip the auto-refresh flag; returns the new value.
    pub fn toggle(&mut self, now: Instant) -> bool {
        let enabled = !self.enabled;
        self.set_auto_refresh(enabled, now);
        info!(enabled, "auto-refresh toggled");
        enabled
    }

    /// Handle an expired poll timer. The timer re-arms for the next period
    /// whatever the fetch outcome turns out to be.
    pub fn on_poll_due(&mut self, now: Instant) -> Option<FetchTicket> {
        self.next_poll?;
        self.next_poll = Some(now + self.poll_period);
        Some(self.begin_refresh())
    }

    /// Issue a ticket for a fetch starting now.
    pub fn begin_refresh(&mut self) -> FetchTicket {
        self.next_generation += 1;
        FetchTicket {
            generation: self.next_generation,
        }
    }

    /// Whether a result for `ticket` would still be applied.
    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation > self.applied_generation
    }

    /// Decide what happens to a finished fetch. Failures are logged and
    /// absorbed; they never disarm the poll timer.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<Card>>) -> RefreshOutcome {
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                applied = self.applied_generation,
                "discarding superseded fetch result"
            );
            return RefreshOutcome::Stale;
        }
        match result {
            Ok(cards) => {
                self.applied_generation = ticket.generation;
                debug!(generation = ticket.generation, cards = cards.len(), "fetch applied");
                RefreshOutcome::Apply(cards)
            }
            Err(e) => {
                warn!(generation = ticket.generation, "card refresh failed, keeping last cards: {e}");
                RefreshOutcome::Failed
            }
        }
    }

    /// Decide whether a successful photo reload for `ticket` replaces the
    /// photos. Photos are tracked apart from cards, so a reload that finishes
    /// after a newer one was applied is dropped even when no cards came back.
    pub fn accept_photos(&mut self, ticket: FetchTicket) -> bool {
        if ticket.generation <= self.applied_photo_generation {
            debug!(
                generation = ticket.generation,
                applied = self.applied_photo_generation,
                "discarding superseded photo reload"
            );
            return false;
        }
        self.applied_photo_generation = ticket.generation;
        true
    }

    /// Input went down. Ignored while already pressed.
    pub fn press_start(&mut self, now: Instant) -> bool {
        self.gesture.press(now)
    }

    /// Input went up.
    pub fn press_end(&mut self, now: Instant) -> GestureAction {
        match self.gesture.release(now) {
            Some(Gesture::ShortPress) => GestureAction::RefreshNow,
            Some(Gesture::LongPress) => GestureAction::Toggled(self.toggle(now)),
            None => GestureAction::None,
        }
    }

    /// Focus or visibility lost: drop the gesture without acting on it.
    pub fn interrupt(&mut self) {
        if self.gesture.is_pressed() {
            debug!("gesture cancelled");
        }
        self.gesture.cancel();
    }

    pub fn gesture_deadline(&self) -> Option<Instant> {
        self.gesture.next_deadline()
    }

    /// Handle an expired gesture sampling deadline.
    pub fn on_gesture_deadline(&mut self, now: Instant) -> GestureAction {
        match self.gesture.sample(now) {
            Some(Gesture::LongPress) => GestureAction::Toggled(self.toggle(now)),
            _ => GestureAction::None,
        }
    }

    pub fn gesture_view(&self, now: Instant) -> GestureView {
        self.gesture.view(now)
    }

    /// Teardown: clear every timer.
    pub fn shutdown(&mut self) {
        self.next_poll = None;
        self.gesture.cancel();
    }
}
