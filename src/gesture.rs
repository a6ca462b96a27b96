//! Long-press detection for a single sustained-press input.
//!
//! A press that is released before the hold duration is a short press. A
//! press held for the full hold duration completes exactly once, shows its
//! completed state for a short linger, and then stays latched until the
//! input is released. Losing focus or visibility resets everything without
//! reporting either gesture.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTiming {
    /// How long the input must be held to count as a long press.
    pub hold: Duration,
    /// Progress sampling interval while held.
    pub sample_interval: Duration,
    /// How long the completed state stays visible.
    pub linger: Duration,
}

impl Default for GestureTiming {
    fn default() -> Self {
        Self {
            hold: Duration::from_secs(2),
            sample_interval: Duration::from_millis(30),
            linger: Duration::from_millis(700),
        }
    }
}

/// A recognised gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    ShortPress,
    LongPress,
}

/// What a progress indicator should show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureView {
    Hidden,
    Holding {
        /// `min(1, elapsed / hold)`.
        progress: f32,
        remaining: Duration,
    },
    Completed,
}

#[derive(Debug, Clone)]
pub struct LongPressDetector {
    timing: GestureTiming,
    pressed: bool,
    started_at: Option<Instant>,
    triggered: bool,
    triggered_at: Option<Instant>,
    next_sample: Option<Instant>,
}

impl LongPressDetector {
    pub fn new(timing: GestureTiming) -> Self {
        Self {
            timing,
            pressed: false,
            started_at: None,
            triggered: false,
            triggered_at: None,
            next_sample: None,
        }
    }

    pub fn timing(&self) -> GestureTiming {
        self.timing
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Begin a press. Repeated press events while already pressed are
    /// ignored and return `false`.
    pub fn press(&mut self, now: Instant) -> bool {
        if self.pressed {
            return false;
        }
        self.pressed = true;
        self.triggered = false;
        self.triggered_at = None;
        self.started_at = Some(now);
        self.next_sample = Some(self.sample_after(now));
        true
    }

    /// Fraction of the hold duration elapsed, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.triggered {
            return 1.0;
        }
        let Some(started) = self.started_at else {
            return 0.0;
        };
        let hold = self.timing.hold.as_secs_f32();
        if hold <= 0.0 {
            return 1.0;
        }
        (now.saturating_duration_since(started).as_secs_f32() / hold).min(1.0)
    }

    /// When the loop should call [`sample`](Self::sample) next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_sample
    }

    /// Periodic sample. Reports [`Gesture::LongPress`] once, on the first
    /// sample at or past the hold duration.
    pub fn sample(&mut self, now: Instant) -> Option<Gesture> {
        if !self.pressed {
            self.next_sample = None;
            return None;
        }

        if self.triggered {
            // Linger over; the press stays latched until release.
            let linger_end = self.triggered_at.map(|at| at + self.timing.linger);
            if linger_end.is_none_or(|end| now >= end) {
                self.next_sample = None;
            }
            return None;
        }

        if self.held_long_enough(now) {
            self.triggered = true;
            self.triggered_at = Some(now);
            self.next_sample = Some(now + self.timing.linger);
            return Some(Gesture::LongPress);
        }

        self.next_sample = Some(self.sample_after(now));
        None
    }

    /// End a press. A release before the hold duration is a short press.
    /// A release after the long press already fired reports nothing.
    pub fn release(&mut self, now: Instant) -> Option<Gesture> {
        if !self.pressed {
            return None;
        }
        let gesture = if self.triggered {
            None
        } else if self.held_long_enough(now) {
            Some(Gesture::LongPress)
        } else {
            Some(Gesture::ShortPress)
        };
        self.reset();
        gesture
    }

    /// Hard cancel: clear all press state without reporting a gesture.
    pub fn cancel(&mut self) {
        self.reset();
    }

    pub fn view(&self, now: Instant) -> GestureView {
        if !self.pressed {
            return GestureView::Hidden;
        }
        if self.triggered {
            return if self.next_sample.is_some() {
                GestureView::Completed
            } else {
                GestureView::Hidden
            };
        }
        let elapsed = self
            .started_at
            .map(|started| now.saturating_duration_since(started))
            .unwrap_or_default();
        GestureView::Holding {
            progress: self.progress(now),
            remaining: self.timing.hold.saturating_sub(elapsed),
        }
    }

    fn held_long_enough(&self, now: Instant) -> bool {
        self.started_at
            .is_some_and(|started| now.saturating_duration_since(started) >= self.timing.hold)
    }

    /// Next sample time, never later than the moment the hold completes.
    fn sample_after(&self, now: Instant) -> Instant {
        let next = now + self.timing.sample_interval;
        match self.started_at {
            Some(started) => next.min(started + self.timing.hold),
            None => next,
        }
    }

    fn reset(&mut self) {
        self.pressed = false;
        self.started_at = None;
        self.triggered = false;
        self.triggered_at = None;
        self.next_sample = None;
    }
}
