use std::time::{Duration, Instant};

use crate::timer::{Deadline, Periodic};

/// Outcome of polling the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashUpdate {
    Idle,
    Toggled,
    Unchanged,
    Expired,
}

/// Time-bounded two-frame alternation shown over the UI during an alert.
#[derive(Debug, Clone)]
pub struct FlashOverlay {
    duration: Duration,
    alternation: Periodic,
    until: Deadline,
    active: bool,
    index: u8,
}

impl FlashOverlay {
    pub fn new(duration: Duration, interval: Duration) -> Self {
        Self {
            duration,
            alternation: Periodic::new(interval),
            until: Deadline::new(),
            active: false,
            index: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Current frame, 0 or 1.
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Restart from frame 0 for the full duration.
    pub fn start(&mut self, now: Instant) {
        self.stop();
        self.active = true;
        self.index = 0;
        self.alternation.start(now);
        self.until.arm_after(now, self.duration);
    }

    /// Returns `true` if the overlay was showing.
    pub fn stop(&mut self) -> bool {
        self.alternation.stop();
        self.until.cancel();
        std::mem::replace(&mut self.active, false)
    }

    pub fn advance(&mut self, now: Instant) -> FlashUpdate {
        if !self.active {
            return FlashUpdate::Idle;
        }
        if self.until.fire(now) {
            self.stop();
            return FlashUpdate::Expired;
        }
        let steps = self.alternation.fire(now);
        if steps % 2 == 1 {
            self.index = 1 - self.index;
            FlashUpdate::Toggled
        } else {
            FlashUpdate::Unchanged
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        match (self.alternation.due(), self.until.due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}
