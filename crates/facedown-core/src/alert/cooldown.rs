use std::time::{Duration, Instant};

use crate::timer::Deadline;

/// Debounce window that blocks repeated violation triggers.
#[derive(Debug, Clone)]
pub struct Cooldown {
    window: Duration,
    expiry: Deadline,
}

impl Cooldown {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            expiry: Deadline::new(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.expiry.is_armed()
    }

    /// Open a window starting at `now`. Returns `false` if one is already open.
    pub fn try_open(&mut self, now: Instant) -> bool {
        if self.is_active() {
            return false;
        }
        self.expiry.arm_after(now, self.window);
        true
    }

    /// Close the window if it has run out. Returns `true` on the closing call.
    pub fn expire(&mut self, now: Instant) -> bool {
        self.expiry.fire(now)
    }

    pub fn cancel(&mut self) {
        self.expiry.cancel();
    }

    pub fn due(&self) -> Option<Instant> {
        self.expiry.due()
    }
}
