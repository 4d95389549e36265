//! Cancellable timer slots.
//!
//! Slots hold the instant they are due instead of owning a thread or a
//! spawned task. The owner polls them with the current instant, so a slot
//! that was cancelled can never fire late, and cancelling twice is a no-op.

use std::time::{Duration, Instant};

/// Stand-in for "never" when a window is too long to represent.
const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// `now + after`, saturating to a far-off instant instead of overflowing.
fn instant_after(now: Instant, after: Duration) -> Instant {
    now.checked_add(after)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

/// One-shot deferred action.
#[derive(Debug, Clone, Default)]
pub struct Deadline {
    due: Option<Instant>,
}

impl Deadline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the slot to fire at `at`.
    pub fn arm(&mut self, at: Instant) {
        self.due = Some(at);
    }

    pub fn arm_after(&mut self, now: Instant, after: Duration) {
        self.arm(instant_after(now, after));
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Returns `true` exactly once, the first time `now` reaches the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(at) if now >= at => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}

/// Repeating action with a fixed period.
#[derive(Debug, Clone)]
pub struct Periodic {
    period: Duration,
    next: Option<Instant>,
}

impl Periodic {
    /// A zero period is bumped to one millisecond.
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            next: None,
        }
    }

    /// First firing happens one period after `now`.
    pub fn start(&mut self, now: Instant) {
        self.next = Some(instant_after(now, self.period));
    }

    pub fn stop(&mut self) {
        self.next = None;
    }

    pub fn is_running(&self) -> bool {
        self.next.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.next
    }

    /// Number of periods that elapsed up to `now`, catching up after gaps.
    pub fn fire(&mut self, now: Instant) -> u32 {
        let Some(next) = self.next else {
            return 0;
        };
        if now < next {
            return 0;
        }
        let behind = now.duration_since(next).as_nanos() / self.period.as_nanos();
        let count = behind.saturating_add(1);
        let advance = self.period.saturating_mul(u32::try_from(count).unwrap_or(u32::MAX));
        self.next = Some(instant_after(next, advance));
        u32::try_from(count).unwrap_or(u32::MAX)
    }
}
