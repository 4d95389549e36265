//! Violation alert coordination.
//!
//! Turns "not compliant" ticks into debounced alert triggers and runs the
//! timed flash overlay and strobe window that follow each trigger.
//!
//! ## States
//!
//! ```text
//! Idle --trigger--> AlertingAndCoolingDown
//! AlertingAndCoolingDown --cooldown expiry--> Alerting
//! AlertingAndCoolingDown --flash expiry / stop_all--> CooldownOnly
//! Alerting --flash expiry / stop_all--> Idle
//! CooldownOnly --cooldown expiry--> Idle
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cooldown::Cooldown;
use super::flash::{FlashOverlay, FlashUpdate};
use crate::device::AlertActuator;
use crate::events::Event;
use crate::timer::Deadline;

/// Fixed windows used by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertTiming {
    /// Blocks new triggers after one fires.
    pub cooldown: Duration,
    /// How long the flash overlay shows before stopping on its own.
    pub flash_duration: Duration,
    /// Frame alternation period of the overlay.
    pub flash_interval: Duration,
    /// How long the strobe runs before the actuator turns it off.
    pub strobe_duration: Duration,
}

impl Default for AlertTiming {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_secs(3),
            flash_duration: Duration::from_secs(5),
            flash_interval: Duration::from_millis(80), // ~12.5 Hz
            strobe_duration: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertPhase {
    Idle,
    CooldownOnly,
    Alerting,
    AlertingAndCoolingDown,
}

pub struct ViolationCoordinator {
    actuator: Arc<dyn AlertActuator>,
    timing: AlertTiming,
    cooldown: Cooldown,
    flash: FlashOverlay,
    strobe: Deadline,
    sounding: bool,
}

impl fmt::Debug for ViolationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViolationCoordinator")
            .field("timing", &self.timing)
            .field("cooldown", &self.cooldown)
            .field("flash", &self.flash)
            .field("strobe", &self.strobe)
            .field("sounding", &self.sounding)
            .finish_non_exhaustive()
    }
}

impl ViolationCoordinator {
    pub fn new(actuator: Arc<dyn AlertActuator>, timing: AlertTiming) -> Self {
        Self {
            actuator,
            timing,
            cooldown: Cooldown::new(timing.cooldown),
            flash: FlashOverlay::new(timing.flash_duration, timing.flash_interval),
            strobe: Deadline::new(),
            sounding: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn timing(&self) -> AlertTiming {
        self.timing
    }

    pub fn is_cooldown_active(&self) -> bool {
        self.cooldown.is_active()
    }

    pub fn is_flashing(&self) -> bool {
        self.flash.is_active()
    }

    pub fn flash_index(&self) -> u8 {
        self.flash.index()
    }

    /// Whether the actuator was told to start and not yet told to stop.
    pub fn is_sounding(&self) -> bool {
        self.sounding
    }

    pub fn phase(&self) -> AlertPhase {
        match (self.flash.is_active(), self.cooldown.is_active()) {
            (false, false) => AlertPhase::Idle,
            (false, true) => AlertPhase::CooldownOnly,
            (true, false) => AlertPhase::Alerting,
            (true, true) => AlertPhase::AlertingAndCoolingDown,
        }
    }

    /// Earliest instant at which `advance` has work to do.
    pub fn next_due(&self) -> Option<Instant> {
        [self.cooldown.due(), self.flash.next_due(), self.strobe.due()]
            .into_iter()
            .flatten()
            .min()
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Fire an alert unless a cooldown window is open.
    ///
    /// Returns the violation event when the alert fired; the caller records
    /// `message` on the session.
    pub fn trigger_if_allowed(&mut self, message: &str, now: Instant) -> Option<Event> {
        if !self.cooldown.try_open(now) {
            debug!("violation suppressed by cooldown");
            return None;
        }
        if let Err(err) = self.actuator.start_alert() {
            warn!(error = %err, "alert actuator failed to start; continuing silently");
        }
        self.sounding = true;
        self.flash.start(now);
        self.strobe.arm_after(now, self.timing.strobe_duration);
        Some(Event::ViolationTriggered {
            message: message.to_string(),
            at: Utc::now(),
        })
    }

    /// Silence the actuator and hide the overlay. The cooldown keeps running.
    ///
    /// Returns `true` if anything was actually on.
    pub fn stop_all(&mut self) -> bool {
        let was_flashing = self.flash.stop();
        self.strobe.cancel();
        let was_sounding = std::mem::replace(&mut self.sounding, false);
        if let Err(err) = self.actuator.stop_alert() {
            if was_sounding {
                warn!(error = %err, "alert actuator failed to stop");
            }
        }
        was_flashing || was_sounding
    }

    /// `stop_all` plus closing the cooldown window, used when the session halts.
    pub fn cancel_all(&mut self) -> bool {
        self.cooldown.cancel();
        self.stop_all()
    }

    /// Run every deferred step that is due at `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();

        if self.cooldown.expire(now) {
            debug!("violation cooldown expired");
            events.push(Event::CooldownExpired { at: Utc::now() });
        }

        if self.flash.advance(now) == FlashUpdate::Expired {
            debug!("flash overlay expired");
            events.push(Event::FlashExpired { at: Utc::now() });
        }

        if self.strobe.fire(now) && self.sounding {
            if let Err(err) = self.actuator.stop_strobe() {
                warn!(error = %err, "alert actuator failed to stop strobe");
            }
            events.push(Event::StrobeExpired { at: Utc::now() });
        }

        events
    }
}
