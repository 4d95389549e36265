//! Session clock implementation.
//!
//! The session clock is a wall-clock-based state machine. It does not use
//! internal threads - the caller passes the current instant and is
//! responsible for calling `advance()` (or `on_tick()` directly) as time
//! moves on. Sensor readings are pushed in with `on_sensor_reading()`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle(Work) -> Running(Work) -> Running(Break) -> Running(Work) ...
//!     ^              |                 |
//!     +---- pause / reset <------------+
//! ```
//!
//! Enforcement arms on the first face-down reading after each start of a
//! face-down-required work phase. Once armed, every tick spent face-up asks
//! the [`ViolationCoordinator`] for an alert.
//!
//! ## Usage
//!
//! ```ignore
//! let mut clock = SessionClock::new(Durations::default(), alerts);
//! clock.toggle_running(Instant::now());
//! // In a loop:
//! clock.advance(Instant::now());
//! ```

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::deadline::Periodic;
use super::schedule::{Durations, Phase};
use crate::alert::{AlertTiming, ViolationCoordinator};
use crate::config::Config;
use crate::device::{AlertActuator, NullSensor, OrientationSensor, ReadingListener};
use crate::events::{Event, StopReason};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub const ARMED_MESSAGE: &str = "Armed: stay face-down during work";
pub const VIOLATION_MESSAGE: &str = "Picked up during work – busted!";

/// Read-only view of every field the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub running: bool,
    pub remaining_secs: u64,
    pub work_minutes: u32,
    pub break_minutes: u32,
    pub require_face_down: bool,
    pub face_down: bool,
    pub enforcement_armed: bool,
    pub flashing_active: bool,
    pub flash_index: u8,
    pub cooldown_active: bool,
    pub last_violation_message: Option<String>,
}

impl SessionSnapshot {
    /// `MM:SS` rendering of the remaining time.
    pub fn formatted_remaining(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }
}

/// The Pomodoro session with face-down enforcement.
pub struct SessionClock {
    durations: Durations,
    phase: Phase,
    running: bool,
    remaining_secs: u64,
    require_face_down: bool,
    enforcement_armed: bool,
    face_down: bool,
    last_violation_message: Option<String>,
    ticker: Periodic,
    alerts: ViolationCoordinator,
    sensor: Arc<dyn OrientationSensor>,
    listener: Option<ReadingListener>,
}

impl fmt::Debug for SessionClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionClock")
            .field("durations", &self.durations)
            .field("phase", &self.phase)
            .field("running", &self.running)
            .field("remaining_secs", &self.remaining_secs)
            .field("require_face_down", &self.require_face_down)
            .field("enforcement_armed", &self.enforcement_armed)
            .field("face_down", &self.face_down)
            .field("alerts", &self.alerts)
            .finish_non_exhaustive()
    }
}

impl SessionClock {
    /// Create an idle work session. Face-down is required by default and no
    /// sensor is attached until [`with_sensor`](Self::with_sensor).
    pub fn new(durations: Durations, alerts: ViolationCoordinator) -> Self {
        Self {
            durations,
            phase: Phase::Work,
            running: false,
            remaining_secs: durations.seconds_for(Phase::Work),
            require_face_down: true,
            enforcement_armed: false,
            face_down: false,
            last_violation_message: None,
            ticker: Periodic::new(TICK_INTERVAL),
            alerts,
            sensor: Arc::new(NullSensor),
            listener: None,
        }
    }

    pub fn from_config(
        config: &Config,
        sensor: Arc<dyn OrientationSensor>,
        actuator: Arc<dyn AlertActuator>,
    ) -> Self {
        let alerts = ViolationCoordinator::new(actuator, config.alert_timing());
        Self::new(config.durations(), alerts)
            .with_sensor(sensor)
            .with_require_face_down(config.timer.require_face_down)
    }

    /// Default durations and alert timing with the given collaborators.
    pub fn with_devices(
        sensor: Arc<dyn OrientationSensor>,
        actuator: Arc<dyn AlertActuator>,
    ) -> Self {
        let alerts = ViolationCoordinator::new(actuator, AlertTiming::default());
        Self::new(Durations::default(), alerts).with_sensor(sensor)
    }

    pub fn with_sensor(mut self, sensor: Arc<dyn OrientationSensor>) -> Self {
        self.sensor = sensor;
        self
    }

    pub fn with_require_face_down(mut self, require: bool) -> Self {
        self.require_face_down = require;
        self
    }

    /// Where the sensor should deliver readings once monitoring starts.
    pub fn set_reading_listener(&mut self, listener: ReadingListener) {
        self.listener = Some(listener);
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn durations(&self) -> Durations {
        self.durations
    }

    pub fn require_face_down(&self) -> bool {
        self.require_face_down
    }

    pub fn is_face_down(&self) -> bool {
        self.face_down
    }

    pub fn is_enforcement_armed(&self) -> bool {
        self.enforcement_armed
    }

    pub fn last_violation_message(&self) -> Option<&str> {
        self.last_violation_message.as_deref()
    }

    pub fn alerts(&self) -> &ViolationCoordinator {
        &self.alerts
    }

    pub fn formatted_remaining(&self) -> String {
        format_mm_ss(self.remaining_secs)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            running: self.running,
            remaining_secs: self.remaining_secs,
            work_minutes: self.durations.work_minutes(),
            break_minutes: self.durations.break_minutes(),
            require_face_down: self.require_face_down,
            face_down: self.face_down,
            enforcement_armed: self.enforcement_armed,
            flashing_active: self.alerts.is_flashing(),
            flash_index: self.alerts.flash_index(),
            cooldown_active: self.alerts.is_cooldown_active(),
            last_violation_message: self.last_violation_message.clone(),
        }
    }

    /// Build a full state snapshot event.
    pub fn snapshot_event(&self) -> Event {
        Event::StateSnapshot {
            snapshot: self.snapshot(),
            at: Utc::now(),
        }
    }

    /// Earliest instant at which `advance` has work to do.
    pub fn next_wakeup(&self) -> Option<Instant> {
        match (self.ticker.due(), self.alerts.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Changes apply to the running countdown only at the next phase start.
    pub fn set_work_duration(&mut self, minutes: u32) -> Event {
        let minutes = self.durations.set_work_minutes(minutes);
        self.recompute_if_idle();
        Event::DurationChanged {
            phase: Phase::Work,
            minutes,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Changes apply to the running countdown only at the next phase start.
    pub fn set_break_duration(&mut self, minutes: u32) -> Event {
        let minutes = self.durations.set_break_minutes(minutes);
        self.recompute_if_idle();
        Event::DurationChanged {
            phase: Phase::Break,
            minutes,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Takes effect at the next tick; the armed flag is left as is.
    pub fn set_require_face_down(&mut self, require: bool) -> Option<Event> {
        if self.require_face_down == require {
            return None;
        }
        self.require_face_down = require;
        Some(Event::FaceDownRequirementChanged {
            require_face_down: require,
            at: Utc::now(),
        })
    }

    pub fn toggle_running(&mut self, now: Instant) -> Vec<Event> {
        if self.running {
            self.pause()
        } else {
            self.start(now)
        }
    }

    pub fn start(&mut self, now: Instant) -> Vec<Event> {
        if self.running {
            return Vec::new();
        }
        if self.remaining_secs == 0 {
            self.remaining_secs = self.durations.seconds_for(self.phase);
        }
        self.running = true;
        // Must go face-down again after every start.
        self.enforcement_armed = false;
        self.ticker.start(now);
        self.start_monitoring();
        info!(phase = ?self.phase, remaining_secs = self.remaining_secs, "session started");
        vec![Event::TimerStarted {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }]
    }

    pub fn pause(&mut self) -> Vec<Event> {
        if !self.running {
            return Vec::new();
        }
        let mut events = Vec::new();
        self.halt(&mut events);
        info!(phase = ?self.phase, remaining_secs = self.remaining_secs, "session paused");
        events.push(Event::TimerPaused {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        });
        events
    }

    pub fn reset(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        self.halt(&mut events);
        self.phase = Phase::Work;
        self.enforcement_armed = false;
        self.remaining_secs = self.durations.seconds_for(Phase::Work);
        self.last_violation_message = None;
        info!(remaining_secs = self.remaining_secs, "session reset");
        events.push(Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        });
        events
    }

    pub fn on_sensor_reading(&mut self, face_down: bool) -> Vec<Event> {
        let mut events = Vec::new();
        if face_down != self.face_down {
            debug!(face_down, "orientation changed");
            events.push(Event::OrientationChanged {
                face_down,
                at: Utc::now(),
            });
        }
        self.face_down = face_down;

        if face_down && self.enforcing() && !self.enforcement_armed {
            self.enforcement_armed = true;
            self.last_violation_message = Some(ARMED_MESSAGE.to_string());
            info!("face-down enforcement armed");
            events.push(Event::EnforcementArmed { at: Utc::now() });
        }

        // Compliance cancels punishment immediately, armed or not.
        if face_down && self.alerts.stop_all() {
            events.push(Event::AlertsStopped {
                reason: StopReason::Compliance,
                at: Utc::now(),
            });
        }
        events
    }

    /// One second of session time.
    pub fn on_tick(&mut self, now: Instant) -> Vec<Event> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }

        if self.enforcing() && self.enforcement_armed && !self.face_down {
            if let Some(event) = self.alerts.trigger_if_allowed(VIOLATION_MESSAGE, now) {
                warn!(remaining_secs = self.remaining_secs, "picked up during work");
                self.last_violation_message = Some(VIOLATION_MESSAGE.to_string());
                events.push(event);
            }
        }

        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        } else {
            self.next_phase(&mut events);
        }
        events
    }

    /// Run alert deadlines and every whole tick that elapsed up to `now`.
    pub fn advance(&mut self, now: Instant) -> Vec<Event> {
        let mut events = self.alerts.advance(now);
        let ticks = self.ticker.fire(now);
        for _ in 0..ticks {
            if !self.running {
                break;
            }
            events.extend(self.on_tick(now));
        }
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn enforcing(&self) -> bool {
        self.running && self.phase == Phase::Work && self.require_face_down
    }

    fn recompute_if_idle(&mut self) {
        if !self.running {
            self.remaining_secs = self.durations.seconds_for(self.phase);
        }
    }

    fn start_monitoring(&self) {
        match &self.listener {
            Some(listener) => {
                if let Err(err) = self.sensor.start(Arc::clone(listener)) {
                    warn!(error = %err, "orientation sensor unavailable; enforcement cannot arm");
                }
            }
            None => debug!("no reading listener registered; sensor not started"),
        }
    }

    /// Stop the tick, sensor and every alert timer.
    fn halt(&mut self, events: &mut Vec<Event>) {
        self.running = false;
        self.enforcement_armed = false;
        self.ticker.stop();
        self.sensor.stop();
        if self.alerts.cancel_all() {
            events.push(Event::AlertsStopped {
                reason: StopReason::Paused,
                at: Utc::now(),
            });
        }
    }

    fn next_phase(&mut self, events: &mut Vec<Event>) {
        let from = self.phase;
        self.phase = from.toggled();
        self.remaining_secs = self.durations.seconds_for(self.phase);
        self.last_violation_message = None;
        if self.alerts.stop_all() {
            events.push(Event::AlertsStopped {
                reason: StopReason::PhaseChanged,
                at: Utc::now(),
            });
        }
        // Cleared for both phases; break never arms.
        self.enforcement_armed = false;
        info!(from = ?from, to = ?self.phase, "phase advanced");
        events.push(Event::PhaseAdvanced {
            from,
            to: self.phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        });
    }
}

/// `MM:SS` rendering of a second count; minutes are not wrapped into hours.
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::NullActuator;

    fn clock() -> SessionClock {
        SessionClock::with_devices(Arc::new(NullSensor), Arc::new(NullActuator))
    }

    #[test]
    fn new_session_is_idle_work() {
        let c = clock();
        assert_eq!(c.phase(), Phase::Work);
        assert!(!c.is_running());
        assert_eq!(c.remaining_secs(), 25 * 60);
        assert!(c.require_face_down());
        assert!(!c.is_face_down());
        assert_eq!(c.formatted_remaining(), "25:00");
    }

    #[test]
    fn toggle_starts_and_pauses() {
        let mut c = clock();
        let t0 = Instant::now();
        let started = c.toggle_running(t0);
        assert!(matches!(started.as_slice(), [Event::TimerStarted { .. }]));
        assert!(c.is_running());
        assert_eq!(c.next_wakeup(), Some(t0 + TICK_INTERVAL));

        let paused = c.toggle_running(t0);
        assert!(matches!(paused.last(), Some(Event::TimerPaused { .. })));
        assert!(!c.is_running());
        assert_eq!(c.next_wakeup(), None);
    }

    #[test]
    fn start_refills_exhausted_countdown() {
        let mut c = clock();
        c.remaining_secs = 0;
        c.start(Instant::now());
        assert_eq!(c.remaining_secs(), 25 * 60);
    }

    #[test]
    fn duration_change_while_running_keeps_countdown() {
        let mut c = clock();
        let t0 = Instant::now();
        c.start(t0);
        c.advance(t0 + Duration::from_secs(2));
        assert_eq!(c.remaining_secs(), 25 * 60 - 2);

        c.set_work_duration(40);
        assert_eq!(c.remaining_secs(), 25 * 60 - 2);
        assert_eq!(c.durations().work_minutes(), 40);
    }

    #[test]
    fn arming_requires_running_work_and_requirement() {
        let mut c = clock();
        c.on_sensor_reading(true);
        assert!(!c.is_enforcement_armed());

        c.set_require_face_down(false);
        c.start(Instant::now());
        c.on_sensor_reading(true);
        assert!(!c.is_enforcement_armed());
    }

    #[test]
    fn requirement_toggle_does_not_disarm() {
        let mut c = clock();
        let t0 = Instant::now();
        c.start(t0);
        c.on_sensor_reading(true);
        assert!(c.is_enforcement_armed());

        assert!(c.set_require_face_down(false).is_some());
        assert!(c.set_require_face_down(false).is_none());
        assert!(c.is_enforcement_armed());

        c.on_sensor_reading(false);
        let events = c.on_tick(t0 + TICK_INTERVAL);
        assert!(!events.iter().any(|e| matches!(e, Event::ViolationTriggered { .. })));
    }

    #[test]
    fn orientation_event_only_on_change() {
        let mut c = clock();
        assert!(c.on_sensor_reading(false).is_empty());
        let events = c.on_sensor_reading(true);
        assert!(matches!(events.as_slice(), [Event::OrientationChanged { face_down: true, .. }]));
        assert!(c.on_sensor_reading(true).is_empty());
    }

    #[test]
    fn tick_is_ignored_while_paused() {
        let mut c = clock();
        assert!(c.on_tick(Instant::now()).is_empty());
        assert_eq!(c.remaining_secs(), 25 * 60);
    }

    #[test]
    fn mm_ss_pads_and_keeps_long_minutes() {
        assert_eq!(format_mm_ss(0), "00:00");
        assert_eq!(format_mm_ss(65), "01:05");
        assert_eq!(format_mm_ss(3599), "59:59");
        assert_eq!(format_mm_ss(3600), "60:00");
    }

    #[test]
    fn snapshot_formats_remaining() {
        let mut c = clock();
        c.set_break_duration(7);
        c.set_work_duration(10);
        let snap = c.snapshot();
        assert_eq!(snap.remaining_secs, 600);
        assert_eq!(snap.formatted_remaining(), "10:00");
        assert_eq!(snap.break_minutes, 7);
        assert!(matches!(c.snapshot_event(), Event::StateSnapshot { .. }));
    }
}
