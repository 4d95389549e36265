use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{Phase, SessionSnapshot};

/// Why alert output was silenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The phone went back face-down.
    Compliance,
    /// The user paused or reset the session.
    Paused,
    /// The session moved to the next phase.
    PhaseChanged,
}

/// Every state change in the session produces an Event.
/// The UI renders from snapshots; observers subscribe to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    DurationChanged {
        phase: Phase,
        minutes: u32,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    FaceDownRequirementChanged {
        require_face_down: bool,
        at: DateTime<Utc>,
    },
    OrientationChanged {
        face_down: bool,
        at: DateTime<Utc>,
    },
    /// First face-down reading after a start during an enforced work phase.
    EnforcementArmed {
        at: DateTime<Utc>,
    },
    ViolationTriggered {
        message: String,
        at: DateTime<Utc>,
    },
    AlertsStopped {
        reason: StopReason,
        at: DateTime<Utc>,
    },
    PhaseAdvanced {
        from: Phase,
        to: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    /// Debounce window closed; a new violation may trigger again.
    CooldownExpired {
        at: DateTime<Utc>,
    },
    FlashExpired {
        at: DateTime<Utc>,
    },
    StrobeExpired {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        snapshot: SessionSnapshot,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Snake-case name of the variant, for log fields and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::TimerStarted { .. } => "timer_started",
            Event::TimerPaused { .. } => "timer_paused",
            Event::TimerReset { .. } => "timer_reset",
            Event::DurationChanged { .. } => "duration_changed",
            Event::FaceDownRequirementChanged { .. } => "face_down_requirement_changed",
            Event::OrientationChanged { .. } => "orientation_changed",
            Event::EnforcementArmed { .. } => "enforcement_armed",
            Event::ViolationTriggered { .. } => "violation_triggered",
            Event::AlertsStopped { .. } => "alerts_stopped",
            Event::PhaseAdvanced { .. } => "phase_advanced",
            Event::CooldownExpired { .. } => "cooldown_expired",
            Event::FlashExpired { .. } => "flash_expired",
            Event::StrobeExpired { .. } => "strobe_expired",
            Event::StateSnapshot { .. } => "state_snapshot",
        }
    }
}
