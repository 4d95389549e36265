//! Enforcement status line shown under the timer controls.

use serde::{Deserialize, Serialize};

use crate::timer::{Phase, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnforcementStatus {
    /// Timer idle; waiting for the user to press start.
    WaitingForStart,
    /// Running, but the phone has not been face-down yet.
    Arming,
    /// Armed and face-down.
    Compliant,
    /// Armed and face-up; the next tick will punish.
    AtRisk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Indicator {
    Yellow,
    Green,
    Red,
}

impl EnforcementStatus {
    /// `None` outside enforced work phases, where no status line is shown.
    pub fn of(snapshot: &SessionSnapshot) -> Option<Self> {
        if snapshot.phase != Phase::Work || !snapshot.require_face_down {
            return None;
        }
        let status = if !snapshot.running {
            EnforcementStatus::WaitingForStart
        } else if !snapshot.enforcement_armed {
            EnforcementStatus::Arming
        } else if snapshot.face_down {
            EnforcementStatus::Compliant
        } else {
            EnforcementStatus::AtRisk
        };
        Some(status)
    }

    pub fn message(self) -> &'static str {
        match self {
            EnforcementStatus::WaitingForStart => "Press Start, then put the phone face-down",
            EnforcementStatus::Arming => "Arming: put the phone face-down to begin enforcement",
            EnforcementStatus::Compliant => "Armed: screen down (good)",
            EnforcementStatus::AtRisk => "Violation if not down (stay down!)",
        }
    }

    pub fn indicator(self) -> Indicator {
        match self {
            EnforcementStatus::WaitingForStart | EnforcementStatus::Arming => Indicator::Yellow,
            EnforcementStatus::Compliant => Indicator::Green,
            EnforcementStatus::AtRisk => Indicator::Red,
        }
    }
}
