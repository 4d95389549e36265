use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

/// Allowed work interval lengths in minutes.
pub const WORK_MINUTES: RangeInclusive<u32> = 10..=60;
/// Work durations move in steps of this many minutes.
pub const WORK_STEP: u32 = 5;
/// Allowed break interval lengths in minutes.
pub const BREAK_MINUTES: RangeInclusive<u32> = 3..=30;
pub const BREAK_STEP: u32 = 1;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Work,
    Break,
}

impl Phase {
    /// The phase that follows this one in the cycle.
    pub fn toggled(self) -> Self {
        match self {
            Phase::Work => Phase::Break,
            Phase::Break => Phase::Work,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Work => "Work",
            Phase::Break => "Break",
        }
    }
}

/// Work and break lengths, always kept inside their allowed ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDurations")]
pub struct Durations {
    work_minutes: u32,
    break_minutes: u32,
}

/// Unchecked wire form; every deserialized value goes through `Durations::new`.
#[derive(Deserialize)]
struct RawDurations {
    work_minutes: u32,
    break_minutes: u32,
}

impl From<RawDurations> for Durations {
    fn from(raw: RawDurations) -> Self {
        Durations::new(raw.work_minutes, raw.break_minutes)
    }
}

impl Default for Durations {
    fn default() -> Self {
        Self {
            work_minutes: DEFAULT_WORK_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
        }
    }
}

impl Durations {
    /// Build from raw minutes, clamping and snapping each value.
    pub fn new(work_minutes: u32, break_minutes: u32) -> Self {
        Self {
            work_minutes: clamp_to_step(work_minutes, &WORK_MINUTES, WORK_STEP),
            break_minutes: clamp_to_step(break_minutes, &BREAK_MINUTES, BREAK_STEP),
        }
    }

    pub fn work_minutes(&self) -> u32 {
        self.work_minutes
    }

    pub fn break_minutes(&self) -> u32 {
        self.break_minutes
    }

    /// Returns the value actually stored.
    pub fn set_work_minutes(&mut self, minutes: u32) -> u32 {
        self.work_minutes = clamp_to_step(minutes, &WORK_MINUTES, WORK_STEP);
        self.work_minutes
    }

    /// Returns the value actually stored.
    pub fn set_break_minutes(&mut self, minutes: u32) -> u32 {
        self.break_minutes = clamp_to_step(minutes, &BREAK_MINUTES, BREAK_STEP);
        self.break_minutes
    }

    pub fn minutes_for(&self, phase: Phase) -> u32 {
        match phase {
            Phase::Work => self.work_minutes,
            Phase::Break => self.break_minutes,
        }
    }

    /// Full length of a phase in seconds.
    pub fn seconds_for(&self, phase: Phase) -> u64 {
        u64::from(self.minutes_for(phase)).saturating_mul(60)
    }
}

/// Clamp into `range`, then snap to the nearest multiple of `step` above
/// the range start.
fn clamp_to_step(value: u32, range: &RangeInclusive<u32>, step: u32) -> u32 {
    let (min, max) = (*range.start(), *range.end());
    let clamped = value.clamp(min, max);
    if step <= 1 {
        return clamped;
    }
    let offset = clamped - min;
    let snapped = min + ((offset + step / 2) / step) * step;
    snapped.min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_classic_pomodoro() {
        let d = Durations::default();
        assert_eq!(d.work_minutes(), 25);
        assert_eq!(d.break_minutes(), 5);
        assert_eq!(d.seconds_for(Phase::Work), 1500);
        assert_eq!(d.seconds_for(Phase::Break), 300);
    }

    #[test]
    fn work_minutes_clamp_and_snap() {
        let mut d = Durations::default();
        assert_eq!(d.set_work_minutes(0), 10);
        assert_eq!(d.set_work_minutes(90), 60);
        assert_eq!(d.set_work_minutes(27), 25);
        assert_eq!(d.set_work_minutes(28), 30);
        assert_eq!(d.set_work_minutes(45), 45);
    }

    #[test]
    fn deserialize_clamps_like_new() {
        let d: Durations =
            serde_json::from_str(r#"{"work_minutes": 99, "break_minutes": 0}"#).unwrap();
        assert_eq!(d, Durations::new(99, 0));
        assert_eq!(d.work_minutes(), 60);
        assert_eq!(d.break_minutes(), 3);

        let d: Durations =
            serde_json::from_str(r#"{"work_minutes": 27, "break_minutes": 5}"#).unwrap();
        assert_eq!(d.work_minutes(), 25);
    }

    #[test]
    fn break_minutes_clamp() {
        let mut d = Durations::default();
        assert_eq!(d.set_break_minutes(1), 3);
        assert_eq!(d.set_break_minutes(31), 30);
        assert_eq!(d.set_break_minutes(17), 17);
    }

    #[test]
    fn phase_toggles() {
        assert_eq!(Phase::Work.toggled(), Phase::Break);
        assert_eq!(Phase::Break.toggled(), Phase::Work);
        assert_eq!(Phase::default(), Phase::Work);
    }
}
