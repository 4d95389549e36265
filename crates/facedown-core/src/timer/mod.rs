mod deadline;
mod engine;
mod schedule;

pub use deadline::{Deadline, Periodic};
pub use engine::{
    format_mm_ss, SessionClock, SessionSnapshot, ARMED_MESSAGE, TICK_INTERVAL, VIOLATION_MESSAGE,
};
pub use schedule::{
    Durations, Phase, BREAK_MINUTES, BREAK_STEP, DEFAULT_BREAK_MINUTES, DEFAULT_WORK_MINUTES,
    WORK_MINUTES, WORK_STEP,
};
