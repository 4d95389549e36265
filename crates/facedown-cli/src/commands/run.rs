use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use facedown_core::timer::{format_mm_ss, ARMED_MESSAGE};
use facedown_core::{
    Config, EnforcementStatus, Event, Phase, SessionClock, SessionHandle, SessionRuntime,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

use crate::device::{KeyboardSensor, TerminalActuator};

#[derive(Args)]
pub struct RunArgs {
    /// Work duration in minutes (overrides config)
    #[arg(long)]
    work: Option<u32>,
    /// Break duration in minutes (overrides config)
    #[arg(long = "break")]
    break_minutes: Option<u32>,
    /// Do not enforce face-down during work
    #[arg(long)]
    no_face_down: bool,
    /// Print events as JSON lines
    #[arg(long)]
    json: bool,
}

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    FaceDown(bool),
    Gravity(f64),
    Toggle,
    Reset,
    Work(u32),
    Break(u32),
    Require(bool),
    Status,
    Quit,
    Help,
}

const HELP: &str = "\
  s        start / pause
  r        reset
  d        phone face-down
  u        phone picked up
  g <z>    gravity z reading (face-down above the threshold)
  w <min>  work duration
  b <min>  break duration
  f on|off require face-down
  ?        status
  h        help
  q        quit";

pub fn parse_input(line: &str) -> Option<Input> {
    let mut parts = line.split_whitespace();
    let word = parts.next()?;
    let arg = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let input = match (word, arg) {
        ("s" | "start" | "pause", None) => Input::Toggle,
        ("r" | "reset", None) => Input::Reset,
        ("d" | "down", None) => Input::FaceDown(true),
        ("u" | "up", None) => Input::FaceDown(false),
        ("g" | "gravity", Some(z)) => Input::Gravity(z.parse().ok()?),
        ("w" | "work", Some(n)) => Input::Work(n.parse().ok()?),
        ("b" | "break", Some(n)) => Input::Break(n.parse().ok()?),
        ("f" | "require", Some("on")) => Input::Require(true),
        ("f" | "require", Some("off")) => Input::Require(false),
        ("?" | "status", None) => Input::Status,
        ("q" | "quit" | "exit", None) => Input::Quit,
        ("h" | "help", None) => Input::Help,
        _ => return None,
    };
    Some(input)
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load_or_default();
    if let Some(minutes) = args.work {
        config.timer.work_minutes = minutes;
    }
    if let Some(minutes) = args.break_minutes {
        config.timer.break_minutes = minutes;
    }
    if args.no_face_down {
        config.timer.require_face_down = false;
    }

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(session(config, args.json));
    // A pending stdin read would otherwise hold up shutdown.
    runtime.shutdown_background();
    result
}

async fn session(config: Config, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let sensor = Arc::new(KeyboardSensor::new(config.classifier()));
    let actuator = Arc::new(TerminalActuator::default());
    let clock = SessionClock::from_config(&config, sensor.clone(), actuator);
    let (handle, task) = SessionRuntime::spawn(clock);
    let printer = tokio::spawn(print_events(handle.subscribe(), json));
    let sampler = tokio::spawn(sample(Arc::clone(&sensor), config.sample_interval()));

    if !json {
        print_status(&handle);
        println!("{HELP}");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let Some(input) = parse_input(&line) else {
            eprintln!("unrecognized input: {} (h for help)", line.trim());
            continue;
        };
        debug!(?input, "user input");
        match input {
            Input::FaceDown(face_down) => sensor.set_face_down(face_down),
            Input::Gravity(z) => {
                let face_down = sensor.set_gravity(z);
                debug!(gravity_z = z, face_down, "gravity reading");
            }
            Input::Toggle => handle.toggle_running()?,
            Input::Reset => handle.reset()?,
            Input::Work(minutes) => handle.set_work_duration(minutes)?,
            Input::Break(minutes) => handle.set_break_duration(minutes)?,
            Input::Require(require) => handle.set_require_face_down(require)?,
            Input::Status => print_status(&handle),
            Input::Help => println!("{HELP}"),
            Input::Quit => break,
        }
    }

    sampler.abort();
    handle.shutdown()?;
    task.await?;
    // The printer ends once the last event sender is gone.
    drop(handle);
    printer.await?;
    Ok(())
}

/// Re-report the current orientation every `period`, like a motion sensor.
async fn sample(sensor: Arc<KeyboardSensor>, period: Duration) {
    let mut ticks = time::interval(period);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticks.tick().await;
        sensor.sample();
    }
}

async fn print_events(mut events: broadcast::Receiver<Event>, json: bool) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if json {
                    match serde_json::to_string(&event) {
                        Ok(line) => println!("{line}"),
                        Err(e) => warn!("failed to encode event: {e}"),
                    }
                } else if let Some(line) = describe(&event) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event printer lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn print_status(handle: &SessionHandle) {
    let snapshot = handle.snapshot();
    let state = if snapshot.running { "running" } else { "paused" };
    println!(
        "{} {} ({state})",
        snapshot.phase.label(),
        snapshot.formatted_remaining()
    );
    if let Some(status) = EnforcementStatus::of(&snapshot) {
        println!("{}", status.message());
    }
    if let Some(message) = &snapshot.last_violation_message {
        println!("{message}");
    }
}

/// Human line for an event; `None` for the ones only worth logging.
fn describe(event: &Event) -> Option<String> {
    let line = match event {
        Event::TimerStarted {
            phase,
            remaining_secs,
            ..
        } => format!("{} started, {} left", phase.label(), format_mm_ss(*remaining_secs)),
        Event::TimerPaused {
            phase,
            remaining_secs,
            ..
        } => format!("{} paused at {}", phase.label(), format_mm_ss(*remaining_secs)),
        Event::TimerReset { remaining_secs, .. } => {
            format!("reset to {}", format_mm_ss(*remaining_secs))
        }
        Event::DurationChanged { phase, minutes, .. } => {
            format!("{} duration set to {minutes} min", phase.label())
        }
        Event::FaceDownRequirementChanged {
            require_face_down, ..
        } => {
            if *require_face_down {
                "face-down required during work".to_string()
            } else {
                "face-down no longer required".to_string()
            }
        }
        Event::EnforcementArmed { .. } => ARMED_MESSAGE.to_string(),
        Event::ViolationTriggered { message, .. } => message.clone(),
        Event::PhaseAdvanced {
            to: Phase::Break,
            remaining_secs,
            ..
        } => format!("work done, break for {}", format_mm_ss(*remaining_secs)),
        Event::PhaseAdvanced { remaining_secs, .. } => {
            format!("break over, work for {}", format_mm_ss(*remaining_secs))
        }
        Event::OrientationChanged { .. }
        | Event::AlertsStopped { .. }
        | Event::CooldownExpired { .. }
        | Event::FlashExpired { .. }
        | Event::StrobeExpired { .. }
        | Event::StateSnapshot { .. } => return None,
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_single_letters() {
        assert_eq!(parse_input("s"), Some(Input::Toggle));
        assert_eq!(parse_input("r"), Some(Input::Reset));
        assert_eq!(parse_input("d"), Some(Input::FaceDown(true)));
        assert_eq!(parse_input("u"), Some(Input::FaceDown(false)));
        assert_eq!(parse_input("?"), Some(Input::Status));
        assert_eq!(parse_input("q"), Some(Input::Quit));
    }

    #[test]
    fn test_parse_arguments() {
        assert_eq!(parse_input("w 40"), Some(Input::Work(40)));
        assert_eq!(parse_input("  break 7 "), Some(Input::Break(7)));
        assert_eq!(parse_input("f off"), Some(Input::Require(false)));
        assert_eq!(parse_input("g 0.9"), Some(Input::Gravity(0.9)));
        assert_eq!(parse_input("gravity -1"), Some(Input::Gravity(-1.0)));
        assert_eq!(parse_input("require on"), Some(Input::Require(true)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_input(""), None);
        assert_eq!(parse_input("w"), None);
        assert_eq!(parse_input("w ten"), None);
        assert_eq!(parse_input("s now"), None);
        assert_eq!(parse_input("f maybe"), None);
        assert_eq!(parse_input("g up"), None);
        assert_eq!(parse_input("w 10 20"), None);
    }

    #[test]
    fn test_describe_phase_change() {
        let event = Event::PhaseAdvanced {
            from: Phase::Work,
            to: Phase::Break,
            remaining_secs: 300,
            at: Utc::now(),
        };
        assert_eq!(describe(&event).unwrap(), "work done, break for 05:00");
        assert!(describe(&Event::CooldownExpired { at: Utc::now() }).is_none());
    }
}
