//! Async driver for [`SessionClock`].
//!
//! A single tokio task owns the clock and is its only writer. User
//! commands and sensor readings reach it over channels; the task sleeps
//! until the clock's next deadline (tick, flash frame, cooldown, strobe)
//! and then calls `advance`. Nothing else can mutate session state, so
//! tick, sensor and alert-expiry work never race.
//!
//! ```ignore
//! let (handle, task) = SessionRuntime::spawn(clock);
//! handle.toggle_running()?;
//! let mut snapshots = handle.watch();
//! while snapshots.changed().await.is_ok() {
//!     render(&snapshots.borrow());
//! }
//! ```

use std::future::pending;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info};

use crate::device::ReadingListener;
use crate::error::RuntimeError;
use crate::events::Event;
use crate::timer::{SessionClock, SessionSnapshot};

/// Events kept for slow subscribers before they start lagging.
const EVENT_CAPACITY: usize = 64;

/// User intents accepted by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SetWorkDuration(u32),
    SetBreakDuration(u32),
    SetRequireFaceDown(bool),
    ToggleRunning,
    Reset,
    Shutdown,
}

/// Cloneable front end to a running session task.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<Command>,
    readings: mpsc::UnboundedSender<bool>,
    snapshots: watch::Receiver<SessionSnapshot>,
    events: broadcast::Sender<Event>,
}

impl SessionHandle {
    pub fn set_work_duration(&self, minutes: u32) -> Result<(), RuntimeError> {
        self.send(Command::SetWorkDuration(minutes))
    }

    pub fn set_break_duration(&self, minutes: u32) -> Result<(), RuntimeError> {
        self.send(Command::SetBreakDuration(minutes))
    }

    pub fn set_require_face_down(&self, require: bool) -> Result<(), RuntimeError> {
        self.send(Command::SetRequireFaceDown(require))
    }

    pub fn toggle_running(&self) -> Result<(), RuntimeError> {
        self.send(Command::ToggleRunning)
    }

    pub fn reset(&self) -> Result<(), RuntimeError> {
        self.send(Command::Reset)
    }

    /// Pause the session and end the task.
    pub fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Command::Shutdown)
    }

    /// Feed a face-down reading as if it came from the sensor.
    pub fn push_reading(&self, face_down: bool) -> Result<(), RuntimeError> {
        self.readings
            .send(face_down)
            .map_err(|_| RuntimeError::Stopped)
    }

    /// Listener that forwards sensor readings into the task.
    pub fn reading_listener(&self) -> ReadingListener {
        let readings = self.readings.clone();
        Arc::new(move |face_down| {
            // The task is gone; late readings have nowhere to go.
            let _ = readings.send(face_down);
        })
    }

    /// Latest published state.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }

    fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.commands
            .send(command)
            .map_err(|_| RuntimeError::Stopped)
    }
}

/// The task side: owns the clock and every channel receiver.
pub struct SessionRuntime {
    clock: SessionClock,
    commands: mpsc::UnboundedReceiver<Command>,
    readings: mpsc::UnboundedReceiver<bool>,
    snapshots: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<Event>,
}

impl SessionRuntime {
    /// Spawn the session task on the current tokio runtime.
    ///
    /// The clock's sensor is wired to deliver readings into the task.
    pub fn spawn(mut clock: SessionClock) -> (SessionHandle, JoinHandle<()>) {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (reading_tx, reading_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(clock.snapshot());
        let (event_tx, _) = broadcast::channel(EVENT_CAPACITY);

        let handle = SessionHandle {
            commands: command_tx,
            readings: reading_tx,
            snapshots: snapshot_rx,
            events: event_tx.clone(),
        };
        clock.set_reading_listener(handle.reading_listener());

        let runtime = SessionRuntime {
            clock,
            commands: command_rx,
            readings: reading_rx,
            snapshots: snapshot_tx,
            events: event_tx,
        };
        let task = tokio::spawn(runtime.run());
        (handle, task)
    }

    async fn run(mut self) {
        info!("session runtime started");
        loop {
            let wake = self.clock.next_wakeup().map(Instant::from_std);
            // Readings first so compliance is never queued behind a command.
            let events = tokio::select! {
                biased;
                Some(face_down) = self.readings.recv() => self.clock.on_sensor_reading(face_down),
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                _ = sleep_until(wake) => self.clock.advance(now()),
            };
            self.publish(events);
        }

        let events = self.clock.pause();
        self.publish(events);
        info!("session runtime stopped");
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        debug!(?command, "applying command");
        match command {
            Command::SetWorkDuration(minutes) => vec![self.clock.set_work_duration(minutes)],
            Command::SetBreakDuration(minutes) => vec![self.clock.set_break_duration(minutes)],
            Command::SetRequireFaceDown(require) => {
                self.clock.set_require_face_down(require).into_iter().collect()
            }
            Command::ToggleRunning => self.clock.toggle_running(now()),
            Command::Reset => self.clock.reset(),
            Command::Shutdown => Vec::new(),
        }
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            debug!(kind = event.kind(), "session event");
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
        let snapshot = self.clock.snapshot();
        self.snapshots.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

fn now() -> std::time::Instant {
    Instant::now().into_std()
}

async fn sleep_until(wake: Option<Instant>) {
    match wake {
        Some(at) => time::sleep_until(at).await,
        None => pending::<()>().await,
    }
}
