//! # Facedown Core Library
//!
//! This library provides the core logic of Facedown, a focus timer that
//! punishes picking the phone up during work. The desktop or mobile shell
//! renders state and forwards user intents; everything that decides what
//! happens lives here.
//!
//! ## Architecture
//!
//! - **Session clock**: A wall-clock-based Pomodoro state machine with
//!   face-down arming and violation detection
//! - **Alerts**: Debounced alert triggering plus the timed flash overlay
//! - **Devices**: Capability traits for the orientation sensor, the alert
//!   actuator and the camera permission prompt
//! - **Runtime**: A tokio task that is the single writer of session state
//!
//! ## Key Components
//!
//! - [`SessionClock`]: Core session state machine
//! - [`ViolationCoordinator`]: Alert debouncing and flash lifecycle
//! - [`SessionRuntime`]: Async driver with command/snapshot channels
//! - [`Config`]: Application configuration management

pub mod alert;
pub mod config;
pub mod device;
pub mod error;
pub mod events;
pub mod onboarding;
pub mod runtime;
pub mod status;
pub mod timer;

pub use alert::{AlertPhase, AlertTiming, ViolationCoordinator};
pub use config::Config;
pub use device::{
    AlertActuator, GravityClassifier, NullActuator, NullSensor, OrientationSensor,
    PermissionGate, ReadingListener, StaticGate,
};
pub use error::{ConfigError, CoreError, DeviceError, RuntimeError};
pub use events::{Event, StopReason};
pub use onboarding::{complete_onboarding, OnboardingOutcome};
pub use runtime::{Command, SessionHandle, SessionRuntime};
pub use status::{EnforcementStatus, Indicator};
pub use timer::{Durations, Phase, SessionClock, SessionSnapshot};
