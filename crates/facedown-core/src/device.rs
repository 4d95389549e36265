//! Capability traits for the hardware the session depends on.
//!
//! The core only talks to the outside world through these traits. One
//! instance of each is built at startup and shared by reference (`Arc`).
//! Adapters report failures as [`DeviceError`]; callers in the core log
//! and drop them, so a missing sensor or torch degrades to "nothing
//! happens" instead of an error.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Callback receiving face-down readings from a sensor.
pub type ReadingListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Pushes face-down readings (~5 Hz) to a registered listener.
pub trait OrientationSensor: Send + Sync {
    /// Begin delivering readings to `listener`.
    fn start(&self, listener: ReadingListener) -> Result<(), DeviceError>;

    /// Stop delivering readings. No reading may reach the listener after
    /// this returns. Must be safe to call when already stopped.
    fn stop(&self);
}

/// Drives the loud sound and strobing light.
pub trait AlertActuator: Send + Sync {
    /// Begin looping sound and strobe at full intensity. Idempotent.
    fn start_alert(&self) -> Result<(), DeviceError>;

    /// Silence and darken immediately. Idempotent.
    fn stop_alert(&self) -> Result<(), DeviceError>;

    /// Turn off only the strobe, leaving the sound looping.
    fn stop_strobe(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Camera access prompt, used once during onboarding.
pub trait PermissionGate: Send + Sync {
    fn request_camera_access(&self) -> bool;
}

/// Sensor for devices without motion hardware. Never reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSensor;

impl OrientationSensor for NullSensor {
    fn start(&self, _listener: ReadingListener) -> Result<(), DeviceError> {
        Err(DeviceError::Unavailable("orientation sensor".into()))
    }

    fn stop(&self) {}
}

/// Actuator that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullActuator;

impl AlertActuator for NullActuator {
    fn start_alert(&self) -> Result<(), DeviceError> {
        Ok(())
    }

    fn stop_alert(&self) -> Result<(), DeviceError> {
        Ok(())
    }
}

/// Gate with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(pub bool);

impl PermissionGate for StaticGate {
    fn request_camera_access(&self) -> bool {
        self.0
    }
}

/// Gravity z-component above which the screen counts as facing down.
pub const DEFAULT_FACE_DOWN_THRESHOLD: f64 = 0.7;

/// Turns raw gravity vectors into face-down readings.
///
/// In device coordinates gravity z is about +1 when the screen faces the
/// table and about -1 when it faces up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityClassifier {
    pub threshold: f64,
}

impl Default for GravityClassifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_FACE_DOWN_THRESHOLD,
        }
    }
}

impl GravityClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn is_face_down(&self, gravity_z: f64) -> bool {
        gravity_z > self.threshold
    }
}
