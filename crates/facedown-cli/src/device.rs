//! Terminal stand-ins for the phone hardware.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use facedown_core::{
    AlertActuator, DeviceError, GravityClassifier, OrientationSensor, PermissionGate,
    ReadingListener,
};

/// Orientation typed by the user, either directly or as a gravity z value.
/// Like a motion sensor it reports the current orientation as soon as it
/// starts, on every change, and again on each [`sample`](Self::sample).
#[derive(Default)]
pub struct KeyboardSensor {
    classifier: GravityClassifier,
    face_down: AtomicBool,
    listener: Mutex<Option<ReadingListener>>,
}

impl KeyboardSensor {
    pub fn new(classifier: GravityClassifier) -> Self {
        Self {
            classifier,
            ..Self::default()
        }
    }

    pub fn set_face_down(&self, face_down: bool) {
        self.face_down.store(face_down, Ordering::SeqCst);
        self.deliver(face_down);
    }

    /// Classify a raw gravity z reading. Returns the orientation it maps to.
    pub fn set_gravity(&self, gravity_z: f64) -> bool {
        let face_down = self.classifier.is_face_down(gravity_z);
        self.set_face_down(face_down);
        face_down
    }

    /// Report the current orientation again, as a periodic sensor would.
    pub fn sample(&self) {
        self.deliver(self.face_down.load(Ordering::SeqCst));
    }

    fn deliver(&self, face_down: bool) {
        if let Ok(guard) = self.listener.lock() {
            if let Some(listener) = guard.as_ref() {
                listener(face_down);
            }
        }
    }
}

impl OrientationSensor for KeyboardSensor {
    fn start(&self, listener: ReadingListener) -> Result<(), DeviceError> {
        let mut guard = self
            .listener
            .lock()
            .map_err(|_| DeviceError::Hardware("sensor lock poisoned".into()))?;
        listener(self.face_down.load(Ordering::SeqCst));
        *guard = Some(listener);
        Ok(())
    }

    fn stop(&self) {
        if let Ok(mut guard) = self.listener.lock() {
            *guard = None;
        }
    }
}

/// Rings the terminal bell and shouts on stderr.
#[derive(Default)]
pub struct TerminalActuator {
    active: AtomicBool,
}

impl AlertActuator for TerminalActuator {
    fn start_alert(&self) -> Result<(), DeviceError> {
        if !self.active.swap(true, Ordering::SeqCst) {
            eprintln!("\x07!!! ALARM !!! put the phone back down");
        }
        Ok(())
    }

    fn stop_alert(&self) -> Result<(), DeviceError> {
        if self.active.swap(false, Ordering::SeqCst) {
            eprintln!("(alarm silenced)");
        }
        Ok(())
    }

    fn stop_strobe(&self) -> Result<(), DeviceError> {
        if self.active.load(Ordering::SeqCst) {
            eprintln!("(strobe off, alarm still sounding)");
        }
        Ok(())
    }
}

/// Asks on the terminal.
pub struct PromptGate;

impl PermissionGate for PromptGate {
    fn request_camera_access(&self) -> bool {
        print!("Allow camera access for the strobe light? [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }
}
