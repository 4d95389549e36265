//! First-run flow: ask for camera access once, then never again.
//!
//! The strobe needs the camera torch, so the prompt happens here rather
//! than in the session clock. The answer does not block completion; a
//! denied gate just means the actuator will have no torch to drive.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::Config;
use crate::device::PermissionGate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OnboardingOutcome {
    AlreadyCompleted,
    Completed { camera_granted: bool },
}

/// Run onboarding if it has not happened yet and mark it done in `config`.
///
/// The caller decides when to persist the config.
pub fn complete_onboarding(config: &mut Config, gate: &dyn PermissionGate) -> OnboardingOutcome {
    if config.onboarding_completed {
        return OnboardingOutcome::AlreadyCompleted;
    }
    let camera_granted = gate.request_camera_access();
    config.onboarding_completed = true;
    info!(camera_granted, "onboarding completed");
    OnboardingOutcome::Completed { camera_granted }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingGate {
        answer: bool,
        asked: AtomicUsize,
    }

    impl PermissionGate for CountingGate {
        fn request_camera_access(&self) -> bool {
            self.asked.fetch_add(1, Ordering::SeqCst);
            self.answer
        }
    }

    #[test]
    fn asks_only_once() {
        let gate = CountingGate {
            answer: true,
            asked: AtomicUsize::new(0),
        };
        let mut config = Config::default();

        assert_eq!(
            complete_onboarding(&mut config, &gate),
            OnboardingOutcome::Completed { camera_granted: true }
        );
        assert!(config.onboarding_completed);
        assert_eq!(
            complete_onboarding(&mut config, &gate),
            OnboardingOutcome::AlreadyCompleted
        );
        assert_eq!(gate.asked.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn denial_still_completes() {
        let gate = CountingGate {
            answer: false,
            asked: AtomicUsize::new(0),
        };
        let mut config = Config::default();
        assert_eq!(
            complete_onboarding(&mut config, &gate),
            OnboardingOutcome::Completed { camera_granted: false }
        );
        assert!(config.onboarding_completed);
    }
}
