use facedown_core::{complete_onboarding, Config, OnboardingOutcome, PermissionGate, StaticGate};

use crate::device::PromptGate;

pub fn run(yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let granted = StaticGate(true);
    let gate: &dyn PermissionGate = if yes { &granted } else { &PromptGate };
    match complete_onboarding(&mut config, gate) {
        OnboardingOutcome::AlreadyCompleted => println!("onboarding already completed"),
        OnboardingOutcome::Completed { camera_granted } => {
            config.save()?;
            if camera_granted {
                println!("ready. be scared productive.");
            } else {
                println!("ready. no camera, so no strobe; the alarm still works.");
            }
        }
    }
    Ok(())
}
