use std::sync::Arc;

use facedown_core::{Config, EnforcementStatus, NullActuator, NullSensor, SessionClock};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let clock = SessionClock::from_config(&config, Arc::new(NullSensor), Arc::new(NullActuator));
    let snapshot = clock.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("{} {}", snapshot.phase.label(), snapshot.formatted_remaining());
    println!(
        "work {} min / break {} min",
        snapshot.work_minutes, snapshot.break_minutes
    );
    if let Some(status) = EnforcementStatus::of(&snapshot) {
        println!("{}", status.message());
    }
    Ok(())
}
