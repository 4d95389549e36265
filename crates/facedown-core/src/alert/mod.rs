mod cooldown;
mod coordinator;
mod flash;

pub use cooldown::Cooldown;
pub use coordinator::{AlertPhase, AlertTiming, ViolationCoordinator};
pub use flash::{FlashOverlay, FlashUpdate};
