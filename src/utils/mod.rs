pub mod constants;
pub mod errors;

pub use constants::{CloudletStatus, FailureKind, PolicyKind};
pub use errors::{Result, SimulationError};
