pub mod models;
pub mod simulation;
pub mod utils;

pub use models::*;
pub use simulation::{simulation, SimulationReport};
pub use utils::{constants, errors};
pub use utils::{CloudletStatus, FailureKind, PolicyKind, Result, SimulationError};
