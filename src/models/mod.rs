mod cloudlet;
mod execution;
mod processor;
pub mod scheduler;
pub mod workload;

pub use cloudlet::{Cloudlet, UtilizationModel};
pub use execution::ExecutionRecord;
pub use processor::ProcessorCapacity;
pub use workload::Workload;

/// Simulated time, in seconds.
pub type Time = f64;

pub type ID = u32;
