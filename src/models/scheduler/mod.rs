pub mod policy;
pub mod scheduler;
pub mod time_shared;
pub mod space_shared;
pub mod dynamic_workload;
pub mod weighted_fair;

pub use policy::{Policy, SchedulingContext};
pub use scheduler::{SchedulerConfig, SchedulerCore};
pub use time_shared::TimeShared;
pub use space_shared::SpaceShared;
pub use dynamic_workload::DynamicWorkload;
pub use weighted_fair::WeightedFair;
