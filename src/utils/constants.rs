use std::fmt::{self, Display};
use std::str::FromStr;

use crate::utils::errors::SimulationError;

/// Minimum distance between two scheduler invocations, in simulated seconds.
pub const DEFAULT_MIN_TIME_BETWEEN_EVENTS: f64 = 0.1;

/// Target latency of the weighted fair policy: the period in which every
/// runnable cloudlet should get a turn.
pub const DEFAULT_LATENCY: f64 = 3.0;

/// Smallest timeslice the weighted fair policy hands out.
pub const DEFAULT_MIN_GRANULARITY: f64 = 2.0;

/// Weight of a cloudlet with niceness 0.
pub const NICE_0_WEIGHT: f64 = 1024.0;

/// Returned by `update` when the scheduler has nothing left to do.
pub const NO_NEXT_EVENT: f64 = f64::INFINITY;

/// Lifecycle status of a cloudlet inside a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudletStatus {
    Created,
    Ready,
    Queued,
    InExec,
    Paused,
    Success,
    Cancelled,
    Failed,
    FailedResourceUnavailable,
    Resumed,
}

impl CloudletStatus {
    /// Whether the cloudlet will never run again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CloudletStatus::Success
                | CloudletStatus::Cancelled
                | CloudletStatus::Failed
                | CloudletStatus::FailedResourceUnavailable
        )
    }
}

impl Display for CloudletStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CloudletStatus::Created => "CREATED",
            CloudletStatus::Ready => "READY",
            CloudletStatus::Queued => "QUEUED",
            CloudletStatus::InExec => "INEXEC",
            CloudletStatus::Paused => "PAUSED",
            CloudletStatus::Success => "SUCCESS",
            CloudletStatus::Cancelled => "CANCELLED",
            CloudletStatus::Failed => "FAILED",
            CloudletStatus::FailedResourceUnavailable => "FAILED_RESOURCE_UNAVAILABLE",
            CloudletStatus::Resumed => "RESUMED",
        };
        write!(f, "{}", name)
    }
}

/// Reason given when a cloudlet is moved to the failed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Failed,
    ResourceUnavailable,
}

impl From<FailureKind> for CloudletStatus {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::Failed => CloudletStatus::Failed,
            FailureKind::ResourceUnavailable => CloudletStatus::FailedResourceUnavailable,
        }
    }
}

/// The scheduling policies the command line can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    TimeShared,
    SpaceShared,
    DynamicWorkload,
    WeightedFair,
}

impl FromStr for PolicyKind {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "time-shared" | "ts" => Ok(PolicyKind::TimeShared),
            "space-shared" | "ss" => Ok(PolicyKind::SpaceShared),
            "dynamic" | "dynamic-workload" => Ok(PolicyKind::DynamicWorkload),
            "fair" | "cfs" | "weighted-fair" => Ok(PolicyKind::WeightedFair),
            other => Err(SimulationError::UnknownPolicy(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(CloudletStatus::Success.is_terminal());
        assert!(CloudletStatus::FailedResourceUnavailable.is_terminal());
        assert!(!CloudletStatus::Paused.is_terminal());
        assert!(!CloudletStatus::Queued.is_terminal());
    }

    #[test]
    fn policy_names() {
        assert_eq!("space-shared".parse::<PolicyKind>().unwrap(), PolicyKind::SpaceShared);
        assert_eq!("cfs".parse::<PolicyKind>().unwrap(), PolicyKind::WeightedFair);
        assert!("edf".parse::<PolicyKind>().is_err());
    }
}
