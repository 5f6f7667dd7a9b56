use super::policy::{Policy, SchedulingContext};
use crate::models::{ExecutionRecord, ID};

/// Every cloudlet executes as soon as it is submitted and all of them share the cores.
///
/// When the executing cloudlets ask for more cores than the share has, the total
/// capacity is spread evenly over the requested cores. Otherwise each cloudlet gets
/// the full MIPS of the cores it asked for, as if it had them to itself. This is an
/// approximation: a real time-shared kernel would interleave cloudlets of different
/// lengths on the same core, and the two only diverge in that case.
#[derive(Debug, Default, Clone)]
pub struct TimeShared;

impl TimeShared {
    pub fn new() -> Self {
        TimeShared
    }

    /// MIPS one requested core receives while `ctx.executing` are running.
    pub fn mips_per_pe(ctx: &SchedulingContext) -> f64 {
        let cores = ctx.capacity.core_count().max(ctx.executing_pes());
        if cores == 0 {
            return 0.0;
        }
        ctx.capacity.total_capacity() / cores as f64
    }
}

impl Policy for TimeShared {
    fn name(&self) -> &'static str {
        "time-shared"
    }

    fn can_admit(&self, _record: &ExecutionRecord, _ctx: &SchedulingContext) -> bool {
        true
    }

    fn select_next(&mut self, ctx: &SchedulingContext, _just_finished: usize) -> Vec<ID> {
        // Nothing is ever queued, except records resumed by a caller.
        ctx.waiting.iter().map(|record| record.id()).collect()
    }

    fn allocated_mips(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> f64 {
        Self::mips_per_pe(ctx) * record.pes() as f64
    }
}
