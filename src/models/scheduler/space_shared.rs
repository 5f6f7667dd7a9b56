use super::policy::{first_fit, latest_over_capacity, Policy, SchedulingContext};
use crate::models::{ExecutionRecord, ID};

/// Each cloudlet holds its cores exclusively until it completes.
///
/// A cloudlet that does not fit the free cores waits. Freed cores are offered to
/// waiting cloudlets in submission order, skipping those that still do not fit.
#[derive(Debug, Default, Clone)]
pub struct SpaceShared;

impl SpaceShared {
    pub fn new() -> Self {
        SpaceShared
    }
}

impl Policy for SpaceShared {
    fn name(&self) -> &'static str {
        "space-shared"
    }

    fn can_admit(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> bool {
        ctx.available_cores() >= record.pes()
    }

    fn select_next(&mut self, ctx: &SchedulingContext, _just_finished: usize) -> Vec<ID> {
        first_fit(ctx, ctx.waiting)
    }

    fn over_capacity(&self, ctx: &SchedulingContext) -> Vec<ID> {
        latest_over_capacity(ctx)
    }
}
