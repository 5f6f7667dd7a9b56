use std::collections::HashMap;

use super::policy::{Policy, SchedulingContext};
use crate::models::{ExecutionRecord, Time, ID};
use crate::utils::constants::NO_NEXT_EVENT;

/// Scheduler for a virtual machine running a single long-lived service cloudlet.
///
/// The cloudlet executes as soon as it is submitted and receives the MIPS its
/// CPU utilization model asks for. A grant never exceeds the cores the cloudlet
/// requested, nor what the cloudlets admitted before it left of the share.
#[derive(Debug, Clone)]
pub struct DynamicWorkload {
    mips: f64,                            // Nominal MIPS of one core of the VM
    under_allocated: HashMap<ID, f64>,    // MI requested but not granted, kept after removal
}

impl DynamicWorkload {
    /// # Arguments
    /// * `mips` - The nominal MIPS of one core, used to turn utilization into demand.
    pub fn new(mips: f64) -> Self {
        Self {
            mips: mips.max(0.0),
            under_allocated: HashMap::new(),
        }
    }

    pub fn mips(&self) -> f64 {
        self.mips
    }

    /// Instructions (MI) the share failed to deliver to a cloudlet over the whole run.
    pub fn under_allocated_length(&self, id: ID) -> f64 {
        self.under_allocated.get(&id).copied().unwrap_or(0.0)
    }

    pub fn total_under_allocated_length(&self) -> f64 {
        self.under_allocated.values().sum()
    }

    fn grant(&self, record: &ExecutionRecord, ctx: &SchedulingContext, free: f64) -> f64 {
        let own_cores = ctx.capacity.capacity_per_core() * record.pes() as f64;
        self.requested_mips(record, ctx).min(own_cores).min(free).max(0.0)
    }
}

impl Policy for DynamicWorkload {
    fn name(&self) -> &'static str {
        "dynamic-workload"
    }

    fn can_admit(&self, _record: &ExecutionRecord, _ctx: &SchedulingContext) -> bool {
        true
    }

    fn select_next(&mut self, ctx: &SchedulingContext, _just_finished: usize) -> Vec<ID> {
        ctx.waiting.iter().map(|record| record.id()).collect()
    }

    /// Serves the executing records in admission order out of the total capacity.
    fn allocated_mips(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> f64 {
        let mut free = ctx.capacity.total_capacity();
        for other in ctx.executing {
            let grant = self.grant(other, ctx, free);
            if other.id() == record.id() {
                return grant;
            }
            free -= grant;
        }
        self.grant(record, ctx, free)
    }

    fn requested_mips(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> f64 {
        record.cloudlet().utilization_of_cpu(ctx.current_time) * self.mips * record.pes() as f64
    }

    fn next_event_time(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> Time {
        if self.requested_mips(record, ctx) > 0.0 {
            return self.estimated_finish_time(record, ctx);
        }

        // Demand is read again at the first whole second it becomes positive.
        match record.cloudlet().cpu_utilization_model().next_busy_time(ctx.current_time) {
            Some(busy) if self.mips > 0.0 => busy.floor() + 1.0,
            _ => NO_NEXT_EVENT,
        }
    }

    fn on_executed(&mut self, record: &ExecutionRecord, elapsed: f64, ctx: &SchedulingContext) {
        let missing = self.requested_mips(record, ctx) - self.allocated_mips(record, ctx);
        if missing > 0.0 {
            *self.under_allocated.entry(record.id()).or_insert(0.0) += missing * elapsed;
        }
    }
}
