use crate::models::{ExecutionRecord, ProcessorCapacity, Time, ID};
use crate::utils::constants::NO_NEXT_EVENT;

/// Read-only view of a scheduler handed to its policy.
#[derive(Debug, Clone, Copy)]
pub struct SchedulingContext<'a> {
    pub capacity: &'a ProcessorCapacity,
    pub executing: &'a [ExecutionRecord],
    pub waiting: &'a [ExecutionRecord],
    pub current_time: Time,
}

impl<'a> SchedulingContext<'a> {
    pub fn new(
        capacity: &'a ProcessorCapacity,
        executing: &'a [ExecutionRecord],
        waiting: &'a [ExecutionRecord],
        current_time: Time,
    ) -> Self {
        Self {
            capacity,
            executing,
            waiting,
            current_time,
        }
    }

    /// Sum of the cores required by the executing records.
    pub fn executing_pes(&self) -> u32 {
        self.executing.iter().map(|record| record.pes()).sum()
    }

    /// Cores of the share not claimed by an executing record.
    pub fn available_cores(&self) -> u32 {
        self.capacity.core_count().saturating_sub(self.executing_pes())
    }

    pub fn waiting_record(&self, id: ID) -> Option<&'a ExecutionRecord> {
        self.waiting.iter().find(|record| record.id() == id)
    }
}

/// Picks, in the given order, every record that still fits the free cores.
///
/// A record that does not fit is skipped, so a smaller one behind it can
/// still take the remaining cores.
pub fn first_fit<'a, I>(ctx: &SchedulingContext, candidates: I) -> Vec<ID>
where
    I: IntoIterator<Item = &'a ExecutionRecord>,
{
    let mut available = ctx.available_cores();
    let mut selected = Vec::new();

    for record in candidates {
        if record.pes() <= available {
            available -= record.pes();
            selected.push(record.id());
        }
    }

    selected
}

/// Most recently admitted records to take off the cores until the rest fit them.
///
/// The ids come back in admission order.
pub fn latest_over_capacity(ctx: &SchedulingContext) -> Vec<ID> {
    let mut excess = ctx.executing_pes().saturating_sub(ctx.capacity.core_count());
    let mut evicted = Vec::new();

    for record in ctx.executing.iter().rev() {
        if excess == 0 {
            break;
        }
        excess = excess.saturating_sub(record.pes());
        evicted.push(record.id());
    }

    evicted.reverse();
    evicted
}

/// Extension points of a cloudlet scheduler.
///
/// `SchedulerCore` owns the record lists and drives the update loop; a policy
/// only decides admission, selection, preemption and how much capacity each
/// executing record receives.
pub trait Policy {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether `record` can start executing with the capacity left right now.
    fn can_admit(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> bool;

    /// Waiting records to move into execution, in admission order.
    ///
    /// # Arguments
    /// * `ctx` - The scheduler state after completions and preemptions.
    /// * `just_finished` - How many records completed during this update.
    fn select_next(&mut self, ctx: &SchedulingContext, just_finished: usize) -> Vec<ID>;

    /// MIPS the record receives across all of its cores during the current tick.
    fn allocated_mips(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> f64 {
        ctx.capacity.capacity_per_core() * record.pes() as f64
    }

    /// MIPS the record asks for, following its CPU utilization model.
    fn requested_mips(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> f64 {
        record.cloudlet().utilization_of_cpu(ctx.current_time)
            * ctx.capacity.capacity_per_core()
            * record.pes() as f64
    }

    /// Predicted completion time of an executing record.
    fn estimated_finish_time(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> Time {
        let mips = self.allocated_mips(record, ctx);
        if mips <= 0.0 {
            return NO_NEXT_EVENT;
        }
        let start = ctx.current_time.max(record.last_processing_time());
        start + record.remaining_length() as f64 / mips
    }

    /// Time at which the scheduler must be invoked again on behalf of `record`.
    fn next_event_time(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> Time {
        self.estimated_finish_time(record, ctx)
    }

    /// Called once `record` has been placed on the waiting list.
    fn on_enqueue(&mut self, _record: &ExecutionRecord, _ctx: &SchedulingContext) {}

    /// Called once `record` has been placed on the executing list.
    fn on_admit(&mut self, _record: &ExecutionRecord, _ctx: &SchedulingContext) {}

    /// Called after `record` executed for `elapsed` seconds.
    fn on_executed(&mut self, _record: &ExecutionRecord, _elapsed: f64, _ctx: &SchedulingContext) {}

    /// Executing records that no longer fit a shrunk share and go back to waiting.
    fn over_capacity(&self, _ctx: &SchedulingContext) -> Vec<ID> {
        Vec::new()
    }

    /// Executing records that must give their cores back to the waiting list.
    fn preempt(&mut self, _ctx: &SchedulingContext) -> Vec<ID> {
        Vec::new()
    }

    /// Called when a record is paused; it may come back later.
    fn on_suspend(&mut self, _id: ID) {}

    /// Called when a record leaves the scheduler for good.
    fn on_remove(&mut self, _id: ID) {}
}
