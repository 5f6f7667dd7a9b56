use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use super::policy::{first_fit, latest_over_capacity, Policy, SchedulingContext};
use crate::models::{ExecutionRecord, Time, ID};
use crate::utils::constants::{DEFAULT_LATENCY, DEFAULT_MIN_GRANULARITY, NICE_0_WEIGHT};

/// Position of a waiting cloudlet in the run queue.
#[derive(Debug, Clone, Copy)]
struct RunQueueKey {
    vruntime: f64,
    id: ID,
}

impl PartialEq for RunQueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RunQueueKey {}

impl Ord for RunQueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.vruntime
            .total_cmp(&other.vruntime)
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for RunQueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Fair-share bookkeeping of one cloudlet.
#[derive(Debug, Clone)]
struct FairEntity {
    weight: f64,
    vruntime: f64,
    timeslice: f64,
    slice_used: f64,               // Seconds executed since the cloudlet was last admitted
    queued: Option<RunQueueKey>,   // Set while the cloudlet sits in the run queue
}

/// Proportional-share policy inspired by the Linux Completely Fair Scheduler.
///
/// A cloudlet's weight is `1024 / 1.25^niceness` with `niceness = -priority`.
/// Executing cloudlets get a timeslice of `latency * weight / total_weight`, never
/// less than the minimum granularity. Their virtual runtime grows by
/// `elapsed * 1024 / weight`, so heavier cloudlets age slower. Waiting cloudlets are
/// ordered by `(vruntime, id)`. When a timeslice runs out while others wait, the
/// cloudlet goes back to the run queue and the lowest virtual runtimes that fit the
/// free cores execute next.
#[derive(Debug, Clone)]
pub struct WeightedFair {
    latency: f64,
    min_granularity: f64,
    min_vruntime: f64,                 // Never decreases
    entities: HashMap<ID, FairEntity>,
    run_queue: BTreeSet<RunQueueKey>,
}

impl Default for WeightedFair {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightedFair {
    pub fn new() -> Self {
        Self::with_params(DEFAULT_LATENCY, DEFAULT_MIN_GRANULARITY)
    }

    /// # Arguments
    /// * `latency` - Period in which every executing cloudlet should get its share.
    /// * `min_granularity` - Smallest timeslice handed out.
    pub fn with_params(latency: f64, min_granularity: f64) -> Self {
        Self {
            latency: latency.max(0.0),
            min_granularity: min_granularity.max(0.0),
            min_vruntime: 0.0,
            entities: HashMap::new(),
            run_queue: BTreeSet::new(),
        }
    }

    pub fn latency(&self) -> f64 {
        self.latency
    }

    pub fn min_granularity(&self) -> f64 {
        self.min_granularity
    }

    pub fn niceness(priority: i32) -> i32 {
        priority.saturating_neg()
    }

    pub fn weight(priority: i32) -> f64 {
        NICE_0_WEIGHT / 1.25f64.powi(Self::niceness(priority))
    }

    /// Timeslice of a cloudlet with `priority` among `executing`, which must include it.
    pub fn timeslice(&self, priority: i32, executing: &[ExecutionRecord]) -> f64 {
        let total: f64 = executing.iter().map(|record| Self::weight(record.priority())).sum();
        let share = if total > 0.0 {
            Self::weight(priority) / total
        } else {
            1.0
        };
        (self.latency * share).max(self.min_granularity)
    }

    pub fn vruntime(&self, id: ID) -> Option<f64> {
        self.entities.get(&id).map(|entity| entity.vruntime)
    }

    pub fn timeslice_of(&self, id: ID) -> Option<f64> {
        self.entities.get(&id).map(|entity| entity.timeslice)
    }

    pub fn min_vruntime(&self) -> f64 {
        self.min_vruntime
    }

    /// Ids of the queued cloudlets, next to run first.
    pub fn run_queue(&self) -> Vec<ID> {
        self.run_queue.iter().map(|key| key.id).collect()
    }

    fn entity(&mut self, record: &ExecutionRecord) -> &mut FairEntity {
        let min_vruntime = self.min_vruntime;
        self.entities.entry(record.id()).or_insert_with(|| FairEntity {
            weight: Self::weight(record.priority()),
            // Higher priorities are placed ahead of the current minimum.
            vruntime: min_vruntime - record.priority() as f64,
            timeslice: 0.0,
            slice_used: 0.0,
            queued: None,
        })
    }

    fn dequeue(&mut self, id: ID) {
        if let Some(entity) = self.entities.get_mut(&id) {
            if let Some(key) = entity.queued.take() {
                self.run_queue.remove(&key);
            }
        }
    }

    fn refresh_min_vruntime(&mut self, ctx: &SchedulingContext) {
        let running = ctx
            .executing
            .iter()
            .filter_map(|record| self.entities.get(&record.id()))
            .map(|entity| entity.vruntime);
        let queued = self.run_queue.first().map(|key| key.vruntime);

        if let Some(min) = running.chain(queued).reduce(f64::min) {
            self.min_vruntime = self.min_vruntime.max(min);
        }
    }
}

impl Policy for WeightedFair {
    fn name(&self) -> &'static str {
        "weighted-fair"
    }

    fn can_admit(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> bool {
        ctx.available_cores() >= record.pes()
    }

    fn select_next(&mut self, ctx: &SchedulingContext, _just_finished: usize) -> Vec<ID> {
        let ordered: Vec<&ExecutionRecord> = self
            .run_queue
            .iter()
            .filter_map(|key| ctx.waiting_record(key.id))
            .collect();
        first_fit(ctx, ordered)
    }

    fn next_event_time(&self, record: &ExecutionRecord, ctx: &SchedulingContext) -> Time {
        let finish = self.estimated_finish_time(record, ctx);
        if ctx.waiting.is_empty() {
            return finish;
        }

        match self.entities.get(&record.id()) {
            Some(entity) => {
                let slice_end = ctx.current_time + (entity.timeslice - entity.slice_used).max(0.0);
                finish.min(slice_end)
            }
            None => finish,
        }
    }

    fn on_enqueue(&mut self, record: &ExecutionRecord, _ctx: &SchedulingContext) {
        self.dequeue(record.id());
        let entity = self.entity(record);
        let key = RunQueueKey {
            vruntime: entity.vruntime,
            id: record.id(),
        };
        entity.queued = Some(key);
        self.run_queue.insert(key);
    }

    fn on_admit(&mut self, record: &ExecutionRecord, ctx: &SchedulingContext) {
        self.dequeue(record.id());
        let timeslice = self.timeslice(record.priority(), ctx.executing);
        let entity = self.entity(record);
        entity.timeslice = timeslice;
        entity.slice_used = 0.0;
    }

    fn on_executed(&mut self, record: &ExecutionRecord, elapsed: f64, _ctx: &SchedulingContext) {
        if let Some(entity) = self.entities.get_mut(&record.id()) {
            entity.vruntime += elapsed * NICE_0_WEIGHT / entity.weight;
            entity.slice_used += elapsed;
        }
    }

    fn over_capacity(&self, ctx: &SchedulingContext) -> Vec<ID> {
        latest_over_capacity(ctx)
    }

    fn preempt(&mut self, ctx: &SchedulingContext) -> Vec<ID> {
        for record in ctx.executing {
            let timeslice = self.timeslice(record.priority(), ctx.executing);
            if let Some(entity) = self.entities.get_mut(&record.id()) {
                entity.timeslice = timeslice;
            }
        }
        self.refresh_min_vruntime(ctx);

        if ctx.waiting.is_empty() {
            return Vec::new();
        }

        ctx.executing
            .iter()
            .filter(|record| {
                self.entities
                    .get(&record.id())
                    .map_or(false, |entity| entity.slice_used >= entity.timeslice)
            })
            .map(|record| record.id())
            .collect()
    }

    fn on_suspend(&mut self, id: ID) {
        self.dequeue(id);
    }

    fn on_remove(&mut self, id: ID) {
        self.dequeue(id);
        self.entities.remove(&id);
    }
}
