use log::{debug, trace, warn};

use super::policy::{Policy, SchedulingContext};
use crate::models::{Cloudlet, ExecutionRecord, ProcessorCapacity, Time, ID};
use crate::utils::constants::{DEFAULT_MIN_TIME_BETWEEN_EVENTS, NO_NEXT_EVENT};
use crate::utils::{CloudletStatus, FailureKind};

/// Tuning knobs shared by every policy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SchedulerConfig {
    /// Smallest distance between the current time and the next requested event.
    pub min_time_between_events: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            min_time_between_events: DEFAULT_MIN_TIME_BETWEEN_EVENTS,
        }
    }
}

/// Schedules the cloudlets of one virtual machine on the cores it was granted.
///
/// Every record lives in exactly one of five lists, and its status always
/// matches that list:
/// * waiting: `Queued` or `Ready`
/// * executing: `InExec`
/// * paused: `Paused`
/// * finished: `Success`
/// * failed: `Failed` or `FailedResourceUnavailable`
#[derive(Debug)]
pub struct SchedulerCore<P: Policy> {
    policy: P,                         // Admission, selection and allocation rules
    config: SchedulerConfig,
    capacity: ProcessorCapacity,       // Snapshot of the last mips share
    waiting: Vec<ExecutionRecord>,     // In submission order
    executing: Vec<ExecutionRecord>,
    paused: Vec<ExecutionRecord>,
    finished: Vec<ExecutionRecord>,    // In completion order
    failed: Vec<ExecutionRecord>,
    previous_time: Time,               // Time of the last update
}

impl<P: Policy> SchedulerCore<P> {
    /// Creates a scheduler over an initial mips share.
    ///
    /// # Arguments
    /// * `policy` - The scheduling policy.
    /// * `mips_share` - The MIPS available on each core until the first update.
    pub fn new(policy: P, mips_share: &[f64]) -> Self {
        Self::with_config(policy, mips_share, SchedulerConfig::default())
    }

    pub fn with_config(policy: P, mips_share: &[f64], config: SchedulerConfig) -> Self {
        Self {
            policy,
            config,
            capacity: ProcessorCapacity::new(mips_share),
            waiting: Vec::new(),
            executing: Vec::new(),
            paused: Vec::new(),
            finished: Vec::new(),
            failed: Vec::new(),
            previous_time: 0.0,
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn capacity(&self) -> &ProcessorCapacity {
        &self.capacity
    }

    pub fn previous_time(&self) -> Time {
        self.previous_time
    }

    pub fn waiting(&self) -> &[ExecutionRecord] {
        &self.waiting
    }

    pub fn executing(&self) -> &[ExecutionRecord] {
        &self.executing
    }

    pub fn paused(&self) -> &[ExecutionRecord] {
        &self.paused
    }

    pub fn finished(&self) -> &[ExecutionRecord] {
        &self.finished
    }

    pub fn failed(&self) -> &[ExecutionRecord] {
        &self.failed
    }

    pub fn has_finished(&self) -> bool {
        !self.finished.is_empty()
    }

    pub fn running_count(&self) -> usize {
        self.executing.len()
    }

    /// Returns `true` when no record is waiting, executing or paused.
    pub fn is_empty(&self) -> bool {
        self.waiting.is_empty() && self.executing.is_empty() && self.paused.is_empty()
    }

    fn contains(&self, id: ID) -> bool {
        [&self.waiting, &self.executing, &self.paused, &self.finished]
            .iter()
            .any(|list| list.iter().any(|record| record.id() == id))
    }

    /// Submits a cloudlet at the time of the last update.
    ///
    /// # Arguments
    /// * `cloudlet` - The cloudlet to run.
    /// * `file_transfer_time` - Delay before the cloudlet's input files are available.
    ///
    /// # Returns
    /// The predicted finish time, or 0 if the cloudlet was queued. A cloudlet whose
    /// id is already scheduled is ignored and 0 is returned.
    pub fn submit(&mut self, cloudlet: Cloudlet, file_transfer_time: Time) -> Time {
        let now = self.previous_time;

        if self.contains(cloudlet.id()) {
            warn!("cloudlet {} is already scheduled, submission ignored", cloudlet.id());
            return 0.0;
        }

        let record = ExecutionRecord::new(cloudlet, now, file_transfer_time);
        let fits = {
            let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, now);
            self.policy.can_admit(&record, &ctx)
        };

        debug!(
            "[{}] t={} submit cloudlet {} ({} MI, {} pes)",
            self.policy.name(),
            now,
            record.id(),
            record.remaining_length(),
            record.pes()
        );

        if fits {
            self.start_executing(record, now);
            self.last_admitted_estimate(now)
        } else {
            self.enqueue(record, CloudletStatus::Queued, now);
            0.0
        }
    }

    /// Cancels a cloudlet, looking into the finished, executing, paused and waiting lists
    /// in that order.
    ///
    /// # Returns
    /// The cloudlet, or `None` if the id is unknown. A finished cloudlet is returned
    /// as it is.
    pub fn cancel(&mut self, id: ID) -> Option<Cloudlet> {
        if let Some(record) = take(&mut self.finished, id) {
            debug!("[{}] cancel of finished cloudlet {}", self.policy.name(), id);
            return Some(record.into_cloudlet());
        }

        let mut record = self.take_live(id)?;
        record.set_status(CloudletStatus::Cancelled);
        record.set_finish_time(self.previous_time);
        self.policy.on_remove(id);
        debug!("[{}] t={} cancel cloudlet {}", self.policy.name(), self.previous_time, id);

        Some(record.into_cloudlet())
    }

    /// Pauses an executing or waiting cloudlet.
    ///
    /// # Returns
    /// `true` if the cloudlet was found and paused.
    pub fn pause(&mut self, id: ID) -> bool {
        let record = take(&mut self.executing, id).or_else(|| take(&mut self.waiting, id));
        let Some(mut record) = record else {
            return false;
        };

        self.refresh_used_cores();
        record.set_status(CloudletStatus::Paused);
        self.policy.on_suspend(id);
        debug!("[{}] t={} pause cloudlet {}", self.policy.name(), self.previous_time, id);
        self.paused.push(record);

        true
    }

    /// Resumes a paused cloudlet.
    ///
    /// # Returns
    /// `None` if the cloudlet is not paused, `Some(0.0)` if it went back to the
    /// waiting list, or `Some(t)` with its predicted finish time if it executes again.
    pub fn resume(&mut self, id: ID) -> Option<Time> {
        let mut record = take(&mut self.paused, id)?;
        let now = self.previous_time;
        record.set_status(CloudletStatus::Resumed);

        let fits = {
            let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, now);
            self.policy.can_admit(&record, &ctx)
        };

        debug!("[{}] t={} resume cloudlet {}", self.policy.name(), now, id);

        if fits {
            self.start_executing(record, now);
            Some(self.last_admitted_estimate(now))
        } else {
            self.enqueue(record, CloudletStatus::Queued, now);
            Some(0.0)
        }
    }

    /// Moves a live cloudlet to the failed list.
    ///
    /// # Returns
    /// `true` if the cloudlet was waiting, executing or paused.
    pub fn fail(&mut self, id: ID, kind: FailureKind) -> bool {
        let Some(mut record) = self.take_live(id) else {
            return false;
        };

        record.set_status(kind.into());
        record.set_finish_time(self.previous_time);
        self.policy.on_remove(id);
        debug!("[{}] t={} cloudlet {} failed ({:?})", self.policy.name(), self.previous_time, id, kind);
        self.failed.push(record);

        true
    }

    /// Takes a live cloudlet out of the scheduler so it can be submitted elsewhere.
    ///
    /// The returned cloudlet carries the length already executed.
    pub fn migrate_out(&mut self, id: ID) -> Option<Cloudlet> {
        let mut record = self.take_live(id)?;
        record.set_status(CloudletStatus::Ready);
        self.policy.on_remove(id);
        debug!(
            "[{}] t={} migrate out cloudlet {} ({} MI left)",
            self.policy.name(),
            self.previous_time,
            id,
            record.remaining_length()
        );

        Some(record.into_cloudlet())
    }

    /// Pops the oldest finished cloudlet.
    pub fn next_finished(&mut self) -> Option<Cloudlet> {
        if self.finished.is_empty() {
            return None;
        }
        Some(self.finished.remove(0).into_cloudlet())
    }

    /// Advances the scheduler to `current_time`.
    ///
    /// # Arguments
    /// * `current_time` - The simulation time, never lower than the previous call.
    /// * `mips_share` - The MIPS available on each core from now on.
    ///
    /// # Returns
    /// The next time the scheduler must be invoked, or `NO_NEXT_EVENT` if it is idle.
    pub fn update(&mut self, current_time: Time, mips_share: &[f64]) -> Time {
        self.capacity = ProcessorCapacity::new(mips_share);
        self.refresh_used_cores();

        if self.executing.is_empty() && self.waiting.is_empty() {
            self.previous_time = current_time;
            return NO_NEXT_EVENT;
        }

        self.advance_executing(current_time);
        let just_finished = self.collect_finished(current_time);
        self.evict_over_capacity(current_time);
        self.preempt_expired(current_time);
        self.admit_waiting(current_time, just_finished);

        let next_event = self.next_event(current_time);
        self.previous_time = current_time;

        trace!(
            "[{}] t={} executing={} waiting={} next={}",
            self.policy.name(),
            current_time,
            self.executing.len(),
            self.waiting.len(),
            next_event
        );

        next_event
    }

    /// MIPS currently allocated to an executing cloudlet.
    pub fn allocated_mips(&self, id: ID) -> Option<f64> {
        let ctx = self.context(self.previous_time);
        self.executing
            .iter()
            .find(|record| record.id() == id)
            .map(|record| self.policy.allocated_mips(record, &ctx))
    }

    /// Fraction of the share's cores demanded by the executing cloudlets, capped at 1.
    pub fn utilization_of_cpu(&self, time: Time) -> f64 {
        let cores = self.capacity.core_count();
        if cores == 0 {
            return 0.0;
        }

        let demanded: f64 = self
            .executing
            .iter()
            .map(|record| record.cloudlet().utilization_of_cpu(time) * record.pes() as f64)
            .sum();

        (demanded / cores as f64).min(1.0)
    }

    pub fn utilization_of_ram(&self, time: Time) -> f64 {
        self.executing
            .iter()
            .map(|record| record.cloudlet().utilization_of_ram(time))
            .sum()
    }

    pub fn utilization_of_bw(&self, time: Time) -> f64 {
        self.executing
            .iter()
            .map(|record| record.cloudlet().utilization_of_bw(time))
            .sum()
    }

    /// MIPS demanded on each core by the executing cloudlets, one entry per pe.
    pub fn current_requested_mips(&self, time: Time) -> Vec<f64> {
        let ctx = self.context(time);
        self.executing
            .iter()
            .flat_map(|record| {
                let per_pe = self.policy.requested_mips(record, &ctx) / record.pes() as f64;
                std::iter::repeat(per_pe).take(record.pes() as usize)
            })
            .collect()
    }

    fn context(&self, time: Time) -> SchedulingContext<'_> {
        SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, time)
    }

    fn refresh_used_cores(&mut self) {
        let used = self.executing.iter().map(|record| record.pes()).sum();
        self.capacity.set_used_cores(used);
    }

    fn take_live(&mut self, id: ID) -> Option<ExecutionRecord> {
        let record = take(&mut self.executing, id)
            .or_else(|| take(&mut self.paused, id))
            .or_else(|| take(&mut self.waiting, id))?;
        self.refresh_used_cores();
        Some(record)
    }

    fn start_executing(&mut self, mut record: ExecutionRecord, time: Time) {
        record.set_last_processing_time(time);
        record.set_status(CloudletStatus::InExec);
        debug!("[{}] t={} cloudlet {} starts executing", self.policy.name(), time, record.id());
        self.executing.push(record);
        self.refresh_used_cores();

        let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, time);
        if let Some(record) = self.executing.last() {
            self.policy.on_admit(record, &ctx);
        }
    }

    fn enqueue(&mut self, mut record: ExecutionRecord, status: CloudletStatus, time: Time) {
        record.set_status(status);
        self.waiting.push(record);

        let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, time);
        if let Some(record) = self.waiting.last() {
            self.policy.on_enqueue(record, &ctx);
        }
    }

    fn last_admitted_estimate(&self, time: Time) -> Time {
        let ctx = self.context(time);
        self.executing
            .last()
            .map(|record| self.policy.estimated_finish_time(record, &ctx))
            .unwrap_or(NO_NEXT_EVENT)
    }

    fn advance_executing(&mut self, current_time: Time) {
        let progress: Vec<(f64, f64)> = {
            let ctx = self.context(current_time);
            self.executing
                .iter()
                .map(|record| {
                    (
                        self.policy.allocated_mips(record, &ctx),
                        record.elapsed_since_last_processing(current_time),
                    )
                })
                .collect()
        };

        for (record, &(mips, elapsed)) in self.executing.iter_mut().zip(&progress) {
            if elapsed > 0.0 && mips > 0.0 {
                let executed = (mips * elapsed).round() as u64;
                record.advance(executed);
                trace!(
                    "cloudlet {} executed {} MI in {}s at {} MIPS",
                    record.id(),
                    executed,
                    elapsed,
                    mips
                );
            }
            record.set_last_processing_time(current_time);
        }

        let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, current_time);
        for (record, &(_, elapsed)) in self.executing.iter().zip(&progress) {
            if elapsed > 0.0 {
                self.policy.on_executed(record, elapsed, &ctx);
            }
        }
    }

    fn collect_finished(&mut self, current_time: Time) -> usize {
        let (done, running): (Vec<_>, Vec<_>) = std::mem::take(&mut self.executing)
            .into_iter()
            .partition(|record| record.is_complete());
        self.executing = running;
        self.refresh_used_cores();

        let count = done.len();
        for mut record in done {
            record.set_status(CloudletStatus::Success);
            record.set_finish_time(current_time);
            self.policy.on_remove(record.id());
            debug!("[{}] t={} cloudlet {} finished", self.policy.name(), current_time, record.id());
            self.finished.push(record);
        }

        count
    }

    fn evict_over_capacity(&mut self, current_time: Time) {
        let evicted = {
            let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, current_time);
            self.policy.over_capacity(&ctx)
        };

        for id in evicted {
            if let Some(record) = take(&mut self.executing, id) {
                debug!(
                    "[{}] t={} cloudlet {} no longer fits {} cores, back to waiting",
                    self.policy.name(),
                    current_time,
                    id,
                    self.capacity.core_count()
                );
                self.refresh_used_cores();
                self.enqueue(record, CloudletStatus::Queued, current_time);
            }
        }
    }

    fn preempt_expired(&mut self, current_time: Time) {
        let preempted = {
            let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, current_time);
            self.policy.preempt(&ctx)
        };

        for id in preempted {
            if let Some(record) = take(&mut self.executing, id) {
                debug!("[{}] t={} preempt cloudlet {}", self.policy.name(), current_time, id);
                self.refresh_used_cores();
                self.enqueue(record, CloudletStatus::Ready, current_time);
            }
        }
    }

    fn admit_waiting(&mut self, current_time: Time, just_finished: usize) {
        if self.waiting.is_empty() {
            return;
        }

        let selected = {
            let ctx = SchedulingContext::new(&self.capacity, &self.executing, &self.waiting, current_time);
            self.policy.select_next(&ctx, just_finished)
        };

        for id in selected {
            let Some(position) = self.waiting.iter().position(|record| record.id() == id) else {
                continue;
            };

            let fits = {
                let ctx = self.context(current_time);
                self.policy.can_admit(&self.waiting[position], &ctx)
            };

            if fits {
                let record = self.waiting.remove(position);
                self.start_executing(record, current_time);
            }
        }
    }

    fn next_event(&self, current_time: Time) -> Time {
        let ctx = self.context(current_time);
        let next = self
            .executing
            .iter()
            .map(|record| self.policy.next_event_time(record, &ctx))
            .fold(NO_NEXT_EVENT, f64::min);

        if next.is_infinite() {
            return NO_NEXT_EVENT;
        }

        next.max(current_time + self.config.min_time_between_events)
    }
}

fn take(list: &mut Vec<ExecutionRecord>, id: ID) -> Option<ExecutionRecord> {
    let position = list.iter().position(|record| record.id() == id)?;
    Some(list.remove(position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::scheduler::{SpaceShared, TimeShared};
    use pretty_assertions::assert_eq;

    fn assert_lists_match_status<P: Policy>(scheduler: &SchedulerCore<P>) {
        use CloudletStatus::*;
        assert!(scheduler.waiting().iter().all(|r| matches!(r.status(), Queued | Ready)));
        assert!(scheduler.executing().iter().all(|r| r.status() == InExec));
        assert!(scheduler.paused().iter().all(|r| r.status() == Paused));
        assert!(scheduler.finished().iter().all(|r| r.status() == Success));
        assert!(scheduler
            .failed()
            .iter()
            .all(|r| matches!(r.status(), Failed | FailedResourceUnavailable)));
    }

    fn ids(records: &[ExecutionRecord]) -> Vec<ID> {
        records.iter().map(|record| record.id()).collect()
    }

    #[test]
    fn idle_update_returns_no_event() {
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &[1000.0]);
        assert_eq!(scheduler.update(7.5, &[1000.0]), NO_NEXT_EVENT);
        assert_eq!(scheduler.previous_time(), 7.5);
        assert_eq!(scheduler.update(9.0, &[]), NO_NEXT_EVENT);
        assert_eq!(scheduler.previous_time(), 9.0);
    }

    #[test]
    fn capacity_is_rebuilt_on_every_update() {
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &[1000.0]);
        scheduler.submit(Cloudlet::new(1, 10_000, 1), 0.0);
        assert_eq!(scheduler.capacity().used_cores(), 1);

        scheduler.update(1.0, &[500.0, 500.0, 500.0]);
        assert_eq!(scheduler.capacity().core_count(), 3);
        assert_eq!(scheduler.capacity().used_cores(), 1);
        assert_eq!(scheduler.capacity().capacity_per_core(), 500.0);
    }

    #[test]
    fn empty_share_makes_no_progress() {
        let mut scheduler = SchedulerCore::new(TimeShared::new(), &[]);
        assert_eq!(scheduler.submit(Cloudlet::new(1, 2000, 1), 0.0), NO_NEXT_EVENT);
        assert_eq!(scheduler.update(10.0, &[]), NO_NEXT_EVENT);
        assert_eq!(scheduler.executing()[0].finished_length_so_far(), 0);

        let next = scheduler.update(11.0, &[1000.0]);
        assert_eq!(next, 12.0);
    }

    #[test]
    fn next_event_is_never_closer_than_min_gap() {
        let config = SchedulerConfig {
            min_time_between_events: 0.5,
        };
        let share = [1000.0];
        let mut scheduler = SchedulerCore::with_config(TimeShared::new(), &share, config);
        scheduler.submit(Cloudlet::new(1, 1100, 1), 0.0);

        assert_eq!(scheduler.update(1.0, &share), 1.5);
        assert_eq!(scheduler.executing()[0].remaining_length(), 100);
    }

    #[test]
    fn finished_length_is_monotonic() {
        let share = [700.0, 300.0];
        let mut scheduler = SchedulerCore::new(TimeShared::new(), &share);
        for id in 1..=3 {
            scheduler.submit(Cloudlet::new(id, 9_999, id), 0.0);
        }

        let mut last: Vec<u64> = vec![0; 3];
        let mut time = 0.0;
        while !scheduler.is_empty() {
            let next = scheduler.update(time, &share);
            for record in scheduler.executing().iter().chain(scheduler.finished()) {
                let index = record.id() as usize - 1;
                assert!(record.finished_length_so_far() >= last[index]);
                last[index] = record.finished_length_so_far();
            }
            assert_lists_match_status(&scheduler);
            time = next;
        }
        assert_eq!(last, vec![9_999; 3]);
    }

    #[test]
    fn cancel_prefers_finished_then_live_lists() {
        let share = [1000.0];
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &share);
        scheduler.submit(Cloudlet::new(1, 1000, 1), 0.0);
        scheduler.submit(Cloudlet::new(2, 5000, 1), 0.0);
        scheduler.submit(Cloudlet::new(3, 5000, 1), 0.0);
        scheduler.update(1.0, &share);
        assert_eq!(ids(scheduler.finished()), vec![1]);
        assert_eq!(ids(scheduler.executing()), vec![2]);

        let finished = scheduler.cancel(1).unwrap();
        assert_eq!(finished.status(), CloudletStatus::Success);
        assert_eq!(finished.finish_time(), Some(1.0));
        assert!(scheduler.finished().is_empty());
        assert!(scheduler.next_finished().is_none());

        let running = scheduler.cancel(2).unwrap();
        assert_eq!(running.status(), CloudletStatus::Cancelled);
        assert_eq!(running.finished_length(), 0);

        let queued = scheduler.cancel(3).unwrap();
        assert_eq!(queued.status(), CloudletStatus::Cancelled);
        assert!(scheduler.is_empty());
        assert!(!scheduler.has_finished());
    }

    #[test]
    fn unknown_ids_are_not_errors() {
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &[1000.0]);
        assert!(scheduler.cancel(42).is_none());
        assert!(!scheduler.pause(42));
        assert_eq!(scheduler.resume(42), None);
        assert!(!scheduler.fail(42, FailureKind::Failed));
        assert!(scheduler.migrate_out(42).is_none());
        assert!(scheduler.next_finished().is_none());
    }

    #[test]
    fn resume_only_applies_to_paused() {
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &[1000.0]);
        scheduler.submit(Cloudlet::new(1, 1000, 1), 0.0);
        assert_eq!(scheduler.resume(1), None);
        assert_eq!(scheduler.running_count(), 1);
    }

    #[test]
    fn paused_time_is_not_executed() {
        let share = [1000.0];
        let mut scheduler = SchedulerCore::new(TimeShared::new(), &share);
        scheduler.submit(Cloudlet::new(1, 10_000, 1), 0.0);

        scheduler.update(3.0, &share);
        assert!(scheduler.pause(1));
        assert_eq!(scheduler.capacity().used_cores(), 0);
        assert_lists_match_status(&scheduler);

        scheduler.update(20.0, &share);
        assert_eq!(scheduler.paused()[0].finished_length_so_far(), 3000);

        assert_eq!(scheduler.resume(1), Some(27.0));
        scheduler.update(27.0, &share);
        assert_eq!(scheduler.finished()[0].finish_time(), Some(27.0));
    }

    #[test]
    fn paused_waiting_cloudlet_leaves_the_queue() {
        let share = [1000.0];
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &share);
        scheduler.submit(Cloudlet::new(1, 2000, 1), 0.0);
        scheduler.submit(Cloudlet::new(2, 2000, 1), 0.0);
        scheduler.submit(Cloudlet::new(3, 2000, 1), 0.0);

        assert!(scheduler.pause(2));
        scheduler.update(2.0, &share);
        assert_eq!(ids(scheduler.executing()), vec![3]);
        assert_eq!(ids(scheduler.paused()), vec![2]);
        assert_lists_match_status(&scheduler);
    }

    #[test]
    fn failed_cloudlets_are_kept_apart() {
        let share = [1000.0];
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &share);
        scheduler.submit(Cloudlet::new(1, 2000, 1), 0.0);
        scheduler.submit(Cloudlet::new(2, 2000, 1), 0.0);

        assert!(scheduler.fail(1, FailureKind::ResourceUnavailable));
        assert_eq!(scheduler.failed()[0].status(), CloudletStatus::FailedResourceUnavailable);
        assert_eq!(scheduler.capacity().available_cores(), 1);

        scheduler.update(1.0, &share);
        assert_eq!(ids(scheduler.executing()), vec![2]);
        assert_lists_match_status(&scheduler);
    }

    #[test]
    fn migrated_cloudlet_resumes_elsewhere() {
        let share = [1000.0];
        let mut source = SchedulerCore::new(SpaceShared::new(), &share);
        source.submit(Cloudlet::new(1, 10_000, 1), 0.0);
        source.update(4.0, &share);

        let cloudlet = source.migrate_out(1).unwrap();
        assert_eq!(cloudlet.finished_length(), 4000);
        assert_eq!(cloudlet.status(), CloudletStatus::Ready);
        assert!(source.is_empty());

        let mut target = SchedulerCore::new(SpaceShared::new(), &[2000.0]);
        target.update(4.0, &[2000.0]);
        assert_eq!(target.submit(cloudlet, 0.0), 7.0);

        target.update(7.0, &[2000.0]);
        let done = target.next_finished().unwrap();
        assert_eq!(done.finished_length(), 10_000);
        assert_eq!(done.exec_start_time(), Some(0.0));
        assert_eq!(done.finish_time(), Some(7.0));
        assert!(!target.has_finished());
    }

    #[test]
    fn file_transfer_delays_execution() {
        let share = [1000.0];
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &share);
        assert_eq!(scheduler.submit(Cloudlet::new(1, 2000, 1), 3.0), 5.0);

        scheduler.update(2.0, &share);
        assert_eq!(scheduler.executing()[0].finished_length_so_far(), 0);

        scheduler.update(5.0, &share);
        let done = scheduler.next_finished().unwrap();
        assert_eq!(done.exec_start_time(), Some(3.0));
        assert_eq!(done.finish_time(), Some(5.0));
    }

    #[test]
    fn duplicate_submission_is_ignored() {
        let mut scheduler = SchedulerCore::new(TimeShared::new(), &[1000.0]);
        scheduler.submit(Cloudlet::new(1, 1000, 1), 0.0);
        assert_eq!(scheduler.submit(Cloudlet::new(1, 9000, 1), 0.0), 0.0);
        assert_eq!(scheduler.running_count(), 1);
        assert_eq!(scheduler.executing()[0].cloudlet().length(), 1000);
    }

    #[test]
    fn utilization_is_reported_over_executing() {
        use crate::models::UtilizationModel;

        let share = [1000.0, 1000.0];
        let mut scheduler = SchedulerCore::new(SpaceShared::new(), &share);
        scheduler.submit(
            Cloudlet::new(1, 1000, 1)
                .with_cpu_utilization(UtilizationModel::Fixed(0.5))
                .with_ram_utilization(UtilizationModel::Fixed(0.25))
                .with_bw_utilization(UtilizationModel::Fixed(0.1)),
            0.0,
        );

        assert!((scheduler.utilization_of_cpu(0.0) - 0.25).abs() < 1e-9);
        assert!((scheduler.utilization_of_ram(0.0) - 0.25).abs() < 1e-9);
        assert!((scheduler.utilization_of_bw(0.0) - 0.1).abs() < 1e-9);
        assert_eq!(scheduler.current_requested_mips(0.0), vec![500.0]);
    }
}
