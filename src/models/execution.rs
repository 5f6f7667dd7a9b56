use super::{Cloudlet, Time, ID};
use crate::utils::CloudletStatus;

/// Scheduler-private progress of one admitted cloudlet.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionRecord {
    cloudlet: Cloudlet,               // The cloudlet being executed
    status: CloudletStatus,           // Must match the scheduler list holding the record
    finished_so_far: u64,             // Executed length, in MI
    arrival_time: Time,               // Time the record was submitted
    last_processing_time: Time,       // Time up to which progress has been accounted
    exec_start_time: Option<Time>,    // First time the record entered execution
    finish_time: Option<Time>,        // Time the record reached a terminal status
}

impl ExecutionRecord {
    /// Wraps a cloudlet submitted at `arrival_time`.
    ///
    /// A migrated cloudlet keeps the length it already executed elsewhere.
    /// Progress is not accounted before `arrival_time + file_transfer_time`.
    pub fn new(cloudlet: Cloudlet, arrival_time: Time, file_transfer_time: Time) -> Self {
        Self {
            finished_so_far: cloudlet.finished_length(),
            exec_start_time: cloudlet.exec_start_time(),
            cloudlet,
            status: CloudletStatus::Ready,
            arrival_time,
            last_processing_time: arrival_time + file_transfer_time.max(0.0),
            finish_time: None,
        }
    }

    pub fn id(&self) -> ID {
        self.cloudlet.id()
    }

    pub fn cloudlet(&self) -> &Cloudlet {
        &self.cloudlet
    }

    pub fn pes(&self) -> u32 {
        self.cloudlet.pes()
    }

    pub fn priority(&self) -> i32 {
        self.cloudlet.priority()
    }

    pub fn status(&self) -> CloudletStatus {
        self.status
    }

    pub fn arrival_time(&self) -> Time {
        self.arrival_time
    }

    pub fn last_processing_time(&self) -> Time {
        self.last_processing_time
    }

    pub fn exec_start_time(&self) -> Option<Time> {
        self.exec_start_time
    }

    pub fn finish_time(&self) -> Option<Time> {
        self.finish_time
    }

    pub fn finished_length_so_far(&self) -> u64 {
        self.finished_so_far
    }

    /// Length still to execute, never negative.
    pub fn remaining_length(&self) -> u64 {
        self.cloudlet.length().saturating_sub(self.finished_so_far)
    }

    /// Adds executed instructions, saturating at the cloudlet length.
    pub fn advance(&mut self, instructions_executed: u64) {
        self.finished_so_far = self
            .finished_so_far
            .saturating_add(instructions_executed)
            .min(self.cloudlet.length());
    }

    pub fn is_complete(&self) -> bool {
        self.finished_so_far >= self.cloudlet.length()
    }

    /// Whole seconds of execution between the last accounted time and `current_time`.
    ///
    /// Time is accounted in whole seconds: `floor(current) - floor(last)`.
    pub fn elapsed_since_last_processing(&self, current_time: Time) -> f64 {
        (current_time.floor() - self.last_processing_time.floor()).max(0.0)
    }

    /// Marks progress as accounted up to `time`.
    ///
    /// A record still waiting on its file transfer keeps its later start.
    pub fn set_last_processing_time(&mut self, time: Time) {
        if time > self.last_processing_time {
            self.last_processing_time = time;
        }
    }

    pub(crate) fn set_status(&mut self, status: CloudletStatus) {
        if status == CloudletStatus::InExec && self.exec_start_time.is_none() {
            self.exec_start_time = Some(self.last_processing_time.max(self.arrival_time));
        }
        self.status = status;
    }

    pub(crate) fn set_finish_time(&mut self, time: Time) {
        self.finish_time = Some(time);
    }

    /// Consumes the record, handing back the cloudlet with its progress synced.
    pub fn into_cloudlet(self) -> Cloudlet {
        let mut cloudlet = self.cloudlet;
        cloudlet.record_progress(
            self.status,
            self.finished_so_far,
            self.exec_start_time,
            self.finish_time,
        );
        cloudlet
    }
}
