use super::{Time, ID};
use crate::utils::CloudletStatus;

/// How much of a resource a cloudlet uses at a given time, as a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UtilizationModel {
    /// Always uses the whole resource.
    Full,
    /// Uses a fixed fraction of the resource.
    Fixed(f64),
    /// Starts at `initial` and grows by `increment` every simulated second.
    Dynamic { initial: f64, increment: f64 },
}

impl UtilizationModel {
    pub fn utilization(&self, time: Time) -> f64 {
        let value = match *self {
            UtilizationModel::Full => 1.0,
            UtilizationModel::Fixed(fraction) => fraction,
            UtilizationModel::Dynamic { initial, increment } => initial + increment * time.max(0.0),
        };
        value.clamp(0.0, 1.0)
    }

    /// Earliest time, not before `time`, from which the model asks for more than nothing.
    ///
    /// # Returns
    /// `None` if the utilization stays at 0 forever.
    pub fn next_busy_time(&self, time: Time) -> Option<Time> {
        if self.utilization(time) > 0.0 {
            return Some(time);
        }
        match *self {
            UtilizationModel::Dynamic { initial, increment } if increment > 0.0 => {
                Some(time.max(-initial / increment))
            }
            _ => None,
        }
    }
}

/// A unit of work submitted to a cloudlet scheduler.
///
/// The length is expressed in millions of instructions (MI), so a core of
/// `x` MIPS executes `x` units of length per simulated second.
#[derive(Debug, Clone, PartialEq)]
pub struct Cloudlet {
    id: ID,
    length: u64,                    // Total length, in MI
    pes: u32,                       // Number of cores required
    priority: i32,                  // Higher runs first under the weighted fair policy
    utilization_cpu: UtilizationModel,
    utilization_ram: UtilizationModel,
    utilization_bw: UtilizationModel,
    status: CloudletStatus,         // Last status reported by a scheduler
    finished_length: u64,           // Length executed so far, synced by the scheduler
    exec_start_time: Option<Time>,  // First time the cloudlet ran
    finish_time: Option<Time>,      // Time it reached a terminal status
}

impl Cloudlet {
    pub fn new(id: ID, length: u64, pes: u32) -> Self {
        Self {
            id,
            length,
            pes: pes.max(1),
            priority: 0,
            utilization_cpu: UtilizationModel::Full,
            utilization_ram: UtilizationModel::Full,
            utilization_bw: UtilizationModel::Full,
            status: CloudletStatus::Created,
            finished_length: 0,
            exec_start_time: None,
            finish_time: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_cpu_utilization(mut self, model: UtilizationModel) -> Self {
        self.utilization_cpu = model;
        self
    }

    pub fn with_ram_utilization(mut self, model: UtilizationModel) -> Self {
        self.utilization_ram = model;
        self
    }

    pub fn with_bw_utilization(mut self, model: UtilizationModel) -> Self {
        self.utilization_bw = model;
        self
    }

    pub fn id(&self) -> ID {
        self.id
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn pes(&self) -> u32 {
        self.pes
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn status(&self) -> CloudletStatus {
        self.status
    }

    pub fn finished_length(&self) -> u64 {
        self.finished_length
    }

    pub fn exec_start_time(&self) -> Option<Time> {
        self.exec_start_time
    }

    pub fn finish_time(&self) -> Option<Time> {
        self.finish_time
    }

    pub fn is_finished(&self) -> bool {
        self.status == CloudletStatus::Success
    }

    pub fn utilization_of_cpu(&self, time: Time) -> f64 {
        self.utilization_cpu.utilization(time)
    }

    pub fn cpu_utilization_model(&self) -> &UtilizationModel {
        &self.utilization_cpu
    }

    pub fn utilization_of_ram(&self, time: Time) -> f64 {
        self.utilization_ram.utilization(time)
    }

    pub fn utilization_of_bw(&self, time: Time) -> f64 {
        self.utilization_bw.utilization(time)
    }

    /// Copies the scheduler-side progress back into the cloudlet.
    pub(crate) fn record_progress(
        &mut self,
        status: CloudletStatus,
        finished_length: u64,
        exec_start_time: Option<Time>,
        finish_time: Option<Time>,
    ) {
        self.status = status;
        self.finished_length = finished_length.min(self.length);
        self.exec_start_time = exec_start_time;
        self.finish_time = finish_time;
    }
}
