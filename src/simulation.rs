use std::io;

use log::info;

use crate::models::scheduler::{Policy, SchedulerCore};
use crate::models::{Cloudlet, Time, Workload};
use crate::utils::Result;

/// Outcome of a simulation run.
#[derive(Debug, Default)]
pub struct SimulationReport {
    pub finished: Vec<Cloudlet>,    // In completion order
    pub unfinished: usize,          // Cloudlets still queued, running or not yet submitted
    pub makespan: Time,             // Latest finish time
    pub invocations: usize,         // Time points at which the scheduler was updated
}

impl SimulationReport {
    pub fn all_finished(&self) -> bool {
        self.unfinished == 0
    }

    /// Writes one CSV row per finished cloudlet, with a header.
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record(["id", "status", "length", "pes", "priority", "exec_start_time", "finish_time"])?;

        for cloudlet in &self.finished {
            wtr.write_record(&[
                cloudlet.id().to_string(),
                cloudlet.status().to_string(),
                cloudlet.length().to_string(),
                cloudlet.pes().to_string(),
                cloudlet.priority().to_string(),
                cloudlet.exec_start_time().map(|t| t.to_string()).unwrap_or_default(),
                cloudlet.finish_time().map(|t| t.to_string()).unwrap_or_default(),
            ])?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Runs `workload` on a single scheduler whose cores keep the same `mips_share`.
///
/// The scheduler is invoked at every arrival and every event time it asks for,
/// until nothing is left to do or the next event falls after `max_time`.
pub fn simulation<P: Policy>(
    scheduler: &mut SchedulerCore<P>,
    mut workload: Workload,
    mips_share: &[f64],
    max_time: Time,
) -> SimulationReport {
    let total = workload.len();
    let mut report = SimulationReport::default();

    info!(
        "[{}] simulating {} cloudlets on {} cores",
        scheduler.policy().name(),
        total,
        mips_share.len()
    );

    let Some(mut time) = workload.next_arrival() else {
        return report;
    };

    while time <= max_time {
        report.invocations += 1;
        let mut next = scheduler.update(time, mips_share);

        let released = workload.release_cloudlets(time);
        if !released.is_empty() {
            for cloudlet in released {
                scheduler.submit(cloudlet, 0.0);
            }
            // Same time point, so only admission and the next event are recomputed.
            next = scheduler.update(time, mips_share);
        }

        while let Some(cloudlet) = scheduler.next_finished() {
            if let Some(finish) = cloudlet.finish_time() {
                report.makespan = report.makespan.max(finish);
            }
            report.finished.push(cloudlet);
        }

        if let Some(arrival) = workload.next_arrival() {
            next = next.min(arrival);
        }
        if next.is_infinite() {
            break;
        }
        time = next;
    }

    report.unfinished = total - report.finished.len();
    info!(
        "[{}] {} finished, {} unfinished, makespan {}",
        scheduler.policy().name(),
        report.finished.len(),
        report.unfinished,
        report.makespan
    );

    report
}
