use super::{Cloudlet, Time};

/// Cloudlets waiting for their submission time, earliest first.
#[derive(Debug, Default)]
pub struct Workload {
    arrivals: Vec<(Time, Cloudlet)>,
}

impl Workload {
    pub fn new(mut arrivals: Vec<(Time, Cloudlet)>) -> Self {
        // Stable, so cloudlets submitted together keep their file order.
        arrivals.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { arrivals }
    }

    pub fn new_empty() -> Self {
        Self::default()
    }

    pub fn add(&mut self, submission_time: Time, cloudlet: Cloudlet) {
        let position = self
            .arrivals
            .partition_point(|(time, _)| *time <= submission_time);
        self.arrivals.insert(position, (submission_time, cloudlet));
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    /// Submission time of the next cloudlet, if any is left.
    pub fn next_arrival(&self) -> Option<Time> {
        self.arrivals.first().map(|(time, _)| *time)
    }

    /// Removes and returns every cloudlet due at or before `current_time`.
    pub fn release_cloudlets(&mut self, current_time: Time) -> Vec<Cloudlet> {
        let due = self
            .arrivals
            .partition_point(|(time, _)| *time <= current_time);
        self.arrivals
            .drain(..due)
            .map(|(_, cloudlet)| cloudlet)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Time, Cloudlet)> {
        self.arrivals.iter()
    }
}
