/// Snapshot of the processing capacity granted to a scheduler.
///
/// Rebuilt from the mips share on every update; it keeps no history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessorCapacity {
    per_core_mips: Vec<f64>, // MIPS of every core in the share
    used_cores: u32,         // Cores occupied by executing cloudlets
}

impl ProcessorCapacity {
    /// Creates a capacity view over a mips share.
    ///
    /// # Arguments
    /// * `mips_share` - The MIPS currently available on each core.
    ///
    /// # Returns
    /// A `ProcessorCapacity` with no core in use. Negative or NaN entries count as 0 MIPS.
    pub fn new(mips_share: &[f64]) -> Self {
        Self {
            per_core_mips: mips_share
                .iter()
                .map(|&mips| if mips.is_finite() && mips > 0.0 { mips } else { 0.0 })
                .collect(),
            used_cores: 0,
        }
    }

    /// Sum of the MIPS of all cores.
    pub fn total_capacity(&self) -> f64 {
        self.per_core_mips.iter().sum()
    }

    /// Average MIPS of one core, 0 for an empty share.
    pub fn capacity_per_core(&self) -> f64 {
        if self.per_core_mips.is_empty() {
            return 0.0;
        }
        self.total_capacity() / self.per_core_mips.len() as f64
    }

    pub fn core_count(&self) -> u32 {
        self.per_core_mips.len() as u32
    }

    pub fn per_core_mips(&self) -> &[f64] {
        &self.per_core_mips
    }

    pub fn used_cores(&self) -> u32 {
        self.used_cores
    }

    /// Cores not occupied by executing cloudlets.
    pub fn available_cores(&self) -> u32 {
        self.core_count() - self.used_cores
    }

    /// Records how many cores are in use, capped at the core count.
    ///
    /// # Arguments
    /// * `used` - Sum of the cores required by the executing cloudlets.
    pub fn set_used_cores(&mut self, used: u32) {
        self.used_cores = used.min(self.core_count());
    }
}
