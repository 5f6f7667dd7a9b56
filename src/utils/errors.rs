use thiserror::Error;

/// Errors raised while loading workloads and configuring a run.
///
/// The scheduler itself never fails: unknown ids and unfitting cloudlets are
/// reported through its return values.
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid number: {0}")]
    ParseFloat(#[from] std::num::ParseFloatError),

    #[error("invalid integer: {0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("line {line}: {reason}")]
    InvalidField { line: usize, reason: String },

    #[error("unknown policy '{0}', expected time-shared, space-shared, dynamic or fair")]
    UnknownPolicy(String),

    #[error("invalid mips share: {0}")]
    InvalidMipsShare(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;
