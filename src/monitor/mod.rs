//! Evaluation driver and its recurring schedule.

mod driver;
mod scheduler;

pub use driver::{run_cycle, CycleOutcome, DriftMonitor, SkipReason};
pub use scheduler::{ctrlc_shutdown, Scheduler};
