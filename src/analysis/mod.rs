//! Run planning and run-wide bookkeeping.
pub mod telemetry;
pub mod topology;

pub use telemetry::{RunAccumulators, RunSummary, SkipReason};
pub use topology::{partition, Plan, PlannedComputation};
