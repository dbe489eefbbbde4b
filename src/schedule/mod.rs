//! Case scheduling and per-computation lead-time resolution.
pub mod cases;
pub mod steps;

pub use cases::{Case, CaseSchedule, ForecastKey, ScheduleParams, SchedulingError};
