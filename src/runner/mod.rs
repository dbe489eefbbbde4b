//! Case orchestration: the per-case state machine and the run driver.
pub mod case;
pub mod rows;
pub mod run;
pub mod skip;

pub use case::{CaseOutcome, CaseReport, CaseRunner};
pub use run::{Cancellation, Runner};
pub use skip::CaseSkip;
