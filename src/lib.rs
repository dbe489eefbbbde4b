//! Point data table core: pairs forecast-model fields with point
//! observations, case by case, through a configured computation graph.
//!
//! A run is driven by [`runner::Runner`]: it validates a [`store::Config`],
//! fixes the [`analysis::Plan`], walks the case schedule and appends one
//! chunk of rows per emitted case to a [`io::TableSink`]. Decoding forecast
//! and observation files is left to implementations of the
//! [`io::FieldLoader`] and [`io::ObservationLoader`] traits.

pub mod analysis;
pub mod compute;
pub mod display;
pub mod error;
pub mod geo;
pub mod io;
pub mod runner;
pub mod schedule;
pub mod store;

pub use analysis::{Plan, RunSummary, SkipReason};
pub use error::RunError;
pub use runner::{Cancellation, Runner};
pub use store::Config;
