//! Forecast fields, point observations and how the two are paired.
pub mod field;
pub mod observations;
pub mod pairing;

pub use field::{Field, GridSpec};
pub use observations::ObservationSet;
pub use pairing::{Mask, Retention};
