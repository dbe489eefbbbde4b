//! Numeric evaluation: SIMD kernels, values, operators and dispatch.
pub mod engine;
pub mod kernel;
pub mod ledger;
pub mod operators;

pub use engine::Computer;
pub use ledger::{CaseLedger, ComputationError, Value};
