//! Run configuration and the computation descriptors it carries.
pub mod config;
pub mod registry;
pub mod types;

pub use config::{Config, ConfigError, ErrorKind, OutFormat};
pub use registry::ComputationRegistry;
pub use types::{Computation, ComputationKind, FieldInput};
