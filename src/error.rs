use crate::io::SchemaMismatch;
use crate::schedule::SchedulingError;
use crate::store::ConfigError;
use thiserror::Error;

/// Failures that stop a run. Per-case problems are `runner::CaseSkip` and
/// never surface here.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid schedule: {0}")]
    Scheduling(#[from] SchedulingError),
    #[error("writing the point data table failed: {0}")]
    Output(#[from] std::io::Error),
    #[error("row chunk does not match the table schema: {0}")]
    Schema(#[from] SchemaMismatch),
}
