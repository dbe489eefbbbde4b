use crate::analysis::SkipReason;
use crate::compute::ComputationError;
use crate::io::LoadError;
use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;
use tracing::Level;

/// A recoverable per-case outcome: the case emits no rows and the run goes on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaseSkip {
    #[error("forecast already considered in case {first_case}")]
    Duplicate { first_case: u32 },
    #[error("forecast out of the calibration period {start} - {end}")]
    OutOfPeriod { start: NaiveDate, end: NaiveDate },
    #[error("file not found: {0}")]
    MissingFile(PathBuf),
    #[error("cannot read {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },
    #[error("no observations in {0}")]
    EmptyObservations(PathBuf),
    #[error("no observation corresponds to {reference} >= {threshold}")]
    RetentionExhausted { reference: String, threshold: f64 },
    #[error("computing '{computation}' failed: {source}")]
    Arithmetic {
        computation: String,
        #[source]
        source: ComputationError,
    },
}

impl From<LoadError> for CaseSkip {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::NotFound(path) => CaseSkip::MissingFile(path),
            LoadError::Read { path, reason } => CaseSkip::ReadError { path, reason },
        }
    }
}

impl CaseSkip {
    pub fn arithmetic(computation: &str) -> impl FnOnce(ComputationError) -> CaseSkip + '_ {
        move |source| CaseSkip::Arithmetic { computation: computation.to_string(), source }
    }

    pub fn reason(&self) -> SkipReason {
        match self {
            CaseSkip::Duplicate { .. } => SkipReason::Duplicate,
            CaseSkip::OutOfPeriod { .. } => SkipReason::OutOfPeriod,
            CaseSkip::MissingFile(_) => SkipReason::MissingFile,
            CaseSkip::ReadError { .. } => SkipReason::ReadError,
            CaseSkip::EmptyObservations(_) => SkipReason::EmptyObservations,
            CaseSkip::RetentionExhausted { .. } => SkipReason::RetentionExhausted,
            CaseSkip::Arithmetic { .. } => SkipReason::Arithmetic,
        }
    }

    /// Undecodable files and failed arithmetic are errors; everything else
    /// is an expected gap in the data.
    pub fn level(&self) -> Level {
        match self {
            CaseSkip::ReadError { .. } | CaseSkip::Arithmetic { .. } => Level::ERROR,
            _ => Level::WARN,
        }
    }

    /// Logs the skip inside the current case span.
    pub fn log(&self) {
        if self.level() == Level::ERROR {
            tracing::error!(reason = %self.reason(), "{self}. Case not considered.");
        } else {
            tracing::warn!(reason = %self.reason(), "{self}. Case not considered.");
        }
    }
}
