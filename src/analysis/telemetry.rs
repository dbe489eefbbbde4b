use crate::schedule::ForecastKey;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Why a case produced no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkipReason {
    Duplicate,
    OutOfPeriod,
    MissingFile,
    ReadError,
    EmptyObservations,
    RetentionExhausted,
    Arithmetic,
}

impl SkipReason {
    pub fn name(&self) -> &'static str {
        match self {
            SkipReason::Duplicate => "duplicate",
            SkipReason::OutOfPeriod => "out_of_period",
            SkipReason::MissingFile => "missing_file",
            SkipReason::ReadError => "read_error",
            SkipReason::EmptyObservations => "empty_observations",
            SkipReason::RetentionExhausted => "retention_exhausted",
            SkipReason::Arithmetic => "arithmetic",
        }
    }
}

impl Serialize for SkipReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Run-wide state owned by the runner and updated only between cases.
#[derive(Debug, Clone, Default)]
pub struct RunAccumulators {
    /// Observations read from non-empty observation files.
    pub observations_seen: u64,
    /// Observations that made it into the table.
    pub observations_retained: u64,
    pub cases_considered: u64,
    pub cases_emitted: u64,
    seen_forecasts: HashMap<ForecastKey, u32>,
    skips: HashMap<SkipReason, u64>,
}

impl RunAccumulators {
    pub fn new() -> Self { Self::default() }

    /// The index of the case that first used `key`, if any.
    pub fn first_seen(&self, key: &ForecastKey) -> Option<u32> {
        self.seen_forecasts.get(key).copied()
    }

    pub fn record_forecast(&mut self, key: ForecastKey, case_index: u32) {
        self.seen_forecasts.entry(key).or_insert(case_index);
    }

    pub fn record_observations(&mut self, n: usize) {
        self.observations_seen += n as u64;
    }

    pub fn record_emitted(&mut self, rows: usize) {
        self.cases_emitted += 1;
        self.observations_retained += rows as u64;
    }

    pub fn record_skip(&mut self, reason: SkipReason) {
        *self.skips.entry(reason).or_insert(0) += 1;
    }

    pub fn skipped(&self, reason: SkipReason) -> u64 {
        self.skips.get(&reason).copied().unwrap_or(0)
    }

    pub fn total_skipped(&self) -> u64 {
        self.skips.values().sum()
    }

    pub fn summary(&self, cancelled: bool) -> RunSummary {
        RunSummary {
            cases_considered: self.cases_considered,
            cases_emitted: self.cases_emitted,
            observations_seen: self.observations_seen,
            observations_retained: self.observations_retained,
            skips: self.skips.iter().map(|(k, v)| (*k, *v)).collect(),
            cancelled,
        }
    }
}

/// End-of-run report, returned to the caller and logged.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    pub cases_considered: u64,
    pub cases_emitted: u64,
    pub observations_seen: u64,
    pub observations_retained: u64,
    pub skips: BTreeMap<SkipReason, u64>,
    pub cancelled: bool,
}

impl RunSummary {
    pub fn skipped(&self, reason: SkipReason) -> u64 {
        self.skips.get(&reason).copied().unwrap_or(0)
    }

    /// Emits the summary as a single `info` event.
    pub fn log(&self) {
        tracing::info!(
            event = "run.summary",
            cases_considered = self.cases_considered,
            cases_emitted = self.cases_emitted,
            observations_seen = self.observations_seen,
            observations_retained = self.observations_retained,
            cases_skipped = self.skips.values().sum::<u64>(),
            cancelled = self.cancelled,
        );
        for (reason, count) in &self.skips {
            tracing::info!(event = "run.skips", reason = %reason, count = *count);
        }
    }
}
