use super::case::{CaseOutcome, CaseRunner};
use super::rows::table_schema;
use super::skip::CaseSkip;
use crate::analysis::{Plan, RunAccumulators, RunSummary};
use crate::display::{format_footer, format_header, run_description};
use crate::error::RunError;
use crate::io::{FieldLoader, ObservationLoader, PathTemplates, TableSchema, TableSink};
use crate::schedule::Case;
use crate::store::Config;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, info_span, warn};

/// Stop flag shared with whoever may want to end a run early.
/// Checked once before each case, so a case is always written whole or not at all.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self { Self::default() }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Drives a whole run: cases in order, one at a time, into a table sink.
pub struct Runner<'a, F, O> {
    config: &'a Config,
    plan: Plan,
    paths: PathTemplates,
    schema: TableSchema,
    fields: F,
    observations: O,
    cancellation: Cancellation,
}

impl<'a, F: FieldLoader, O: ObservationLoader> Runner<'a, F, O> {
    /// Validates the configuration and fixes the plan and the table schema.
    pub fn new(config: &'a Config, fields: F, observations: O) -> Result<Self, RunError> {
        config.schedule().validate()?;
        config.validate()?;
        let plan = Plan::from_config(config)?;
        let schema = table_schema(&plan, config.predictand.error);
        Ok(Self {
            config,
            plan,
            paths: PathTemplates::from_config(config),
            schema,
            fields,
            observations,
            cancellation: Cancellation::new(),
        })
    }

    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn plan(&self) -> &Plan { &self.plan }
    pub fn schema(&self) -> &TableSchema { &self.schema }

    /// Runs every scheduled case.
    pub fn run<S: TableSink>(&self, sink: &mut S) -> Result<RunSummary, RunError> {
        let cases = self.config.schedule().cases()?;
        self.run_cases(cases, sink)
    }

    /// Runs the given cases in order. Repeated forecasts and cases outside
    /// the calibration period are skipped.
    pub fn run_cases<I, S>(&self, cases: I, sink: &mut S) -> Result<RunSummary, RunError>
    where
        I: IntoIterator<Item = Case>,
        S: TableSink,
    {
        info!("POINT DATA TABLE\n{}", run_description(self.config, &self.plan));
        sink.add_header(&format_header(self.config, &self.plan, Utc::now().naive_utc()))?;

        let case_runner = CaseRunner::new(
            &self.plan,
            &self.paths,
            self.config.predictand.error,
            self.config.predictors.sampling_interval,
            &self.fields,
            &self.observations,
        );

        let mut acc = RunAccumulators::new();
        let mut cancelled = false;
        for case in cases {
            if self.cancellation.is_cancelled() {
                warn!(next_case = case.index, "run cancelled");
                cancelled = true;
                break;
            }
            acc = self.run_case(&case_runner, case, acc, sink)?;
        }

        let summary = acc.summary(cancelled);
        sink.add_footer(&format_footer(self.config, &self.plan, &summary))?;
        summary.log();
        Ok(summary)
    }

    fn run_case<S: TableSink>(
        &self,
        case_runner: &CaseRunner<'_, F, O>,
        case: Case,
        mut acc: RunAccumulators,
        sink: &mut S,
    ) -> Result<RunAccumulators, RunError> {
        let span = info_span!("case", case = case.index);
        let _enter = span.enter();

        acc.cases_considered += 1;
        let key = case.forecast_key(self.plan.accumulation());
        info!(forecast = %key, "forecast parameters");

        let params = &self.config.parameters;
        let guard = if let Some(first_case) = acc.first_seen(&key) {
            Some(CaseSkip::Duplicate { first_case })
        } else if case.date < params.date_start || case.date > params.date_end {
            Some(CaseSkip::OutOfPeriod { start: params.date_start, end: params.date_end })
        } else {
            None
        };
        if let Some(skip) = guard {
            skip.log();
            acc.record_skip(skip.reason());
            return Ok(acc);
        }
        acc.record_forecast(key, case.index);

        let report = case_runner.run(&case);
        acc.record_observations(report.observations_read);
        match report.outcome {
            CaseOutcome::Emitted(chunk) => {
                let rows = self.schema.check(&chunk)?;
                sink.add_columns_chunk(&chunk)?;
                acc.record_emitted(rows);
                info!(rows, "rows written");
            }
            CaseOutcome::Skipped(skip) => {
                skip.log();
                acc.record_skip(skip.reason());
            }
        }
        Ok(acc)
    }
}
