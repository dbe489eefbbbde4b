//! The per-case state machine:
//! read observations, compute base, compute derived, errors, assemble rows.

use super::rows::{self, CaseRows};
use super::skip::CaseSkip;
use crate::analysis::{Plan, PlannedComputation};
use crate::compute::operators::local_solar_time;
use crate::compute::{CaseLedger, ComputationError, Computer, Value};
use crate::geo::{ObservationSet, Retention};
use crate::io::{ColumnChunk, FieldLoader, ObservationLoader, PathTemplates};
use crate::schedule::{steps, Case};
use crate::store::{ComputationKind, ErrorKind};
use tracing::info;

#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Emitted(ColumnChunk),
    Skipped(CaseSkip),
}

/// What one case hands back to the run: its outcome and how many
/// observations it read (counted even when the case is later skipped).
#[derive(Debug, Clone, PartialEq)]
pub struct CaseReport {
    pub observations_read: usize,
    pub outcome: CaseOutcome,
}

impl CaseReport {
    fn skipped(observations_read: usize, skip: CaseSkip) -> Self {
        Self { observations_read, outcome: CaseOutcome::Skipped(skip) }
    }
}

/// Evaluates single cases against a fixed plan. Holds no state between cases.
pub struct CaseRunner<'a, F, O> {
    plan: &'a Plan,
    paths: &'a PathTemplates,
    error: ErrorKind,
    sampling_interval: u32,
    fields: &'a F,
    observations: &'a O,
}

impl<'a, F: FieldLoader, O: ObservationLoader> CaseRunner<'a, F, O> {
    pub fn new(
        plan: &'a Plan,
        paths: &'a PathTemplates,
        error: ErrorKind,
        sampling_interval: u32,
        fields: &'a F,
        observations: &'a O,
    ) -> Self {
        Self { plan, paths, error, sampling_interval, fields, observations }
    }

    /// Runs one case that already passed the duplicate and period checks.
    pub fn run(&self, case: &Case) -> CaseReport {
        let accumulation = self.plan.accumulation().unwrap_or(0);
        let validity = case.validity(accumulation);
        let obs_path = self.paths.observation(validity);

        info!(validity = %validity, file = %obs_path.display(), "reading observation file");
        let obs = match self.observations.load_observations(&obs_path) {
            Ok(obs) => obs,
            Err(err) => return CaseReport::skipped(0, err.into()),
        };
        if obs.is_empty() {
            return CaseReport::skipped(0, CaseSkip::EmptyObservations(obs_path));
        }

        let observations_read = obs.len();
        let outcome = match self.evaluate(case, &obs) {
            Ok(rows) => CaseOutcome::Emitted(rows.into_chunk(self.plan, self.error)),
            Err(skip) => CaseOutcome::Skipped(skip),
        };
        CaseReport { observations_read, outcome }
    }

    fn evaluate(&self, case: &Case, obs: &ObservationSet) -> Result<CaseRows, CaseSkip> {
        let accumulation = self.plan.accumulation().unwrap_or(0);
        let mut ledger = CaseLedger::new();
        let mut retention = Retention::All;
        let mut predictand = Vec::new();
        let mut computed = Vec::new();

        for planned in self.plan.base() {
            let name = planned.shortname();
            let inputs = self.read_forecasts(case, planned)?;
            info!(computation = %planned.computation.fullname, inputs = inputs.len(), "computing");
            let value = Computer::new(planned).run(&inputs).map_err(CaseSkip::arithmetic(name))?;
            ledger.insert(name, value.clone());

            // Hidden base computations only feed derived ones.
            if !planned.is_exposed() {
                continue;
            }
            let projected = value.project(obs).map_err(CaseSkip::arithmetic(name))?;

            if planned.is_reference {
                retention = Retention::for_reference(projected.values(), self.plan.threshold());
                let kept = retention.apply(&projected.into_values()).map_err(CaseSkip::arithmetic(name))?;
                if kept.is_empty() {
                    return Err(CaseSkip::RetentionExhausted {
                        reference: name.to_string(),
                        threshold: self.plan.threshold().unwrap_or(f64::NEG_INFINITY),
                    });
                }
                if let Some(threshold) = self.plan.threshold() {
                    info!(kept = kept.len(), total = obs.len(), "selected {name} >= {threshold}");
                }
                predictand = kept.clone();
                computed.push((name.to_string(), kept));
            } else {
                let kept = retention.apply(&projected.into_values()).map_err(CaseSkip::arithmetic(name))?;
                computed.push((name.to_string(), kept));
            }
        }

        for planned in self.plan.derived() {
            let name = planned.shortname();
            let inputs = ledger.resolve(&planned.computation).map_err(CaseSkip::arithmetic(name))?;
            let codes: Vec<&str> = planned.computation.input_codes().collect();
            info!(computation = %planned.computation.fullname, inputs = %codes.join(", "), "computing");
            let kept = self
                .evaluate_derived(planned, &inputs, obs, &retention)
                .map_err(CaseSkip::arithmetic(name))?;
            computed.push((name.to_string(), kept));
        }

        let observations = retention.apply(obs).map_err(CaseSkip::arithmetic("OBS"))?;
        let errors = rows::forecast_errors(self.error, observations.values(), &predictand)
            .map_err(CaseSkip::arithmetic(self.error.column_name()))?;
        let local_solar_time = self
            .plan
            .emits_local_solar_time()
            .then(|| local_solar_time(observations.longitudes(), case.hour));

        Ok(CaseRows {
            case: *case,
            accumulation,
            validity: case.validity(accumulation),
            observations,
            predictand,
            errors,
            local_solar_time,
            computed,
        })
    }

    /// Loads every lead time a base computation needs, in resolver order.
    fn read_forecasts(&self, case: &Case, planned: &PlannedComputation) -> Result<Vec<Value>, CaseSkip> {
        let name = planned.shortname();
        let Some(code) = planned.computation.input_codes().next() else {
            return Err(CaseSkip::arithmetic(name)(ComputationError::MissingInput(name.to_string())));
        };
        let lead_times = steps::resolve(planned.kind(), self.plan.accumulation(), case.step, self.sampling_interval);

        lead_times
            .iter()
            .map(|&step| -> Result<Value, CaseSkip> {
                let path = self.paths.forecast(code, case.date, case.hour, step);
                info!(file = %path.display(), "reading forecast file");
                Ok(Value::from(self.fields.load_field(&path)?))
            })
            .collect()
    }

    /// Ratios are projected and masked operand by operand, then divided;
    /// anything else is computed on the cached values and projected after.
    fn evaluate_derived(
        &self,
        planned: &PlannedComputation,
        inputs: &[Value],
        obs: &ObservationSet,
        retention: &Retention,
    ) -> Result<Vec<f64>, ComputationError> {
        let computer = Computer::new(planned);
        if planned.kind() == ComputationKind::Ratio {
            let operands = inputs
                .iter()
                .map(|v| -> Result<Value, ComputationError> {
                    Ok(retention.apply(&v.project(obs)?.into_values())?.into())
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(computer.run(&operands)?.to_vec());
        }
        let value = computer.run(inputs)?;
        retention.apply(&value.project(obs)?.into_values())
    }
}
