//! Forecast errors, rounding and the per-case row chunk.

use crate::analysis::Plan;
use crate::compute::kernel::{self, Kernel};
use crate::compute::ComputationError;
use crate::geo::ObservationSet;
use crate::io::{Column, ColumnChunk, TableSchema};
use crate::schedule::Case;
use crate::store::ErrorKind;
use chrono::NaiveDateTime;

pub const LOCAL_SOLAR_TIME_COLUMN: &str = "LST";
pub const PREDICTAND_COLUMN: &str = "Predictand";

pub fn round3(values: &[f64]) -> Vec<f64> {
    values.iter().map(|v| (v * 1000.0).round() / 1000.0).collect()
}

fn step_column(plan: &Plan) -> &'static str {
    if plan.accumulation().is_some() { "StepF" } else { "Step" }
}

/// The column layout every chunk of the run must follow.
pub fn table_schema(plan: &Plan, error: ErrorKind) -> TableSchema {
    let mut columns = vec![
        "BaseDate", "BaseTime", step_column(plan), "DateOBS", "TimeOBS",
        "LatOBS", "LonOBS", "OBS", PREDICTAND_COLUMN, error.column_name(),
    ];
    if plan.emits_local_solar_time() {
        columns.push(LOCAL_SOLAR_TIME_COLUMN);
    }
    columns.extend(plan.exposed_columns());
    TableSchema::new(columns)
}

/// FER `(obs - fc) / fc` or FE `obs - fc`. A non-finite result fails.
pub fn forecast_errors(kind: ErrorKind, obs: &[f64], predictand: &[f64]) -> Result<Vec<f64>, ComputationError> {
    if obs.len() != predictand.len() {
        return Err(ComputationError::ShapeMismatch {
            msg: format!("{} observations, {} predictand values", obs.len(), predictand.len()),
        });
    }
    let diff = kernel::zip(Kernel::Sub, obs, predictand);
    let errors = match kind {
        ErrorKind::Ratio => kernel::zip(Kernel::Div, &diff, predictand),
        ErrorKind::Difference => diff,
    };
    if let Some(index) = errors.iter().position(|v| !v.is_finite()) {
        return Err(ComputationError::NonFinite { op: kind.column_name(), index });
    }
    Ok(errors)
}

/// Everything one emitted case contributes, already masked.
#[derive(Debug, Clone)]
pub struct CaseRows {
    pub case: Case,
    /// Accumulation hours, 0 when instantaneous.
    pub accumulation: u32,
    pub validity: NaiveDateTime,
    pub observations: ObservationSet,
    pub predictand: Vec<f64>,
    pub errors: Vec<f64>,
    pub local_solar_time: Option<Vec<f64>>,
    /// Exposed computations in column order.
    pub computed: Vec<(String, Vec<f64>)>,
}

impl CaseRows {
    pub fn len(&self) -> usize { self.observations.len() }
    pub fn is_empty(&self) -> bool { self.observations.is_empty() }

    pub fn into_chunk(self, plan: &Plan, error: ErrorKind) -> ColumnChunk {
        let n = self.len();
        let mut chunk = ColumnChunk::new();
        let text = |s: String| Column::Text(vec![s; n]);
        let int = |v: u32| Column::Integer(vec![i64::from(v); n]);

        chunk.push("BaseDate", text(self.case.date.format("%Y-%m-%d").to_string()));
        chunk.push("BaseTime", int(self.case.hour));
        chunk.push(step_column(plan), int(self.case.step + self.accumulation));
        chunk.push("DateOBS", text(self.validity.format("%Y-%m-%d").to_string()));
        chunk.push("TimeOBS", text(self.validity.format("%H").to_string()));
        chunk.push("LatOBS", Column::Float(self.observations.latitudes().to_vec()));
        chunk.push("LonOBS", Column::Float(self.observations.longitudes().to_vec()));
        chunk.push("OBS", Column::Float(self.observations.into_values()));
        chunk.push(PREDICTAND_COLUMN, Column::Float(round3(&self.predictand)));
        chunk.push(error.column_name(), Column::Float(round3(&self.errors)));
        if let Some(lst) = self.local_solar_time {
            chunk.push(LOCAL_SOLAR_TIME_COLUMN, Column::Float(round3(&lst)));
        }
        for (name, values) in self.computed {
            chunk.push(name, Column::Float(round3(&values)));
        }
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::config::tests::SAMPLE;
    use crate::store::Config;
    use chrono::NaiveDate;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorKind::Ratio, &[2.0, 1.0], &[1.0, 4.0], &[1.0, -0.75])]
    #[case(ErrorKind::Difference, &[2.0, 1.0], &[1.0, 4.0], &[1.0, -3.0])]
    fn test_forecast_errors(
        #[case] kind: ErrorKind,
        #[case] obs: &[f64],
        #[case] fc: &[f64],
        #[case] expected: &[f64],
    ) {
        assert_eq!(forecast_errors(kind, obs, fc).unwrap(), expected);
    }

    #[test]
    fn test_zero_predictand_ratio_is_an_error() {
        let err = forecast_errors(ErrorKind::Ratio, &[1.0, 2.0], &[1.0, 0.0]).unwrap_err();
        assert_eq!(err, ComputationError::NonFinite { op: "FER", index: 1 });
        assert!(forecast_errors(ErrorKind::Difference, &[1.0, 2.0], &[1.0, 0.0]).is_ok());
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round3(&[1.23456, -0.0004, 2.0006]), vec![1.235, 0.0, 2.001]);
    }

    #[test]
    fn test_chunk_matches_schema() {
        let config = Config::from_json_str(SAMPLE).unwrap();
        let plan = Plan::from_config(&config).unwrap();
        let schema = table_schema(&plan, config.predictand.error);
        assert_eq!(
            schema.columns(),
            &["BaseDate", "BaseTime", "StepF", "DateOBS", "TimeOBS", "LatOBS", "LonOBS", "OBS", "Predictand", "FER", "TP", "CPR"]
        );

        let case = Case { date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), hour: 12, step: 6, index: 1 };
        let rows = CaseRows {
            case,
            accumulation: 6,
            validity: case.validity(6),
            observations: ObservationSet::from_points([(45.0, 7.0, 3.0), (46.0, 8.0, 5.0)]),
            predictand: vec![2.0, 4.00049],
            errors: vec![0.5, 0.25],
            local_solar_time: None,
            computed: vec![("TP".into(), vec![2.0, 4.00049]), ("CPR".into(), vec![0.1, 0.2])],
        };
        let chunk = rows.into_chunk(&plan, config.predictand.error);

        assert_eq!(schema.check(&chunk), Ok(2));
        assert_eq!(chunk.get("StepF"), Some(&Column::Integer(vec![12, 12])));
        assert_eq!(chunk.get("DateOBS"), Some(&Column::Text(vec!["2020-01-02".into(); 2])));
        assert_eq!(chunk.get("TimeOBS"), Some(&Column::Text(vec!["00".into(); 2])));
        assert_eq!(chunk.get("Predictand"), Some(&Column::Float(vec![2.0, 4.0])));
    }
}
