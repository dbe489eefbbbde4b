//! Immutable run parameters, loaded from the JSON run document.

use super::types::Computation;
use crate::analysis::Plan;
use crate::schedule::{ScheduleParams, SchedulingError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate computation short name '{0}'")]
    DuplicateName(String),
    #[error("no base computation takes the predictand '{0}' as its single input")]
    MissingReference(String),
    #[error("predictand computation '{0}' must be post-processed")]
    HiddenReference(String),
    #[error("computation '{name}': {reason}")]
    InvalidComputation { name: String, reason: String },
    #[error("only one LOCAL_SOLAR_TIME computation is allowed, found {0}")]
    MultipleLocalSolarTime(usize),
    #[error("{0} must be positive")]
    NotPositive(&'static str),
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutFormat {
    #[default]
    #[serde(rename = "ASCII")]
    Ascii,
    #[serde(rename = "PARQUET")]
    Parquet,
}

impl OutFormat {
    pub fn name(&self) -> &'static str {
        match self {
            OutFormat::Ascii => "ASCII",
            OutFormat::Parquet => "PARQUET",
        }
    }
}

/// How the forecast error column is derived from observation and predictand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Forecast error ratio: `(obs - fc) / fc`.
    #[serde(rename = "FER")]
    Ratio,
    /// Forecast error: `obs - fc`.
    #[serde(rename = "FE")]
    Difference,
}

impl ErrorKind {
    pub fn column_name(&self) -> &'static str {
        match self {
            ErrorKind::Ratio => "FER",
            ErrorKind::Difference => "FE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameters {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub spinup_limit: u32,
    pub model_interval: u32,
    pub step_interval: u32,
    pub start_time: u32,
    pub out_path: PathBuf,
    #[serde(default)]
    pub out_format: OutFormat,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictand {
    pub code: String,
    /// Accumulation window in hours; `None` for an instantaneous predictand.
    #[serde(default)]
    pub accumulation: Option<u32>,
    #[serde(default)]
    pub min_value: f64,
    pub error: ErrorKind,
    #[serde(default)]
    pub units: Option<String>,
}

impl Predictand {
    pub fn is_accumulated(&self) -> bool { self.accumulation.is_some() }

    /// Window length in hours, 0 for an instantaneous predictand.
    pub fn accumulation_hours(&self) -> u32 { self.accumulation.unwrap_or(0) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predictors {
    pub path: PathBuf,
    pub codes: Vec<String>,
    pub sampling_interval: u32,
    #[serde(default)]
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observations {
    pub path: PathBuf,
    #[serde(default)]
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub parameters: Parameters,
    pub predictand: Predictand,
    pub predictors: Predictors,
    pub observations: Observations,
    pub computations: Vec<Computation>,
}

impl Config {
    pub fn from_json_str(doc: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(doc)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&doc)
    }

    pub fn schedule(&self) -> ScheduleParams {
        let p = &self.parameters;
        ScheduleParams {
            date_start: p.date_start,
            date_end: p.date_end,
            start_hour: p.start_time,
            model_interval: p.model_interval,
            step_interval: p.step_interval,
            spinup_limit: p.spinup_limit,
        }
    }

    /// Every check that can fail before the first case runs: scalar
    /// parameters, the schedule, and the computation wiring.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.predictand.accumulation == Some(0) {
            return Err(ConfigError::NotPositive("predictand accumulation"));
        }
        if self.predictors.sampling_interval == 0 {
            return Err(ConfigError::NotPositive("predictors sampling interval"));
        }
        self.schedule().validate()?;
        Plan::from_config(self)?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::types::ComputationKind;
    use std::io::Write;

    pub(crate) const SAMPLE: &str = r#"{
        "parameters": {
            "dateStart": "2020-01-01",
            "dateEnd": "2020-01-02",
            "spinupLimit": 6,
            "modelInterval": 12,
            "stepInterval": 6,
            "startTime": 0,
            "outPath": "/tmp/pdt.ascii",
            "outFormat": "ASCII"
        },
        "predictand": {
            "code": "tp",
            "accumulation": 6,
            "minValue": 1.0,
            "error": "FER",
            "units": "mm"
        },
        "predictors": {
            "path": "/data/fc",
            "codes": ["tp", "cp", "sr"],
            "samplingInterval": 6
        },
        "observations": { "path": "/data/obs", "units": "mm" },
        "computations": [
            {
                "shortname": "TP", "fullname": "Total Precipitation",
                "field": "ACCUMULATED_FIELD", "inputs": [{"code": "tp"}],
                "isPostProcessed": true, "mulScale": 1000
            },
            {
                "shortname": "CP", "fullname": "Convective Precipitation",
                "field": "ACCUMULATED_FIELD", "inputs": [{"code": "cp"}],
                "isPostProcessed": false
            },
            {
                "shortname": "CPR", "fullname": "Convective Precipitation Ratio",
                "field": "RATIO_FIELD", "inputs": [{"code": "CP"}, {"code": "TP"}],
                "isPostProcessed": true
            }
        ]
    }"#;

    #[test]
    fn test_parse_sample_document() {
        let config = Config::from_json_str(SAMPLE).unwrap();
        assert_eq!(config.parameters.date_start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.predictand.accumulation_hours(), 6);
        assert!(config.predictand.is_accumulated());
        assert_eq!(config.predictand.error, ErrorKind::Ratio);
        assert_eq!(config.computations.len(), 3);
        assert_eq!(config.computations[2].field, ComputationKind::Ratio);
        assert!(!config.computations[1].is_post_processed);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let config = Config::from_json_file(file.path()).unwrap();
        assert_eq!(config.predictors.codes, vec!["tp", "cp", "sr"]);
        assert_eq!(config.parameters.out_format, OutFormat::Ascii);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = Config::from_json_file(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("absent.json"));
    }

    #[test]
    fn test_zero_sampling_interval_is_rejected() {
        let mut config = Config::from_json_str(SAMPLE).unwrap();
        config.predictors.sampling_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::NotPositive(_))));
    }

    #[test]
    fn test_validate_checks_schedule_and_wiring() {
        let mut config = Config::from_json_str(SAMPLE).unwrap();
        config.parameters.model_interval = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Scheduling(_))));

        let mut config = Config::from_json_str(SAMPLE).unwrap();
        config.predictand.code = "2t".into();
        assert!(matches!(config.validate(), Err(ConfigError::MissingReference(_))));
    }

    #[test]
    fn test_malformed_document() {
        let err = Config::from_json_str("{ \"parameters\": 3 }").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
