//! Loader seams for forecast grids and observation files, and the path
//! layout both are found under.

use crate::geo::{Field, ObservationSet};
use crate::store::Config;
use chrono::{NaiveDate, NaiveDateTime};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("file not found: {0}")]
    NotFound(PathBuf),
    #[error("cannot read {path}: {reason}")]
    Read { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound(path) | LoadError::Read { path, .. } => path,
        }
    }
}

/// Decodes one forecast grid file.
pub trait FieldLoader {
    fn load_field(&self, path: &Path) -> Result<Field, LoadError>;
}

/// Decodes one point observation file.
pub trait ObservationLoader {
    fn load_observations(&self, path: &Path) -> Result<ObservationSet, LoadError>;
}

impl<T: FieldLoader + ?Sized> FieldLoader for &T {
    fn load_field(&self, path: &Path) -> Result<Field, LoadError> {
        (**self).load_field(path)
    }
}

impl<T: ObservationLoader + ?Sized> ObservationLoader for &T {
    fn load_observations(&self, path: &Path) -> Result<ObservationSet, LoadError> {
        (**self).load_observations(path)
    }
}

/// Where forecast and observation files live on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplates {
    pub forecast_root: PathBuf,
    pub observation_root: PathBuf,
    pub predictand_code: String,
    pub accumulation: Option<u32>,
}

impl PathTemplates {
    pub fn from_config(config: &Config) -> Self {
        Self {
            forecast_root: config.predictors.path.clone(),
            observation_root: config.observations.path.clone(),
            predictand_code: config.predictand.code.clone(),
            accumulation: config.predictand.accumulation,
        }
    }

    /// `<root>/<code>/<YYYYMMDDHH>/<code>_<YYYYMMDD>_<HH>_<SS>.grib`
    pub fn forecast(&self, code: &str, date: NaiveDate, hour: u32, step: u32) -> PathBuf {
        let day = date.format("%Y%m%d");
        self.forecast_root
            .join(code)
            .join(format!("{day}{hour:02}"))
            .join(format!("{code}_{day}_{hour:02}_{step:02}.grib"))
    }

    /// Observation file valid at `validity` (the end of the window when accumulated).
    pub fn observation(&self, validity: NaiveDateTime) -> PathBuf {
        let day = validity.format("%Y%m%d");
        let hour = validity.format("%H");
        let code = &self.predictand_code;
        match self.accumulation {
            Some(acc) => self
                .observation_root
                .join(format!("Acc{acc:02}h"))
                .join(day.to_string())
                .join(format!("{code}_{acc:02}_{day}_{hour}.geo")),
            None => self
                .observation_root
                .join(day.to_string())
                .join(format!("{code}_{day}_{hour}.geo")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn templates(accumulation: Option<u32>) -> PathTemplates {
        PathTemplates {
            forecast_root: PathBuf::from("/fc"),
            observation_root: PathBuf::from("/obs"),
            predictand_code: "tp".into(),
            accumulation,
        }
    }

    fn ymd(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2020, 1, d).unwrap()
    }

    #[test]
    fn test_forecast_path() {
        let path = templates(Some(6)).forecast("cp", ymd(1), 0, 6);
        assert_eq!(path, PathBuf::from("/fc/cp/2020010100/cp_20200101_00_06.grib"));

        let path = templates(Some(6)).forecast("cp", ymd(1), 12, 132);
        assert_eq!(path, PathBuf::from("/fc/cp/2020010112/cp_20200101_12_132.grib"));
    }

    #[test]
    fn test_observation_paths() {
        let validity = ymd(2).and_hms_opt(6, 0, 0).unwrap();
        assert_eq!(
            templates(Some(6)).observation(validity),
            PathBuf::from("/obs/Acc06h/20200102/tp_06_20200102_06.geo")
        );
        assert_eq!(
            templates(None).observation(validity),
            PathBuf::from("/obs/20200102/tp_20200102_06.geo")
        );
    }

    #[test]
    fn test_error_carries_path() {
        let err = LoadError::Read { path: "/x.geo".into(), reason: "bad header".into() };
        assert_eq!(err.path(), Path::new("/x.geo"));
        assert_eq!(err.to_string(), "cannot read /x.geo: bad header");
    }
}
