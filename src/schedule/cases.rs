//! The case scheduler: a lazy, finite, restartable sequence of forecast cases.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error("date range is inverted: {start} is after {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
    #[error("{0} must be positive")]
    ZeroInterval(&'static str),
    #[error("start hour {0} is outside 0..24")]
    StartHour(u32),
    #[error("model interval {0}h does not divide the 24h day")]
    ModelInterval(u32),
    #[error("step interval {step}h is longer than the model interval {model}h")]
    StepExceedsModel { step: u32, model: u32 },
}

/// One forecast issue date/hour + lead-time combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Case {
    pub date: NaiveDate,
    /// Issue hour (UTC).
    pub hour: u32,
    /// Lead time in hours; the start of the window for an accumulated predictand.
    pub step: u32,
    /// 1-based position in the run.
    pub index: u32,
}

impl Case {
    pub fn issued_at(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + Duration::hours(i64::from(self.hour))
    }

    /// End of the observation window: issue time + lead time + accumulation.
    pub fn validity(&self, accumulation: u32) -> NaiveDateTime {
        self.issued_at() + Duration::hours(i64::from(self.step + accumulation))
    }

    pub fn forecast_key(&self, accumulation: Option<u32>) -> ForecastKey {
        ForecastKey {
            date: self.date,
            hour: self.hour,
            start: self.step,
            end: accumulation.map(|acc| self.step + acc),
        }
    }
}

/// Identity of the forecast a case evaluates. Two cases with equal keys
/// would produce identical rows, so only the first is kept in a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ForecastKey {
    pub date: NaiveDate,
    pub hour: u32,
    pub start: u32,
    pub end: Option<u32>,
}

impl fmt::Display for ForecastKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {:02} UTC, ", self.date.format("%Y-%m-%d"), self.hour)?;
        match self.end {
            Some(end) => write!(f, "(t+{}, t+{})", self.start, end),
            None => write!(f, "(t+{})", self.start),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParams {
    pub date_start: NaiveDate,
    pub date_end: NaiveDate,
    pub start_hour: u32,
    /// Hours between two model runs.
    pub model_interval: u32,
    /// Hours between two lead times of the same run.
    pub step_interval: u32,
    pub spinup_limit: u32,
}

impl ScheduleParams {
    pub fn validate(&self) -> Result<(), SchedulingError> {
        if self.date_start > self.date_end {
            return Err(SchedulingError::InvertedRange { start: self.date_start, end: self.date_end });
        }
        if self.model_interval == 0 {
            return Err(SchedulingError::ZeroInterval("model interval"));
        }
        if self.step_interval == 0 {
            return Err(SchedulingError::ZeroInterval("step interval"));
        }
        if self.start_hour >= 24 {
            return Err(SchedulingError::StartHour(self.start_hour));
        }
        if 24 % self.model_interval != 0 {
            return Err(SchedulingError::ModelInterval(self.model_interval));
        }
        if self.step_interval > self.model_interval {
            return Err(SchedulingError::StepExceedsModel {
                step: self.step_interval,
                model: self.model_interval,
            });
        }
        Ok(())
    }

    /// Smallest multiple of the step interval that is not inside the spin-up period.
    pub fn first_step(&self) -> u32 {
        self.spinup_limit.div_ceil(self.step_interval) * self.step_interval
    }

    pub fn hours_per_day(&self) -> u32 {
        (24 - self.start_hour).div_ceil(self.model_interval)
    }

    /// Lead times per issue: enough to cover one model interval.
    pub fn steps_per_issue(&self) -> u32 {
        self.model_interval.div_ceil(self.step_interval)
    }

    pub fn case_count(&self) -> u64 {
        let days = (self.date_end - self.date_start).num_days() + 1;
        days.max(0) as u64 * u64::from(self.hours_per_day()) * u64::from(self.steps_per_issue())
    }

    /// A fresh sequence positioned on the first case. Calling it again restarts.
    pub fn cases(&self) -> Result<CaseSchedule, SchedulingError> {
        self.validate()?;
        Ok(CaseSchedule {
            params: *self,
            cursor: Some(Cursor {
                date: self.date_start,
                hour: self.start_hour,
                step: self.first_step(),
            }),
            next_index: 1,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    date: NaiveDate,
    hour: u32,
    step: u32,
}

/// Ordered by issue date, then issue hour, then lead time.
#[derive(Debug, Clone)]
pub struct CaseSchedule {
    params: ScheduleParams,
    cursor: Option<Cursor>,
    next_index: u32,
}

impl CaseSchedule {
    fn advance(&self, at: Cursor) -> Option<Cursor> {
        let p = &self.params;
        let first = p.first_step();

        let step = at.step + p.step_interval;
        if step < first + p.model_interval {
            return Some(Cursor { step, ..at });
        }
        let hour = at.hour + p.model_interval;
        if hour < 24 {
            return Some(Cursor { hour, step: first, ..at });
        }
        let date = at.date.succ_opt().filter(|d| *d <= p.date_end)?;
        Some(Cursor { date, hour: p.start_hour, step: first })
    }
}

impl Iterator for CaseSchedule {
    type Item = Case;

    fn next(&mut self) -> Option<Case> {
        let at = self.cursor?;
        let case = Case { date: at.date, hour: at.hour, step: at.step, index: self.next_index };
        self.cursor = self.advance(at);
        self.next_index += 1;
        Some(case)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn params() -> ScheduleParams {
        ScheduleParams {
            date_start: ymd(2020, 1, 1),
            date_end: ymd(2020, 1, 2),
            start_hour: 0,
            model_interval: 12,
            step_interval: 6,
            spinup_limit: 5,
        }
    }

    #[test]
    fn test_order_and_indices() {
        let cases: Vec<_> = params().cases().unwrap().collect();
        let triples: Vec<_> = cases.iter().map(|c| (c.date.day0(), c.hour, c.step)).collect();
        assert_eq!(
            triples,
            vec![
                (0, 0, 6), (0, 0, 12), (0, 12, 6), (0, 12, 12),
                (1, 0, 6), (1, 0, 12), (1, 12, 6), (1, 12, 12),
            ]
        );
        let indices: Vec<_> = cases.iter().map(|c| c.index).collect();
        assert_eq!(indices, (1..=8).collect::<Vec<_>>());
        assert_eq!(params().case_count(), 8);
    }

    #[test]
    fn test_restartable() {
        let p = params();
        let first: Vec<_> = p.cases().unwrap().take(3).collect();
        let again: Vec<_> = p.cases().unwrap().take(3).collect();
        assert_eq!(first, again);
    }

    #[test]
    fn test_first_step_respects_spinup() {
        let mut p = params();
        p.spinup_limit = 0;
        assert_eq!(p.first_step(), 0);
        p.spinup_limit = 6;
        assert_eq!(p.first_step(), 6);
        p.spinup_limit = 7;
        assert_eq!(p.first_step(), 12);
    }

    #[test]
    fn test_start_hour_offsets_issue_cycle() {
        let mut p = params();
        p.start_hour = 12;
        p.date_end = p.date_start;
        let hours: Vec<_> = p.cases().unwrap().map(|c| c.hour).collect();
        assert_eq!(hours, vec![12, 12]);
    }

    #[test]
    fn test_invalid_parameters() {
        let mut p = params();
        p.date_end = ymd(2019, 12, 31);
        assert!(matches!(p.cases(), Err(SchedulingError::InvertedRange { .. })));

        let mut p = params();
        p.step_interval = 0;
        assert_eq!(p.validate(), Err(SchedulingError::ZeroInterval("step interval")));

        let mut p = params();
        p.start_hour = 24;
        assert_eq!(p.validate(), Err(SchedulingError::StartHour(24)));

        let mut p = params();
        p.model_interval = 7;
        assert_eq!(p.validate(), Err(SchedulingError::ModelInterval(7)));

        let mut p = params();
        p.step_interval = 24;
        assert_eq!(p.validate(), Err(SchedulingError::StepExceedsModel { step: 24, model: 12 }));
    }

    #[test]
    fn test_validity_crosses_midnight() {
        let case = Case { date: ymd(2020, 1, 1), hour: 12, step: 12, index: 1 };
        let validity = case.validity(6);
        assert_eq!(validity.date(), ymd(2020, 1, 2));
        assert_eq!(validity.format("%H").to_string(), "06");
    }

    #[test]
    fn test_forecast_key_display() {
        let case = Case { date: ymd(2020, 1, 1), hour: 0, step: 6, index: 1 };
        assert_eq!(case.forecast_key(Some(6)).to_string(), "2020-01-01, 00 UTC, (t+6, t+12)");
        assert_eq!(case.forecast_key(None).to_string(), "2020-01-01, 00 UTC, (t+6)");
        assert_ne!(case.forecast_key(Some(6)), case.forecast_key(Some(12)));
    }
}
