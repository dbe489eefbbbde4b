//! Lead-time resolution: which forecast steps a computation needs for one case.

use crate::store::ComputationKind;
use smallvec::SmallVec;

pub type Steps = SmallVec<[u32; 8]>;

/// Returns the ordered lead times (hours) to read for a computation of `kind`
/// evaluated at case lead time `step`.
///
/// `accumulation` is `None` for an instantaneous predictand, in which case
/// every kind reads the single step `[step]`. `sampling_interval` is the
/// spacing of the available predictor steps and must be positive.
pub fn resolve(
    kind: ComputationKind,
    accumulation: Option<u32>,
    step: u32,
    sampling_interval: u32,
) -> Steps {
    let Some(acc) = accumulation else {
        return Steps::from_slice(&[step]);
    };
    let end = step + acc;
    let by = sampling_interval.max(1) as usize;

    match kind {
        ComputationKind::SolarRadiation24h => {
            // Clamp the 24h window onto a calendar-day boundary.
            if acc == 24 {
                Steps::from_slice(&[step, end])
            } else if end <= 24 {
                Steps::from_slice(&[0, 24])
            } else {
                Steps::from_slice(&[end - 24, end])
            }
        }
        ComputationKind::WeightedAverage | ComputationKind::Average => {
            (step..=end).step_by(by).collect()
        }
        ComputationKind::Maximum | ComputationKind::Minimum => {
            (step + sampling_interval..=end).step_by(by).collect()
        }
        _ => Steps::from_slice(&[step, end]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ComputationKind::AccumulatedField)]
    #[case(ComputationKind::SolarRadiation24h)]
    #[case(ComputationKind::WeightedAverage)]
    #[case(ComputationKind::Maximum)]
    #[case(ComputationKind::InstantaneousMiddle)]
    fn test_instantaneous_predictand_reads_single_step(#[case] kind: ComputationKind) {
        assert_eq!(resolve(kind, None, 18, 6).as_slice(), &[18]);
    }

    #[rstest]
    #[case(24, 6, &[6, 30])]
    #[case(6, 20, &[2, 26])]
    #[case(6, 10, &[0, 24])]
    #[case(12, 12, &[0, 24])]
    fn test_solar_radiation_window(#[case] acc: u32, #[case] step: u32, #[case] expected: &[u32]) {
        let steps = resolve(ComputationKind::SolarRadiation24h, Some(acc), step, 6);
        assert_eq!(steps.as_slice(), expected);
    }

    #[test]
    fn test_average_includes_window_start() {
        let steps = resolve(ComputationKind::WeightedAverage, Some(12), 6, 3);
        assert_eq!(steps.as_slice(), &[6, 9, 12, 15, 18]);
        let steps = resolve(ComputationKind::Average, Some(6), 0, 6);
        assert_eq!(steps.as_slice(), &[0, 6]);
    }

    #[test]
    fn test_extremes_exclude_window_start() {
        let steps = resolve(ComputationKind::Maximum, Some(12), 6, 3);
        assert_eq!(steps.as_slice(), &[9, 12, 15, 18]);
        let steps = resolve(ComputationKind::Minimum, Some(6), 0, 6);
        assert_eq!(steps.as_slice(), &[6]);
    }

    #[rstest]
    #[case(ComputationKind::AccumulatedField)]
    #[case(ComputationKind::InstantaneousFirst)]
    #[case(ComputationKind::Vector)]
    fn test_other_kinds_read_window_edges(#[case] kind: ComputationKind) {
        assert_eq!(resolve(kind, Some(6), 12, 3).as_slice(), &[12, 18]);
    }
}
