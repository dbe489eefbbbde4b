//! Pairing gridded results with observations and the retention mask.

use super::field::Field;
use super::observations::ObservationSet;
use crate::compute::ledger::ComputationError;

/// Boolean retention filter, one element per observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(Vec<bool>);

impl From<Vec<bool>> for Mask {
    fn from(bits: Vec<bool>) -> Self { Self(bits) }
}

impl Mask {
    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn as_slice(&self) -> &[bool] { &self.0 }

    pub fn retained(&self) -> usize {
        self.0.iter().filter(|&&keep| keep).count()
    }

    /// The mask-true subsequence of `values`.
    pub fn select<T: Copy>(&self, values: &[T]) -> Result<Vec<T>, ComputationError> {
        if values.len() != self.0.len() {
            return Err(ComputationError::ShapeMismatch {
                msg: format!("mask covers {} points, got {}", self.0.len(), values.len()),
            });
        }
        Ok(values
            .iter()
            .zip(&self.0)
            .filter_map(|(v, &keep)| keep.then_some(*v))
            .collect())
    }
}

/// Anything the retention mask can be applied to.
pub trait Filterable: Sized {
    fn filter_by(&self, mask: &Mask) -> Result<Self, ComputationError>;
}

impl Filterable for ObservationSet {
    fn filter_by(&self, mask: &Mask) -> Result<Self, ComputationError> {
        self.filter(mask)
    }
}

impl Filterable for Vec<f64> {
    fn filter_by(&self, mask: &Mask) -> Result<Self, ComputationError> {
        mask.select(self)
    }
}

/// Nearest-neighbour projection of `field` onto the observation locations.
pub fn project(field: &Field, observations: &ObservationSet) -> Result<ObservationSet, ComputationError> {
    field.nearest_gridpoint(observations)
}

/// True where the projected reference value reaches `min_value`. NaN never does.
pub fn build_mask(projected_reference: &[f64], min_value: f64) -> Mask {
    Mask(projected_reference.iter().map(|&v| v >= min_value).collect())
}

pub fn apply<T: Filterable>(mask: &Mask, target: &T) -> Result<T, ComputationError> {
    target.filter_by(mask)
}

/// What a case keeps of its observations.
///
/// Built once per case from the predictand reference and reused unchanged
/// for every other computation and for the observations themselves. An
/// instantaneous predictand is never masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retention {
    All,
    Masked(Mask),
}

impl Retention {
    pub fn for_reference(projected_reference: &[f64], threshold: Option<f64>) -> Self {
        match threshold {
            Some(min_value) => Retention::Masked(build_mask(projected_reference, min_value)),
            None => Retention::All,
        }
    }

    pub fn apply<T: Filterable + Clone>(&self, target: &T) -> Result<T, ComputationError> {
        match self {
            Retention::All => Ok(target.clone()),
            Retention::Masked(mask) => apply(mask, target),
        }
    }

    pub fn retained(&self, total: usize) -> usize {
        match self {
            Retention::All => total,
            Retention::Masked(mask) => mask.retained(),
        }
    }
}
