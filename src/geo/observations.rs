//! Sparse point observations for one case.

use super::pairing::Mask;
use crate::compute::kernel::{self, Kernel};
use crate::compute::ledger::ComputationError;

/// Parallel latitude / longitude / value columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationSet {
    latitudes: Vec<f64>,
    longitudes: Vec<f64>,
    values: Vec<f64>,
}

impl ObservationSet {
    pub fn new(latitudes: Vec<f64>, longitudes: Vec<f64>, values: Vec<f64>) -> Result<Self, ComputationError> {
        if latitudes.len() != longitudes.len() || latitudes.len() != values.len() {
            return Err(ComputationError::ShapeMismatch {
                msg: format!(
                    "observation columns differ in length ({} lat, {} lon, {} values)",
                    latitudes.len(),
                    longitudes.len(),
                    values.len()
                ),
            });
        }
        Ok(Self { latitudes, longitudes, values })
    }

    pub fn from_points(points: impl IntoIterator<Item = (f64, f64, f64)>) -> Self {
        let mut set = Self::default();
        for (lat, lon, value) in points {
            set.latitudes.push(lat);
            set.longitudes.push(lon);
            set.values.push(value);
        }
        set
    }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn latitudes(&self) -> &[f64] { &self.latitudes }
    pub fn longitudes(&self) -> &[f64] { &self.longitudes }
    pub fn values(&self) -> &[f64] { &self.values }

    pub fn into_values(self) -> Vec<f64> { self.values }

    /// Same locations, new values.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self, ComputationError> {
        if values.len() != self.len() {
            return Err(ComputationError::ShapeMismatch {
                msg: format!("{} observations, got {} values", self.len(), values.len()),
            });
        }
        Ok(Self { latitudes: self.latitudes.clone(), longitudes: self.longitudes.clone(), values })
    }

    pub fn zip_with(&self, other: &ObservationSet, op: Kernel) -> Result<Self, ComputationError> {
        if other.len() != self.len() {
            return Err(ComputationError::ShapeMismatch {
                msg: format!("observation sets differ in size ({} vs {})", self.len(), other.len()),
            });
        }
        self.with_values(kernel::zip(op, &self.values, &other.values))
    }

    pub fn map_scalar(&self, op: Kernel, k: f64) -> Self {
        Self {
            latitudes: self.latitudes.clone(),
            longitudes: self.longitudes.clone(),
            values: kernel::map_scalar(op, &self.values, k),
        }
    }

    /// Keeps the observations at mask-true positions, in order.
    pub fn filter(&self, mask: &Mask) -> Result<Self, ComputationError> {
        Ok(Self {
            latitudes: mask.select(&self.latitudes)?,
            longitudes: mask.select(&self.longitudes)?,
            values: mask.select(&self.values)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs() -> ObservationSet {
        ObservationSet::from_points([(45.0, 7.0, 1.0), (46.0, 8.0, 4.0), (47.0, 9.0, 9.0)])
    }

    #[test]
    fn test_columns_must_align() {
        assert!(ObservationSet::new(vec![1.0], vec![1.0, 2.0], vec![0.0]).is_err());
        assert!(obs().with_values(vec![1.0]).is_err());
    }

    #[test]
    fn test_arithmetic_against_sets_and_scalars() {
        let o = obs();
        let fc = o.with_values(vec![2.0, 2.0, 3.0]).unwrap();
        let fer = o.zip_with(&fc, Kernel::Sub).unwrap().zip_with(&fc, Kernel::Div).unwrap();
        assert_eq!(fer.values(), &[-0.5, 1.0, 2.0]);
        assert_eq!(o.map_scalar(Kernel::Mul, 2.0).values(), &[2.0, 8.0, 18.0]);
        assert_eq!(fer.longitudes(), o.longitudes());
    }

    #[test]
    fn test_filter_keeps_order() {
        let mask = Mask::from(vec![true, false, true]);
        let kept = obs().filter(&mask).unwrap();
        assert_eq!(kept.len(), 2);
        assert_eq!(kept.latitudes(), &[45.0, 47.0]);
        assert_eq!(kept.values(), &[1.0, 9.0]);
    }

    #[test]
    fn test_filter_rejects_wrong_mask_length() {
        assert!(obs().filter(&Mask::from(vec![true])).is_err());
    }
}
