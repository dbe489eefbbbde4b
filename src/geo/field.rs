//! Dense forecast fields on a regular latitude/longitude grid.

use super::observations::ObservationSet;
use crate::compute::kernel::{self, Kernel};
use crate::compute::ledger::ComputationError;
use std::sync::Arc;

/// Geometry of a regular lat/lon grid, values stored row-major
/// (one row per latitude).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    pub lat_first: f64,
    pub lon_first: f64,
    /// Signed latitude increment between rows (negative for north-to-south scans).
    pub lat_step: f64,
    pub lon_step: f64,
    pub rows: usize,
    pub cols: usize,
}

impl GridSpec {
    pub fn len(&self) -> usize { self.rows * self.cols }
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    /// True when the columns span the full circle, so longitudes wrap.
    pub fn is_global(&self) -> bool {
        (self.cols as f64 * self.lon_step.abs() - 360.0).abs() < 1e-6
    }

    /// Index of the grid point nearest to `(lat, lon)`. Latitude is clamped
    /// to the grid; longitude wraps on global grids and is clamped otherwise.
    pub fn nearest_index(&self, lat: f64, lon: f64) -> usize {
        let row = Self::clamp((lat - self.lat_first) / self.lat_step, self.rows);

        let mut offset = lon - self.lon_first;
        if self.is_global() {
            offset = offset.rem_euclid(360.0);
            if self.lon_step < 0.0 {
                offset -= 360.0;
            }
            let col = (offset / self.lon_step).round() as i64;
            return row * self.cols + col.rem_euclid(self.cols as i64) as usize;
        }
        let col = Self::clamp(offset / self.lon_step, self.cols);
        row * self.cols + col
    }

    fn clamp(fraction: f64, count: usize) -> usize {
        let idx = fraction.round();
        if idx.is_nan() || idx < 0.0 {
            0
        } else {
            (idx as usize).min(count.saturating_sub(1))
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    grid: GridSpec,
    values: Arc<Vec<f64>>,
    units: Option<Arc<str>>,
}

impl Field {
    pub fn new(grid: GridSpec, values: Vec<f64>) -> Result<Self, ComputationError> {
        if values.len() != grid.len() {
            return Err(ComputationError::ShapeMismatch {
                msg: format!("grid has {} points, got {} values", grid.len(), values.len()),
            });
        }
        Ok(Self { grid, values: Arc::new(values), units: None })
    }

    pub fn with_units(mut self, units: impl Into<Arc<str>>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn grid(&self) -> &GridSpec { &self.grid }
    pub fn values(&self) -> &[f64] { &self.values }
    pub fn units(&self) -> Option<&str> { self.units.as_deref() }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    fn derive(&self, values: Vec<f64>) -> Self {
        Self { grid: self.grid, values: Arc::new(values), units: self.units.clone() }
    }

    /// Elementwise `op(self, other)`; both fields must share one grid.
    pub fn zip_with(&self, other: &Field, op: Kernel) -> Result<Field, ComputationError> {
        if self.grid != other.grid {
            return Err(ComputationError::ShapeMismatch {
                msg: format!(
                    "fields on different grids ({}x{} vs {}x{})",
                    self.grid.rows, self.grid.cols, other.grid.rows, other.grid.cols
                ),
            });
        }
        Ok(self.derive(kernel::zip(op, &self.values, &other.values)))
    }

    pub fn map_scalar(&self, op: Kernel, k: f64) -> Field {
        self.derive(kernel::map_scalar(op, &self.values, k))
    }

    pub fn sqrt(&self) -> Field {
        let mut values = self.values.to_vec();
        kernel::sqrt_in_place(&mut values);
        self.derive(values)
    }

    /// Projects the field onto the observation coordinates: one value per
    /// observation, taken from the nearest grid point (no interpolation).
    pub fn nearest_gridpoint(&self, obs: &ObservationSet) -> Result<ObservationSet, ComputationError> {
        if self.grid.is_empty() {
            return Err(ComputationError::ShapeMismatch { msg: "cannot project an empty field".into() });
        }
        let projected = obs
            .latitudes()
            .iter()
            .zip(obs.longitudes())
            .map(|(&lat, &lon)| self.values[self.grid.nearest_index(lat, lon)])
            .collect();
        obs.with_values(projected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 3x4 global grid: latitudes 10, 0, -10; longitudes 0, 90, 180, 270.
    fn global_grid() -> GridSpec {
        GridSpec { lat_first: 10.0, lon_first: 0.0, lat_step: -10.0, lon_step: 90.0, rows: 3, cols: 4 }
    }

    fn field() -> Field {
        Field::new(global_grid(), (0..12).map(f64::from).collect()).unwrap()
    }

    #[test]
    fn test_nearest_index_rounds_and_clamps() {
        let g = global_grid();
        assert_eq!(g.nearest_index(10.0, 0.0), 0);
        assert_eq!(g.nearest_index(1.0, 100.0), 5);
        // Poleward of the grid clamps to the last row.
        assert_eq!(g.nearest_index(-80.0, 180.0), 10);
    }

    #[test]
    fn test_global_grid_wraps_longitude() {
        let g = global_grid();
        assert!(g.is_global());
        // -10 degrees is 350, nearest column wraps back to 0.
        assert_eq!(g.nearest_index(0.0, -10.0), 4);
        assert_eq!(g.nearest_index(0.0, 300.0), 7);
    }

    #[test]
    fn test_regional_grid_clamps_longitude() {
        let g = GridSpec { lat_first: 50.0, lon_first: -10.0, lat_step: -1.0, lon_step: 1.0, rows: 2, cols: 3 };
        assert!(!g.is_global());
        assert_eq!(g.nearest_index(50.0, -40.0), 0);
        assert_eq!(g.nearest_index(49.0, 40.0), 5);
    }

    #[test]
    fn test_projection_is_pointwise() {
        let obs = ObservationSet::from_points([(10.0, 0.0, 1.0), (0.0, 90.0, 2.0), (-10.0, 270.0, 3.0)]);
        let projected = field().nearest_gridpoint(&obs).unwrap();
        assert_eq!(projected.values(), &[0.0, 5.0, 11.0]);
        assert_eq!(projected.latitudes(), obs.latitudes());

        let single = ObservationSet::from_points([(0.0, 90.0, 9.0)]);
        assert_eq!(field().nearest_gridpoint(&single).unwrap().values(), &[5.0]);
    }

    #[test]
    fn test_arithmetic_requires_same_grid() {
        let f = field();
        let sum = f.zip_with(&f, Kernel::Add).unwrap();
        assert_eq!(sum.values()[11], 22.0);

        let other = Field::new(
            GridSpec { rows: 1, ..global_grid() },
            vec![0.0; 4],
        )
        .unwrap();
        assert!(matches!(f.zip_with(&other, Kernel::Sub), Err(ComputationError::ShapeMismatch { .. })));
    }

    #[test]
    fn test_value_count_must_match_grid() {
        assert!(Field::new(global_grid(), vec![1.0; 5]).is_err());
    }

    #[test]
    fn test_units_survive_arithmetic() {
        let f = field().with_units("m");
        assert_eq!(f.map_scalar(Kernel::Mul, 1000.0).units(), Some("m"));
    }
}
