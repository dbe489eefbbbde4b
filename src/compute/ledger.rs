//! ledger.rs
//! Computed values and the per-case cache they live in.

use super::kernel::Kernel;
use crate::geo::{Field, ObservationSet};
use crate::store::Computation;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("'{op}' expects {expected} input(s), got {actual}")]
    ArityMismatch { op: &'static str, expected: usize, actual: usize },
    #[error("'{op}' needs at least {minimum} input(s), got {actual}")]
    NotEnoughInputs { op: &'static str, minimum: usize, actual: usize },
    #[error("Structural mismatch: {msg}")]
    ShapeMismatch { msg: String },
    #[error("'{op}' produced a non-finite value at point {index}")]
    NonFinite { op: &'static str, index: usize },
    #[error("input '{0}' has not been computed for this case")]
    MissingInput(String),
    #[error("'{0}' cannot be evaluated from forecast values")]
    Unsupported(&'static str),
}

/// The result of a computation: a gridded field, or a plain array of
/// values already paired with observations.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Field(Field),
    Points(Arc<Vec<f64>>),
}

impl From<Field> for Value {
    fn from(field: Field) -> Self { Value::Field(field) }
}

impl From<Vec<f64>> for Value {
    fn from(values: Vec<f64>) -> Self { Value::Points(Arc::new(values)) }
}

impl Value {
    pub fn len(&self) -> usize {
        match self { Value::Field(f) => f.len(), Value::Points(v) => v.len() }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }

    pub fn values(&self) -> &[f64] {
        match self { Value::Field(f) => f.values(), Value::Points(v) => v.as_slice() }
    }

    pub fn to_vec(&self) -> Vec<f64> { self.values().to_vec() }

    fn kind_name(&self) -> &'static str {
        match self { Value::Field(_) => "field", Value::Points(_) => "point array" }
    }

    pub fn zip_with(&self, other: &Value, op: Kernel) -> Result<Value, ComputationError> {
        match (self, other) {
            (Value::Field(a), Value::Field(b)) => Ok(Value::Field(a.zip_with(b, op)?)),
            (Value::Points(a), Value::Points(b)) => {
                if a.len() != b.len() {
                    return Err(ComputationError::ShapeMismatch {
                        msg: format!("point arrays differ in size ({} vs {})", a.len(), b.len()),
                    });
                }
                Ok(super::kernel::zip(op, a, b).into())
            }
            (a, b) => Err(ComputationError::ShapeMismatch {
                msg: format!("cannot combine a {} with a {}", a.kind_name(), b.kind_name()),
            }),
        }
    }

    pub fn map_scalar(&self, op: Kernel, k: f64) -> Value {
        match self {
            Value::Field(f) => Value::Field(f.map_scalar(op, k)),
            Value::Points(v) => super::kernel::map_scalar(op, v, k).into(),
        }
    }

    pub fn sqrt(&self) -> Value {
        match self {
            Value::Field(f) => Value::Field(f.sqrt()),
            Value::Points(v) => {
                let mut out = v.to_vec();
                super::kernel::sqrt_in_place(&mut out);
                out.into()
            }
        }
    }

    /// Pairs the value with the observations. A field is projected by
    /// nearest grid point; a point array must already be one-per-observation.
    pub fn project(&self, obs: &ObservationSet) -> Result<ObservationSet, ComputationError> {
        match self {
            Value::Field(f) => f.nearest_gridpoint(obs),
            Value::Points(v) => obs.with_values(v.to_vec()),
        }
    }

    /// Index of the first non-finite element, if any.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.values().iter().position(|v| !v.is_finite())
    }
}

/// Case-local cache: computation short name -> computed value.
///
/// Created empty for every case and dropped with it, so nothing computed
/// for one case can be observed by the next.
#[derive(Debug, Clone, Default)]
pub struct CaseLedger {
    values: HashMap<String, Value>,
}

impl CaseLedger {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    #[inline(always)]
    pub fn get(&self, shortname: &str) -> Option<&Value> {
        self.values.get(shortname)
    }

    #[inline(always)]
    pub fn insert(&mut self, shortname: impl Into<String>, value: Value) {
        self.values.insert(shortname.into(), value);
    }

    /// The cached values feeding `computation`, in input order.
    pub fn resolve(&self, computation: &Computation) -> Result<Vec<Value>, ComputationError> {
        computation
            .input_codes()
            .map(|code| {
                self.get(code)
                    .cloned()
                    .ok_or_else(|| ComputationError::MissingInput(code.to_string()))
            })
            .collect()
    }
}
