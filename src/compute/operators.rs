//! The numeric operator library.
//!
//! Every operator is a pure function over same-shaped inputs given in
//! lead-time order, as produced by `schedule::steps::resolve`.

use super::kernel::Kernel;
use super::ledger::{ComputationError, Value};

const SECONDS_PER_DAY: f64 = 86400.0;

fn at_least<'a>(op: &'static str, inputs: &'a [Value], minimum: usize) -> Result<&'a [Value], ComputationError> {
    if inputs.len() < minimum {
        return Err(ComputationError::NotEnoughInputs { op, minimum, actual: inputs.len() });
    }
    Ok(inputs)
}

fn fold(inputs: &[Value], op: Kernel) -> Result<Value, ComputationError> {
    let (first, rest) = inputs
        .split_first()
        .ok_or(ComputationError::NotEnoughInputs { op: "fold", minimum: 1, actual: 0 })?;
    rest.iter().try_fold(first.clone(), |acc, v| acc.zip_with(v, op))
}

/// `last - first`
pub fn accumulated_difference(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("accumulated difference", inputs, 1)?;
    inputs[inputs.len() - 1].zip_with(&inputs[0], Kernel::Sub)
}

/// `(last - first) / 86400`
pub fn solar_radiation_24h(inputs: &[Value]) -> Result<Value, ComputationError> {
    Ok(accumulated_difference(inputs)?.map_scalar(Kernel::Div, SECONDS_PER_DAY))
}

/// Trapezoidal mean: the endpoints weigh 0.5, interior steps 1.0.
pub fn weighted_average(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("weighted average", inputs, 1)?;
    let first = &inputs[0];
    let last = &inputs[inputs.len() - 1];
    let edges = first
        .map_scalar(Kernel::Mul, 0.5)
        .zip_with(&last.map_scalar(Kernel::Mul, 0.5), Kernel::Add)?;

    if inputs.len() <= 2 {
        return Ok(edges);
    }
    let interior = &inputs[1..inputs.len() - 1];
    let total = interior.iter().try_fold(edges, |acc, v| acc.zip_with(v, Kernel::Add))?;
    let total_weight = interior.len() as f64 + 1.0;
    Ok(total.map_scalar(Kernel::Div, total_weight))
}

pub fn average(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("average", inputs, 1)?;
    Ok(fold(inputs, Kernel::Add)?.map_scalar(Kernel::Div, inputs.len() as f64))
}

/// Magnitude of the vector whose components are the inputs.
pub fn vector_magnitude(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("vector", inputs, 1)?;
    let squares = inputs[0].zip_with(&inputs[0], Kernel::Mul)?;
    let sum = inputs[1..].iter().try_fold(squares, |acc, v| acc.zip_with(v, Kernel::AddSquare))?;
    Ok(sum.sqrt())
}

pub fn maximum(inputs: &[Value]) -> Result<Value, ComputationError> {
    fold(at_least("maximum", inputs, 1)?, Kernel::Max)
}

pub fn minimum(inputs: &[Value]) -> Result<Value, ComputationError> {
    fold(at_least("minimum", inputs, 1)?, Kernel::Min)
}

/// `dividend / divisor`. Any non-finite quotient is an error.
pub fn ratio(inputs: &[Value]) -> Result<Value, ComputationError> {
    let [dividend, divisor] = inputs else {
        return Err(ComputationError::ArityMismatch { op: "ratio", expected: 2, actual: inputs.len() });
    };
    let quotient = dividend.zip_with(divisor, Kernel::Div)?;
    if let Some(index) = quotient.first_non_finite() {
        return Err(ComputationError::NonFinite { op: "ratio", index });
    }
    Ok(quotient)
}

pub fn instantaneous_first(inputs: &[Value]) -> Result<Value, ComputationError> {
    Ok(at_least("instantaneous", inputs, 1)?[0].clone())
}

pub fn instantaneous_last(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("instantaneous", inputs, 1)?;
    Ok(inputs[inputs.len() - 1].clone())
}

pub fn instantaneous_middle(inputs: &[Value]) -> Result<Value, ComputationError> {
    let inputs = at_least("instantaneous", inputs, 1)?;
    Ok(inputs[inputs.len() / 2].clone())
}

/// Local solar time (hours) at each longitude for a UTC `hour`.
///
/// East of Greenwich: `hour + lon/15`, minus 24 once it reaches 24.
/// West of Greenwich: `hour - |lon|/15`, plus 24 when it drops below 0.
/// A longitude of exactly 0 yields 0 rather than `hour`, and a western
/// result of exactly 0 stays 0; both are kept as the established output
/// of this column.
pub fn local_solar_time(longitudes: &[f64], hour: u32) -> Vec<f64> {
    let hour = f64::from(hour);
    longitudes
        .iter()
        .map(|&lon| {
            if lon > 0.0 {
                let lst = hour + lon / 15.0;
                if lst >= 24.0 { lst - 24.0 } else { lst }
            } else if lon < 0.0 {
                let lst = hour - (lon / 15.0).abs();
                if lst < 0.0 { lst + 24.0 } else { lst }
            } else {
                0.0
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{Field, GridSpec};
    use rstest::rstest;

    fn pts(values: &[f64]) -> Value {
        values.to_vec().into()
    }

    fn scalars(values: &[f64]) -> Vec<Value> {
        values.iter().map(|v| pts(&[*v])).collect()
    }

    #[test]
    fn test_accumulated_difference_uses_window_edges() {
        let out = accumulated_difference(&scalars(&[3.0, 100.0, 10.0])).unwrap();
        assert_eq!(out.values(), &[7.0]);
    }

    #[test]
    fn test_solar_radiation_divides_by_day() {
        let out = solar_radiation_24h(&scalars(&[0.0, 172800.0])).unwrap();
        assert_eq!(out.values(), &[2.0]);
    }

    #[rstest]
    #[case(&[10.0, 20.0, 30.0], 20.0)]
    #[case(&[10.0, 30.0], 20.0)]
    #[case(&[0.0, 4.0, 8.0, 0.0], 4.0)]
    #[case(&[2.0, 4.0, 8.0, 6.0], 16.0 / 3.0)]
    #[case(&[5.0], 5.0)]
    fn test_weighted_average(#[case] inputs: &[f64], #[case] expected: f64) {
        let out = weighted_average(&scalars(inputs)).unwrap();
        assert!((out.values()[0] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_average() {
        assert_eq!(average(&scalars(&[1.0, 2.0, 6.0])).unwrap().values(), &[3.0]);
    }

    #[test]
    fn test_vector_magnitude() {
        let out = vector_magnitude(&[pts(&[3.0, 0.0]), pts(&[4.0, 2.0])]).unwrap();
        assert_eq!(out.values(), &[5.0, 2.0]);
    }

    #[test]
    fn test_extremes_are_elementwise() {
        let inputs = [pts(&[1.0, 9.0]), pts(&[5.0, 2.0]), pts(&[3.0, 4.0])];
        assert_eq!(maximum(&inputs).unwrap().values(), &[5.0, 9.0]);
        assert_eq!(minimum(&inputs).unwrap().values(), &[1.0, 2.0]);
        assert_eq!(maximum(&inputs[..1]).unwrap().values(), &[1.0, 9.0]);
    }

    #[test]
    fn test_ratio() {
        let out = ratio(&[pts(&[1.0, 3.0]), pts(&[2.0, 4.0])]).unwrap();
        assert_eq!(out.values(), &[0.5, 0.75]);

        let err = ratio(&[pts(&[1.0, 3.0]), pts(&[2.0, 0.0])]).unwrap_err();
        assert_eq!(err, ComputationError::NonFinite { op: "ratio", index: 1 });

        let err = ratio(&scalars(&[1.0, 2.0, 3.0])).unwrap_err();
        assert!(matches!(err, ComputationError::ArityMismatch { expected: 2, actual: 3, .. }));
    }

    #[rstest]
    #[case(&[1.0, 2.0, 3.0, 4.0], 1.0, 4.0, 3.0)]
    #[case(&[1.0, 2.0, 3.0], 1.0, 3.0, 2.0)]
    #[case(&[7.0, 8.0], 7.0, 8.0, 8.0)]
    fn test_instantaneous_selectors(
        #[case] inputs: &[f64],
        #[case] first: f64,
        #[case] last: f64,
        #[case] middle: f64,
    ) {
        let inputs = scalars(inputs);
        assert_eq!(instantaneous_first(&inputs).unwrap().values(), &[first]);
        assert_eq!(instantaneous_last(&inputs).unwrap().values(), &[last]);
        assert_eq!(instantaneous_middle(&inputs).unwrap().values(), &[middle]);
    }

    #[test]
    fn test_empty_inputs_are_rejected() {
        assert!(matches!(average(&[]), Err(ComputationError::NotEnoughInputs { .. })));
        assert!(matches!(instantaneous_middle(&[]), Err(ComputationError::NotEnoughInputs { .. })));
    }

    #[test]
    fn test_operators_accept_fields() {
        let grid = GridSpec { lat_first: 0.0, lon_first: 0.0, lat_step: 1.0, lon_step: 1.0, rows: 1, cols: 5 };
        let a: Value = Field::new(grid, vec![0.0; 5]).unwrap().into();
        let b: Value = Field::new(grid, vec![2.0; 5]).unwrap().into();
        let out = accumulated_difference(&[a.clone(), b.clone()]).unwrap();
        assert!(matches!(out, Value::Field(_)));
        assert_eq!(out.values(), &[2.0; 5]);

        let other = Field::new(GridSpec { cols: 4, ..grid }, vec![0.0; 4]).unwrap();
        assert!(average(&[a, other.into()]).is_err());
    }

    #[rstest]
    #[case(30.0, 20, 22.0)]
    #[case(30.0, 14, 16.0)]
    #[case(-60.0, 2, 22.0)]
    #[case(90.0, 22, 4.0)]
    #[case(-30.0, 6, 4.0)]
    #[case(0.0, 12, 0.0)]
    #[case(-30.0, 2, 0.0)]
    fn test_local_solar_time(#[case] lon: f64, #[case] hour: u32, #[case] expected: f64) {
        assert_eq!(local_solar_time(&[lon], hour), vec![expected]);
    }
}
