use crate::analysis::PlannedComputation;
use crate::compute::kernel::Kernel;
use crate::compute::ledger::{ComputationError, Value};
use crate::compute::operators;
use crate::store::ComputationKind;

type Operator = fn(&[Value]) -> Result<Value, ComputationError>;

/// Evaluates one planned computation. Stateless; caching is the caller's job.
pub struct Computer<'a> {
    planned: &'a PlannedComputation,
}

impl<'a> Computer<'a> {
    pub fn new(planned: &'a PlannedComputation) -> Self {
        Self { planned }
    }

    /// Applies the computation's operator to `inputs` (lead-time or input
    /// order). The reference computation's result is then scaled by
    /// `(value + add_scale) * mul_scale`.
    pub fn run(&self, inputs: &[Value]) -> Result<Value, ComputationError> {
        let computation = &self.planned.computation;
        let op = operator(computation.field)
            .ok_or(ComputationError::Unsupported(computation.field.name()))?;
        let value = op(inputs)?;

        if self.planned.is_reference && computation.has_scaling() {
            return Ok(value
                .map_scalar(Kernel::Add, computation.add_scale)
                .map_scalar(Kernel::Mul, computation.mul_scale));
        }
        Ok(value)
    }
}

/// Dispatch table. Local solar time reads observation metadata, not
/// forecast values, so it has no entry.
fn operator(kind: ComputationKind) -> Option<Operator> {
    let op: Operator = match kind {
        ComputationKind::AccumulatedField => operators::accumulated_difference,
        ComputationKind::SolarRadiation24h => operators::solar_radiation_24h,
        ComputationKind::WeightedAverage => operators::weighted_average,
        ComputationKind::Average => operators::average,
        ComputationKind::Vector => operators::vector_magnitude,
        ComputationKind::Maximum => operators::maximum,
        ComputationKind::Minimum => operators::minimum,
        ComputationKind::Ratio => operators::ratio,
        ComputationKind::InstantaneousFirst => operators::instantaneous_first,
        ComputationKind::InstantaneousLast => operators::instantaneous_last,
        ComputationKind::InstantaneousMiddle => operators::instantaneous_middle,
        ComputationKind::LocalSolarTime => return None,
    };
    Some(op)
}
