use crate::schedule::steps;
use crate::store::{Computation, ComputationKind, ComputationRegistry, Config, ConfigError};
use std::collections::HashSet;

/// A computation together with its read-only role in the plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedComputation {
    pub computation: Computation,
    /// Supplies the `Predictand` column and the retention mask.
    pub is_reference: bool,
}

impl PlannedComputation {
    fn new(computation: Computation, is_reference: bool) -> Self {
        Self { computation, is_reference }
    }

    pub fn shortname(&self) -> &str {
        &self.computation.shortname
    }

    pub fn kind(&self) -> ComputationKind {
        self.computation.field
    }

    pub fn is_exposed(&self) -> bool {
        self.computation.is_post_processed
    }
}

/// The immutable evaluation plan of a run.
///
/// Built once from the configured computations. Base computations read
/// forecast files and run reference first; derived computations read the
/// per-case cache and run after every base computation of the case.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    reference: PlannedComputation,
    base: Vec<PlannedComputation>,
    derived: Vec<PlannedComputation>,
    local_solar_time: Option<Computation>,
    accumulation: Option<u32>,
    threshold: Option<f64>,
}

impl Plan {
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let registry = ComputationRegistry::from_computations(config.computations.iter().cloned())?;
        let mut plan = partition(&registry, &config.predictors.codes, &config.predictand.code)?;

        plan.accumulation = config.predictand.accumulation;
        for planned in plan.base() {
            check_window(planned, plan.accumulation, config.predictors.sampling_interval)?;
        }
        plan.threshold = plan
            .accumulation
            .map(|_| plan.reference.computation.scale_value(config.predictand.min_value));
        Ok(plan)
    }

    pub fn reference(&self) -> &PlannedComputation {
        &self.reference
    }

    /// Base computations in evaluation order: the reference, then the rest
    /// in configured order.
    pub fn base(&self) -> impl Iterator<Item = &PlannedComputation> {
        std::iter::once(&self.reference).chain(&self.base)
    }

    pub fn derived(&self) -> &[PlannedComputation] {
        &self.derived
    }

    pub fn local_solar_time(&self) -> Option<&Computation> {
        self.local_solar_time.as_ref()
    }

    /// Whether the `LST` column is written.
    pub fn emits_local_solar_time(&self) -> bool {
        self.local_solar_time.as_ref().is_some_and(|c| c.is_post_processed)
    }

    pub fn accumulation(&self) -> Option<u32> {
        self.accumulation
    }

    /// Scaled minimum predictand value a retained observation must reach.
    /// `None` when the predictand is instantaneous and nothing is masked.
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    /// Short names of every computation that becomes a column, in column order.
    pub fn exposed_columns(&self) -> impl Iterator<Item = &str> {
        self.base()
            .chain(&self.derived)
            .filter(|p| p.is_exposed())
            .map(PlannedComputation::shortname)
    }
}

/// A base computation must read at least one forecast step per case.
/// Maximum and minimum skip the window start, so a sampling interval longer
/// than the accumulation leaves them nothing to read.
fn check_window(planned: &PlannedComputation, accumulation: Option<u32>, sampling_interval: u32) -> Result<(), ConfigError> {
    if steps::resolve(planned.kind(), accumulation, 0, sampling_interval).is_empty() {
        return Err(ConfigError::InvalidComputation {
            name: planned.shortname().to_string(),
            reason: format!(
                "sampling interval {sampling_interval}h leaves no forecast step in the {}h window",
                accumulation.unwrap_or(0)
            ),
        });
    }
    Ok(())
}

/// Splits the registry into base and derived computations and checks the wiring.
///
/// A computation is derived when it reads something other than a raw
/// predictor, is exposed, and is not local solar time. Everything else
/// except local solar time is base.
pub fn partition(
    registry: &ComputationRegistry,
    predictor_codes: &[String],
    predictand_code: &str,
) -> Result<Plan, ConfigError> {
    let predictors: HashSet<&str> = predictor_codes.iter().map(String::as_str).collect();

    let lst: Vec<&Computation> = registry.local_solar_time().collect();
    if lst.len() > 1 {
        return Err(ConfigError::MultipleLocalSolarTime(lst.len()));
    }

    let (derived, base): (Vec<&Computation>, Vec<&Computation>) = registry
        .iter()
        .filter(|c| !c.is_local_solar_time())
        .partition(|c| is_derived(c, &predictors));

    let reference_pos = base
        .iter()
        .position(|c| is_reference_candidate(c, predictand_code))
        .ok_or_else(|| ConfigError::MissingReference(predictand_code.to_string()))?;
    let reference = base[reference_pos];
    if !reference.is_post_processed {
        return Err(ConfigError::HiddenReference(reference.shortname.clone()));
    }

    for c in &base {
        check_base(c, &predictors)?;
    }
    let base_names: HashSet<&str> = base.iter().map(|c| c.shortname.as_str()).collect();
    for c in &derived {
        check_derived(c, &base_names)?;
    }

    Ok(Plan {
        reference: PlannedComputation::new(reference.clone(), true),
        base: base
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != reference_pos)
            .map(|(_, c)| PlannedComputation::new((*c).clone(), false))
            .collect(),
        derived: derived.into_iter().map(|c| PlannedComputation::new(c.clone(), false)).collect(),
        local_solar_time: lst.first().map(|c| (*c).clone()),
        accumulation: None,
        threshold: None,
    })
}

fn is_derived(c: &Computation, predictors: &HashSet<&str>) -> bool {
    c.is_post_processed && c.input_codes().any(|code| !predictors.contains(code))
}

fn is_reference_candidate(c: &Computation, predictand_code: &str) -> bool {
    c.inputs.len() == 1 && c.inputs[0].code == predictand_code
}

fn invalid(c: &Computation, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidComputation { name: c.shortname.clone(), reason: reason.into() }
}

fn check_base(c: &Computation, predictors: &HashSet<&str>) -> Result<(), ConfigError> {
    let [input] = c.inputs.as_slice() else {
        return Err(invalid(c, format!("a base computation reads exactly one predictor, got {}", c.inputs.len())));
    };
    if !predictors.contains(input.code.as_str()) {
        return Err(invalid(c, format!("'{}' is not a configured predictor", input.code)));
    }
    if c.field == ComputationKind::Ratio {
        return Err(invalid(c, "a ratio needs two computed inputs"));
    }
    Ok(())
}

fn check_derived(c: &Computation, base_names: &HashSet<&str>) -> Result<(), ConfigError> {
    if let Some(code) = c.input_codes().find(|code| !base_names.contains(code)) {
        return Err(invalid(c, format!("input '{code}' is neither a predictor nor a base computation")));
    }
    if c.field == ComputationKind::Ratio && c.inputs.len() != 2 {
        return Err(invalid(c, format!("a ratio takes two inputs, got {}", c.inputs.len())));
    }
    if c.inputs.is_empty() {
        return Err(invalid(c, "no inputs"));
    }
    Ok(())
}
