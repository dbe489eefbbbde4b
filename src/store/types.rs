use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The operator a computation applies to its inputs.
///
/// The serialized names are the tags used in run configurations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComputationKind {
    /// `last - first`
    #[serde(rename = "ACCUMULATED_FIELD")]
    AccumulatedField,
    /// `(last - first) / 86400`, turning J/m2 into a mean W/m2 flux.
    #[serde(rename = "24H_SOLAR_RADIATION")]
    SolarRadiation24h,
    #[serde(rename = "WEIGHTED_AVERAGE_FIELD")]
    WeightedAverage,
    #[serde(rename = "AVERAGE_FIELD")]
    Average,
    #[serde(rename = "VECTOR_FIELD")]
    Vector,
    #[serde(rename = "MAXIMUM_FIELD")]
    Maximum,
    #[serde(rename = "MINIMUM_FIELD")]
    Minimum,
    #[serde(rename = "RATIO_FIELD")]
    Ratio,
    #[serde(rename = "INSTANTANEOUS_FIELD_100")]
    InstantaneousFirst,
    #[serde(rename = "INSTANTANEOUS_FIELD_001")]
    InstantaneousLast,
    #[serde(rename = "INSTANTANEOUS_FIELD_010")]
    InstantaneousMiddle,
    /// Computed from observation longitudes and the issue hour, never from forecast files.
    #[serde(rename = "LOCAL_SOLAR_TIME")]
    LocalSolarTime,
}

impl ComputationKind {
    pub fn name(&self) -> &'static str {
        match self {
            ComputationKind::AccumulatedField => "ACCUMULATED_FIELD",
            ComputationKind::SolarRadiation24h => "24H_SOLAR_RADIATION",
            ComputationKind::WeightedAverage => "WEIGHTED_AVERAGE_FIELD",
            ComputationKind::Average => "AVERAGE_FIELD",
            ComputationKind::Vector => "VECTOR_FIELD",
            ComputationKind::Maximum => "MAXIMUM_FIELD",
            ComputationKind::Minimum => "MINIMUM_FIELD",
            ComputationKind::Ratio => "RATIO_FIELD",
            ComputationKind::InstantaneousFirst => "INSTANTANEOUS_FIELD_100",
            ComputationKind::InstantaneousLast => "INSTANTANEOUS_FIELD_001",
            ComputationKind::InstantaneousMiddle => "INSTANTANEOUS_FIELD_010",
            ComputationKind::LocalSolarTime => "LOCAL_SOLAR_TIME",
        }
    }
}

impl std::fmt::Display for ComputationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldInput {
    /// A raw predictor code, or the short name of another computation.
    pub code: String,
}

impl FieldInput {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

fn unit_scale() -> f64 { 1.0 }

/// One configured computation. Fixed shape: a kind tag, ordered inputs and flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Computation {
    pub shortname: String,
    pub fullname: String,
    pub field: ComputationKind,
    pub inputs: SmallVec<[FieldInput; 2]>,
    /// Exposed as a column of the point data table.
    #[serde(default)]
    pub is_post_processed: bool,
    /// Only honoured on the predictand reference computation.
    #[serde(default)]
    pub add_scale: f64,
    #[serde(default = "unit_scale")]
    pub mul_scale: f64,
}

impl Computation {
    pub fn new(shortname: impl Into<String>, kind: ComputationKind, inputs: &[&str]) -> Self {
        let shortname = shortname.into();
        Self {
            fullname: shortname.clone(),
            shortname,
            field: kind,
            inputs: inputs.iter().map(|c| FieldInput::new(*c)).collect(),
            is_post_processed: true,
            add_scale: 0.0,
            mul_scale: 1.0,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.is_post_processed = false;
        self
    }

    pub fn scaled(mut self, add_scale: f64, mul_scale: f64) -> Self {
        self.add_scale = add_scale;
        self.mul_scale = mul_scale;
        self
    }

    pub fn input_codes(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|i| i.code.as_str())
    }

    pub fn is_local_solar_time(&self) -> bool {
        self.field == ComputationKind::LocalSolarTime
    }

    /// Whether `(value + add_scale) * mul_scale` changes anything.
    pub fn has_scaling(&self) -> bool {
        self.add_scale != 0.0 || self.mul_scale != 1.0
    }

    pub fn scale_value(&self, value: f64) -> f64 {
        (value + self.add_scale) * self.mul_scale
    }
}
