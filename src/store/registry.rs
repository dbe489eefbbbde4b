use super::config::ConfigError;
use super::types::*;
use std::collections::HashSet;

/// Ordered, name-unique collection of the configured computations.
///
/// Insertion order is the configured order and is preserved everywhere
/// (partitioning, evaluation and column layout all depend on it).
#[derive(Debug, Clone, Default)]
pub struct ComputationRegistry {
    computations: Vec<Computation>,
    used_names: HashSet<String>,
}

impl ComputationRegistry {
    pub fn new() -> Self { Self::default() }
    pub fn count(&self) -> usize { self.computations.len() }

    pub fn from_computations<I>(computations: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = Computation>,
    {
        let mut registry = Self::new();
        for computation in computations {
            registry.add(computation)?;
        }
        Ok(registry)
    }

    /// Registers a computation. Short names key the per-case cache and the
    /// output columns, so a repeated name is rejected rather than renamed.
    pub fn add(&mut self, computation: Computation) -> Result<(), ConfigError> {
        if !self.used_names.insert(computation.shortname.clone()) {
            return Err(ConfigError::DuplicateName(computation.shortname));
        }
        self.computations.push(computation);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Computation> {
        self.computations.iter()
    }

    pub fn local_solar_time(&self) -> impl Iterator<Item = &Computation> {
        self.computations.iter().filter(|c| c.is_local_solar_time())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_configured_order() {
        let reg = ComputationRegistry::from_computations(vec![
            Computation::new("B", ComputationKind::Maximum, &["cape"]),
            Computation::new("A", ComputationKind::AccumulatedField, &["tp"]),
        ])
        .unwrap();

        let names: Vec<_> = reg.iter().map(|c| c.shortname.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn test_duplicate_short_name_is_rejected() {
        let mut reg = ComputationRegistry::new();
        reg.add(Computation::new("TP", ComputationKind::AccumulatedField, &["tp"])).unwrap();
        let err = reg
            .add(Computation::new("TP", ComputationKind::Maximum, &["tp"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(ref n) if n == "TP"));
        assert_eq!(reg.count(), 1);
    }
}
