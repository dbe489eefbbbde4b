//! In-memory loaders keyed by path.

use super::loaders::{FieldLoader, LoadError, ObservationLoader};
use crate::geo::{Field, ObservationSet};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Serves fields and observation sets registered under their would-be paths.
/// Unknown paths are `NotFound`; paths marked corrupt fail with `Read`.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    fields: HashMap<PathBuf, Field>,
    observations: HashMap<PathBuf, ObservationSet>,
    corrupt: HashMap<PathBuf, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn insert_field(&mut self, path: impl Into<PathBuf>, field: Field) -> &mut Self {
        self.fields.insert(path.into(), field);
        self
    }

    pub fn insert_observations(&mut self, path: impl Into<PathBuf>, obs: ObservationSet) -> &mut Self {
        self.observations.insert(path.into(), obs);
        self
    }

    pub fn insert_corrupt(&mut self, path: impl Into<PathBuf>, reason: impl Into<String>) -> &mut Self {
        self.corrupt.insert(path.into(), reason.into());
        self
    }

    fn lookup<'a, T>(&'a self, table: &'a HashMap<PathBuf, T>, path: &Path) -> Result<&'a T, LoadError> {
        if let Some(reason) = self.corrupt.get(path) {
            return Err(LoadError::Read { path: path.to_path_buf(), reason: reason.clone() });
        }
        table.get(path).ok_or_else(|| LoadError::NotFound(path.to_path_buf()))
    }
}

impl FieldLoader for MemoryStore {
    fn load_field(&self, path: &Path) -> Result<Field, LoadError> {
        self.lookup(&self.fields, path).cloned()
    }
}

impl ObservationLoader for MemoryStore {
    fn load_observations(&self, path: &Path) -> Result<ObservationSet, LoadError> {
        self.lookup(&self.observations, path).cloned()
    }
}
