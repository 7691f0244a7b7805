//! Registries shared by the orchestrating driver.
//!
//! Checks are merged into an explicit name-to-definition registry rather
//! than a global namespace; duplicate names are rejected synchronously with
//! a typed error, never silently overwritten.

use std::collections::{BTreeMap, HashSet};

use crate::checks::config::CheckConfig;
use crate::error::{Result, ScanError};

/// Name → check definition. Iteration order is the registration name order,
/// so warning output is deterministic across runs.
#[derive(Debug, Default)]
pub struct CheckRegistry {
    checks: BTreeMap<String, CheckConfig>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a check under its configured name. Two checks sharing a
    /// name would silently merge their results, so a duplicate is fatal.
    pub fn register(&mut self, check: CheckConfig) -> Result<()> {
        let name = check.name()?.to_string();
        if self.checks.contains_key(&name) {
            return Err(ScanError::DuplicateCheck(name));
        }
        tracing::debug!("Registered check `{}`", name);
        self.checks.insert(name, check);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CheckConfig> {
        self.checks.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CheckConfig> {
        self.checks.values()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// The known model classes of the analyzed program, used to expand the
/// all-models wildcard in check target lists.
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: HashSet<String>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        self.models.insert(name.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }
}
