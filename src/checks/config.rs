//! Configuration-driven check definitions.
//!
//! A check is declared in YAML (or built programmatically) with a name,
//! description, warning classification, a target list, and a methods table.
//! Required fields are validated lazily, at first access, so a check with a
//! fixable but currently-incomplete configuration can still be constructed.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use sha2::{Digest, Sha256};

use crate::checks::registry::ModelRegistry;
use crate::error::{Result, ScanError};

/// Wildcard target meaning "every known model class in the program",
/// expanded against the orchestrator's model registry at run time.
pub const ALL_MODELS: &str = "@all_models";

/// One configured check.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckConfig {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    warning_type: Option<String>,
    #[serde(default)]
    warning_code: Option<u32>,
    #[serde(default)]
    pub targets: Vec<String>,
    /// Either a list of method names (check every argument) or a mapping
    /// from method name to the argument positions of interest. Kept as raw
    /// YAML and validated when first resolved.
    #[serde(default)]
    methods: Option<Value>,
}

/// The validated methods table of a check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedMethods {
    /// Check every argument of these methods
    All(Vec<String>),
    /// Check only the listed 1-based argument positions per method
    Positions(BTreeMap<String, Vec<usize>>),
}

impl ResolvedMethods {
    /// Every method name the check queries for.
    pub fn names(&self) -> Vec<String> {
        match self {
            ResolvedMethods::All(names) => names.clone(),
            ResolvedMethods::Positions(map) => map.keys().cloned().collect(),
        }
    }

    /// Argument positions of interest for one method; `None` means all.
    pub fn positions_for(&self, method: &str) -> Option<&[usize]> {
        match self {
            ResolvedMethods::All(_) => None,
            ResolvedMethods::Positions(map) => map.get(method).map(Vec::as_slice),
        }
    }
}

impl CheckConfig {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        warning_type: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            warning_type: Some(warning_type.into()),
            warning_code: None,
            targets: Vec::new(),
            methods: None,
        }
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.targets = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(Value::Sequence(
            methods
                .into_iter()
                .map(|m| Value::String(m.into()))
                .collect(),
        ));
        self
    }

    pub fn with_method_positions<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<usize>)>,
        S: Into<String>,
    {
        let mapping = methods
            .into_iter()
            .map(|(method, positions)| {
                (
                    Value::String(method.into()),
                    Value::Sequence(
                        positions
                            .into_iter()
                            .map(|p| Value::Number((p as u64).into()))
                            .collect(),
                    ),
                )
            })
            .collect();
        self.methods = Some(Value::Mapping(mapping));
        self
    }

    pub fn with_warning_code(mut self, code: u32) -> Self {
        self.warning_code = Some(code);
        self
    }

    /// The check's name under which it is registered. Required.
    pub fn name(&self) -> Result<&str> {
        self.required_field(&self.name, "name")
    }

    /// Human-readable description, used as the warning message. Required.
    pub fn description(&self) -> Result<&str> {
        self.required_field(&self.description, "description")
    }

    /// Warning classification symbol. Required.
    pub fn warning_type(&self) -> Result<&str> {
        self.required_field(&self.warning_type, "warning_type")
    }

    fn required_field<'a>(&self, field: &'a Option<String>, name: &'static str) -> Result<&'a str> {
        field.as_deref().ok_or_else(|| ScanError::MissingField {
            check: self.label(),
            field: name,
        })
    }

    /// Best-effort identity for diagnostics, before `name` is validated.
    pub fn label(&self) -> String {
        self.name.clone().unwrap_or_else(|| "<unnamed>".to_string())
    }

    /// Validates and resolves the methods table. A table that is neither a
    /// list of names nor a name-to-positions mapping is fatal here, not at
    /// configuration load.
    pub fn methods(&self) -> Result<ResolvedMethods> {
        let value = self
            .methods
            .as_ref()
            .ok_or_else(|| self.invalid_methods("no methods configured"))?;

        match value {
            Value::Sequence(entries) => {
                let mut names = Vec::with_capacity(entries.len());
                for entry in entries {
                    match entry.as_str() {
                        Some(name) => names.push(name.to_string()),
                        None => {
                            return Err(
                                self.invalid_methods(format!("expected method name, got {entry:?}"))
                            )
                        }
                    }
                }
                Ok(ResolvedMethods::All(names))
            }
            Value::Mapping(entries) => {
                let mut map = BTreeMap::new();
                for (key, positions) in entries {
                    let method = key
                        .as_str()
                        .ok_or_else(|| {
                            self.invalid_methods(format!("expected method name, got {key:?}"))
                        })?
                        .to_string();
                    let positions = match positions {
                        Value::Sequence(values) => values
                            .iter()
                            .map(|v| {
                                v.as_u64().map(|p| p as usize).ok_or_else(|| {
                                    self.invalid_methods(format!(
                                        "expected argument position, got {v:?}"
                                    ))
                                })
                            })
                            .collect::<Result<Vec<usize>>>()?,
                        other => {
                            return Err(self.invalid_methods(format!(
                                "expected argument positions for `{method}`, got {other:?}"
                            )))
                        }
                    };
                    map.insert(method, positions);
                }
                Ok(ResolvedMethods::Positions(map))
            }
            other => Err(self.invalid_methods(format!(
                "expected a name list or a name-to-positions mapping, got {other:?}"
            ))),
        }
    }

    fn invalid_methods(&self, detail: impl Into<String>) -> ScanError {
        ScanError::InvalidMethods {
            check: self.label(),
            detail: detail.into(),
        }
    }

    /// Expands the target list against the model registry.
    pub fn resolve_targets(&self, models: &ModelRegistry) -> HashSet<String> {
        let mut resolved = HashSet::new();
        for target in &self.targets {
            if target == ALL_MODELS {
                resolved.extend(models.iter().map(str::to_string));
            } else {
                resolved.insert(target.clone());
            }
        }
        resolved
    }

    /// The warning code: the configured one, or a code derived
    /// deterministically from the configuration so re-runs produce the same
    /// code for the same check.
    pub fn warning_code(&self) -> Result<u32> {
        match self.warning_code {
            Some(code) => Ok(code),
            None => self.derived_warning_code(),
        }
    }

    /// Hashes a canonical, order-independent serialization of the
    /// configuration: two semantically identical configurations built in
    /// different field order hash identically. That is a correctness
    /// requirement, not an implementation detail.
    fn derived_warning_code(&self) -> Result<u32> {
        #[derive(Serialize)]
        struct Canonical<'a> {
            name: &'a str,
            description: &'a str,
            warning_type: &'a str,
            targets: BTreeSet<&'a str>,
            methods: CanonicalMethods,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "snake_case")]
        enum CanonicalMethods {
            Names(BTreeSet<String>),
            Positions(BTreeMap<String, Vec<usize>>),
        }

        let methods = match self.methods()? {
            ResolvedMethods::All(names) => CanonicalMethods::Names(names.into_iter().collect()),
            ResolvedMethods::Positions(map) => CanonicalMethods::Positions(
                map.into_iter()
                    .map(|(method, mut positions)| {
                        positions.sort_unstable();
                        positions.dedup();
                        (method, positions)
                    })
                    .collect(),
            ),
        };

        let canonical = Canonical {
            name: self.name()?,
            description: self.description()?,
            warning_type: self.warning_type()?,
            targets: self.targets.iter().map(String::as_str).collect(),
            methods,
        };

        let bytes = serde_json::to_vec(&canonical)?;
        let digest = Sha256::digest(&bytes);
        Ok(u32::from_be_bytes([
            digest[0], digest[1], digest[2], digest[3],
        ]))
    }
}

/// Loads a list of check configurations from YAML.
pub fn load_checks(yaml: &str) -> Result<Vec<CheckConfig>> {
    Ok(serde_yaml::from_str(yaml)?)
}
