//! [`ModelEntry`] – configuration record for one collision model instance.
//!
//! The instance `name` is what operators see in logs and faults; `kind` is
//! the identifier looked up in the model registry and defaults to the name,
//! so a single-instance model can be configured with just its name.
//!
//! Factories read their parameters through the `*_or`/`require_*` lookups and
//! [`ModelEntry::check_params`], which turn a misspelled key or a value of the
//! wrong type into [`GuardError::ModelInstantiation`] instead of quietly
//! falling back to a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

/// A model-specific parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Type name used in configuration error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ParamValue::Flag(_) => "flag",
            ParamValue::Number(_) => "number",
            ParamValue::Text(_) => "text",
        }
    }
}

fn default_enabled() -> bool {
    true
}

/// Configured collision model: identity, enable flag and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub params: BTreeMap<String, ParamValue>,
}

impl ModelEntry {
    /// An enabled entry whose kind equals its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: None,
            enabled: true,
            params: BTreeMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: ParamValue) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Registry identifier used to resolve this entry.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(&self.name)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        match self.params.get(key) {
            Some(ParamValue::Number(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        match self.params.get(key) {
            Some(ParamValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.params.get(key) {
            Some(ParamValue::Flag(v)) => Some(*v),
            _ => None,
        }
    }

    /// Reject any parameter key not listed in `allowed`.
    ///
    /// # Errors
    ///
    /// [`GuardError::ModelInstantiation`] naming every unexpected key.
    pub fn check_params(&self, allowed: &[&str]) -> Result<(), GuardError> {
        let unknown: Vec<&str> = self
            .params
            .keys()
            .map(String::as_str)
            .filter(|key| !allowed.contains(key))
            .collect();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(self.param_error(format!(
            "unknown parameter(s) `{}`; expected one of `{}`",
            unknown.join("`, `"),
            allowed.join("`, `")
        )))
    }

    /// Number parameter, or `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// [`GuardError::ModelInstantiation`] when the key holds another type or
    /// a non-finite number.
    pub fn number_or(&self, key: &str, default: f64) -> Result<f64, GuardError> {
        match self.params.get(key) {
            None => Ok(default),
            Some(ParamValue::Number(v)) if v.is_finite() => Ok(*v),
            Some(ParamValue::Number(v)) => {
                Err(self.param_error(format!("parameter `{key}` must be finite, got {v}")))
            }
            Some(other) => Err(self.type_error(key, "number", other)),
        }
    }

    /// Text parameter, or `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// [`GuardError::ModelInstantiation`] when the key holds another type.
    pub fn text_or<'a>(&'a self, key: &str, default: &'a str) -> Result<&'a str, GuardError> {
        match self.params.get(key) {
            None => Ok(default),
            Some(ParamValue::Text(v)) => Ok(v),
            Some(other) => Err(self.type_error(key, "text", other)),
        }
    }

    /// Flag parameter, or `default` when the key is absent.
    ///
    /// # Errors
    ///
    /// [`GuardError::ModelInstantiation`] when the key holds another type.
    pub fn flag_or(&self, key: &str, default: bool) -> Result<bool, GuardError> {
        match self.params.get(key) {
            None => Ok(default),
            Some(ParamValue::Flag(v)) => Ok(*v),
            Some(other) => Err(self.type_error(key, "flag", other)),
        }
    }

    /// Text parameter that must be present.
    ///
    /// # Errors
    ///
    /// [`GuardError::ModelInstantiation`] when the key is absent or holds
    /// another type.
    pub fn require_text(&self, key: &str) -> Result<&str, GuardError> {
        match self.params.get(key) {
            None => Err(self.param_error(format!("missing `{key}` parameter"))),
            Some(ParamValue::Text(v)) => Ok(v),
            Some(other) => Err(self.type_error(key, "text", other)),
        }
    }

    fn type_error(&self, key: &str, expected: &str, found: &ParamValue) -> GuardError {
        self.param_error(format!(
            "parameter `{key}` must be {expected}, got {} {found:?}",
            found.type_name()
        ))
    }

    fn param_error(&self, details: String) -> GuardError {
        GuardError::ModelInstantiation {
            model: self.name.clone(),
            details,
        }
    }
}
