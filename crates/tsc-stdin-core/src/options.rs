//! Resolved compiler options.

use crate::source::ScriptTarget;
use serde::Serialize;
use serde_json::{Map, Value};

/// Flat mapping from option name to JSON value, as handed to the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CompilerOptions(Map<String, Value>);

impl CompilerOptions {
    /// Create an empty option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing JSON object.
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// The options used when no project configuration exists.
    pub fn engine_defaults() -> Self {
        let mut options = Self::new();
        options.set("target", Value::from("es5"));
        options.set("jsx", Value::from("preserve"));
        options
    }

    /// Look up an option.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Set (or replace) an option.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Current value of `noEmit` (absent means `false`).
    pub fn no_emit(&self) -> bool {
        self.get("noEmit").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Force `noEmit: true`.
    pub fn force_no_emit(&mut self) {
        self.set("noEmit", Value::Bool(true));
    }

    /// The language version derived from `target`. Unknown or missing values fall back to ES5.
    pub fn target(&self) -> ScriptTarget {
        self.get("target")
            .and_then(Value::as_str)
            .and_then(ScriptTarget::from_option)
            .unwrap_or_default()
    }

    /// Apply `overrides` on top of `self`, key by key.
    pub fn extend(&mut self, overrides: CompilerOptions) {
        for (name, value) in overrides.0 {
            self.0.insert(name, value);
        }
    }

    /// The underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Number of options set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` when no option is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
