//! Function arguments as sent by the planner
//!
//! The planner may send each argument either as a raw value or wrapped in an
//! object with a `value` field:
//!
//! ```text
//! {"object": "apple"}
//! {"object": {"value": "apple"}}
//! ```
//!
//! [`FunctionArgs::normalize`] unwraps the second form so executables only
//! ever see raw values.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Normalized keyword arguments passed to an executable
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionArgs(Map<String, Value>);

impl FunctionArgs {
    /// Create empty arguments
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Unwrap `{"value": x}` wrappers into `x`, leaving raw values untouched
    pub fn normalize(raw: &Map<String, Value>) -> Self {
        let args = raw
            .iter()
            .map(|(name, value)| {
                let inner = match value {
                    Value::Object(wrapper) => wrapper.get("value").unwrap_or(value),
                    _ => value,
                };
                (name.clone(), inner.clone())
            })
            .collect();
        Self(args)
    }

    /// Add an argument (builder style, mostly for tests and direct calls)
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Get an argument by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a string argument, failing if it is absent or not a string
    pub fn get_str(&self, name: &str) -> Result<&str> {
        self.0
            .get(name)
            .with_context(|| format!("missing required argument '{}'", name))?
            .as_str()
            .with_context(|| format!("argument '{}' must be a string", name))
    }

    /// Deserialize all arguments into a typed struct
    ///
    /// Mismatches surface as errors, which the function boundary turns into a
    /// failed result.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .context("arguments do not match the function signature")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for FunctionArgs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
