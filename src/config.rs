//! Run Configuration - the parameter set dumped verbatim at fit-start

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Immutable mapping of parameter names to their serialized values.
///
/// No validation is performed: whatever the caller supplies is written
/// to `model_param.json` as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunConfiguration {
    params: Map<String, Value>,
}

impl RunConfiguration {
    /// Wrap an existing parameter map.
    #[must_use]
    pub const fn new(params: Map<String, Value>) -> Self {
        Self { params }
    }

    /// Capture any serializable argument struct.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAnObject`] if `args` does not serialize to a JSON
    /// object, or [`Error::Json`] if serialization itself fails.
    pub fn from_serializable<T: Serialize>(args: &T) -> Result<Self> {
        match serde_json::to_value(args)? {
            Value::Object(params) => Ok(Self { params }),
            other => Err(Error::NotAnObject(kind_of(&other).to_string())),
        }
    }

    /// Get a parameter by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the configuration has no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the underlying map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Render one `key: value` line per parameter, in key order.
    #[must_use]
    pub fn render(&self) -> String {
        let mut keys: Vec<&String> = self.params.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| format!("{key}: {}", display_value(&self.params[key])))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the configuration as a JSON object, truncating any previous file.
    ///
    /// # Errors
    ///
    /// Surfaces the underlying I/O error when the file cannot be created or
    /// written.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &self.params)?;
        writer.flush()?;
        Ok(())
    }
}

impl From<Map<String, Value>> for RunConfiguration {
    fn from(params: Map<String, Value>) -> Self {
        Self::new(params)
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
