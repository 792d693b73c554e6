use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::OptionsError;

/// An opaque bag of metadata shared by the inputs of a form.
///
/// Typical contents are choice lists for select-like fields. Fieldsets only
/// forward a shared reference to it and never look inside.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
    entries: Map<String, Value>,
}

impl Options {
    /// Creates an empty options bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads options from a TOML, YAML or JSON file.
    ///
    /// The format is chosen from the file extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, has an unsupported
    /// extension, or its content cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let options = match extension.as_deref() {
            Some("toml") => toml::from_str(&content)?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)?,
            Some("json") => serde_json::from_str(&content)?,
            _ => return Err(OptionsError::UnsupportedFormat(path.to_path_buf())),
        };

        tracing::debug!("Loaded options from {}", path.display());
        Ok(options)
    }

    /// Returns the entry stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Stores `value` under `key`, returning the previous entry if any.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Checks whether an entry exists under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }
}

impl From<Map<String, Value>> for Options {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}
