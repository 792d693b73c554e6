use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::qualify;

/// A leaf input holding a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    input_type: String,
    name: String,
    array_name: String,
    value: Value,
    attribs: IndexMap<String, String>,
    choices: IndexMap<String, String>,
}

impl Field {
    /// Creates an unnamed field of the given type, e.g. `text` or `select`.
    ///
    /// The value starts out as `null`.
    #[must_use]
    pub fn new(input_type: impl Into<String>) -> Self {
        Self {
            input_type: input_type.into(),
            name: String::new(),
            array_name: String::new(),
            value: Value::Null,
            attribs: IndexMap::new(),
            choices: IndexMap::new(),
        }
    }

    /// Returns the symbolic type of this field.
    #[must_use]
    pub fn input_type(&self) -> &str {
        &self.input_type
    }

    /// Returns the name of this field.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name of this field.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Returns the name of the enclosing array-like context.
    #[must_use]
    pub fn array_name(&self) -> &str {
        &self.array_name
    }

    /// Records the name of the enclosing array-like context.
    pub fn set_array_name(&mut self, array_name: impl Into<String>) {
        self.array_name = array_name.into();
    }

    /// Returns the qualified name, e.g. `user[email]`.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(&self.array_name, &self.name)
    }

    /// Replaces the current value.
    pub fn load(&mut self, value: Value) {
        self.value = value;
    }

    /// Returns the current value.
    #[must_use]
    pub const fn read(&self) -> &Value {
        &self.value
    }

    /// Returns a display-ready view of this field.
    #[must_use]
    pub fn export(&self) -> FieldView<'_> {
        FieldView {
            input_type: &self.input_type,
            name: self.full_name(),
            attribs: &self.attribs,
            choices: &self.choices,
            value: &self.value,
        }
    }

    /// Returns the display attributes.
    #[must_use]
    pub const fn attribs(&self) -> &IndexMap<String, String> {
        &self.attribs
    }

    /// Sets a single display attribute.
    pub fn set_attrib(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.attribs.insert(key.into(), value.into());
        self
    }

    /// Replaces all display attributes.
    pub fn set_attribs<K, V>(&mut self, attribs: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.attribs = attribs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Returns the choices offered by this field (value → label).
    #[must_use]
    pub const fn choices(&self) -> &IndexMap<String, String> {
        &self.choices
    }

    /// Replaces the choices offered by this field.
    pub fn set_choices<K, V>(&mut self, choices: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.choices = choices
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }
}

/// A borrowed, display-ready view of a [`Field`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView<'a> {
    /// The symbolic field type.
    #[serde(rename = "type")]
    pub input_type: &'a str,
    /// The qualified name.
    pub name: String,
    /// Display attributes.
    pub attribs: &'a IndexMap<String, String>,
    /// Choices (value → label).
    #[serde(rename = "options")]
    pub choices: &'a IndexMap<String, String>,
    /// The current value.
    pub value: &'a Value,
}
