use std::{
    collections::{btree_map::Entry, BTreeMap},
    rc::Rc,
};

use serde_json::Value;
use tracing::instrument;

use super::{qualify, Fieldset, Inputs};
use crate::{BuildError, Builder, FilterError, Messages};

type Elements = BTreeMap<usize, Fieldset>;

/// An ordered sequence of fieldsets of a single type.
///
/// Each element is a fieldset named after its index, created on demand by
/// asking the builder for a fieldset of the collection's element type.
/// Indexes may be sparse: an element keeps the index it was loaded under.
#[derive(Debug)]
pub struct Collection {
    name: String,
    array_name: String,
    element_type: String,
    builder: Rc<dyn Builder>,
    fieldsets: Elements,
}

impl Collection {
    /// Creates an empty, unnamed collection of fieldsets of `element_type`.
    #[must_use]
    pub fn new(builder: Rc<dyn Builder>, element_type: impl Into<String>) -> Self {
        Self {
            name: String::new(),
            array_name: String::new(),
            element_type: element_type.into(),
            builder,
            fieldsets: Elements::new(),
        }
    }

    /// Returns the name of this collection.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name of this collection.
    ///
    /// Elements are restamped with the new name as their array context.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.stamp_elements();
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

    /// Returns the qualified name, e.g. `user[phones]`.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(&self.array_name, &self.name)
    }

    /// Returns the fieldset type of every element.
    #[must_use]
    pub fn element_type(&self) -> &str {
        &self.element_type
    }

    /// Returns the number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fieldsets.len()
    }

    /// Checks whether the collection has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fieldsets.is_empty()
    }

    /// Returns the indexes of all elements, in order.
    pub fn indexes(&self) -> impl Iterator<Item = usize> + '_ {
        self.fieldsets.keys().copied()
    }

    /// Returns the element at `index`, without restamping it.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Fieldset> {
        self.fieldsets.get(&index)
    }

    /// Returns the element at `index`, with its array context set to this
    /// collection's name.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Fieldset> {
        let fieldset = self.fieldsets.get_mut(&index)?;
        fieldset.set_array_name(self.name.as_str());
        Some(fieldset)
    }

    /// Iterates over the elements in index order.
    pub fn iter(&self) -> std::collections::btree_map::Values<'_, usize, Fieldset> {
        self.fieldsets.values()
    }

    /// Iterates mutably over the elements in index order.
    pub fn iter_mut(&mut self) -> std::collections::btree_map::ValuesMut<'_, usize, Fieldset> {
        self.fieldsets.values_mut()
    }

    /// Appends a new, empty element after the highest index.
    ///
    /// # Errors
    ///
    /// Returns the builder's error if it cannot create the fieldset.
    pub fn append(&mut self) -> Result<&mut Fieldset, BuildError> {
        let index = self
            .fieldsets
            .last_key_value()
            .map_or(0, |(index, _)| index + 1);
        self.element(index)
    }

    /// Returns the element at `index`, creating it if needed.
    fn element(&mut self, index: usize) -> Result<&mut Fieldset, BuildError> {
        match self.fieldsets.entry(index) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let fieldset = Rc::clone(&self.builder).new_fieldset(
                    &self.element_type,
                    &index.to_string(),
                    &self.name,
                )?;
                tracing::trace!("Created element {index} in collection '{}'", self.name);
                Ok(entry.insert(fieldset))
            }
        }
    }

    fn stamp_elements(&mut self) {
        for fieldset in self.fieldsets.values_mut() {
            fieldset.set_array_name(self.name.as_str());
        }
    }

    /// Loads the collection from a sequence of records.
    ///
    /// `data` may be an array, or an object keyed by element index. Each
    /// record is loaded into the element at its index, which is created if
    /// it does not exist yet. Elements without a record are left unchanged.
    ///
    /// # Errors
    ///
    /// Returns the builder's error if a new element cannot be created.
    #[instrument(skip(self, data), fields(collection = %self.name))]
    pub fn load(&mut self, data: Value) -> Result<(), BuildError> {
        let records: Vec<(usize, Value)> = match data {
            Value::Array(records) => records.into_iter().enumerate().collect(),
            Value::Object(records) => records
                .into_iter()
                .filter_map(|(key, record)| match key.parse::<usize>() {
                    Ok(index) => Some((index, record)),
                    Err(_) => {
                        tracing::trace!("Ignoring non-index key '{key}'");
                        None
                    }
                })
                .collect(),
            Value::Null => Vec::new(),
            _ => {
                tracing::trace!("Ignoring non-sequence data");
                Vec::new()
            }
        };

        for (index, record) in records {
            self.element(index)?.load(record)?;
        }

        tracing::debug!(len = self.fieldsets.len(), "Loaded collection");
        Ok(())
    }

    /// Exports every element, in index order.
    ///
    /// Each element is stamped with this collection's name as its array
    /// context before its own export is taken.
    pub fn export(&mut self) -> Vec<&mut Inputs> {
        self.stamp_elements();
        self.fieldsets.values_mut().map(Fieldset::export).collect()
    }

    /// Filters every element.
    ///
    /// All elements are filtered, even after one fails. Returns whether they
    /// all passed.
    ///
    /// # Errors
    ///
    /// Returns the first filter error raised by an element.
    pub fn filter(&mut self) -> Result<bool, FilterError> {
        let mut passed = true;
        for fieldset in self.fieldsets.values_mut() {
            passed &= fieldset.filter()?;
        }
        Ok(passed)
    }

    /// Returns the filter messages of every element, by index.
    #[must_use]
    pub fn messages(&self) -> BTreeMap<usize, Messages> {
        self.fieldsets
            .iter()
            .map(|(index, fieldset)| (*index, fieldset.messages()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Fieldset;
    type IntoIter = std::collections::btree_map::Values<'a, usize, Fieldset>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a> IntoIterator for &'a mut Collection {
    type Item = &'a mut Fieldset;
    type IntoIter = std::collections::btree_map::ValuesMut<'a, usize, Fieldset>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
