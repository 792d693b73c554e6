use std::rc::Rc;

use serde_json::Value;
use tracing::instrument;

use super::{qualify, Collection, Field, Input, Inputs, Kind, Read};
use crate::{BuildError, Builder, Error, Filter, FilterError, Messages, Options};

/// The default type requested for fields when none is given.
const DEFAULT_FIELD_TYPE: &str = "text";

/// An initialization hook, run once when a [`Fieldset`] is constructed.
///
/// This is where an application declares the children of a fieldset, using
/// [`Fieldset::set_field`], [`Fieldset::set_fieldset`] and
/// [`Fieldset::set_collection`].
pub trait Init {
    /// Registers the children of `fieldset`.
    ///
    /// # Errors
    ///
    /// Returns an error if the builder cannot create a requested child.
    fn init(&self, fieldset: &mut Fieldset) -> Result<(), BuildError>;
}

impl<F> Init for F
where
    F: Fn(&mut Fieldset) -> Result<(), BuildError>,
{
    fn init(&self, fieldset: &mut Fieldset) -> Result<(), BuildError> {
        self(fieldset)
    }
}

/// A name-keyed set of inputs.
///
/// Children may be fields, other fieldsets or collections. They are created
/// through the injected [`Builder`] and kept in registration order.
///
/// The builder, filter and options are shared with the caller: a fieldset
/// holds a reference to them but does not own them.
#[derive(Debug)]
pub struct Fieldset {
    name: String,
    array_name: String,
    builder: Rc<dyn Builder>,
    filter: Rc<dyn Filter>,
    options: Rc<Options>,
    inputs: Inputs,
}

impl Fieldset {
    /// Creates an empty, unnamed fieldset.
    #[must_use]
    pub fn new(builder: Rc<dyn Builder>, filter: Rc<dyn Filter>, options: Rc<Options>) -> Self {
        Self {
            name: String::new(),
            array_name: String::new(),
            builder,
            filter,
            options,
            inputs: Inputs::new(),
        }
    }

    /// Creates a fieldset and runs `init` on it once.
    ///
    /// # Errors
    ///
    /// Returns any error raised by the hook.
    pub fn with_init(
        builder: Rc<dyn Builder>,
        filter: Rc<dyn Filter>,
        options: Rc<Options>,
        init: &dyn Init,
    ) -> Result<Self, BuildError> {
        let mut fieldset = Self::new(builder, filter, options);
        init.init(&mut fieldset)?;
        Ok(fieldset)
    }

    /// Returns the name of this fieldset.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sets the name of this fieldset.
    ///
    /// Children are restamped with the new name as their array context.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.stamp_children();
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

    /// Returns the qualified name, e.g. `user[address]`.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(&self.array_name, &self.name)
    }

    /// Returns the builder used to create children.
    #[must_use]
    pub const fn builder(&self) -> &Rc<dyn Builder> {
        &self.builder
    }

    /// Returns the filter applied by [`Fieldset::filter`].
    #[must_use]
    pub const fn filter_ref(&self) -> &Rc<dyn Filter> {
        &self.filter
    }

    /// Returns the shared options.
    #[must_use]
    pub const fn options(&self) -> &Rc<Options> {
        &self.options
    }

    /// Returns all children, without restamping them.
    #[must_use]
    pub const fn inputs(&self) -> &Inputs {
        &self.inputs
    }

    /// Returns the names of all children in registration order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.keys().map(String::as_str)
    }

    /// Checks whether a child is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inputs.contains_key(name)
    }

    /// Returns the number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Checks whether this fieldset has no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Registers a new field named `name`.
    ///
    /// The builder is asked for a field of `input_type`, or `text` when none
    /// is given. A child already registered under `name` is replaced.
    ///
    /// # Errors
    ///
    /// Returns the builder's error if it cannot create the field.
    pub fn set_field(
        &mut self,
        name: &str,
        input_type: Option<&str>,
    ) -> Result<&mut Field, BuildError> {
        let input_type = input_type.unwrap_or(DEFAULT_FIELD_TYPE);
        let field = Rc::clone(&self.builder).new_field(input_type, name, &self.name)?;
        self.register(name, field, Kind::Field, Input::as_field_mut)
    }

    /// Registers a new nested fieldset named `name`.
    ///
    /// The builder is asked for a fieldset of `input_type`, which defaults to
    /// `name`. A child already registered under `name` is replaced.
    ///
    /// # Errors
    ///
    /// Returns the builder's error if it cannot create the fieldset.
    pub fn set_fieldset(
        &mut self,
        name: &str,
        input_type: Option<&str>,
    ) -> Result<&mut Self, BuildError> {
        let input_type = input_type.unwrap_or(name);
        let fieldset = Rc::clone(&self.builder).new_fieldset(input_type, name, &self.name)?;
        self.register(name, fieldset, Kind::Fieldset, Input::as_fieldset_mut)
    }

    /// Registers a new collection named `name`.
    ///
    /// The builder is asked for a collection of fieldsets of `input_type`,
    /// which defaults to `name`. A child already registered under `name` is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns the builder's error if it cannot create the collection.
    pub fn set_collection(
        &mut self,
        name: &str,
        input_type: Option<&str>,
    ) -> Result<&mut Collection, BuildError> {
        let input_type = input_type.unwrap_or(name);
        let collection = Rc::clone(&self.builder).new_collection(input_type, name, &self.name)?;
        self.register(name, collection, Kind::Collection, Input::as_collection_mut)
    }

    fn register<T>(
        &mut self,
        name: &str,
        child: T,
        kind: Kind,
        project: fn(&mut Input) -> Option<&mut T>,
    ) -> Result<&mut T, BuildError>
    where
        T: Into<Input>,
    {
        tracing::trace!("Registering {kind} '{name}' in fieldset '{}'", self.name);
        let (index, _) = self.inputs.insert_full(name.to_string(), child.into());
        let input = &mut self.inputs[index];
        let actual = input.kind();
        project(input).ok_or_else(|| BuildError::WrongKind {
            name: name.to_string(),
            expected: kind,
            actual,
        })
    }

    /// Reads the value of the child named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`] if no such child exists.
    pub fn value(&self, name: &str) -> Result<Read<'_>, Error> {
        self.input(name).map(Input::read)
    }

    /// Loads `value` into the child named `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`] if no such child exists, or the
    /// builder's error if the child is a collection that cannot grow.
    pub fn set_value(&mut self, name: &str, value: Value) -> Result<(), Error> {
        self.inputs
            .get_mut(name)
            .ok_or_else(|| Error::UnknownInput(name.to_string()))?
            .load(value)?;
        Ok(())
    }

    /// Returns the child named `name` without restamping it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`] if no such child exists.
    pub fn input(&self, name: &str) -> Result<&Input, Error> {
        self.inputs
            .get(name)
            .ok_or_else(|| Error::UnknownInput(name.to_string()))
    }

    /// Returns the child named `name`, with its array context set to this
    /// fieldset's name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`] if no such child exists.
    pub fn get_input(&mut self, name: &str) -> Result<&mut Input, Error> {
        let input = self
            .inputs
            .get_mut(name)
            .ok_or_else(|| Error::UnknownInput(name.to_string()))?;
        input.set_array_name(self.name.as_str());
        Ok(input)
    }

    /// Exports the child named `name` for display.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownInput`] if no such child exists.
    pub fn get(&mut self, name: &str) -> Result<super::Export<'_>, Error> {
        Ok(self.get_input(name)?.export())
    }

    /// Returns the field named `name`, restamped.
    ///
    /// # Errors
    ///
    /// Returns an error if no such child exists or it is not a field.
    pub fn field_mut(&mut self, name: &str) -> Result<&mut Field, Error> {
        match self.get_input(name)? {
            Input::Field(field) => Ok(field),
            other => Err(wrong_kind(name, Kind::Field, other)),
        }
    }

    /// Returns the nested fieldset named `name`, restamped.
    ///
    /// # Errors
    ///
    /// Returns an error if no such child exists or it is not a fieldset.
    pub fn fieldset_mut(&mut self, name: &str) -> Result<&mut Self, Error> {
        match self.get_input(name)? {
            Input::Fieldset(fieldset) => Ok(fieldset),
            other => Err(wrong_kind(name, Kind::Fieldset, other)),
        }
    }

    /// Returns the collection named `name`, restamped.
    ///
    /// # Errors
    ///
    /// Returns an error if no such child exists or it is not a collection.
    pub fn collection_mut(&mut self, name: &str) -> Result<&mut Collection, Error> {
        match self.get_input(name)? {
            Input::Collection(collection) => Ok(collection),
            other => Err(wrong_kind(name, Kind::Collection, other)),
        }
    }

    /// Loads this fieldset from an associative structure.
    ///
    /// Each key naming a registered child is forwarded to that child. Keys
    /// without a matching child are ignored, and children without a matching
    /// key keep their current value. Anything other than an object loads
    /// nothing.
    ///
    /// # Errors
    ///
    /// Loading never validates. The only failure is a builder error raised
    /// while a child collection grows to fit its data.
    pub fn load(&mut self, data: Value) -> Result<(), BuildError> {
        let mut data = match data {
            Value::Object(data) => data,
            Value::Null => return Ok(()),
            _ => {
                tracing::trace!("Ignoring non-object data for fieldset '{}'", self.name);
                return Ok(());
            }
        };

        for (name, input) in &mut self.inputs {
            if let Some(value) = data.remove(name) {
                input.load(value)?;
            }
        }

        for key in data.keys() {
            tracing::trace!("Ignoring unknown input '{key}' in fieldset '{}'", self.name);
        }

        Ok(())
    }

    /// Exports this fieldset for display.
    ///
    /// Every child is stamped with this fieldset's name as its array context
    /// and returned as-is; children are not exported recursively.
    pub fn export(&mut self) -> &mut Inputs {
        self.stamp_children();
        &mut self.inputs
    }

    fn stamp_children(&mut self) {
        for input in self.inputs.values_mut() {
            input.set_array_name(self.name.as_str());
        }
    }

    /// Applies the filter to the current values.
    ///
    /// Returns whether every rule passed. A `false` result is a normal
    /// outcome; the reasons are available from [`Fieldset::messages`].
    ///
    /// # Errors
    ///
    /// Returns the filter's own error unchanged.
    #[instrument(skip(self), fields(fieldset = %self.name))]
    pub fn filter(&mut self) -> Result<bool, FilterError> {
        let filter = Rc::clone(&self.filter);
        let passed = filter.values(self)?;
        tracing::debug!(passed, "Filtered fieldset");
        Ok(passed)
    }

    /// Returns the filter messages for every child.
    #[must_use]
    pub fn messages(&self) -> Messages {
        self.filter.messages()
    }

    /// Returns the filter messages for the child named `name`.
    ///
    /// The result is empty when the child has no messages.
    #[must_use]
    pub fn messages_for(&self, name: &str) -> Vec<String> {
        self.filter.messages_for(name)
    }
}

fn wrong_kind(name: &str, expected: Kind, actual: &Input) -> Error {
    Error::WrongKind {
        name: name.to_string(),
        expected,
        actual: actual.kind(),
    }
}
