//! Construction of inputs by symbolic type name.
//!
//! Fieldsets never construct their children directly. They ask a [`Builder`]
//! for a field, fieldset or collection of a named type, so that one
//! [`Fieldset`] implementation can hold children of any concrete shape.

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    rc::Rc,
};

use crate::{BuildError, Collection, Field, Fieldset, Filter, Init, Options};

/// A factory for inputs.
///
/// Every method receives the requested type, the name of the new input and
/// the name of the context it is created in, and returns a fully constructed
/// input ready to be registered in its parent.
///
/// Methods take `self` by [`Rc`] so that a builder can hand a reference to
/// itself to the fieldsets and collections it creates.
pub trait Builder: fmt::Debug {
    /// Creates a scalar field.
    ///
    /// # Errors
    ///
    /// Returns an error if `input_type` is not a known field type.
    fn new_field(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Field, BuildError>;

    /// Creates a fieldset.
    ///
    /// # Errors
    ///
    /// Returns an error if `input_type` is not a known fieldset type, or its
    /// initialization fails.
    fn new_fieldset(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Fieldset, BuildError>;

    /// Creates a collection of fieldsets of `input_type`.
    ///
    /// # Errors
    ///
    /// Returns an error if `input_type` is not a known fieldset type.
    fn new_collection(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Collection, BuildError>;
}

type FilterFactory = Box<dyn Fn() -> Rc<dyn Filter>>;

/// How to construct one type of fieldset.
struct FieldsetType {
    /// Creates the filter owned by each new fieldset of this type.
    filter: FilterFactory,

    /// Registers the children of each new fieldset of this type.
    init: Box<dyn Init>,
}

/// A [`Builder`] backed by a map of registered types.
///
/// Fieldset types must be registered before use. Field types are accepted
/// freely unless an allow-list is configured with
/// [`Registry::with_field_types`].
///
/// ```
/// use std::rc::Rc;
///
/// use forminput::{BuildError, Fieldset, NullFilter, Options, Registry};
///
/// let mut registry = Registry::new(Rc::new(Options::new()));
/// registry.register_fieldset(
///     "address",
///     || Rc::new(NullFilter),
///     |fieldset: &mut Fieldset| -> Result<(), BuildError> {
///         fieldset.set_field("city", None)?;
///         Ok(())
///     },
/// );
/// let registry = Rc::new(registry);
///
/// let options = Rc::clone(registry.options());
/// let mut form = Fieldset::new(registry, Rc::new(NullFilter), options);
/// form.set_fieldset("address", None).unwrap();
///
/// assert!(form.contains("address"));
/// ```
pub struct Registry {
    options: Rc<Options>,

    /// Allowed field types. Empty means any type is allowed.
    field_types: BTreeSet<String>,

    fieldset_types: HashMap<String, FieldsetType>,
}

impl Registry {
    /// Creates a registry with no fieldset types, accepting any field type.
    #[must_use]
    pub fn new(options: Rc<Options>) -> Self {
        Self {
            options,
            field_types: BTreeSet::new(),
            fieldset_types: HashMap::new(),
        }
    }

    /// Restricts the field types this registry will build.
    #[must_use]
    pub fn with_field_types<I, S>(mut self, field_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.field_types = field_types.into_iter().map(Into::into).collect();
        self
    }

    /// Returns the options shared with every fieldset this registry builds.
    #[must_use]
    pub const fn options(&self) -> &Rc<Options> {
        &self.options
    }

    /// Checks whether a field type is allowed.
    ///
    /// If no allow-list is configured, all field types are allowed.
    #[must_use]
    pub fn is_field_type_allowed(&self, input_type: &str) -> bool {
        self.field_types.is_empty() || self.field_types.contains(input_type)
    }

    /// Checks whether a fieldset type is registered.
    #[must_use]
    pub fn is_fieldset_type_registered(&self, input_type: &str) -> bool {
        self.fieldset_types.contains_key(input_type)
    }

    /// Registers a fieldset type.
    ///
    /// Every fieldset built for `input_type` gets a fresh filter from
    /// `filter` and has `init` run on it once. Registering a type again
    /// replaces the previous registration.
    pub fn register_fieldset<F, I>(
        &mut self,
        input_type: impl Into<String>,
        filter: F,
        init: I,
    ) -> &mut Self
    where
        F: Fn() -> Rc<dyn Filter> + 'static,
        I: Init + 'static,
    {
        self.fieldset_types.insert(
            input_type.into(),
            FieldsetType {
                filter: Box::new(filter),
                init: Box::new(init),
            },
        );
        self
    }

    fn fieldset_type(&self, input_type: &str) -> Result<&FieldsetType, BuildError> {
        self.fieldset_types
            .get(input_type)
            .ok_or_else(|| BuildError::UnknownFieldsetType(input_type.to_string()))
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fieldset_types: Vec<_> = self.fieldset_types.keys().collect();
        fieldset_types.sort();
        f.debug_struct("Registry")
            .field("field_types", &self.field_types)
            .field("fieldset_types", &fieldset_types)
            .finish_non_exhaustive()
    }
}

impl Builder for Registry {
    fn new_field(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Field, BuildError> {
        if !self.is_field_type_allowed(input_type) {
            return Err(BuildError::UnknownFieldType(input_type.to_string()));
        }

        let mut field = Field::new(input_type);
        field.set_name(name);
        field.set_array_name(array_name);
        tracing::debug!("Built {input_type} field '{}'", field.full_name());
        Ok(field)
    }

    fn new_fieldset(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Fieldset, BuildError> {
        let fieldset_type = self.fieldset_type(input_type)?;
        let filter = (fieldset_type.filter)();
        let options = Rc::clone(&self.options);
        let builder: Rc<dyn Builder> = Rc::<Self>::clone(&self);

        let mut fieldset =
            Fieldset::with_init(builder, filter, options, fieldset_type.init.as_ref())?;
        fieldset.set_name(name);
        fieldset.set_array_name(array_name);
        tracing::debug!("Built {input_type} fieldset '{}'", fieldset.full_name());
        Ok(fieldset)
    }

    fn new_collection(
        self: Rc<Self>,
        input_type: &str,
        name: &str,
        array_name: &str,
    ) -> Result<Collection, BuildError> {
        self.fieldset_type(input_type)?;

        let mut collection = Collection::new(self, input_type);
        collection.set_name(name);
        collection.set_array_name(array_name);
        tracing::debug!(
            "Built collection '{}' of {input_type}",
            collection.full_name()
        );
        Ok(collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NullFilter;

    fn empty(_: &mut Fieldset) -> Result<(), BuildError> {
        Ok(())
    }

    fn registry() -> Rc<Registry> {
        let mut registry = Registry::new(Rc::new(Options::new()));
        registry.register_fieldset("empty", || Rc::new(NullFilter), empty);
        Rc::new(registry)
    }

    #[test]
    fn any_field_type_allowed_by_default() {
        let field = registry().new_field("colour-picker", "c", "").unwrap();

        assert_eq!(field.input_type(), "colour-picker");
        assert_eq!(field.full_name(), "c");
    }

    #[test]
    fn field_allow_list_rejects_unknown_types() {
        let registry =
            Rc::new(Registry::new(Rc::new(Options::new())).with_field_types(["text", "email"]));

        assert!(Rc::clone(&registry).new_field("email", "e", "form").is_ok());
        let error = registry.new_field("date", "d", "form").unwrap_err();
        assert_eq!(error, BuildError::UnknownFieldType("date".to_string()));
    }

    #[test]
    fn new_fieldset_is_named_and_scoped() {
        let fieldset = registry().new_fieldset("empty", "billing", "order").unwrap();

        assert_eq!(fieldset.name(), "billing");
        assert_eq!(fieldset.array_name(), "order");
        assert_eq!(fieldset.full_name(), "order[billing]");
    }

    #[test]
    fn new_fieldset_hands_itself_to_children() {
        let mut registry = Registry::new(Rc::new(Options::new()));
        registry
            .register_fieldset("empty", || Rc::new(NullFilter), empty)
            .register_fieldset(
                "outer",
                || Rc::new(NullFilter),
                |fieldset: &mut Fieldset| -> Result<(), BuildError> {
                    fieldset.set_fieldset("inner", Some("empty"))?;
                    Ok(())
                },
            );

        let mut outer = Rc::new(registry)
            .new_fieldset("outer", "outer", "")
            .unwrap();

        let inner = outer.fieldset_mut("inner").unwrap();
        assert_eq!(inner.full_name(), "outer[inner]");
        assert!(inner.set_fieldset("nested", Some("empty")).is_ok());
    }

    #[test]
    fn new_fieldset_shares_options() {
        let registry = registry();

        let fieldset = Rc::clone(&registry)
            .new_fieldset("empty", "billing", "")
            .unwrap();

        assert!(Rc::ptr_eq(fieldset.options(), registry.options()));
    }

    #[test]
    fn unknown_fieldset_type_fails() {
        let error = registry().new_fieldset("missing", "m", "").unwrap_err();

        assert_eq!(error, BuildError::UnknownFieldsetType("missing".to_string()));
    }

    #[test]
    fn collection_of_unknown_type_fails_eagerly() {
        let error = registry().new_collection("missing", "m", "").unwrap_err();

        assert_eq!(error, BuildError::UnknownFieldsetType("missing".to_string()));
    }

    #[test]
    fn init_failure_propagates() {
        let mut registry = Registry::new(Rc::new(Options::new())).with_field_types(["text"]);
        registry.register_fieldset(
            "broken",
            || Rc::new(NullFilter),
            |fieldset: &mut Fieldset| -> Result<(), BuildError> {
                fieldset.set_field("when", Some("date"))?;
                Ok(())
            },
        );

        let error = Rc::new(registry)
            .new_fieldset("broken", "b", "")
            .unwrap_err();

        assert_eq!(error, BuildError::UnknownFieldType("date".to_string()));
    }

    #[test]
    fn debug_lists_registered_types() {
        let debug = format!("{:?}", registry());

        assert!(debug.contains("\"empty\""));
    }
}
