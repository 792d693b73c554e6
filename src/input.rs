//! The input tree.
//!
//! Every node of the tree is an [`Input`]: a scalar [`Field`], a name-keyed
//! [`Fieldset`] or a repeated [`Collection`] of fieldsets. All three share the
//! same lifecycle: they are loaded from raw data, read back, and exported for
//! display one level at a time.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;

use crate::BuildError;

mod collection;
pub use collection::Collection;

mod field;
pub use field::{Field, FieldView};

mod fieldset;
pub use fieldset::{Fieldset, Init};

/// The children of a fieldset, keyed by name in registration order.
pub type Inputs = IndexMap<String, Input>;

/// The kind of an [`Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// A scalar [`Field`].
    Field,
    /// A nested [`Fieldset`].
    Fieldset,
    /// A [`Collection`] of fieldsets.
    Collection,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Field => write!(f, "field"),
            Self::Fieldset => write!(f, "fieldset"),
            Self::Collection => write!(f, "collection"),
        }
    }
}

/// A node in the input tree.
#[derive(Debug)]
pub enum Input {
    /// A scalar value.
    Field(Field),
    /// A name-keyed set of child inputs.
    Fieldset(Fieldset),
    /// An ordered sequence of fieldsets.
    Collection(Collection),
}

impl Input {
    /// Returns the kind of this input.
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Field(_) => Kind::Field,
            Self::Fieldset(_) => Kind::Fieldset,
            Self::Collection(_) => Kind::Collection,
        }
    }

    /// Returns the name of this input within its parent.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field(field) => field.name(),
            Self::Fieldset(fieldset) => fieldset.name(),
            Self::Collection(collection) => collection.name(),
        }
    }

    /// Returns the name of the enclosing array-like context.
    #[must_use]
    pub fn array_name(&self) -> &str {
        match self {
            Self::Field(field) => field.array_name(),
            Self::Fieldset(fieldset) => fieldset.array_name(),
            Self::Collection(collection) => collection.array_name(),
        }
    }

    /// Records the name of the enclosing array-like context.
    pub fn set_array_name(&mut self, array_name: impl Into<String>) {
        match self {
            Self::Field(field) => field.set_array_name(array_name),
            Self::Fieldset(fieldset) => fieldset.set_array_name(array_name),
            Self::Collection(collection) => collection.set_array_name(array_name),
        }
    }

    /// Returns the qualified name, e.g. `address[city]`.
    #[must_use]
    pub fn full_name(&self) -> String {
        qualify(self.array_name(), self.name())
    }

    /// Loads a raw value into this input.
    ///
    /// # Errors
    ///
    /// Only a collection can fail to load, when its builder cannot create a
    /// new element.
    pub fn load(&mut self, data: Value) -> Result<(), BuildError> {
        match self {
            Self::Field(field) => {
                field.load(data);
                Ok(())
            }
            Self::Fieldset(fieldset) => fieldset.load(data),
            Self::Collection(collection) => collection.load(data),
        }
    }

    /// Reads the current value of this input.
    #[must_use]
    pub const fn read(&self) -> Read<'_> {
        match self {
            Self::Field(field) => Read::Value(field.read()),
            Self::Fieldset(fieldset) => Read::Fieldset(fieldset),
            Self::Collection(collection) => Read::Collection(collection),
        }
    }

    /// Exports this input for display.
    ///
    /// Composite inputs only export one level: the returned children are
    /// still inputs and can be exported in turn.
    pub fn export(&mut self) -> Export<'_> {
        match self {
            Self::Field(field) => Export::Field(field.export()),
            Self::Fieldset(fieldset) => Export::Fieldset(fieldset.export()),
            Self::Collection(collection) => Export::Collection(collection.export()),
        }
    }

    /// Returns the field, if this input is one.
    #[must_use]
    pub const fn as_field(&self) -> Option<&Field> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Returns the fieldset, if this input is one.
    #[must_use]
    pub const fn as_fieldset(&self) -> Option<&Fieldset> {
        match self {
            Self::Fieldset(fieldset) => Some(fieldset),
            _ => None,
        }
    }

    /// Returns the collection, if this input is one.
    #[must_use]
    pub const fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Returns the field mutably, if this input is one.
    pub const fn as_field_mut(&mut self) -> Option<&mut Field> {
        match self {
            Self::Field(field) => Some(field),
            _ => None,
        }
    }

    /// Returns the fieldset mutably, if this input is one.
    pub const fn as_fieldset_mut(&mut self) -> Option<&mut Fieldset> {
        match self {
            Self::Fieldset(fieldset) => Some(fieldset),
            _ => None,
        }
    }

    /// Returns the collection mutably, if this input is one.
    pub const fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

impl From<Field> for Input {
    fn from(field: Field) -> Self {
        Self::Field(field)
    }
}

impl From<Fieldset> for Input {
    fn from(fieldset: Fieldset) -> Self {
        Self::Fieldset(fieldset)
    }
}

impl From<Collection> for Input {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

/// The current value of an input, as returned by [`Input::read`].
///
/// Composite inputs read as themselves, so nested values can be reached by
/// chaining lookups.
#[derive(Debug, Clone, Copy)]
pub enum Read<'a> {
    /// The raw value of a field.
    Value(&'a Value),
    /// A nested fieldset.
    Fieldset(&'a Fieldset),
    /// A collection of fieldsets.
    Collection(&'a Collection),
}

impl<'a> Read<'a> {
    /// Returns the raw value, if this is a field.
    #[must_use]
    pub const fn as_value(self) -> Option<&'a Value> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the fieldset, if this is one.
    #[must_use]
    pub const fn as_fieldset(self) -> Option<&'a Fieldset> {
        match self {
            Self::Fieldset(fieldset) => Some(fieldset),
            _ => None,
        }
    }

    /// Returns the collection, if this is one.
    #[must_use]
    pub const fn as_collection(self) -> Option<&'a Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }
}

/// The display-ready shape of an input, as returned by [`Input::export`].
#[derive(Debug)]
pub enum Export<'a> {
    /// A field's view.
    Field(FieldView<'a>),
    /// The children of a fieldset, not yet exported themselves.
    Fieldset(&'a mut Inputs),
    /// The exported children of each element of a collection, in order.
    Collection(Vec<&'a mut Inputs>),
}

impl<'a> Export<'a> {
    /// Returns the field view, if this is a field export.
    #[must_use]
    pub fn into_field(self) -> Option<FieldView<'a>> {
        match self {
            Self::Field(view) => Some(view),
            _ => None,
        }
    }

    /// Returns the children, if this is a fieldset export.
    #[must_use]
    pub fn into_fieldset(self) -> Option<&'a mut Inputs> {
        match self {
            Self::Fieldset(inputs) => Some(inputs),
            _ => None,
        }
    }

    /// Returns the elements, if this is a collection export.
    #[must_use]
    pub fn into_collection(self) -> Option<Vec<&'a mut Inputs>> {
        match self {
            Self::Collection(elements) => Some(elements),
            _ => None,
        }
    }
}

/// Composes a qualified name from an array context and a name.
pub(crate) fn qualify(array_name: &str, name: &str) -> String {
    if array_name.is_empty() {
        name.to_string()
    } else {
        format!("{array_name}[{name}]")
    }
}
