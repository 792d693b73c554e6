//! Composable form inputs.
//!
//! An input tree is made of scalar [`Field`]s, name-keyed [`Fieldset`]s and
//! repeated [`Collection`]s of fieldsets. Trees are populated from raw
//! [`serde_json::Value`] data, validated through a pluggable [`Filter`] and
//! exported one level at a time for display.
//!
//! Children are never constructed directly by a fieldset: they are requested
//! from a [`Builder`] by symbolic type name.

/// The builder collaborator and the stock type registry.
pub mod builder;
pub use builder::{Builder, Registry};

mod error;
pub use error::{BuildError, Error, FilterError, OptionsError};

/// The filter collaborator and reference implementations.
pub mod filter;
pub use filter::{Filter, Messages, NullFilter, RuleFilter};

/// Input variants: fields, fieldsets and collections.
pub mod input;
pub use input::{Collection, Export, Field, FieldView, Fieldset, Init, Input, Inputs, Kind, Read};

mod options;
pub use options::Options;
