use std::{io, path::PathBuf};

use crate::input::Kind;

/// Errors raised when addressing the children of a fieldset.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// No child is registered under the given name.
    #[error("no input named '{0}'")]
    UnknownInput(String),

    /// The child exists but is not of the requested kind.
    #[error("input '{name}' is a {actual}, not a {expected}")]
    WrongKind {
        /// Name of the child.
        name: String,
        /// The kind the caller asked for.
        expected: Kind,
        /// The kind actually registered.
        actual: Kind,
    },

    /// The builder failed while loading a collection child.
    #[error(transparent)]
    Build(#[from] BuildError),
}

/// Errors raised by a [`Builder`](crate::Builder) when constructing inputs.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// The field type is not on the builder's allow-list.
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    /// No fieldset factory is registered for the type.
    #[error("unknown fieldset type '{0}'")]
    UnknownFieldsetType(String),

    /// A child registered in a fieldset did not keep the kind it was built as.
    #[error("input '{name}' was registered as a {actual}, not a {expected}")]
    WrongKind {
        /// Name of the child.
        name: String,
        /// The kind that was built.
        expected: Kind,
        /// The kind found under the name afterwards.
        actual: Kind,
    },
}

/// Errors raised by a [`Filter`](crate::Filter) while applying its rules.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    /// A rule refers to an input the fieldset does not have.
    #[error("filter rule refers to unknown input '{0}'")]
    UnknownInput(String),
}

/// Errors raised when loading [`Options`](crate::Options) from a file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    /// The file could not be read.
    #[error("failed to read options file {}: {source}", .path.display())]
    Io {
        /// Path of the file.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file extension is not one of `toml`, `yaml`, `yml` or `json`.
    #[error("unsupported options format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// TOML content could not be parsed.
    #[error("failed to parse TOML options: {0}")]
    Toml(#[from] toml::de::Error),

    /// YAML content could not be parsed.
    #[error("failed to parse YAML options: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON content could not be parsed.
    #[error("failed to parse JSON options: {0}")]
    Json(#[from] serde_json::Error),
}
