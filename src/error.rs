//! Error types: schema validation failures vs. I/O faults. Nothing else.

use std::path::PathBuf;

use thiserror::Error;

/// A hierarchy definition violated a validation rule.
///
/// Always raised before any text is produced, and always fatal to that one
/// definition only — sibling definitions in a batch still emit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("`baseName` must be present and non-empty")]
    MissingBaseName,

    /// `field` is the schema key holding the offending value.
    #[error("`{field}` is not a well-formed identifier: {value:?}")]
    InvalidIdentifier { field: String, value: String },

    #[error("hierarchy `{base}` declares no variants")]
    NoVariants { base: String },

    #[error("duplicate variant name `{name}` in hierarchy `{base}`")]
    DuplicateVariant { base: String, name: String },

    #[error("variant `{name}` shadows the base type name")]
    VariantShadowsBase { name: String },

    #[error("duplicate field name `{field}` in variant `{variant}`")]
    DuplicateField { variant: String, field: String },
}

/// The input document cannot be read or an artifact cannot be written.
/// Fatal to the run; the underlying cause is always carried.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `pointer` is the JSON path at which deserialization failed.
    #[error("failed to parse `{path}` (at {pointer}): {message}")]
    Parse {
        path: PathBuf,
        pointer: String,
        message: String,
    },

    #[error("failed to write `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
