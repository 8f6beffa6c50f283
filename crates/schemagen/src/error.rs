//! Error types for schema processing and configuration.

use std::path::PathBuf;

/// A fatal problem with a schema definition.
///
/// Definition errors abort processing of the current document and propagate
/// to the caller unchanged.
#[derive(Debug, thiserror::Error)]
pub enum DefinitionError {
    #[error("malformed schema for {property}: {reason}")]
    Malformed { property: String, reason: String },

    #[error("unresolved reference {reference}")]
    UnresolvedReference { reference: String },

    #[error("unsupported type {type_name} for property {property}")]
    UnsupportedType { property: String, type_name: String },

    #[error("unsupported format {format} for property {property}")]
    UnsupportedFormat { property: String, format: String },

    #[error("name of the property '{name}' results in an empty identifier")]
    EmptyIdentifier { name: String },

    #[error("invalid pattern '{pattern}' for property {property}: {reason}")]
    InvalidPattern {
        property: String,
        pattern: String,
        reason: String,
    },

    #[error("duplicate pattern property access key '{key}' in {class}")]
    DuplicatePatternKey { class: String, key: String },

    #[error("a referenced base schema must be an object, got {reference}")]
    BaseReferenceNotObject { reference: String },

    #[error("root schema of {document} must describe an object")]
    RootNotObject { document: String },

    #[error("empty enum for property {property}")]
    EmptyEnum { property: String },

    #[error("unsupported filter {filter} on property {property}")]
    UnknownFilter { property: String, filter: String },

    #[error("filter {filter} is not compatible with property {property} of type {type_name}")]
    IncompatibleFilter {
        property: String,
        filter: String,
        type_name: String,
    },

    #[error("invalid default value for property {property}: expected {expected}")]
    InvalidDefault { property: String, expected: String },
}

pub(crate) fn malformed(property: &str, reason: impl Into<String>) -> DefinitionError {
    DefinitionError::Malformed {
        property: property.to_string(),
        reason: reason.into(),
    }
}

/// Failure to load a configuration or schema file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure of a generator run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
