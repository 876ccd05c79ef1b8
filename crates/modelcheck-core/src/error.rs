use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while turning a document into a [`crate::Schema`].
///
/// These are format errors and stop decoding immediately. Semantic problems
/// of a well-formed document are reported by the validators instead.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The models file could not be read.
    #[error("reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid YAML/JSON or does not have the expected shape.
    #[error("decoding models: {0}")]
    Document(#[from] serde_yaml::Error),
    /// A field specification that is neither a type name nor a readable
    /// field object.
    #[error("invalid field {location}: {reason}")]
    InvalidField { location: String, reason: String },
    /// A `collection/field` shorthand without exactly one separator.
    #[error("invalid value of `to` in {location}, expected one `/`: {value}")]
    InvalidTarget { location: String, value: String },
    /// A typed field object without an attribute its type requires.
    #[error("invalid object of type {type_name} in {location}: missing `{attribute}`")]
    MissingAttribute {
        location: String,
        type_name: String,
        attribute: &'static str,
    },
    /// A `to` value whose form does not fit the field type.
    #[error("invalid object of type {type_name} in {location}: {reason}")]
    InvalidTargetForm {
        location: String,
        type_name: String,
        reason: String,
    },
}

/// Convenience alias for decoding results.
pub type Result<T> = std::result::Result<T, DecodeError>;
