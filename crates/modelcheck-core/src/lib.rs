//! Core contracts and helpers for modelcheck.
//!
//! This crate defines the raw `models.yml` document shapes, the typed schema
//! model decoded from them, and the closed tables of recognized type names.

pub mod decode;
pub mod document;
pub mod error;
pub mod model;
pub mod types;

pub use decode::{decode_document, decode_reader, decode_str, load_file};
pub use document::{
    FieldObject, FieldSpec, ModelsDocument, ToFieldSpec, ToSpec, document_json_schema,
};
pub use error::{DecodeError, Result};
pub use model::{Collection, DEFAULT_FIELD_KIND, Field, Schema, TargetReference};
pub use types::{
    LIST_SUFFIX, RELATION_TYPES, SCALAR_TYPES, is_known_type, is_relation_type, is_scalar_type,
};

/// Separator between collection and field in `collection/field` references.
pub const KEY_SEPARATOR: char = '/';
