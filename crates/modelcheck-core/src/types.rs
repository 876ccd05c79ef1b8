//! Closed tables of the type names a `models.yml` field may declare.

pub const RELATION: &str = "relation";
pub const RELATION_LIST: &str = "relation-list";
pub const GENERIC_RELATION: &str = "generic-relation";
pub const GENERIC_RELATION_LIST: &str = "generic-relation-list";
pub const TEMPLATE: &str = "template";

/// Scalar type names. Any of them may carry [`LIST_SUFFIX`].
pub static SCALAR_TYPES: &[&str] = &[
    "string",
    "number",
    "boolean",
    "JSON",
    "HTMLPermissive",
    "HTMLStrict",
    "float",
    "decimal(6)",
    "timestamp",
];

/// Relation-family type names, including `template`.
pub static RELATION_TYPES: &[&str] = &[
    RELATION,
    RELATION_LIST,
    GENERIC_RELATION,
    GENERIC_RELATION_LIST,
    TEMPLATE,
];

/// Marks a scalar as "list of", e.g. `string[]`.
pub const LIST_SUFFIX: &str = "[]";

/// Returns true when `name` is a scalar type, with or without a list suffix.
pub fn is_scalar_type(name: &str) -> bool {
    let base = name.strip_suffix(LIST_SUFFIX).unwrap_or(name);
    SCALAR_TYPES.contains(&base)
}

/// Returns true when `name` is one of the relation-family type names.
pub fn is_relation_type(name: &str) -> bool {
    RELATION_TYPES.contains(&name)
}

pub fn is_known_type(name: &str) -> bool {
    is_scalar_type(name) || is_relation_type(name)
}
