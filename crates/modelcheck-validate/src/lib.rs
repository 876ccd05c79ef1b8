//! Consistency checks for decoded `models.yml` schemas.
//!
//! Independent validators (types, relations, template prefixes, names,
//! `on_delete` rules) each collect every violation they find; [`check`]
//! gathers them into one [`ErrorList`] report.

pub mod errors;
pub mod validate;

pub use errors::{ErrorEntry, ErrorList};
pub use validate::{
    NAMES_VALIDATOR, ON_DELETE_RULES, ON_DELETE_VALIDATOR, RELATION_VALIDATOR, TEMPLATE_MARKER,
    TEMPLATE_PREFIXES_VALIDATOR, TYPE_VALIDATOR, check, check_named, check_names,
    check_on_delete, check_relations, check_template_prefixes, check_types,
};
