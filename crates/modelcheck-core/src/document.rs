use std::collections::BTreeMap;

use schemars::JsonSchema;
use schemars::schema::RootSchema;
use schemars::schema_for;
use serde::{Deserialize, Serialize};

/// Raw `models.yml` document: collection name to its field specifications.
///
/// A collection without a body (`motion:` followed by nothing) is kept as
/// `None` and decodes to an empty collection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ModelsDocument(pub BTreeMap<String, Option<BTreeMap<String, FieldSpec>>>);

/// Field specification as written in the document.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldSpec {
    /// Bare type name, e.g. `string` or `number[]`.
    Name(String),
    /// Object form carrying at least `type`.
    Object(FieldObject),
}

/// Object form of a field specification.
///
/// Attributes other than the ones below (`description`, `required`,
/// `default`, ...) are accepted and ignored.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldObject {
    #[serde(rename = "type")]
    pub type_name: String,
    /// Target of a relation or generic relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<ToSpec>,
    /// Replacement marker of a template field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Inner field shared by every member of a template family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Box<FieldSpec>>,
    /// Deletion rule of a relation: `CASCADE` or `PROTECT`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<String>,
}

/// Value of `to` in a relation-family field.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ToSpec {
    /// `collection/field`.
    Shorthand(String),
    /// List of `collection/field` entries (generic relations).
    List(Vec<String>),
    /// One field specifier shared by several collections (generic relations).
    Collections {
        collections: Vec<String>,
        field: ToFieldSpec,
    },
    /// Explicit collection and field (relations).
    Collection {
        collection: String,
        field: ToFieldSpec,
    },
}

/// Target field inside an object-form `to`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ToFieldSpec {
    Name(String),
    Typed {
        name: String,
        #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
        kind: Option<String>,
    },
}

/// Emit the JSON Schema for `models.yml`.
pub fn document_json_schema() -> RootSchema {
    schema_for!(ModelsDocument)
}
