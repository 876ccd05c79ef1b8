use std::collections::BTreeMap;
use std::fmt;

use crate::KEY_SEPARATOR;
use crate::types::{
    GENERIC_RELATION, GENERIC_RELATION_LIST, RELATION, RELATION_LIST, TEMPLATE, is_relation_type,
};

/// Field kind of a target given only by name.
pub const DEFAULT_FIELD_KIND: &str = "normal";

/// Decoded `models.yml`: every collection by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub collections: BTreeMap<String, Collection>,
}

impl Schema {
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.collections.get(name)
    }

    /// Look up `collection/field`.
    pub fn field(&self, collection: &str, field: &str) -> Option<&Field> {
        self.collection(collection)
            .and_then(|collection| collection.field(field))
    }

    /// Collections in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Collection> {
        self.collections.values()
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

/// A named entity of the schema and its fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    pub name: String,
    pub fields: BTreeMap<String, Field>,
    /// Declared `on_delete` rules by field name, as written.
    pub on_delete: BTreeMap<String, String>,
}

impl Collection {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn on_delete(&self, field: &str) -> Option<&str> {
        self.on_delete.get(field).map(String::as_str)
    }
}

/// One attribute of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    /// Leaf value type; the name is kept verbatim, list suffix included.
    Scalar(String),
    Relation(TargetReference),
    RelationList(TargetReference),
    /// Reference into any of several collections.
    GenericRelation(Vec<TargetReference>),
    GenericRelationList(Vec<TargetReference>),
    /// Family of fields named `<prefix>$<suffix>` sharing one inner field.
    Template {
        replacement: String,
        inner: Box<Field>,
    },
}

impl Field {
    /// Declared type name as written in the document.
    pub fn type_name(&self) -> &str {
        match self {
            Field::Scalar(name) => name,
            Field::Relation(_) => RELATION,
            Field::RelationList(_) => RELATION_LIST,
            Field::GenericRelation(_) => GENERIC_RELATION,
            Field::GenericRelationList(_) => GENERIC_RELATION_LIST,
            Field::Template { .. } => TEMPLATE,
        }
    }

    /// Returns true when the declared type is one of the relation-family names.
    pub fn is_relation_type(&self) -> bool {
        is_relation_type(self.type_name())
    }

    /// Targets of this field itself; empty unless it is a relation variant.
    pub fn targets(&self) -> &[TargetReference] {
        match self {
            Field::Relation(target) | Field::RelationList(target) => std::slice::from_ref(target),
            Field::GenericRelation(targets) | Field::GenericRelationList(targets) => targets,
            Field::Scalar(_) | Field::Template { .. } => &[],
        }
    }

    /// Inner field of a template.
    pub fn template_inner(&self) -> Option<&Field> {
        match self {
            Field::Template { inner, .. } => Some(inner.as_ref()),
            _ => None,
        }
    }

    /// The relation this field resolves to, directly or through one template.
    pub fn relation(&self) -> Option<&Field> {
        let field = self.template_inner().unwrap_or(self);
        match field {
            Field::Relation(_)
            | Field::RelationList(_)
            | Field::GenericRelation(_)
            | Field::GenericRelationList(_) => Some(field),
            Field::Scalar(_) | Field::Template { .. } => None,
        }
    }

    /// Targets of [`Field::relation`]; empty when the field is not a relation.
    pub fn relation_targets(&self) -> &[TargetReference] {
        self.relation().map(Field::targets).unwrap_or(&[])
    }
}

/// The `(collection, field, kind)` a relation points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetReference {
    pub collection: String,
    pub field: String,
    pub kind: String,
}

impl TargetReference {
    /// Target given only by name, with the default field kind.
    pub fn new(collection: impl Into<String>, field: impl Into<String>) -> Self {
        Self::with_kind(collection, field, DEFAULT_FIELD_KIND)
    }

    pub fn with_kind(
        collection: impl Into<String>,
        field: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            collection: collection.into(),
            field: field.into(),
            kind: kind.into(),
        }
    }
}

impl fmt::Display for TargetReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.collection, KEY_SEPARATOR, self.field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(inner: Field) -> Field {
        Field::Template {
            replacement: "meeting".to_string(),
            inner: Box::new(inner),
        }
    }

    #[test]
    fn type_names_follow_variant() {
        assert_eq!(Field::Scalar("string[]".to_string()).type_name(), "string[]");
        assert_eq!(
            Field::GenericRelationList(Vec::new()).type_name(),
            "generic-relation-list"
        );
        assert_eq!(template(Field::Scalar("number".to_string())).type_name(), "template");
    }

    #[test]
    fn relation_unwraps_one_template_level() {
        let target = TargetReference::new("user", "group_ids");
        let field = template(Field::RelationList(target.clone()));

        assert!(field.targets().is_empty());
        assert_eq!(field.relation_targets(), std::slice::from_ref(&target));

        let nested = template(field);
        assert!(nested.relation().is_none());
        assert!(nested.relation_targets().is_empty());
    }

    #[test]
    fn scalars_have_no_targets() {
        let field = Field::Scalar("HTMLStrict".to_string());
        assert!(field.relation().is_none());
        assert!(!field.is_relation_type());
        assert!(template(field).is_relation_type());
    }

    #[test]
    fn target_displays_as_collection_field() {
        let target = TargetReference::with_kind("motion", "tag_ids", "list");
        assert_eq!(target.to_string(), "motion/tag_ids");
        assert_eq!(TargetReference::new("a", "b").kind, DEFAULT_FIELD_KIND);
    }

    #[test]
    fn schema_lookups() {
        let mut fields = BTreeMap::new();
        fields.insert("title".to_string(), Field::Scalar("string".to_string()));
        let mut collections = BTreeMap::new();
        collections.insert(
            "topic".to_string(),
            Collection {
                name: "topic".to_string(),
                fields,
                on_delete: BTreeMap::new(),
            },
        );
        let schema = Schema { collections };

        assert_eq!(schema.len(), 1);
        assert!(schema.field("topic", "title").is_some());
        assert!(schema.field("topic", "text").is_none());
        assert!(schema.field("motion", "title").is_none());
    }
}
