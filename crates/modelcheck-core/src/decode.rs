use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use serde_yaml::Value;

use crate::KEY_SEPARATOR;
use crate::document::{FieldObject, FieldSpec, ModelsDocument, ToFieldSpec, ToSpec};
use crate::error::{DecodeError, Result};
use crate::model::{Collection, DEFAULT_FIELD_KIND, Field, Schema, TargetReference};
use crate::types::{GENERIC_RELATION, GENERIC_RELATION_LIST, RELATION, RELATION_LIST, TEMPLATE};

/// Document as read, before any field specification is interpreted.
type RawDocument = BTreeMap<String, Option<BTreeMap<String, Value>>>;

/// Field object read attribute by attribute, so a bad `to` or `fields`
/// is reported as such instead of as a shapeless mismatch.
#[derive(Deserialize)]
struct RawFieldObject {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    to: Option<Value>,
    #[serde(default)]
    replacement: Option<String>,
    #[serde(default)]
    fields: Option<Value>,
    #[serde(default)]
    on_delete: Option<String>,
}

/// Decode a YAML (or JSON) `models.yml` document.
pub fn decode_str(input: &str) -> Result<Schema> {
    let document: RawDocument = serde_yaml::from_str(input)?;
    decode_raw(document)
}

/// Decode a document read from `reader`.
pub fn decode_reader<R: Read>(reader: R) -> Result<Schema> {
    let document: RawDocument = serde_yaml::from_reader(reader)?;
    decode_raw(document)
}

/// Read and decode the models file at `path`.
pub fn load_file(path: &Path) -> Result<Schema> {
    let contents = std::fs::read_to_string(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(event = "models_loaded", path = %path.display(), bytes = contents.len());
    decode_str(&contents)
}

/// Resolve the raw document shapes into the typed schema model.
///
/// Stops at the first malformed field.
pub fn decode_document(document: ModelsDocument) -> Result<Schema> {
    let mut collections = BTreeMap::new();

    for (name, specs) in document.0 {
        let mut fields = BTreeMap::new();
        let mut on_delete = BTreeMap::new();
        for (field_name, spec) in specs.unwrap_or_default() {
            let location = format!("{name}{KEY_SEPARATOR}{field_name}");
            if let Some(rule) = on_delete_rule(&spec) {
                on_delete.insert(field_name.clone(), rule.to_string());
            }
            let field = decode_field(&location, spec)?;
            fields.insert(field_name, field);
        }
        collections.insert(
            name.clone(),
            Collection {
                name,
                fields,
                on_delete,
            },
        );
    }

    tracing::debug!(event = "models_decoded", collections = collections.len());

    Ok(Schema { collections })
}

fn decode_raw(document: RawDocument) -> Result<Schema> {
    let mut shaped = BTreeMap::new();

    for (name, values) in document {
        let mut specs = BTreeMap::new();
        for (field_name, value) in values.unwrap_or_default() {
            let location = format!("{name}{KEY_SEPARATOR}{field_name}");
            specs.insert(field_name, read_field_spec(&location, value)?);
        }
        shaped.insert(name, Some(specs));
    }

    decode_document(ModelsDocument(shaped))
}

fn read_field_spec(location: &str, value: Value) -> Result<FieldSpec> {
    match value {
        Value::String(type_name) => Ok(FieldSpec::Name(type_name)),
        Value::Mapping(_) => {
            let RawFieldObject {
                type_name,
                to,
                replacement,
                fields,
                on_delete,
            } = serde_yaml::from_value(value).map_err(|err| DecodeError::InvalidField {
                location: location.to_string(),
                reason: err.to_string(),
            })?;

            let to = match to {
                Some(to) => Some(serde_yaml::from_value::<ToSpec>(to).map_err(|err| {
                    DecodeError::InvalidTargetForm {
                        location: location.to_string(),
                        type_name: type_name.clone(),
                        reason: format!("unreadable `to`: {err}"),
                    }
                })?),
                None => None,
            };
            let fields = match fields {
                Some(inner) => Some(Box::new(read_field_spec(location, inner)?)),
                None => None,
            };

            Ok(FieldSpec::Object(FieldObject {
                type_name,
                to,
                replacement,
                fields,
                on_delete,
            }))
        }
        other => Err(DecodeError::InvalidField {
            location: location.to_string(),
            reason: format!(
                "expected a type name or an object with `type`, found {}",
                describe(&other)
            ),
        }),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::Sequence(_) => "a list",
        Value::Tagged(_) => "a tagged value",
        Value::String(_) | Value::Mapping(_) => "a field",
    }
}

/// `on_delete` of a field object, or of the inner field of a template.
fn on_delete_rule(spec: &FieldSpec) -> Option<&str> {
    match spec {
        FieldSpec::Name(_) => None,
        FieldSpec::Object(object) => object
            .on_delete
            .as_deref()
            .or_else(|| object.fields.as_deref().and_then(on_delete_rule)),
    }
}

fn decode_field(location: &str, spec: FieldSpec) -> Result<Field> {
    let FieldObject {
        type_name,
        to,
        replacement,
        fields,
        ..
    } = match spec {
        FieldSpec::Name(type_name) => return Ok(Field::Scalar(type_name)),
        FieldSpec::Object(object) => object,
    };

    match type_name.as_str() {
        RELATION => Ok(Field::Relation(single_target(location, &type_name, to)?)),
        RELATION_LIST => Ok(Field::RelationList(single_target(
            location, &type_name, to,
        )?)),
        GENERIC_RELATION => Ok(Field::GenericRelation(generic_targets(
            location, &type_name, to,
        )?)),
        GENERIC_RELATION_LIST => Ok(Field::GenericRelationList(generic_targets(
            location, &type_name, to,
        )?)),
        TEMPLATE => {
            let Some(inner) = fields else {
                return Err(missing(location, &type_name, "fields"));
            };
            let inner = decode_field(location, *inner)?;
            Ok(Field::Template {
                replacement: replacement.unwrap_or_default(),
                inner: Box::new(inner),
            })
        }
        // Unrecognized names stay scalars so the type validator reports them.
        _ => Ok(Field::Scalar(type_name)),
    }
}

fn single_target(location: &str, type_name: &str, to: Option<ToSpec>) -> Result<TargetReference> {
    match to {
        None => Err(missing(location, type_name, "to")),
        Some(ToSpec::Shorthand(value)) => split_shorthand(location, &value),
        Some(ToSpec::Collection { collection, field }) => Ok(target(collection, field)),
        Some(ToSpec::List(_)) | Some(ToSpec::Collections { .. }) => Err(
            DecodeError::InvalidTargetForm {
                location: location.to_string(),
                type_name: type_name.to_string(),
                reason: "expected `collection/field` or an object with `collection` and `field`"
                    .to_string(),
            },
        ),
    }
}

fn generic_targets(
    location: &str,
    type_name: &str,
    to: Option<ToSpec>,
) -> Result<Vec<TargetReference>> {
    let targets = match to {
        None => return Err(missing(location, type_name, "to")),
        Some(ToSpec::List(entries)) => entries
            .iter()
            .map(|entry| split_shorthand(location, entry))
            .collect::<Result<Vec<_>>>()?,
        Some(ToSpec::Collections { collections, field }) => collections
            .into_iter()
            .map(|collection| target(collection, field.clone()))
            .collect(),
        Some(ToSpec::Shorthand(_)) | Some(ToSpec::Collection { .. }) => {
            return Err(DecodeError::InvalidTargetForm {
                location: location.to_string(),
                type_name: type_name.to_string(),
                reason: "expected a list of `collection/field` or an object with `collections` and `field`"
                    .to_string(),
            });
        }
    };

    if targets.is_empty() {
        return Err(DecodeError::InvalidTargetForm {
            location: location.to_string(),
            type_name: type_name.to_string(),
            reason: "no target collections".to_string(),
        });
    }

    Ok(targets)
}

fn split_shorthand(location: &str, value: &str) -> Result<TargetReference> {
    let mut parts = value.split(KEY_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(collection), Some(field), None) => Ok(TargetReference::new(collection, field)),
        _ => Err(DecodeError::InvalidTarget {
            location: location.to_string(),
            value: value.to_string(),
        }),
    }
}

fn target(collection: String, field: ToFieldSpec) -> TargetReference {
    match field {
        ToFieldSpec::Name(name) => TargetReference::new(collection, name),
        ToFieldSpec::Typed { name, kind } => TargetReference::with_kind(
            collection,
            name,
            kind.unwrap_or_else(|| DEFAULT_FIELD_KIND.to_string()),
        ),
    }
}

fn missing(location: &str, type_name: &str, attribute: &'static str) -> DecodeError {
    DecodeError::MissingAttribute {
        location: location.to_string(),
        type_name: type_name.to_string(),
        attribute,
    }
}
