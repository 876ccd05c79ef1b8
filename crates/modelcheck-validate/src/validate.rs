use std::collections::BTreeMap;
use std::sync::OnceLock;

use modelcheck_core::{Field, KEY_SEPARATOR, Schema, TargetReference, is_scalar_type};
use regex::Regex;

use crate::errors::ErrorList;

pub const TYPE_VALIDATOR: &str = "type validator";
pub const RELATION_VALIDATOR: &str = "relation validator";
pub const TEMPLATE_PREFIXES_VALIDATOR: &str = "template prefixes validator";
pub const NAMES_VALIDATOR: &str = "names validator";
pub const ON_DELETE_VALIDATOR: &str = "on_delete validator";

/// Marker separating a template field's prefix from its replaceable suffix.
pub const TEMPLATE_MARKER: char = '$';

/// Values accepted for `on_delete`.
pub static ON_DELETE_RULES: &[&str] = &["CASCADE", "PROTECT"];

const COLLECTION_NAME_PATTERN: &str = r"^[a-z]([a-z_]+[a-z]+)?$";
const FIELD_NAME_PATTERN: &str = r"^[a-z][a-z0-9_]*\$?[a-z0-9_]*$";

/// Run every validator over `schema`.
///
/// Returns `Err` with one nested list per validator that found violations.
pub fn check(schema: &Schema) -> Result<(), ErrorList> {
    check_named(schema, "")
}

/// Like [`check`], with the report rooted under `name` (usually the document path).
pub fn check_named(schema: &Schema, name: &str) -> Result<(), ErrorList> {
    let mut report = ErrorList::new(name);
    report.push_list(check_types(schema));
    report.push_list(check_relations(schema));
    report.push_list(check_template_prefixes(schema));
    report.push_list(check_names(schema));
    report.push_list(check_on_delete(schema));

    tracing::debug!(
        event = "check_finished",
        collections = schema.len(),
        failed_validators = report.len()
    );

    report.into_result()
}

/// Every field declares a recognized scalar or relation type.
///
/// Template fields are judged by their inner field; a template nested in a
/// template is reported as such.
pub fn check_types(schema: &Schema) -> ErrorList {
    let mut errors = ErrorList::new(TYPE_VALIDATOR);

    for collection in schema.iter() {
        for (name, field) in &collection.fields {
            let location = format!("{}{KEY_SEPARATOR}{name}", collection.name);
            check_field_type(&location, field, &mut errors);
        }
    }

    log_finished(&errors);
    errors
}

fn check_field_type(location: &str, field: &Field, errors: &mut ErrorList) {
    match field {
        Field::Scalar(type_name) => {
            if !is_scalar_type(type_name) {
                errors.push(format!("Unknown type '{type_name}' in {location}"));
            }
        }
        Field::Template { inner, .. } => match inner.as_ref() {
            Field::Template { .. } => errors.push(format!("Nested template field in {location}")),
            inner => check_field_type(location, inner, errors),
        },
        // The variant itself proves the relation type name is known.
        Field::Relation(_)
        | Field::RelationList(_)
        | Field::GenericRelation(_)
        | Field::GenericRelationList(_) => {}
    }
}

/// Every relation target names an existing relation-family field.
///
/// Targets are checked independently, so one dangling target of a generic
/// relation does not hide problems with the others.
pub fn check_relations(schema: &Schema) -> ErrorList {
    let mut errors = ErrorList::new(RELATION_VALIDATOR);

    for collection in schema.iter() {
        for (name, field) in &collection.fields {
            let location = format!("{}{KEY_SEPARATOR}{name}", collection.name);
            for target in field.relation_targets() {
                if let Some(message) = check_target(schema, &location, target) {
                    errors.push(message);
                }
            }
        }
    }

    log_finished(&errors);
    errors
}

fn check_target(schema: &Schema, location: &str, target: &TargetReference) -> Option<String> {
    let Some(collection) = schema.collection(&target.collection) else {
        return Some(format!(
            "{location} directs to nonexisting model '{}'",
            target.collection
        ));
    };

    let Some(field) = collection.field(&target.field) else {
        return Some(format!(
            "{location} directs to nonexisting collectionfield '{target}'"
        ));
    };

    if field.is_relation_type() {
        None
    } else {
        Some(format!(
            "{location} directs to '{target}', but it is not a relation, but {}",
            field.type_name()
        ))
    }
}

/// No collection declares two template families with the same prefix.
///
/// Works on field names: any name containing `$` counts, whatever its type.
/// Each colliding prefix is reported once per collection.
pub fn check_template_prefixes(schema: &Schema) -> ErrorList {
    let mut errors = ErrorList::new(TEMPLATE_PREFIXES_VALIDATOR);

    for collection in schema.iter() {
        let mut seen: BTreeMap<&str, usize> = BTreeMap::new();
        for name in collection.fields.keys() {
            let Some((prefix, _)) = name.split_once(TEMPLATE_MARKER) else {
                continue;
            };
            let count = seen.entry(prefix).or_insert(0);
            *count += 1;
            if *count == 2 {
                errors.push(format!(
                    "Duplicate template prefix {prefix} in {}",
                    collection.name
                ));
            }
        }
    }

    log_finished(&errors);
    errors
}

/// Collection and field names are lower snake case; field names carry at
/// most one `$`, and template fields must carry it.
///
/// A field with an invalid name is not judged any further.
pub fn check_names(schema: &Schema) -> ErrorList {
    let mut errors = ErrorList::new(NAMES_VALIDATOR);

    for collection in schema.iter() {
        if !matches_pattern(collection_name_regex(), &collection.name) {
            errors.push(format!("Collection '{}' is not valid.", collection.name));
        }
        for (name, field) in &collection.fields {
            if !matches_pattern(field_name_regex(), name) {
                errors.push(format!(
                    "Field name '{name}' of collection {} is not a valid field name.",
                    collection.name
                ));
                continue;
            }
            if matches!(field, Field::Template { .. }) && !name.contains(TEMPLATE_MARKER) {
                errors.push(format!(
                    "The template field {}{KEY_SEPARATOR}{name} is missing a $",
                    collection.name
                ));
            }
        }
    }

    log_finished(&errors);
    errors
}

/// `on_delete` is only declared on relations (possibly inside a template)
/// and only with one of [`ON_DELETE_RULES`].
pub fn check_on_delete(schema: &Schema) -> ErrorList {
    let mut errors = ErrorList::new(ON_DELETE_VALIDATOR);

    for collection in schema.iter() {
        for (name, rule) in &collection.on_delete {
            let location = format!("{}{KEY_SEPARATOR}{name}", collection.name);
            let is_relation = collection.field(name).and_then(Field::relation).is_some();
            if !is_relation {
                errors.push(format!(
                    "Attribute 'on_delete' for collectionfield {location} is invalid."
                ));
            } else if !ON_DELETE_RULES.contains(&rule.as_str()) {
                errors.push(format!("invalid value for 'on_delete' for {location}"));
            }
        }
    }

    log_finished(&errors);
    errors
}

fn collection_name_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(COLLECTION_NAME_PATTERN).ok()).as_ref()
}

fn field_name_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(FIELD_NAME_PATTERN).ok()).as_ref()
}

fn matches_pattern(regex: Option<&Regex>, name: &str) -> bool {
    regex.is_some_and(|regex| regex.is_match(name))
}

fn log_finished(errors: &ErrorList) {
    tracing::debug!(
        event = "validator_finished",
        validator = errors.name(),
        violations = errors.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelcheck_core::decode_str;

    fn schema(input: &str) -> Schema {
        decode_str(input).expect("decode models")
    }

    fn messages(list: &ErrorList) -> Vec<String> {
        list.messages().map(str::to_string).collect()
    }

    #[test]
    fn unknown_scalar_type_is_reported() {
        let schema = schema("motion:\n  title: string\n  weird: unknown\n");
        assert_eq!(
            messages(&check_types(&schema)),
            vec!["Unknown type 'unknown' in motion/weird"]
        );
    }

    #[test]
    fn unknown_object_type_is_reported() {
        let schema = schema("motion:\n  weird:\n    type: unknown\n    to: a/b\n");
        assert_eq!(
            messages(&check_types(&schema)),
            vec!["Unknown type 'unknown' in motion/weird"]
        );
    }

    #[test]
    fn list_suffix_scalars_are_known() {
        let schema = schema("motion:\n  tags: string[]\n  ids: number[]\n  bad: color[]\n");
        assert_eq!(
            messages(&check_types(&schema)),
            vec!["Unknown type 'color[]' in motion/bad"]
        );
    }

    #[test]
    fn template_inner_types_are_checked() {
        let input = r#"
motion:
  good_$:
    type: template
    fields: HTMLStrict
  bad_$:
    type: template
    fields: text
  nested_$:
    type: template
    fields:
      type: template
      fields: string
"#;
        let errors = check_types(&schema(input));
        let mut found = messages(&errors);
        found.sort();
        assert_eq!(
            found,
            vec![
                "Nested template field in motion/nested_$",
                "Unknown type 'text' in motion/bad_$",
            ]
        );
    }

    #[test]
    fn dangling_collection_stops_at_the_model() {
        let schema = schema("motion:\n  ref:\n    type: relation\n    to: not_existing/field\n");
        assert_eq!(
            messages(&check_relations(&schema)),
            vec!["motion/ref directs to nonexisting model 'not_existing'"]
        );
    }

    #[test]
    fn dangling_field_is_reported() {
        let schema = schema("motion:\n  ref:\n    type: relation\n    to: motion/missing\n");
        assert_eq!(
            messages(&check_relations(&schema)),
            vec!["motion/ref directs to nonexisting collectionfield 'motion/missing'"]
        );
    }

    #[test]
    fn target_must_be_a_relation() {
        let input = r#"
motion:
  text: HTMLStrict
  ref:
    type: relation-list
    to: motion/text
"#;
        assert_eq!(
            messages(&check_relations(&schema(input))),
            vec!["motion/ref directs to 'motion/text', but it is not a relation, but HTMLStrict"]
        );
    }

    #[test]
    fn generic_targets_are_checked_independently() {
        let input = r#"
motion:
  agenda_item_id:
    type: relation
    to: agenda_item/content_object_id
topic:
  agenda_item_id:
    type: relation
    to: agenda_item/content_object_id
agenda_item:
  content_object_id:
    type: generic-relation
    to:
      - motion/agenda_item_id
      - assignment/agenda_item_id
      - topic/agenda_item_id
"#;
        assert_eq!(
            messages(&check_relations(&schema(input))),
            vec!["agenda_item/content_object_id directs to nonexisting model 'assignment'"]
        );
    }

    #[test]
    fn every_dangling_target_is_reported() {
        let input = r#"
tag:
  tagged_ids:
    type: generic-relation-list
    to:
      collections: [motion, topic]
      field: tag_ids
"#;
        assert_eq!(check_relations(&schema(input)).len(), 2);
    }

    #[test]
    fn template_relations_are_resolved() {
        let input = r#"
user:
  group_$_ids:
    type: template
    fields:
      type: relation-list
      to: group/missing_ids
group:
  user_ids:
    type: relation-list
    to: user/group_$_ids
"#;
        assert_eq!(
            messages(&check_relations(&schema(input))),
            vec!["user/group_$_ids directs to nonexisting collectionfield 'group/missing_ids'"]
        );
    }

    #[test]
    fn template_generic_relations_are_resolved() {
        let input = r#"
user:
  tagged_$_ids:
    type: template
    replacement: meeting
    fields:
      type: generic-relation-list
      to:
        collections: [motion, topic]
        field: tag_ids
motion:
  tag_ids:
    type: relation-list
    to: user/tagged_$_ids
"#;
        assert_eq!(
            messages(&check_relations(&schema(input))),
            vec!["user/tagged_$_ids directs to nonexisting model 'topic'"]
        );
    }

    #[test]
    fn duplicate_prefix_is_reported_once() {
        let input = r#"
motion:
  field_$_1: string
  field_$_2: string
  field_$_3: string
  other_$: number
topic:
  field_$_1: string
"#;
        assert_eq!(
            messages(&check_template_prefixes(&schema(input))),
            vec!["Duplicate template prefix field_ in motion"]
        );
    }

    #[test]
    fn fields_without_marker_are_ignored() {
        let schema = schema("motion:\n  field: string\n  field_id: number\n");
        assert!(check_template_prefixes(&schema).is_empty());
    }

    #[test]
    fn invalid_names_are_reported() {
        let input = r#"
Motion:
  title: string
motion_:
  title: string
topic:
  Title: string
  two_$_$: string
  item_2: number
  s: string
"#;
        let mut found = messages(&check_names(&schema(input)));
        found.sort();
        assert_eq!(
            found,
            vec![
                "Collection 'Motion' is not valid.",
                "Collection 'motion_' is not valid.",
                "Field name 'Title' of collection topic is not a valid field name.",
                "Field name 'two_$_$' of collection topic is not a valid field name.",
            ]
        );
    }

    #[test]
    fn template_field_needs_the_marker() {
        let input = r#"
motion:
  comment:
    type: template
    fields: HTMLStrict
  comment_$:
    type: template
    fields: HTMLStrict
  plain_$: string
"#;
        assert_eq!(
            messages(&check_names(&schema(input))),
            vec!["The template field motion/comment is missing a $"]
        );
    }

    #[test]
    fn on_delete_is_limited_to_relations_and_known_rules() {
        let input = r#"
motion:
  title:
    type: string
    on_delete: CASCADE
  block_id:
    type: relation
    to: motion_block/motion_ids
    on_delete: PROTECT
  category_id:
    type: relation
    to: motion_category/motion_ids
    on_delete: SET_NULL
  poll_$_ids:
    type: template
    fields:
      type: relation-list
      to: poll/motion_ids
      on_delete: cascade
"#;
        let mut found = messages(&check_on_delete(&schema(input)));
        found.sort();
        assert_eq!(
            found,
            vec![
                "Attribute 'on_delete' for collectionfield motion/title is invalid.",
                "invalid value for 'on_delete' for motion/category_id",
                "invalid value for 'on_delete' for motion/poll_$_ids",
            ]
        );
    }

    #[test]
    fn clean_schema_passes() {
        let input = r#"
motion:
  title: string
  tag_ids:
    type: relation-list
    to: tag/motion_ids
    on_delete: PROTECT
tag:
  motion_ids:
    type: relation-list
    to: motion/tag_ids
"#;
        assert_eq!(check(&schema(input)), Ok(()));
    }

    #[test]
    fn check_groups_violations_by_validator() {
        let input = r#"
motion:
  weird: unknown
  ref:
    type: relation
    to: nowhere/field
  a_$_1: string
  a_$_2: string
"#;
        let report = check(&schema(input)).expect_err("violations expected");
        assert_eq!(
            report.lists().map(ErrorList::name).collect::<Vec<_>>(),
            vec![
                TYPE_VALIDATOR,
                RELATION_VALIDATOR,
                TEMPLATE_PREFIXES_VALIDATOR
            ]
        );
        assert_eq!(report.all_messages().len(), 3);
    }

    #[test]
    fn supplementary_validators_follow_the_core_ones() {
        let input = r#"
motion:
  weird: unknown
  comment:
    type: template
    fields: string
  block_id:
    type: relation
    to: motion/block_id
    on_delete: SET_NULL
"#;
        let report = check(&schema(input)).expect_err("violations expected");
        assert_eq!(
            report.lists().map(ErrorList::name).collect::<Vec<_>>(),
            vec![TYPE_VALIDATOR, NAMES_VALIDATOR, ON_DELETE_VALIDATOR]
        );
    }
}
