//! Schema Import Engine
//!
//! Rebuilds a field forest from a data schema and, optionally, a presentation
//! schema. Import is the approximate inverse of derivation: the derived
//! schema of an imported forest describes the same properties, kinds and
//! required keys as the input.
//!
//! # Kind inference
//!
//! | property | kind |
//! |---|---|
//! | non-empty `enum`, up to 3 options | radio |
//! | non-empty `enum`, more options | select |
//! | string, `format: email` / `date` / `data-url` | email / date / file |
//! | string, `maxLength > 100` | textarea |
//! | string | text |
//! | number, integer | number |
//! | boolean | checkbox |
//! | object | object container |
//! | array of objects | array container |
//! | other arrays | array |
//! | anything else | text |
//!
//! # Groups
//!
//! With a presentation schema, every top-level `Group` element becomes a
//! `group` container holding the properties its `Control` elements point at,
//! in element order. Properties no group references follow at the root in
//! declaration order. Nested groups are not reconstructed.

use crate::models::{
    into_fragment, template_for, FieldId, FieldIdAllocator, FieldKind, FieldNode, SchemaFragment,
};
use crate::utils::ScopePath;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::debug;

/// Enum option lists up to this size import as radio groups
const RADIO_MAX_OPTIONS: usize = 3;

/// Strings allowing more characters than this import as textareas
const TEXTAREA_MIN_LENGTH: u64 = 100;

/// Import a forest from a data schema and optional presentation schema
///
/// Ids come from `ids`, so imported nodes never collide with nodes the
/// allocator handed out before. A schema without a `properties` object
/// yields an empty forest.
pub fn import_schema(
    schema: &Value,
    uischema: Option<&Value>,
    ids: &mut FieldIdAllocator,
) -> Vec<FieldNode> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        debug!("Schema has no properties object; nothing to import");
        return Vec::new();
    };
    let required = required_keys(schema);

    let group_elements: Vec<&Map<String, Value>> = uischema
        .and_then(|ui| ui.get("elements"))
        .and_then(Value::as_array)
        .map(|elements| {
            elements
                .iter()
                .filter_map(Value::as_object)
                .filter(|element| {
                    element.get("type").and_then(Value::as_str) == Some("Group")
                        && element.get("elements").is_some_and(Value::is_array)
                })
                .collect()
        })
        .unwrap_or_default();

    let mut forest = Vec::new();
    let mut grouped = HashSet::new();
    for element in group_elements {
        let group = import_group(element, properties, &required, &mut grouped, ids);
        forest.push(group);
    }

    for (key, property) in properties {
        if !grouped.contains(key) {
            forest.push(import_property(key, property, required.contains(key.as_str()), None, ids));
        }
    }

    debug!("Imported {} root fields", forest.len());
    forest
}

/// Infer the field kind for a property schema
pub fn infer_kind(property: &Value) -> FieldKind {
    let enum_len = property
        .get("enum")
        .and_then(Value::as_array)
        .map_or(0, Vec::len);
    if enum_len > 0 {
        return if enum_len <= RADIO_MAX_OPTIONS {
            FieldKind::Radio
        } else {
            FieldKind::Select
        };
    }

    match property.get("type").and_then(Value::as_str) {
        Some("string") => match property.get("format").and_then(Value::as_str) {
            Some("email") => FieldKind::Email,
            Some("date") => FieldKind::Date,
            Some("data-url") => FieldKind::File,
            _ if property
                .get("maxLength")
                .and_then(Value::as_u64)
                .is_some_and(|max| max > TEXTAREA_MIN_LENGTH) =>
            {
                FieldKind::Textarea
            }
            _ => FieldKind::Text,
        },
        Some("number") | Some("integer") => FieldKind::Number,
        Some("boolean") => FieldKind::Checkbox,
        Some("object") => FieldKind::Object,
        Some("array") => FieldKind::Array,
        _ => FieldKind::Text,
    }
}

/// Display label for a key without a `title`: first letter upper-cased,
/// underscores as spaces
pub fn humanize_key(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars)
            .collect::<String>()
            .replace('_', " "),
        None => String::new(),
    }
}

fn required_keys(schema: &Value) -> HashSet<&str> {
    schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn import_group(
    element: &Map<String, Value>,
    properties: &Map<String, Value>,
    required: &HashSet<&str>,
    grouped: &mut HashSet<String>,
    ids: &mut FieldIdAllocator,
) -> FieldNode {
    let id = ids.next_id();
    let label = element
        .get("label")
        .and_then(Value::as_str)
        .unwrap_or("Group")
        .to_string();

    let key = format!("group_{}", id.get());
    let mut group = FieldNode::new(id, FieldKind::Group, label.clone(), key);
    group.ui_schema = into_fragment(json!({ "type": "Group", "label": label }));

    let controls = element
        .get("elements")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    for control in controls {
        if control.get("type").and_then(Value::as_str) != Some("Control") {
            continue;
        }
        let Some(scope) = control.get("scope").and_then(Value::as_str) else {
            continue;
        };
        let Ok(path) = ScopePath::parse(scope) else {
            continue;
        };
        let [segment] = path.segments() else {
            continue;
        };
        let Some(property) = properties.get(segment.as_str()) else {
            continue;
        };
        if !grouped.insert(segment.clone()) {
            continue;
        }

        let required = required.contains(segment.as_str());
        let child = import_property(segment, property, required, Some(id), ids);
        group.children.push(child);
    }

    group
}

fn import_level(schema: &Value, parent_id: FieldId, ids: &mut FieldIdAllocator) -> Vec<FieldNode> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    let required = required_keys(schema);
    properties
        .iter()
        .map(|(key, property)| {
            import_property(key, property, required.contains(key.as_str()), Some(parent_id), ids)
        })
        .collect()
}

fn import_property(
    key: &str,
    property: &Value,
    required: bool,
    parent_id: Option<FieldId>,
    ids: &mut FieldIdAllocator,
) -> FieldNode {
    let id = ids.next_id();
    let label = property
        .get("title")
        .and_then(Value::as_str)
        .filter(|title| !title.is_empty())
        .map(String::from)
        .unwrap_or_else(|| humanize_key(key));

    let kind = infer_kind(property);
    let template = template_for(kind);

    let mut node = FieldNode::new(id, kind, label, key);
    node.required = required;
    node.parent_id = parent_id;
    node.data_schema = overlay(&template.data_schema, property);
    node.ui_schema = template.ui_schema.clone();

    match kind {
        FieldKind::Object => {
            node.ui_schema
                .insert("label".to_string(), Value::String(node.label.clone()));
            node.children = import_level(property, id, ids);
        }
        FieldKind::Array => {
            node.ui_schema.insert(
                "scope".to_string(),
                Value::String(ScopePath::root().child(key).to_pointer()),
            );
            let item_schema = property
                .get("items")
                .filter(|items| items.get("type").and_then(Value::as_str) == Some("object"));
            if let Some(item_schema) = item_schema {
                node.children = import_level(item_schema, id, ids);
            }
        }
        _ => {
            node.ui_schema.insert(
                "scope".to_string(),
                Value::String(ScopePath::root().child(key).to_pointer()),
            );
        }
    }

    node
}

/// Template data schema with the property's own keys laid over it
fn overlay(template: &SchemaFragment, property: &Value) -> SchemaFragment {
    let mut schema = template.clone();
    if let Some(own) = property.as_object() {
        for (key, value) in own {
            schema.insert(key.clone(), value.clone());
        }
    }
    schema
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "schema_import_test.rs"]
mod schema_import_test;
