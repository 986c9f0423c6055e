//! Schema Derivation Engine
//!
//! Derives the three artifacts a form renderer needs from a field forest:
//!
//! - **Data schema**: JSON Schema object, one `properties` level per object
//!   container (arrays with children describe their items)
//! - **Presentation schema**: JSON Forms style element tree
//!   (`VerticalLayout` root, `Group`/layout/`Control` elements)
//! - **Default data**: a skeleton that fills absent keys only
//!
//! Derivation is pure and never fails: unknown or malformed fragments fall
//! back to the plain text rules.
//!
//! # Scopes
//!
//! Controls address their property with a `#/properties/...` pointer.
//! Object containers prefix their children's scopes with their own key.
//! Vertical/horizontal/group layouts do not add a segment. Array item
//! details are scoped relative to the item, so the scope context restarts
//! at every array.

use crate::models::{is_truthy, template_for, FieldKind, FieldNode, SchemaFragment};
use crate::utils::ScopePath;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Array constraints carried from the node's own data schema onto a derived
/// array-of-objects schema
const ARRAY_CONSTRAINTS: [&str; 3] = ["minItems", "maxItems", "uniqueItems"];

/// Derived data and presentation schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchemas {
    pub schema: Value,
    pub uischema: Value,
}

/// Everything a renderer needs: both schemas plus the form data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub schema: Value,
    pub uischema: Value,
    pub data: Value,
}

/// Properties and required keys of one schema level
#[derive(Debug, Default)]
struct SchemaLevel {
    properties: Map<String, Value>,
    required: Vec<Value>,
}

impl SchemaLevel {
    fn add(&mut self, node: &FieldNode, schema: Map<String, Value>) {
        self.properties.insert(node.key.clone(), Value::Object(schema));
        if node.required {
            self.required.push(Value::String(node.key.clone()));
        }
    }

    /// `{type: object, title?, properties, required?}`
    fn into_object_schema(self, title: Option<&str>) -> Map<String, Value> {
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        if let Some(title) = title {
            schema.insert("title".to_string(), json!(title));
        }
        schema.insert("properties".to_string(), Value::Object(self.properties));
        if !self.required.is_empty() {
            schema.insert("required".to_string(), Value::Array(self.required));
        }
        schema
    }
}

/// Derive the data and presentation schemas for a forest
pub fn derive_schema(forest: &[FieldNode]) -> FormSchemas {
    FormSchemas {
        schema: derive_data_schema(forest),
        uischema: derive_ui_schema(forest),
    }
}

/// Derive both schemas and seed `data` with defaults for absent keys
pub fn derive_form_state(forest: &[FieldNode], data: &Value) -> FormState {
    let FormSchemas { schema, uischema } = derive_schema(forest);
    FormState {
        schema,
        uischema,
        data: seed_default_data(forest, data),
    }
}

/// Root data schema: `{type: object, properties, required?}`
pub fn derive_data_schema(forest: &[FieldNode]) -> Value {
    let mut root = SchemaLevel::default();
    collect_level(forest, &mut root);
    Value::Object(root.into_object_schema(None))
}

fn collect_level(nodes: &[FieldNode], level: &mut SchemaLevel) {
    for node in nodes {
        match node.kind {
            FieldKind::VerticalLayout | FieldKind::HorizontalLayout | FieldKind::Group => {
                collect_level(&node.children, level);
            }
            FieldKind::Object => {
                let mut inner = SchemaLevel::default();
                collect_level(&node.children, &mut inner);
                level.add(node, inner.into_object_schema(Some(&node.label)));
            }
            FieldKind::Array if !node.children.is_empty() => {
                let mut items = SchemaLevel::default();
                collect_level(&node.children, &mut items);

                let mut schema = Map::new();
                schema.insert("type".to_string(), json!("array"));
                schema.insert("title".to_string(), json!(node.label));
                schema.insert(
                    "items".to_string(),
                    Value::Object(items.into_object_schema(None)),
                );
                for constraint in ARRAY_CONSTRAINTS {
                    if let Some(value) = node.data_schema.get(constraint).filter(|v| is_truthy(v)) {
                        schema.insert(constraint.to_string(), value.clone());
                    }
                }
                level.add(node, schema);
            }
            FieldKind::Array
            | FieldKind::Text
            | FieldKind::Textarea
            | FieldKind::Number
            | FieldKind::Email
            | FieldKind::Date
            | FieldKind::Checkbox
            | FieldKind::Select
            | FieldKind::Radio
            | FieldKind::File => {
                level.add(node, titled(&node.data_schema, &node.label));
            }
        }
    }
}

fn titled(fragment: &SchemaFragment, label: &str) -> Map<String, Value> {
    let mut schema = fragment.clone();
    schema.insert("title".to_string(), json!(label));
    schema
}

/// Root presentation schema: `{type: VerticalLayout, elements}`
pub fn derive_ui_schema(forest: &[FieldNode]) -> Value {
    json!({
        "type": "VerticalLayout",
        "elements": ui_elements(forest, &ScopePath::root()),
    })
}

fn ui_elements(nodes: &[FieldNode], scope: &ScopePath) -> Vec<Value> {
    nodes
        .iter()
        .filter(|node| !node.is_hidden())
        .map(|node| ui_element(node, scope))
        .collect()
}

fn ui_element(node: &FieldNode, scope: &ScopePath) -> Value {
    match node.kind {
        FieldKind::Object => json!({
            "type": "Group",
            "label": node.label,
            "elements": ui_elements(&node.children, &scope.child(&node.key)),
        }),
        FieldKind::VerticalLayout | FieldKind::HorizontalLayout | FieldKind::Group => {
            layout_element(node, scope)
        }
        FieldKind::Array => array_element(node, scope),
        FieldKind::Text
        | FieldKind::Textarea
        | FieldKind::Number
        | FieldKind::Email
        | FieldKind::Date
        | FieldKind::Checkbox
        | FieldKind::Select
        | FieldKind::Radio
        | FieldKind::File => {
            let mut element = node.ui_schema.clone();
            element.insert("scope".to_string(), json!(scope.child(&node.key).to_pointer()));
            element.insert("label".to_string(), json!(node.label));
            Value::Object(element)
        }
    }
}

fn layout_element(node: &FieldNode, scope: &ScopePath) -> Value {
    let mut element = Map::new();
    if let Some(icon) = &node.icon {
        element.insert("icon".to_string(), json!(format!("Icon{}", icon)));
    }

    let layout_type = node
        .ui_schema
        .get("type")
        .or_else(|| template_for(node.kind).ui_schema.get("type"))
        .cloned()
        .unwrap_or_else(|| json!("VerticalLayout"));
    element.insert("type".to_string(), layout_type);
    element.insert("label".to_string(), json!(node.label));
    element.insert(
        "elements".to_string(),
        Value::Array(ui_elements(&node.children, scope)),
    );
    if let Some(options) = node.ui_schema.get("options") {
        element.insert("options".to_string(), options.clone());
    }
    Value::Object(element)
}

fn array_element(node: &FieldNode, scope: &ScopePath) -> Value {
    let mut element = node.ui_schema.clone();
    element.insert("type".to_string(), json!("Control"));
    element.insert("scope".to_string(), json!(scope.child(&node.key).to_pointer()));
    element.insert("label".to_string(), json!(node.label));

    let mut options = match node.ui_schema.get("options") {
        Some(Value::Object(options)) => options.clone(),
        _ => Map::new(),
    };
    options.insert("showSortButtons".to_string(), json!(true));

    // Item details are scoped relative to the item
    let detail = ui_elements(&node.children, &ScopePath::root());
    if !detail.is_empty() {
        options.insert(
            "detail".to_string(),
            json!({ "type": "VerticalLayout", "elements": detail }),
        );
    }
    element.insert("options".to_string(), Value::Object(options));
    Value::Object(element)
}

/// Fill absent keys of `existing` with defaults; present values are kept
///
/// A non-object `existing` is treated as `{}`.
pub fn seed_default_data(forest: &[FieldNode], existing: &Value) -> Value {
    let mut data = match existing {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    seed_level(forest, &mut data);
    Value::Object(data)
}

fn seed_level(nodes: &[FieldNode], data: &mut Map<String, Value>) {
    for node in nodes {
        match node.kind {
            FieldKind::VerticalLayout | FieldKind::HorizontalLayout | FieldKind::Group => {
                seed_level(&node.children, data);
            }
            FieldKind::Object => {
                let entry = data
                    .entry(node.key.clone())
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(inner) = entry {
                    seed_level(&node.children, inner);
                }
            }
            FieldKind::Array if !node.children.is_empty() => {
                let needs_sample = match data.get(&node.key) {
                    None => true,
                    Some(Value::Array(items)) => items.is_empty(),
                    Some(_) => false,
                };
                if needs_sample {
                    data.insert(node.key.clone(), json!([sample_item(&node.children)]));
                }
            }
            FieldKind::Array
            | FieldKind::Text
            | FieldKind::Textarea
            | FieldKind::Number
            | FieldKind::Email
            | FieldKind::Date
            | FieldKind::Checkbox
            | FieldKind::Select
            | FieldKind::Radio
            | FieldKind::File => {
                if !data.contains_key(&node.key) {
                    data.insert(node.key.clone(), leaf_default(node));
                }
            }
        }
    }
}

fn sample_item(children: &[FieldNode]) -> Value {
    let mut item = Map::new();
    seed_level(children, &mut item);
    Value::Object(item)
}

fn leaf_default(node: &FieldNode) -> Value {
    match node.schema_type() {
        Some("boolean") => json!(false),
        Some("number") | Some("integer") => json!(0),
        Some("array") => json!([]),
        _ => json!(""),
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "schema_builder_test.rs"]
mod schema_builder_test;
