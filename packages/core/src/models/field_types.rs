//! Field Type Registry
//!
//! This module contains the canonical catalog of field-type templates. Every
//! node in a field tree is created from one of these templates, either by the
//! tree mutation engine (palette inserts) or by the schema import engine.
//!
//! ## Templates
//!
//! - **Layouts** - vertical-layout, horizontal-layout, group
//! - **Leaf fields** - text, textarea, number, email, date, checkbox, select,
//!   radio, file
//! - **Structured containers** - object, array
//!
//! The catalog is built once per process and is immutable afterwards.
//! Templates are never aliased into the tree: `instantiate` deep-copies the
//! schema fragments into the new node.
//!
//! ## Usage
//!
//! ```rust
//! use formsmith_core::models::{instantiate, template_for, FieldId, FieldKind};
//!
//! let node = instantiate(template_for(FieldKind::Email), FieldId::new(3));
//! assert_eq!(node.key, "email_3");
//! assert_eq!(node.label, "Email Field");
//! ```

use crate::models::{FieldId, FieldKind, FieldNode, SchemaFragment};
use crate::services::FormTreeError;
use crate::utils::ScopePath;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::OnceLock;

/// Default option list seeded into new select/radio fields
const DEFAULT_ENUM_OPTIONS: [&str; 3] = ["Option 1", "Option 2", "Option 3"];

/// A field-type template from the registry
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeTemplate {
    pub kind: FieldKind,

    /// Default label (palette title)
    pub label: &'static str,

    /// Palette icon name
    pub icon: &'static str,

    pub data_schema: SchemaFragment,

    pub ui_schema: SchemaFragment,

    pub is_container: bool,
}

static TEMPLATES: OnceLock<Vec<FieldTypeTemplate>> = OnceLock::new();

/// The full ordered catalog
pub fn templates() -> &'static [FieldTypeTemplate] {
    TEMPLATES.get_or_init(|| FieldKind::ALL.iter().map(|kind| build_template(*kind)).collect())
}

/// Template for a typed kind
///
/// The catalog holds one template per kind in `FieldKind::ALL` order, so this
/// lookup is total.
pub fn template_for(kind: FieldKind) -> &'static FieldTypeTemplate {
    &templates()[kind as usize]
}

/// Template lookup by textual kind id (e.g. a palette drag payload)
///
/// # Errors
///
/// `FormTreeError::NotFound` when no template carries that id.
pub fn find_template(kind_id: &str) -> Result<&'static FieldTypeTemplate, FormTreeError> {
    kind_id
        .parse::<FieldKind>()
        .map(template_for)
        .map_err(|_| FormTreeError::not_found(format!("field type '{}'", kind_id)))
}

/// Templates offered by the field-kind picker (everything except pure layouts and objects)
pub fn palette_templates() -> impl Iterator<Item = &'static FieldTypeTemplate> {
    templates()
        .iter()
        .filter(|template| !template.kind.is_layout() && template.kind != FieldKind::Object)
}

/// Create a freshly identified node from a template
///
/// Containers keep the template label and get a `layout_<n>` key (arrays are
/// the exception and are keyed like leaf fields); leaves get `"<label> Field"`
/// and a `<kind>_<n>` key.
pub fn instantiate(template: &FieldTypeTemplate, id: FieldId) -> FieldNode {
    let keyed_as_layout = template.is_container && template.kind != FieldKind::Array;
    let (label, key) = if keyed_as_layout {
        (template.label.to_string(), format!("layout_{}", id.get()))
    } else {
        (
            format!("{} Field", template.label),
            format!("{}_{}", template.kind.as_str(), id.get()),
        )
    };

    let mut node = FieldNode::new(id, template.kind, label, key);
    node.data_schema = template.data_schema.clone();
    node.ui_schema = template.ui_schema.clone();
    if node.ui_schema.contains_key("scope") {
        let scope = ScopePath::root().child(&node.key).to_pointer();
        node.ui_schema.insert("scope".to_string(), Value::String(scope));
    }
    node
}

fn build_template(kind: FieldKind) -> FieldTypeTemplate {
    let control = json!({ "type": "Control", "scope": "#/properties/field" });

    let (label, icon, data_schema, ui_schema) = match kind {
        FieldKind::VerticalLayout => (
            "Vertical Layout",
            "LayoutRows",
            json!({}),
            json!({ "type": "VerticalLayout", "elements": [] }),
        ),
        FieldKind::HorizontalLayout => (
            "Horizontal Layout",
            "LayoutColumns",
            json!({}),
            json!({ "type": "HorizontalLayout", "elements": [] }),
        ),
        FieldKind::Group => (
            "Group",
            "Box",
            json!({}),
            json!({ "type": "Group", "label": "Group Section", "elements": [] }),
        ),
        FieldKind::Text => ("Text Input", "Edit", json!({ "type": "string" }), control),
        FieldKind::Textarea => (
            "Textarea",
            "FileText",
            json!({ "type": "string" }),
            json!({
                "type": "Control",
                "scope": "#/properties/field",
                "options": { "multi": true }
            }),
        ),
        FieldKind::Number => ("Number", "Hash", json!({ "type": "number" }), control),
        FieldKind::Email => (
            "Email",
            "Mail",
            json!({ "type": "string", "format": "email" }),
            control,
        ),
        FieldKind::Date => (
            "Date",
            "Calendar",
            json!({ "type": "string", "format": "date" }),
            control,
        ),
        FieldKind::Checkbox => ("Checkbox", "SquareCheck", json!({ "type": "boolean" }), control),
        FieldKind::Select => (
            "Select",
            "ChevronDown",
            json!({ "type": "string", "enum": DEFAULT_ENUM_OPTIONS }),
            control,
        ),
        FieldKind::Radio => (
            "Radio Group",
            "CircleDot",
            json!({ "type": "string", "enum": DEFAULT_ENUM_OPTIONS }),
            json!({
                "type": "Control",
                "scope": "#/properties/field",
                "options": { "format": "radio" }
            }),
        ),
        FieldKind::Object => (
            "Object",
            "Cube",
            json!({ "type": "object", "properties": {} }),
            json!({ "type": "Group", "label": "Object", "elements": [] }),
        ),
        FieldKind::Array => (
            "Array",
            "List",
            json!({ "type": "array", "items": { "type": "string" } }),
            json!({
                "type": "Control",
                "scope": "#/properties/field",
                "options": {
                    "detail": { "type": "VerticalLayout", "elements": [] }
                }
            }),
        ),
        FieldKind::File => (
            "File Upload",
            "FileText",
            json!({ "type": "string", "format": "data-url", "title": "Upload File" }),
            json!({
                "type": "Control",
                "scope": "#/properties/field",
                "options": {
                    "ui:widget": "file",
                    "ui:options": { "accept": "" }
                }
            }),
        ),
    };

    FieldTypeTemplate {
        kind,
        label,
        icon,
        data_schema: into_fragment(data_schema),
        ui_schema: into_fragment(ui_schema),
        is_container: kind.is_container(),
    }
}

/// Unwrap a JSON object literal into a fragment
pub(crate) fn into_fragment(value: Value) -> SchemaFragment {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
