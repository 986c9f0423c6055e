//! Field Node Data Structures
//!
//! This module defines the `FieldNode` struct and the identity and kind types
//! every other part of the engine is built on.
//!
//! # Architecture
//!
//! - **Single node shape**: leaf fields, layout containers and object/array
//!   containers share one struct, selected by the closed `FieldKind` tag
//! - **Exclusive ownership**: a container owns its `children`; `parent_id` is a
//!   lookup key only and never an ownership edge
//! - **Schema fragments**: `data_schema` and `ui_schema` hold the node's own
//!   JSON Schema / UI schema fragments, merged by the derivation engine
//!
//! # Examples
//!
//! ```rust
//! use formsmith_core::models::{FieldId, FieldKind, FieldNode};
//!
//! let node = FieldNode::new(FieldId::new(1), FieldKind::Text, "Name", "name");
//! assert!(node.is_leaf());
//! assert_eq!(node.id.to_string(), "field_1");
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A JSON object fragment (data schema or UI schema)
pub type SchemaFragment = Map<String, Value>;

/// Validation errors for field nodes and forests
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing key on {0}")]
    MissingKey(FieldId),

    #[error("Leaf field {id} of kind '{kind}' cannot own children")]
    LeafWithChildren { id: FieldId, kind: FieldKind },

    #[error("Duplicate field id: {0}")]
    DuplicateId(FieldId),

    #[error("Field {id} points at parent {found:?}, expected {expected:?}")]
    ParentMismatch {
        id: FieldId,
        expected: Option<FieldId>,
        found: Option<FieldId>,
    },

    #[error("Invalid field kind: {0}")]
    InvalidFieldKind(String),

    #[error("Field id {0} is outside the allocatable range")]
    IdOutOfRange(FieldId),

    #[error("Key '{key}' used twice at one schema level (second use by {id})")]
    DuplicateKey { key: String, id: FieldId },
}

/// Process-unique identity of a field node
///
/// Ids come from a [`FieldIdAllocator`] and are never reused, even after the
/// node they named has been deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldId(u64);

impl FieldId {
    /// Largest id a restored forest may carry (exact as a JSON double)
    pub const MAX_ALLOCATABLE: FieldId = FieldId((1 << 53) - 1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "field_{}", self.0)
    }
}

/// Monotonic id counter
///
/// Owned by whatever holds the forest (normally `FieldTree`), so tests get
/// deterministic, isolated id sequences.
#[derive(Debug, Clone)]
pub struct FieldIdAllocator {
    next: u64,
}

impl Default for FieldIdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl FieldIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the sequence at `first` (clamped to 1)
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: first.max(1),
        }
    }

    /// Allocate the next id
    pub fn next_id(&mut self) -> FieldId {
        let id = FieldId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to `next_id` will return
    pub fn peek(&self) -> FieldId {
        FieldId(self.next)
    }

    /// Make sure `id` can never be handed out again
    ///
    /// Used when adopting a forest that was built elsewhere (restored exports).
    /// Forests carrying ids past `FieldId::MAX_ALLOCATABLE` are rejected by
    /// validation before they get here.
    pub fn reserve_past(&mut self, id: FieldId) {
        if let Some(next) = id.0.checked_add(1) {
            self.next = self.next.max(next);
        }
    }
}

/// Closed set of field kinds
///
/// Every kind has exactly one template in the field type registry. Recursive
/// consumers match on this enum exhaustively, so adding a kind forces an audit
/// of the derivation and import engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldKind {
    VerticalLayout,
    HorizontalLayout,
    Group,
    Text,
    Textarea,
    Number,
    Email,
    Date,
    Checkbox,
    Select,
    Radio,
    Object,
    Array,
    File,
}

impl FieldKind {
    /// All kinds in palette order
    pub const ALL: [FieldKind; 14] = [
        FieldKind::VerticalLayout,
        FieldKind::HorizontalLayout,
        FieldKind::Group,
        FieldKind::Text,
        FieldKind::Textarea,
        FieldKind::Number,
        FieldKind::Email,
        FieldKind::Date,
        FieldKind::Checkbox,
        FieldKind::Select,
        FieldKind::Radio,
        FieldKind::Object,
        FieldKind::Array,
        FieldKind::File,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::VerticalLayout => "vertical-layout",
            FieldKind::HorizontalLayout => "horizontal-layout",
            FieldKind::Group => "group",
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Email => "email",
            FieldKind::Date => "date",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Object => "object",
            FieldKind::Array => "array",
            FieldKind::File => "file",
        }
    }

    /// Kinds that own an ordered child list
    pub fn is_container(self) -> bool {
        matches!(
            self,
            FieldKind::VerticalLayout
                | FieldKind::HorizontalLayout
                | FieldKind::Group
                | FieldKind::Object
                | FieldKind::Array
        )
    }

    /// Pure layout kinds: no key level of their own, children flatten upward
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            FieldKind::VerticalLayout | FieldKind::HorizontalLayout | FieldKind::Group
        )
    }

    /// Kinds presented as a `Group` element
    pub fn is_group(self) -> bool {
        matches!(self, FieldKind::Group | FieldKind::Object)
    }

    /// Kinds whose data schema carries an `enum` option list
    pub fn has_enum_options(self) -> bool {
        matches!(self, FieldKind::Select | FieldKind::Radio)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidFieldKind(s.to_string()))
    }
}

/// One element of the field tree
///
/// # Fields
///
/// - `id`: process-unique identity
/// - `kind`: registry template this node was created from
/// - `label`: display title, emitted as the schema `title`
/// - `key`: property name inside the enclosing schema level
/// - `required`: whether `key` joins the enclosing level's `required` list
/// - `data_schema` / `ui_schema`: the node's own schema fragments
/// - `icon`: optional icon tag rendered on layout groups
/// - `children`: ordered children (containers only)
/// - `parent_id`: lookup key of the containing node, `None` for roots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub id: FieldId,

    pub kind: FieldKind,

    pub label: String,

    pub key: String,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub data_schema: SchemaFragment,

    #[serde(default)]
    pub ui_schema: SchemaFragment,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Ordered children; insertion order is the property/rendering order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,

    #[serde(default)]
    pub parent_id: Option<FieldId>,
}

impl FieldNode {
    /// Create a bare node with empty schema fragments
    ///
    /// Most callers go through the registry (`instantiate`) or the import
    /// engine instead; this constructor exists for tests and restores.
    pub fn new(
        id: FieldId,
        kind: FieldKind,
        label: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            id,
            kind,
            label: label.into(),
            key: key.into(),
            required: false,
            data_schema: Map::new(),
            ui_schema: Map::new(),
            icon: None,
            children: Vec::new(),
            parent_id: None,
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind.is_container()
    }

    /// Vertical/horizontal layouts and plain groups
    pub fn is_layout_container(&self) -> bool {
        self.kind.is_layout()
    }

    pub fn is_object_container(&self) -> bool {
        self.kind == FieldKind::Object
    }

    pub fn is_array_container(&self) -> bool {
        self.kind == FieldKind::Array
    }

    /// Containers presented as a `Group` element (plain groups and objects)
    pub fn is_group_container(&self) -> bool {
        self.kind.is_group()
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_container()
    }

    /// Object and array containers open their own property namespace
    pub fn opens_schema_level(&self) -> bool {
        self.is_object_container() || self.is_array_container()
    }

    pub fn has_enum_options(&self) -> bool {
        self.kind.has_enum_options()
    }

    /// Look up a presentation option (`ui_schema.options.<name>`)
    pub fn ui_option(&self, name: &str) -> Option<&Value> {
        self.ui_schema
            .get("options")
            .and_then(Value::as_object)
            .and_then(|options| options.get(name))
    }

    /// Hidden nodes are left out of the presentation tree
    pub fn is_hidden(&self) -> bool {
        self.ui_option("hidden").is_some_and(is_truthy)
    }

    /// Declared JSON Schema `type` of this node's data schema
    pub fn schema_type(&self) -> Option<&str> {
        self.data_schema.get("type").and_then(Value::as_str)
    }

    /// Enum option list, when the data schema carries one
    pub fn enum_options(&self) -> Option<&Vec<Value>> {
        self.data_schema.get("enum").and_then(Value::as_array)
    }

    /// Depth-first lookup inside this subtree (including `self`)
    pub fn find(&self, id: FieldId) -> Option<&FieldNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    pub fn find_mut(&mut self, id: FieldId) -> Option<&mut FieldNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter_mut().find_map(|child| child.find_mut(id))
    }

    /// Whether `id` names this node or one of its descendants
    pub fn contains(&self, id: FieldId) -> bool {
        self.find(id).is_some()
    }

    /// Visit every node of the subtree in depth-first pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a FieldNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Point every direct child's `parent_id` at this node
    pub fn adopt_children(&mut self) {
        let id = self.id;
        for child in &mut self.children {
            child.parent_id = Some(id);
        }
    }

    /// Validate the structure of this subtree
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if:
    /// - an id is past `FieldId::MAX_ALLOCATABLE`
    /// - `key` is empty
    /// - a leaf owns children
    /// - a child does not point back at its parent
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id > FieldId::MAX_ALLOCATABLE {
            return Err(ValidationError::IdOutOfRange(self.id));
        }

        if self.key.trim().is_empty() {
            return Err(ValidationError::MissingKey(self.id));
        }

        if self.is_leaf() && !self.children.is_empty() {
            return Err(ValidationError::LeafWithChildren {
                id: self.id,
                kind: self.kind,
            });
        }

        for child in &self.children {
            if child.parent_id != Some(self.id) {
                return Err(ValidationError::ParentMismatch {
                    id: child.id,
                    expected: Some(self.id),
                    found: child.parent_id,
                });
            }
            child.validate()?;
        }

        Ok(())
    }
}

/// JavaScript-style truthiness, used for loosely typed UI options
pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Deserialize a double-Option field
///
/// A present `null` becomes `Some(None)`; a missing field stays `None`
/// through `#[serde(default)]`.
fn deserialize_optional_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::<T>::deserialize(deserializer)?))
}

/// Partial field update for the tree engine's `update` operation
///
/// All fields are optional; only provided fields are applied.
///
/// `icon` uses the double-Option pattern:
/// - `None`: Don't change the icon
/// - `Some(None)`: Remove the icon
/// - `Some(Some(tag))`: Set the icon tag
///
/// `children` replaces the child list only when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldUpdate {
    /// Change the field kind (regenerates schema fragments from the template)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<FieldKind>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_schema: Option<SchemaFragment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ui_schema: Option<SchemaFragment>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_optional_field"
    )]
    pub icon: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FieldNode>>,
}

impl FieldUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn with_data_schema(mut self, data_schema: SchemaFragment) -> Self {
        self.data_schema = Some(data_schema);
        self
    }

    pub fn with_ui_schema(mut self, ui_schema: SchemaFragment) -> Self {
        self.ui_schema = Some(ui_schema);
        self
    }

    pub fn with_icon(mut self, icon: Option<String>) -> Self {
        self.icon = Some(icon);
        self
    }

    pub fn with_children(mut self, children: Vec<FieldNode>) -> Self {
        self.children = Some(children);
        self
    }

    /// Check if update contains any changes
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.label.is_none()
            && self.key.is_none()
            && self.required.is_none()
            && self.data_schema.is_none()
            && self.ui_schema.is_none()
            && self.icon.is_none()
            && self.children.is_none()
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "node_test.rs"]
mod node_test;
