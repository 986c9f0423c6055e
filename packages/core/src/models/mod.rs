//! Data Models
//!
//! This module contains the core data structures used throughout Formsmith:
//!
//! - `FieldNode` - One node of the field tree (leaf field or container)
//! - `FieldTypeTemplate` - Registry templates every node is created from
//! - `FormDocument` / `ImportDocument` - Export and import artifacts
//! - `SampleSchema` - Bundled example schemas
//!
//! Schema fragments are plain `serde_json` objects; the engine treats them as
//! opaque except for the keys it derives or inspects.

mod document;
mod field_types;
mod node;
mod sample_schemas;

pub use document::{export_file_name, FormDocument, ImportDocument, DEFAULT_EXPORT_FILE};
pub use field_types::{
    find_template, instantiate, palette_templates, template_for, templates, FieldTypeTemplate,
};
pub(crate) use field_types::into_fragment;
pub(crate) use node::is_truthy;
pub use node::{
    FieldId, FieldIdAllocator, FieldKind, FieldNode, FieldUpdate, SchemaFragment, ValidationError,
};
pub use sample_schemas::{find_sample, sample_schemas, SampleSchema};
