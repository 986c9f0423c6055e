//! Business Services
//!
//! This module contains the field-tree engine services:
//!
//! - `FieldTree` - Structural edits over the field forest
//! - `schema_builder` - Data/presentation schema derivation and default data
//! - `schema_import` - Rebuilding a forest from existing schemas
//! - `FormDesigner` - Caller-layer session (dedupe, data, import/export)
//!
//! Services sit between the plain node model and callers such as the CLI,
//! implementing the tree rules and orchestrating derivation.

pub mod error;
pub mod field_tree;
pub mod form_designer;
pub mod schema_builder;
pub mod schema_import;

pub use error::FormTreeError;
pub use field_tree::{find_by_id, validate_forest, FieldTree};
pub use form_designer::FormDesigner;
pub use schema_builder::{
    derive_data_schema, derive_form_state, derive_schema, derive_ui_schema, seed_default_data,
    FormSchemas, FormState,
};
pub use schema_import::{humanize_key, import_schema, infer_kind};
