//! Formsmith Core Field-Tree Engine
//!
//! This crate provides the model and services behind a visual form builder:
//! a tree of typed fields edited by drag and drop, from which a JSON Schema
//! (data model), a JSON Forms style presentation schema and a default data
//! object are derived.
//!
//! # Architecture
//!
//! - **Tree is the source of truth**: schemas and default data are pure
//!   functions of the field forest
//! - **Closed kind set**: every field kind has one registry template
//! - **Atomic edits**: a tree mutation either applies completely or leaves
//!   the forest untouched
//! - **Import is approximate inverse**: importing a schema and deriving again
//!   describes the same properties
//!
//! # Modules
//!
//! - [`models`] - Field nodes, the type registry, documents and samples
//! - [`services`] - Tree mutations, schema derivation/import, designer session
//! - [`operations`] - Drop targets and duplicate insert suppression
//! - [`config`] - Designer session configuration
//! - [`utils`] - Scope pointer parsing

pub mod config;
pub mod models;
pub mod operations;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::DesignerConfig;
pub use models::*;
pub use operations::{DropTarget, MoveDirection};
pub use services::*;
