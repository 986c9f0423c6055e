//! Form Designer Session
//!
//! `FormDesigner` is the caller layer around [`FieldTree`]: it owns the
//! tree, the authoritative form data, the duplicate-insert registry and the
//! session configuration.
//!
//! # Derived state
//!
//! The schema pair is memoized against the tree revision. The first
//! `form_state()` after a tree change re-derives both schemas and seeds
//! defaults into the current data; data edits made through `set_data` are
//! never overwritten, only missing keys are filled.
//!
//! # Examples
//!
//! ```rust
//! use formsmith_core::config::DesignerConfig;
//! use formsmith_core::models::FieldKind;
//! use formsmith_core::services::FormDesigner;
//!
//! let mut designer = FormDesigner::new(DesignerConfig::default());
//! let field = designer.add_field(FieldKind::Checkbox, None, None).unwrap().unwrap();
//!
//! let state = designer.form_state();
//! assert_eq!(state.data[&field.key], false);
//! ```

use crate::config::DesignerConfig;
use crate::models::{
    export_file_name, find_sample, FieldId, FieldKind, FieldNode, FieldUpdate, FormDocument,
    ImportDocument,
};
use crate::operations::{Clock, DropTarget, InsertDeduper, MoveDirection, SystemClock};
use crate::services::{
    derive_schema, import_schema, seed_default_data, FieldTree, FormSchemas, FormState,
    FormTreeError,
};
use serde_json::{Map, Value};
use std::io::Write;
use tracing::{debug, info, warn};

/// Designer session over one form
#[derive(Debug)]
pub struct FormDesigner<C: Clock = SystemClock> {
    tree: FieldTree,
    data: Value,
    deduper: InsertDeduper<C>,
    config: DesignerConfig,
    /// Schemas derived at the given tree revision
    derived: Option<(u64, FormSchemas)>,
}

impl FormDesigner<SystemClock> {
    pub fn new(config: DesignerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> FormDesigner<C> {
    /// Session with an explicit dedupe clock
    pub fn with_clock(config: DesignerConfig, clock: C) -> Self {
        Self {
            tree: FieldTree::new(),
            data: empty_data(),
            deduper: InsertDeduper::new(clock, config.dedupe_window_ms),
            config,
            derived: None,
        }
    }

    pub fn tree(&self) -> &FieldTree {
        &self.tree
    }

    pub fn fields(&self) -> &[FieldNode] {
        self.tree.roots()
    }

    pub fn config(&self) -> &DesignerConfig {
        &self.config
    }

    /// Current form data, as last seeded or set
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Data-change callback from the renderer
    ///
    /// The value becomes the authoritative data; the tree is not touched.
    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    /// Insert a field from the palette
    ///
    /// Returns `Ok(None)` when an identical request (same kind and parent)
    /// arrived within the dedupe window.
    pub fn add_field(
        &mut self,
        kind: FieldKind,
        parent_id: Option<FieldId>,
        index: Option<usize>,
    ) -> Result<Option<FieldNode>, FormTreeError> {
        if !self.deduper.try_acquire(kind, parent_id) {
            return Ok(None);
        }
        self.tree.insert(kind, parent_id, index).map(Some)
    }

    pub fn move_node(
        &mut self,
        node_id: FieldId,
        target_parent_id: Option<FieldId>,
        target_index: usize,
    ) -> Result<(), FormTreeError> {
        self.tree.move_node(node_id, target_parent_id, target_index)
    }

    pub fn reorder_after(
        &mut self,
        node_id: FieldId,
        anchor_id: FieldId,
        destination: Option<DropTarget>,
    ) -> Result<(), FormTreeError> {
        self.tree.reorder_after(node_id, anchor_id, destination)
    }

    pub fn move_sibling(
        &mut self,
        node_id: FieldId,
        direction: MoveDirection,
        parent_id: Option<FieldId>,
    ) -> Result<bool, FormTreeError> {
        self.tree.move_sibling(node_id, direction, parent_id)
    }

    pub fn remove(
        &mut self,
        node_id: FieldId,
        parent_id: Option<FieldId>,
    ) -> Result<FieldNode, FormTreeError> {
        self.tree.remove(node_id, parent_id)
    }

    pub fn update(
        &mut self,
        node_id: FieldId,
        patch: FieldUpdate,
    ) -> Result<&FieldNode, FormTreeError> {
        self.tree.update(node_id, patch)
    }

    pub fn add_enum_option(&mut self, node_id: FieldId, option: &str) -> Result<(), FormTreeError> {
        self.tree.add_enum_option(node_id, option)
    }

    pub fn remove_enum_option(
        &mut self,
        node_id: FieldId,
        index: usize,
    ) -> Result<(), FormTreeError> {
        self.tree.remove_enum_option(node_id, index)
    }

    pub fn set_ui_option(
        &mut self,
        node_id: FieldId,
        name: &str,
        value: Option<Value>,
    ) -> Result<(), FormTreeError> {
        self.tree.set_ui_option(node_id, name, value)
    }

    /// Schemas and data for the renderer
    pub fn form_state(&mut self) -> FormState {
        let FormSchemas { schema, uischema } = self.schemas();
        FormState {
            schema,
            uischema,
            data: self.data.clone(),
        }
    }

    /// Derived schemas, refreshed (and data re-seeded) after a tree change
    fn schemas(&mut self) -> FormSchemas {
        let revision = self.tree.revision();
        if let Some((derived_at, schemas)) = &self.derived {
            if *derived_at == revision {
                return schemas.clone();
            }
        }

        debug!("Deriving schemas at revision {}", revision);
        self.data = seed_default_data(self.tree.roots(), &self.data);
        let schemas = derive_schema(self.tree.roots());
        self.derived = Some((revision, schemas.clone()));
        schemas
    }

    /// Replace the form from import text
    ///
    /// A document carrying `fields` restores that raw tree; otherwise the
    /// tree is rebuilt from the schemas. On success the data is reset to
    /// `{}`.
    ///
    /// # Errors
    ///
    /// - `ParseError` for malformed text
    /// - `ValidationFailed` for a restored tree that breaks an invariant
    ///
    /// Tree and data are unchanged on error.
    pub fn import_text(&mut self, text: &str) -> Result<(), FormTreeError> {
        let document = ImportDocument::parse(text).map_err(|e| {
            warn!("Rejected import: {}", e);
            e
        })?;

        match document.fields {
            Some(fields) => {
                self.tree.replace_roots(fields)?;
                info!("Restored {} fields from exported document", self.tree.node_count());
            }
            None => {
                let forest = import_schema(
                    &document.schema,
                    document.uischema.as_ref(),
                    self.tree.allocator_mut(),
                );
                self.tree.replace_roots(forest)?;
                info!("Imported {} fields from schema", self.tree.node_count());
            }
        }

        self.data = empty_data();
        Ok(())
    }

    /// Replace the form with a bundled sample schema
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown sample id.
    pub fn load_sample(&mut self, sample_id: &str) -> Result<(), FormTreeError> {
        let sample = find_sample(sample_id)?;
        let forest = import_schema(
            &sample.schema,
            sample.uischema.as_ref(),
            self.tree.allocator_mut(),
        );
        self.tree.replace_roots(forest)?;
        self.data = empty_data();

        info!("Loaded sample '{}' ({} fields)", sample.id, self.tree.node_count());
        Ok(())
    }

    /// The export artifact: derived schemas plus the raw tree
    pub fn export_document(&mut self) -> FormDocument {
        let FormSchemas { schema, uischema } = self.schemas();
        FormDocument {
            schema,
            uischema,
            fields: self.tree.roots().to_vec(),
        }
    }

    /// Write the export artifact, honoring `pretty_export`
    pub fn write_export<W: Write>(&mut self, writer: W) -> Result<(), FormTreeError> {
        let document = self.export_document();
        document.write_to(writer, self.config.pretty_export)?;
        info!(
            "Exported {} fields as {}",
            self.tree.node_count(),
            self.export_file_name()
        );
        Ok(())
    }

    /// File name for exports (`<stem>-config.json`)
    pub fn export_file_name(&self) -> String {
        export_file_name(&self.config.export_file_stem)
    }
}

fn empty_data() -> Value {
    Value::Object(Map::new())
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "form_designer_test.rs"]
mod form_designer_test;
