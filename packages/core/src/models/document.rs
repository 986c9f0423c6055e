//! Export and Import Documents
//!
//! `FormDocument` is the export artifact (`form-config.json` by convention):
//! the derived schema pair plus the raw field tree. `ImportDocument` is the
//! textual payload accepted by the import path. It is either a full document
//! (`{ "schema": .., "uischema": .., "fields": .. }`) or a bare data schema.

use crate::models::FieldNode;
use crate::services::FormTreeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

/// Conventional export file name
pub const DEFAULT_EXPORT_FILE: &str = "form-config.json";

/// Export file name for a stem (`form` → `form-config.json`)
pub fn export_file_name(stem: &str) -> String {
    format!("{}-config.json", stem)
}

/// The export artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormDocument {
    pub schema: Value,
    pub uischema: Value,
    pub fields: Vec<FieldNode>,
}

impl FormDocument {
    /// Serialize to a writer, pretty-printed or compact
    ///
    /// # Errors
    ///
    /// `FormTreeError::ParseError` if the writer fails.
    pub fn write_to<W: Write>(&self, writer: W, pretty: bool) -> Result<(), FormTreeError> {
        if pretty {
            serde_json::to_writer_pretty(writer, self)?;
        } else {
            serde_json::to_writer(writer, self)?;
        }
        Ok(())
    }

    pub fn to_json_pretty(&self) -> Result<String, FormTreeError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Payload accepted by the import path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDocument {
    pub schema: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uischema: Option<Value>,

    /// Raw tree of a previously exported document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldNode>>,
}

impl ImportDocument {
    pub fn from_schema(schema: Value) -> Self {
        Self {
            schema,
            uischema: None,
            fields: None,
        }
    }

    /// Parse import text
    ///
    /// A top-level object with a `schema` member is read as a full document;
    /// any other object is taken as a bare data schema.
    ///
    /// # Errors
    ///
    /// `FormTreeError::ParseError` for malformed JSON, a non-object payload or
    /// `schema` member, or a document whose `fields` do not describe field
    /// nodes.
    pub fn parse(text: &str) -> Result<Self, FormTreeError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| FormTreeError::parse_error(format!("Invalid JSON format: {}", e)))?;

        let Some(map) = value.as_object() else {
            return Err(FormTreeError::parse_error("Import must be a JSON object"));
        };

        if !map.contains_key("schema") {
            return Ok(Self::from_schema(value));
        }
        let doc: Self = serde_json::from_value(value)?;
        if !doc.schema.is_object() {
            return Err(FormTreeError::parse_error("'schema' must be a JSON object"));
        }
        Ok(doc)
    }
}
