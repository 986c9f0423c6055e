//! Tree Operation Types
//!
//! Supporting types for the tree mutation engine and the designer session:
//! drop targets, sibling move directions and duplicate insert suppression.

pub mod dedupe;

// Re-export types for convenience
pub use dedupe::{Clock, InsertDeduper, ManualClock, SystemClock};

use crate::models::FieldId;
use serde::{Deserialize, Serialize};

/// Explicit drop zone for a reorder
///
/// `parent_id: None` targets the root list. `index: None` appends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropTarget {
    pub parent_id: Option<FieldId>,
    pub index: Option<usize>,
}

impl DropTarget {
    /// Append to the end of a container (or the roots)
    pub fn append_to(parent_id: Option<FieldId>) -> Self {
        Self {
            parent_id,
            index: None,
        }
    }

    /// Insert at a position inside a container (or the roots)
    pub fn at(parent_id: Option<FieldId>, index: usize) -> Self {
        Self {
            parent_id,
            index: Some(index),
        }
    }
}

/// Direction of a single-step sibling move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}
