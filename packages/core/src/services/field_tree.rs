//! Field Tree Mutation Engine
//!
//! `FieldTree` owns the forest of field nodes, the id allocator and a revision
//! counter. All structural edits go through it.
//!
//! # Architecture
//!
//! - **Check, then splice**: every precondition (existence, container target,
//!   cycles, key collisions) is verified before the forest is touched, so a
//!   failed call never leaves a partial edit behind
//! - **One revision per edit**: a successful mutation bumps `revision` exactly
//!   once; failed calls and no-ops leave it untouched, which lets callers
//!   memoize anything derived from the forest
//! - **Schema levels**: object and array containers open a property
//!   namespace; layout containers hoist their children into the enclosing
//!   one. Keys must be unique per namespace.
//!
//! # Examples
//!
//! ```rust
//! use formsmith_core::models::FieldKind;
//! use formsmith_core::services::FieldTree;
//!
//! let mut tree = FieldTree::new();
//! let layout = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
//! let email = tree.insert(FieldKind::Email, Some(layout.id), None).unwrap();
//!
//! assert_eq!(tree.find_by_id(email.id).unwrap().parent_id, Some(layout.id));
//! assert_eq!(tree.revision(), 2);
//! ```

use crate::models::{
    instantiate, template_for, FieldId, FieldIdAllocator, FieldKind, FieldNode, FieldUpdate,
    ValidationError,
};
use crate::operations::{DropTarget, MoveDirection};
use crate::services::FormTreeError;
use crate::utils::ScopePath;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Depth-first lookup across a forest
pub fn find_by_id(forest: &[FieldNode], id: FieldId) -> Option<&FieldNode> {
    forest.iter().find_map(|node| node.find(id))
}

fn find_by_id_mut(forest: &mut [FieldNode], id: FieldId) -> Option<&mut FieldNode> {
    forest.iter_mut().find_map(|node| node.find_mut(id))
}

/// Validate a whole forest: roots have no parent, every subtree is
/// consistent, ids are unique across the forest and keys are unique per
/// schema level.
pub fn validate_forest(forest: &[FieldNode]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for root in forest {
        if root.parent_id.is_some() {
            return Err(ValidationError::ParentMismatch {
                id: root.id,
                expected: None,
                found: root.parent_id,
            });
        }
        root.validate()?;

        let mut duplicate = None;
        root.walk(&mut |node| {
            if !seen.insert(node.id) && duplicate.is_none() {
                duplicate = Some(node.id);
            }
        });
        if let Some(id) = duplicate {
            return Err(ValidationError::DuplicateId(id));
        }
    }
    check_level_keys(forest)
}

/// Each schema level, starting at `members` and going down, uses a key once
fn check_level_keys(members: &[FieldNode]) -> Result<(), ValidationError> {
    let mut keys = Vec::new();
    for member in members {
        contributed_keys(member, &mut keys);
    }
    let mut seen = HashSet::new();
    for (key, id) in keys {
        if !seen.insert(key) {
            return Err(ValidationError::DuplicateKey {
                key: key.to_string(),
                id,
            });
        }
    }
    members.iter().try_for_each(check_nested_levels)
}

/// Check the schema levels opened inside `node`
fn check_nested_levels(node: &FieldNode) -> Result<(), ValidationError> {
    if node.opens_schema_level() {
        check_level_keys(&node.children)
    } else {
        node.children.iter().try_for_each(check_nested_levels)
    }
}

/// Largest id used anywhere in a forest
fn max_id(forest: &[FieldNode]) -> Option<FieldId> {
    let mut max = None;
    for root in forest {
        root.walk(&mut |node| {
            if max.map_or(true, |current| node.id > current) {
                max = Some(node.id);
            }
        });
    }
    max
}

/// Property keys a subtree contributes to the namespace it sits in
///
/// Layout containers contribute their descendants' keys (recursively through
/// nested layouts); every other node contributes its own key.
fn contributed_keys<'a>(node: &'a FieldNode, out: &mut Vec<(&'a str, FieldId)>) {
    if node.is_layout_container() {
        for child in &node.children {
            contributed_keys(child, out);
        }
    } else {
        out.push((node.key.as_str(), node.id));
    }
}

/// The field tree: forest, id allocator and revision counter
#[derive(Debug, Clone, Default)]
pub struct FieldTree {
    roots: Vec<FieldNode>,
    ids: FieldIdAllocator,
    revision: u64,
}

impl FieldTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree around an existing forest
    ///
    /// # Errors
    ///
    /// `FormTreeError::ValidationFailed` if the forest breaks a structural
    /// invariant.
    pub fn from_roots(roots: Vec<FieldNode>) -> Result<Self, FormTreeError> {
        let mut tree = Self::new();
        tree.replace_roots(roots)?;
        Ok(tree)
    }

    pub fn roots(&self) -> &[FieldNode] {
        &self.roots
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Total number of nodes in the forest
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        for root in &self.roots {
            root.walk(&mut |_| count += 1);
        }
        count
    }

    /// Id allocator shared with the import engine
    pub fn allocator_mut(&mut self) -> &mut FieldIdAllocator {
        &mut self.ids
    }

    pub fn find_by_id(&self, id: FieldId) -> Option<&FieldNode> {
        find_by_id(&self.roots, id)
    }

    /// Parent and position of a node, derived from the actual tree structure
    pub fn locate(&self, id: FieldId) -> Option<(Option<FieldId>, usize)> {
        fn search(
            nodes: &[FieldNode],
            parent: Option<FieldId>,
            id: FieldId,
        ) -> Option<(Option<FieldId>, usize)> {
            for (index, node) in nodes.iter().enumerate() {
                if node.id == id {
                    return Some((parent, index));
                }
                if let Some(found) = search(&node.children, Some(node.id), id) {
                    return Some(found);
                }
            }
            None
        }

        search(&self.roots, None, id)
    }

    /// Insert a fresh node from the registry
    ///
    /// With a parent, the parent must exist and be a container. The index is
    /// clamped to the sibling list; `None` appends. A fresh key that is
    /// already taken at the target level gets a numeric suffix.
    ///
    /// # Errors
    ///
    /// - `NotFound` if `parent_id` does not exist
    /// - `InvalidTarget` if the parent is not a container
    pub fn insert(
        &mut self,
        kind: FieldKind,
        parent_id: Option<FieldId>,
        index: Option<usize>,
    ) -> Result<FieldNode, FormTreeError> {
        self.check_container(parent_id)?;

        let mut node = instantiate(template_for(kind), self.ids.next_id());
        node.parent_id = parent_id;
        if !node.is_layout_container() {
            self.assign_free_key(&mut node, parent_id);
        }

        let siblings = self.children_mut(parent_id)?;
        let position = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(position, node.clone());
        self.bump();

        debug!(
            "Inserted {} ({}) under {:?} at {}",
            node.id, node.kind, parent_id, position
        );
        Ok(node)
    }

    /// Move a subtree to a new parent and position
    ///
    /// The index is interpreted against the destination list after the node
    /// has been detached, and clamped.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node or the target parent does not exist
    /// - `InvalidTarget` if the target is not a container or lies inside the
    ///   moved subtree
    /// - `SchemaMismatch` if a moved key collides at the destination level
    pub fn move_node(
        &mut self,
        node_id: FieldId,
        target_parent_id: Option<FieldId>,
        target_index: usize,
    ) -> Result<(), FormTreeError> {
        let (source_parent, source_index) = self
            .locate(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        self.check_container(target_parent_id)?;

        if let Some(target) = target_parent_id {
            let moved = self
                .find_by_id(node_id)
                .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
            if moved.contains(target) {
                warn!("Rejected move of {} into its own subtree", node_id);
                return Err(FormTreeError::invalid_target(
                    target,
                    format!("cannot move {} into its own subtree", node_id),
                ));
            }
        }

        let same_parent = source_parent == target_parent_id;
        let destination_len = self.children(target_parent_id)?.len() - usize::from(same_parent);
        let position = target_index.min(destination_len);
        if same_parent && position == source_index {
            return Ok(());
        }

        if !same_parent {
            self.check_move_keys(target_parent_id, node_id)?;
        }

        let mut node = self.detach(node_id)?;
        node.parent_id = target_parent_id;
        self.children_mut(target_parent_id)?.insert(position, node);
        self.bump();

        debug!(
            "Moved {} to {:?} at {}",
            node_id, target_parent_id, position
        );
        Ok(())
    }

    /// Move a subtree to just after `anchor_id`, or into an explicit drop zone
    ///
    /// An explicit `destination` takes precedence over the anchor.
    ///
    /// # Errors
    ///
    /// Same as [`FieldTree::move_node`]; additionally `NotFound` for a
    /// missing anchor and `InvalidTarget` for an anchor inside the moved
    /// subtree.
    pub fn reorder_after(
        &mut self,
        node_id: FieldId,
        anchor_id: FieldId,
        destination: Option<DropTarget>,
    ) -> Result<(), FormTreeError> {
        if let Some(target) = destination {
            return self.move_node(node_id, target.parent_id, target.index.unwrap_or(usize::MAX));
        }

        let (source_parent, source_index) = self
            .locate(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        let (anchor_parent, anchor_index) = self
            .locate(anchor_id)
            .ok_or_else(|| FormTreeError::node_not_found(anchor_id))?;

        let moved = self
            .find_by_id(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        if moved.contains(anchor_id) {
            return Err(FormTreeError::invalid_target(
                anchor_id,
                format!("anchor lies inside the moved subtree of {}", node_id),
            ));
        }

        // Detaching an earlier sibling shifts the anchor up by one
        let position = if source_parent == anchor_parent && source_index < anchor_index {
            anchor_index
        } else {
            anchor_index + 1
        };
        self.move_node(node_id, anchor_parent, position)
    }

    /// Swap a node with its previous or next sibling
    ///
    /// Returns `false` (and changes nothing) at the list boundary.
    ///
    /// # Errors
    ///
    /// `NotFound` if the parent does not exist or the node is not one of its
    /// children.
    pub fn move_sibling(
        &mut self,
        node_id: FieldId,
        direction: MoveDirection,
        parent_id: Option<FieldId>,
    ) -> Result<bool, FormTreeError> {
        let siblings = self.children_mut(parent_id)?;
        let index = siblings
            .iter()
            .position(|node| node.id == node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;

        let other = match direction {
            MoveDirection::Up if index > 0 => index - 1,
            MoveDirection::Down if index + 1 < siblings.len() => index + 1,
            _ => return Ok(false),
        };

        siblings.swap(index, other);
        self.bump();
        debug!("Moved {} {:?} within {:?}", node_id, direction, parent_id);
        Ok(true)
    }

    /// Detach and return a subtree
    ///
    /// Without `parent_id` the node is searched across the whole forest.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node does not exist
    /// - `InvalidTarget` if `parent_id` is not the node's actual parent
    pub fn remove(
        &mut self,
        node_id: FieldId,
        parent_id: Option<FieldId>,
    ) -> Result<FieldNode, FormTreeError> {
        let (actual_parent, _) = self
            .locate(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;

        if let Some(expected) = parent_id {
            if actual_parent != Some(expected) {
                warn!(
                    "Rejected removal of {}: parent is {:?}, not {}",
                    node_id, actual_parent, expected
                );
                return Err(FormTreeError::invalid_target(
                    expected,
                    format!("{} is not a child of this node", node_id),
                ));
            }
        }

        let node = self.detach(node_id)?;
        self.bump();
        debug!("Removed {} from {:?}", node_id, actual_parent);
        Ok(node)
    }

    /// Apply a partial update
    ///
    /// A kind change regenerates both schema fragments from the new template
    /// (`title` preset to the label, `scope` preset to the key) and carries
    /// the enum option list over between enum-bearing kinds. Switching
    /// between the vertical and horizontal layouts only swaps the layout type
    /// and default label.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the node does not exist
    /// - `InvalidTarget` when turning a container with children into a leaf
    /// - `SchemaMismatch` when the new key collides at the node's level
    /// - `ValidationFailed` when replacement children are malformed or reuse
    ///   ids from elsewhere in the forest
    pub fn update(
        &mut self,
        node_id: FieldId,
        patch: FieldUpdate,
    ) -> Result<&FieldNode, FormTreeError> {
        let current = self
            .find_by_id(node_id)
            .cloned()
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;

        let updated = Self::apply_update(&current, patch)?;
        if updated == current {
            return self
                .find_by_id(node_id)
                .ok_or_else(|| FormTreeError::node_not_found(node_id));
        }

        updated.validate()?;
        if updated.children != current.children {
            self.check_replacement_ids(&current, &updated)?;
        }
        if updated.children != current.children {
            check_nested_levels(&updated)?;
        }
        if updated.key != current.key
            || updated.kind != current.kind
            || updated.children != current.children
        {
            let (parent, _) = self
                .locate(node_id)
                .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
            self.check_keys_against_level(parent, &updated, node_id)?;
        }

        if let Some(max) = max_id(std::slice::from_ref(&updated)) {
            self.ids.reserve_past(max);
        }
        let slot = find_by_id_mut(&mut self.roots, node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        *slot = updated;
        self.bump();

        debug!("Updated {}", node_id);
        self.find_by_id(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))
    }

    /// Replace the whole forest (import or restore)
    ///
    /// # Errors
    ///
    /// `ValidationFailed` if the forest breaks a structural invariant; the
    /// current forest is kept in that case.
    pub fn replace_roots(&mut self, roots: Vec<FieldNode>) -> Result<(), FormTreeError> {
        validate_forest(&roots)?;
        if let Some(max) = max_id(&roots) {
            self.ids.reserve_past(max);
        }
        self.roots = roots;
        self.bump();
        debug!("Replaced forest ({} roots)", self.roots.len());
        Ok(())
    }

    /// Append an option to a select/radio field
    ///
    /// Blank options are ignored.
    pub fn add_enum_option(&mut self, node_id: FieldId, option: &str) -> Result<(), FormTreeError> {
        let option = option.trim();
        let node = self.enum_node_mut(node_id)?;
        if option.is_empty() {
            return Ok(());
        }

        let options = node
            .data_schema
            .entry("enum")
            .or_insert_with(|| Value::Array(Vec::new()));
        match options {
            Value::Array(list) => list.push(Value::String(option.to_string())),
            other => *other = Value::Array(vec![Value::String(option.to_string())]),
        }
        self.bump();
        Ok(())
    }

    /// Remove the option at `index`; removing the last one drops `enum`
    ///
    /// # Errors
    ///
    /// `InvalidTarget` for an out-of-range index.
    pub fn remove_enum_option(
        &mut self,
        node_id: FieldId,
        index: usize,
    ) -> Result<(), FormTreeError> {
        let node = self.enum_node_mut(node_id)?;
        let len = node.enum_options().map_or(0, Vec::len);
        if index >= len {
            return Err(FormTreeError::invalid_target(
                node_id,
                format!("option index {} out of range ({} options)", index, len),
            ));
        }

        if let Some(Value::Array(list)) = node.data_schema.get_mut("enum") {
            list.remove(index);
            if list.is_empty() {
                node.data_schema.remove("enum");
            }
        }
        self.bump();
        Ok(())
    }

    /// Set or clear a presentation option (`ui_schema.options.<name>`)
    ///
    /// `None` removes the option, and so does `hidden: false`. An options
    /// object left empty is dropped.
    pub fn set_ui_option(
        &mut self,
        node_id: FieldId,
        name: &str,
        value: Option<Value>,
    ) -> Result<(), FormTreeError> {
        let node = self
            .find_by_id(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;

        let value = match value {
            Some(Value::Bool(false)) if name == "hidden" => None,
            other => other,
        };
        if node.ui_option(name) == value.as_ref() {
            return Ok(());
        }

        let node = find_by_id_mut(&mut self.roots, node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        let options = node
            .ui_schema
            .entry("options")
            .or_insert_with(|| Value::Object(Default::default()));
        if !options.is_object() {
            *options = Value::Object(Default::default());
        }
        let emptied = match options {
            Value::Object(map) => {
                match value {
                    Some(value) => {
                        map.insert(name.to_string(), value);
                    }
                    None => {
                        map.remove(name);
                    }
                }
                map.is_empty()
            }
            _ => false,
        };
        if emptied {
            node.ui_schema.remove("options");
        }
        self.bump();
        Ok(())
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    fn children(&self, parent_id: Option<FieldId>) -> Result<&Vec<FieldNode>, FormTreeError> {
        match parent_id {
            None => Ok(&self.roots),
            Some(id) => self
                .find_by_id(id)
                .map(|node| &node.children)
                .ok_or_else(|| FormTreeError::node_not_found(id)),
        }
    }

    fn children_mut(
        &mut self,
        parent_id: Option<FieldId>,
    ) -> Result<&mut Vec<FieldNode>, FormTreeError> {
        match parent_id {
            None => Ok(&mut self.roots),
            Some(id) => find_by_id_mut(&mut self.roots, id)
                .map(|node| &mut node.children)
                .ok_or_else(|| FormTreeError::node_not_found(id)),
        }
    }

    /// `None` (the roots) or an existing container
    fn check_container(&self, parent_id: Option<FieldId>) -> Result<(), FormTreeError> {
        let Some(id) = parent_id else {
            return Ok(());
        };
        let parent = self
            .find_by_id(id)
            .ok_or_else(|| FormTreeError::node_not_found(id))?;
        if !parent.is_container() {
            warn!("Rejected child for non-container {} ({})", id, parent.kind);
            return Err(FormTreeError::invalid_target(
                id,
                format!("{} fields cannot own children", parent.kind),
            ));
        }
        Ok(())
    }

    fn detach(&mut self, node_id: FieldId) -> Result<FieldNode, FormTreeError> {
        let (parent, index) = self
            .locate(node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        Ok(self.children_mut(parent)?.remove(index))
    }

    fn enum_node_mut(&mut self, node_id: FieldId) -> Result<&mut FieldNode, FormTreeError> {
        let node = find_by_id_mut(&mut self.roots, node_id)
            .ok_or_else(|| FormTreeError::node_not_found(node_id))?;
        if !node.has_enum_options() {
            return Err(FormTreeError::invalid_target(
                node_id,
                format!("{} fields have no option list", node.kind),
            ));
        }
        Ok(node)
    }

    /// Children of the container that owns the namespace `parent_id` sits in
    fn level_members(&self, parent_id: Option<FieldId>) -> &[FieldNode] {
        fn owner_path<'a>(
            nodes: &'a [FieldNode],
            id: FieldId,
            path: &mut Vec<&'a FieldNode>,
        ) -> bool {
            for node in nodes {
                path.push(node);
                if node.id == id || owner_path(&node.children, id, path) {
                    return true;
                }
                path.pop();
            }
            false
        }

        let Some(parent) = parent_id else {
            return &self.roots;
        };
        let mut path = Vec::new();
        if !owner_path(&self.roots, parent, &mut path) {
            return &self.roots;
        }
        path.iter()
            .rev()
            .copied()
            .find(|node| node.opens_schema_level())
            .map_or(self.roots.as_slice(), |owner| owner.children.as_slice())
    }

    /// Keys of `incoming` must not collide with the namespace of `parent_id`,
    /// ignoring the subtree rooted at `exclude`
    fn check_keys_against_level(
        &self,
        parent_id: Option<FieldId>,
        incoming: &FieldNode,
        exclude: FieldId,
    ) -> Result<(), FormTreeError> {
        let excluded = self.find_by_id(exclude);
        let mut existing = Vec::new();
        for member in self.level_members(parent_id) {
            contributed_keys(member, &mut existing);
        }
        existing.retain(|(_, id)| !excluded.is_some_and(|node| node.contains(*id)));

        let mut incoming_keys = Vec::new();
        contributed_keys(incoming, &mut incoming_keys);
        for (key, _) in incoming_keys {
            if let Some((_, owner)) = existing
                .iter()
                .find(|(existing_key, _)| *existing_key == key)
            {
                warn!("Key '{}' already used by {}", key, owner);
                return Err(FormTreeError::schema_mismatch(key, *owner));
            }
        }
        Ok(())
    }

    /// Give a fresh node a key unused at its level (`text_2` → `text_2_1`, …)
    fn assign_free_key(&self, node: &mut FieldNode, parent_id: Option<FieldId>) {
        let mut members = Vec::new();
        for member in self.level_members(parent_id) {
            contributed_keys(member, &mut members);
        }
        let taken: HashSet<&str> = members.into_iter().map(|(key, _)| key).collect();
        if !taken.contains(node.key.as_str()) {
            return;
        }

        let Some(key) = (1u64..)
            .map(|n| format!("{}_{}", node.key, n))
            .find(|candidate| !taken.contains(candidate.as_str()))
        else {
            return;
        };
        debug!("Key '{}' is taken at this level; using '{}'", node.key, key);
        if node.ui_schema.contains_key("scope") {
            let scope = ScopePath::root().child(&key).to_pointer();
            node.ui_schema.insert("scope".to_string(), Value::String(scope));
        }
        node.key = key;
    }

    fn check_move_keys(
        &self,
        parent_id: Option<FieldId>,
        moved_id: FieldId,
    ) -> Result<(), FormTreeError> {
        let moved = self
            .find_by_id(moved_id)
            .ok_or_else(|| FormTreeError::node_not_found(moved_id))?;
        self.check_keys_against_level(parent_id, moved, moved_id)
    }

    /// Replacement children may reuse ids from the node's old subtree but not
    /// from anywhere else in the forest
    fn check_replacement_ids(
        &self,
        current: &FieldNode,
        updated: &FieldNode,
    ) -> Result<(), FormTreeError> {
        let mut duplicate = None;
        let mut seen = HashSet::new();
        updated.walk(&mut |node| {
            let reused_elsewhere = !current.contains(node.id) && self.find_by_id(node.id).is_some();
            if (!seen.insert(node.id) || reused_elsewhere) && duplicate.is_none() {
                duplicate = Some(node.id);
            }
        });
        match duplicate {
            Some(id) => Err(ValidationError::DuplicateId(id).into()),
            None => Ok(()),
        }
    }

    fn apply_update(current: &FieldNode, patch: FieldUpdate) -> Result<FieldNode, FormTreeError> {
        let mut node = current.clone();

        if let Some(label) = patch.label {
            node.label = label;
        }
        if let Some(key) = patch.key {
            node.key = key;
        }
        if let Some(required) = patch.required {
            node.required = required;
        }
        if let Some(data_schema) = patch.data_schema {
            node.data_schema = data_schema;
        }
        if let Some(ui_schema) = patch.ui_schema {
            node.ui_schema = ui_schema;
        }
        if let Some(icon) = patch.icon {
            node.icon = icon;
        }
        if let Some(mut children) = patch.children {
            for child in &mut children {
                child.parent_id = Some(node.id);
            }
            node.children = children;
        }

        if let Some(kind) = patch.kind.filter(|kind| *kind != current.kind) {
            if !kind.is_container() && !node.children.is_empty() {
                return Err(FormTreeError::invalid_target(
                    node.id,
                    format!("a {} with children cannot become a {} field", current.kind, kind),
                ));
            }
            Self::change_kind(&mut node, current, kind);
        }

        Ok(node)
    }

    fn change_kind(node: &mut FieldNode, current: &FieldNode, kind: FieldKind) {
        let template = template_for(kind);
        let switching_layout = matches!(
            (current.kind, kind),
            (FieldKind::VerticalLayout, FieldKind::HorizontalLayout)
                | (FieldKind::HorizontalLayout, FieldKind::VerticalLayout)
        );

        node.kind = kind;
        if switching_layout {
            if let Some(layout_type) = template.ui_schema.get("type") {
                node.ui_schema.insert("type".to_string(), layout_type.clone());
            }
            if node.label == template_for(current.kind).label {
                node.label = template.label.to_string();
            }
            return;
        }

        node.data_schema = template.data_schema.clone();
        node.data_schema
            .insert("title".to_string(), Value::String(node.label.clone()));
        node.ui_schema = template.ui_schema.clone();
        if node.ui_schema.contains_key("scope") {
            let scope = ScopePath::root().child(&node.key).to_pointer();
            node.ui_schema.insert("scope".to_string(), Value::String(scope));
        }

        if current.has_enum_options() && kind.has_enum_options() {
            if let Some(options) = current.data_schema.get("enum") {
                node.data_schema.insert("enum".to_string(), options.clone());
            }
        }
    }
}

// Comprehensive tests in separate module
#[cfg(test)]
#[path = "field_tree_test.rs"]
mod field_tree_test;
