//! Tests for the field tree mutation engine

#[cfg(test)]
mod tests {
    use crate::models::{FieldId, FieldKind, FieldNode, FieldUpdate, ValidationError};
    use crate::operations::{DropTarget, MoveDirection};
    use crate::services::{derive_data_schema, find_by_id, FieldTree, FormTreeError};
    use serde_json::json;

    fn ids(nodes: &[FieldNode]) -> Vec<u64> {
        nodes.iter().map(|n| n.id.get()).collect()
    }

    fn collect_ids(tree: &FieldTree) -> Vec<FieldId> {
        let mut out = Vec::new();
        for root in tree.roots() {
            root.walk(&mut |node| out.push(node.id));
        }
        out
    }

    // ===== insert =====

    #[test]
    fn test_insert_root_and_child() {
        let mut tree = FieldTree::new();
        let layout = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
        let text = tree.insert(FieldKind::Text, Some(layout.id), None).unwrap();

        assert_eq!(layout.key, "layout_1");
        assert_eq!(text.key, "text_2");
        assert_eq!(text.parent_id, Some(layout.id));
        assert_eq!(ids(&tree.roots()[0].children), vec![2]);
        assert_eq!(tree.revision(), 2);
    }

    #[test]
    fn test_insert_clamps_index() {
        let mut tree = FieldTree::new();
        tree.insert(FieldKind::Text, None, None).unwrap();
        tree.insert(FieldKind::Number, None, Some(99)).unwrap();
        tree.insert(FieldKind::Email, None, Some(0)).unwrap();

        assert_eq!(ids(tree.roots()), vec![3, 1, 2]);
    }

    #[test]
    fn test_insert_into_leaf_is_rejected() {
        let mut tree = FieldTree::new();
        let text = tree.insert(FieldKind::Text, None, None).unwrap();
        let revision = tree.revision();

        let err = tree.insert(FieldKind::Email, Some(text.id), None).unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));
        assert_eq!(tree.revision(), revision);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_insert_skips_key_taken_at_level() {
        let mut tree = FieldTree::new();
        let number = tree.insert(FieldKind::Number, None, None).unwrap();
        tree.update(number.id, FieldUpdate::new().with_key("text_2")).unwrap();

        let text = tree.insert(FieldKind::Text, None, None).unwrap();
        assert_eq!(text.key, "text_2_1");
        assert_eq!(text.ui_schema["scope"], json!("#/properties/text_2_1"));
        assert_eq!(tree.find_by_id(text.id).unwrap().key, "text_2_1");

        let schema = derive_data_schema(tree.roots());
        assert_eq!(
            schema["properties"].as_object().unwrap().len(),
            tree.node_count()
        );
    }

    #[test]
    fn test_insert_sees_keys_hoisted_from_layouts() {
        let mut tree = FieldTree::new();
        let layout = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
        let nested = tree.insert(FieldKind::Email, Some(layout.id), None).unwrap();
        tree.update(nested.id, FieldUpdate::new().with_key("text_3")).unwrap();

        let root_field = tree.insert(FieldKind::Text, None, None).unwrap();
        assert_eq!(root_field.key, "text_3_1");

        // A separate level does not see the hoisted key
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        tree.update(object.id, FieldUpdate::new().with_key("address")).unwrap();
        let inner = tree.insert(FieldKind::Number, Some(object.id), None).unwrap();
        assert_eq!(inner.key, format!("number_{}", inner.id.get()));
    }

    #[test]
    fn test_insert_into_missing_parent() {
        let mut tree = FieldTree::new();
        let err = tree
            .insert(FieldKind::Email, Some(FieldId::new(42)), None)
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(tree.revision(), 0);
    }

    #[test]
    fn test_ids_unique_after_deletes() {
        let mut tree = FieldTree::new();
        let a = tree.insert(FieldKind::Text, None, None).unwrap();
        tree.remove(a.id, None).unwrap();
        let b = tree.insert(FieldKind::Text, None, None).unwrap();
        assert_ne!(a.id, b.id);
    }

    // ===== move_node =====

    #[test]
    fn test_move_preserves_subtree() {
        let mut tree = FieldTree::new();
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        let inner = tree.insert(FieldKind::Text, Some(object.id), None).unwrap();
        let layout = tree.insert(FieldKind::HorizontalLayout, None, None).unwrap();

        let before = tree.find_by_id(object.id).unwrap().clone();
        tree.move_node(object.id, Some(layout.id), 0).unwrap();

        let moved = tree.find_by_id(object.id).unwrap();
        assert_eq!(moved.parent_id, Some(layout.id));
        assert_eq!(moved.children, before.children);
        assert_eq!(moved.find(inner.id).unwrap().parent_id, Some(object.id));
        assert_eq!(ids(tree.roots()), vec![layout.id.get()]);
    }

    #[test]
    fn test_move_into_own_subtree_is_rejected() {
        let mut tree = FieldTree::new();
        let outer = tree.insert(FieldKind::Group, None, None).unwrap();
        let inner = tree.insert(FieldKind::VerticalLayout, Some(outer.id), None).unwrap();
        let snapshot = tree.roots().to_vec();
        let revision = tree.revision();

        let err = tree.move_node(outer.id, Some(inner.id), 0).unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));
        let err = tree.move_node(outer.id, Some(outer.id), 0).unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));

        assert_eq!(tree.roots(), snapshot.as_slice());
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn test_move_to_same_position_is_noop() {
        let mut tree = FieldTree::new();
        let a = tree.insert(FieldKind::Text, None, None).unwrap();
        tree.insert(FieldKind::Text, None, None).unwrap();
        let revision = tree.revision();

        tree.move_node(a.id, None, 0).unwrap();
        assert_eq!(tree.revision(), revision);

        tree.move_node(a.id, None, 5).unwrap();
        assert_eq!(ids(tree.roots()), vec![2, 1]);
        assert_eq!(tree.revision(), revision + 1);
    }

    #[test]
    fn test_move_rejects_key_collision() {
        let mut tree = FieldTree::new();
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        let inner = tree.insert(FieldKind::Text, Some(object.id), None).unwrap();
        let outer = tree.insert(FieldKind::Text, None, None).unwrap();
        tree.update(outer.id, FieldUpdate::new().with_key("name")).unwrap();
        tree.update(inner.id, FieldUpdate::new().with_key("name")).unwrap();

        let err = tree.move_node(inner.id, None, 0).unwrap_err();
        match err {
            FormTreeError::SchemaMismatch { key, existing } => {
                assert_eq!(key, "name");
                assert_eq!(existing, outer.id);
            }
            other => panic!("Expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_move_between_layouts_of_same_level() {
        let mut tree = FieldTree::new();
        let left = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
        let right = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
        let field = tree.insert(FieldKind::Email, Some(left.id), None).unwrap();

        tree.move_node(field.id, Some(right.id), 0).unwrap();
        assert_eq!(tree.locate(field.id), Some((Some(right.id), 0)));
    }

    // ===== reorder_after =====

    #[test]
    fn test_reorder_after_anchor() {
        let mut tree = FieldTree::new();
        for _ in 0..4 {
            tree.insert(FieldKind::Text, None, None).unwrap();
        }

        // Forward move: 1 goes after 3
        tree.reorder_after(FieldId::new(1), FieldId::new(3), None).unwrap();
        assert_eq!(ids(tree.roots()), vec![2, 3, 1, 4]);

        // Backward move: 4 goes after 2
        tree.reorder_after(FieldId::new(4), FieldId::new(2), None).unwrap();
        assert_eq!(ids(tree.roots()), vec![2, 4, 3, 1]);
    }

    #[test]
    fn test_reorder_after_anchor_in_other_container() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let inside = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();
        let outside = tree.insert(FieldKind::Number, None, None).unwrap();

        tree.reorder_after(outside.id, inside.id, None).unwrap();
        let group = tree.find_by_id(group.id).unwrap();
        assert_eq!(ids(&group.children), vec![inside.id.get(), outside.id.get()]);
        assert_eq!(group.children[1].parent_id, Some(group.id));
    }

    #[test]
    fn test_reorder_explicit_destination_wins() {
        let mut tree = FieldTree::new();
        let a = tree.insert(FieldKind::Text, None, None).unwrap();
        let b = tree.insert(FieldKind::Text, None, None).unwrap();
        let layout = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();

        tree.reorder_after(a.id, b.id, Some(DropTarget::append_to(Some(layout.id))))
            .unwrap();
        assert_eq!(tree.locate(a.id), Some((Some(layout.id), 0)));

        tree.reorder_after(a.id, b.id, Some(DropTarget::at(None, 0))).unwrap();
        assert_eq!(ids(tree.roots()), vec![a.id.get(), b.id.get(), layout.id.get()]);
    }

    #[test]
    fn test_reorder_after_missing_anchor() {
        let mut tree = FieldTree::new();
        let a = tree.insert(FieldKind::Text, None, None).unwrap();
        let err = tree.reorder_after(a.id, FieldId::new(77), None).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(tree.revision(), 1);
    }

    // ===== move_sibling =====

    #[test]
    fn test_move_sibling_and_boundaries() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let first = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();
        let second = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();

        assert!(tree.move_sibling(first.id, MoveDirection::Down, Some(group.id)).unwrap());
        let children = &tree.find_by_id(group.id).unwrap().children;
        assert_eq!(ids(children), vec![second.id.get(), first.id.get()]);

        let revision = tree.revision();
        assert!(!tree.move_sibling(first.id, MoveDirection::Down, Some(group.id)).unwrap());
        assert!(!tree.move_sibling(second.id, MoveDirection::Up, Some(group.id)).unwrap());
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn test_move_sibling_wrong_parent() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let child = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();

        let err = tree.move_sibling(child.id, MoveDirection::Up, None).unwrap_err();
        assert!(err.is_not_found());
    }

    // ===== remove =====

    #[test]
    fn test_remove_returns_subtree() {
        let mut tree = FieldTree::new();
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        tree.insert(FieldKind::Text, Some(object.id), None).unwrap();

        let removed = tree.remove(object.id, None).unwrap();
        assert_eq!(removed.children.len(), 1);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_remove_nested_without_parent_hint() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let child = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();

        tree.remove(child.id, None).unwrap();
        assert!(tree.find_by_id(child.id).is_none());
    }

    #[test]
    fn test_remove_with_wrong_parent() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let child = tree.insert(FieldKind::Text, Some(group.id), None).unwrap();
        let other = tree.insert(FieldKind::Group, None, None).unwrap();

        let err = tree.remove(child.id, Some(other.id)).unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));
        assert!(tree.find_by_id(child.id).is_some());
    }

    #[test]
    fn test_remove_missing_node() {
        let mut tree = FieldTree::new();
        assert!(tree.remove(FieldId::new(1), None).unwrap_err().is_not_found());
    }

    // ===== update =====

    #[test]
    fn test_update_scalar_attributes() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Text, None, None).unwrap();

        let updated = tree
            .update(
                field.id,
                FieldUpdate::new()
                    .with_label("Full Name")
                    .with_key("full_name")
                    .with_required(true),
            )
            .unwrap();
        assert_eq!(updated.label, "Full Name");
        assert_eq!(updated.key, "full_name");
        assert!(updated.required);
    }

    #[test]
    fn test_update_with_identical_values_is_noop() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Text, None, None).unwrap();
        let revision = tree.revision();

        tree.update(field.id, FieldUpdate::new().with_label(field.label.clone()))
            .unwrap();
        assert_eq!(tree.revision(), revision);
    }

    #[test]
    fn test_kind_change_regenerates_schema() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Text, None, None).unwrap();
        tree.update(field.id, FieldUpdate::new().with_label("Contact")).unwrap();

        let updated = tree
            .update(field.id, FieldUpdate::new().with_kind(FieldKind::Email))
            .unwrap();
        assert_eq!(updated.kind, FieldKind::Email);
        assert_eq!(updated.label, "Contact");
        assert_eq!(updated.data_schema["format"], json!("email"));
        assert_eq!(updated.data_schema["title"], json!("Contact"));
        assert_eq!(updated.ui_schema["scope"], json!("#/properties/text_1"));
    }

    #[test]
    fn test_kind_change_carries_enum_options() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Select, None, None).unwrap();
        tree.add_enum_option(field.id, "Option 4").unwrap();

        let radio = tree
            .update(field.id, FieldUpdate::new().with_kind(FieldKind::Radio))
            .unwrap();
        assert_eq!(radio.enum_options().map(Vec::len), Some(4));
        assert_eq!(radio.ui_schema["options"]["format"], json!("radio"));

        let text = tree
            .update(field.id, FieldUpdate::new().with_kind(FieldKind::Text))
            .unwrap();
        assert!(text.enum_options().is_none());
    }

    #[test]
    fn test_layout_switch_keeps_children() {
        let mut tree = FieldTree::new();
        let layout = tree.insert(FieldKind::VerticalLayout, None, None).unwrap();
        tree.insert(FieldKind::Text, Some(layout.id), None).unwrap();

        let switched = tree
            .update(layout.id, FieldUpdate::new().with_kind(FieldKind::HorizontalLayout))
            .unwrap();
        assert_eq!(switched.ui_schema["type"], json!("HorizontalLayout"));
        assert_eq!(switched.label, "Horizontal Layout");
        assert_eq!(switched.children.len(), 1);
    }

    #[test]
    fn test_container_with_children_cannot_become_leaf() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        tree.insert(FieldKind::Text, Some(group.id), None).unwrap();

        let err = tree
            .update(group.id, FieldUpdate::new().with_kind(FieldKind::Text))
            .unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));
        assert_eq!(tree.find_by_id(group.id).unwrap().kind, FieldKind::Group);
    }

    #[test]
    fn test_update_key_collision_through_layouts() {
        let mut tree = FieldTree::new();
        let layout = tree.insert(FieldKind::HorizontalLayout, None, None).unwrap();
        let nested = tree.insert(FieldKind::Text, Some(layout.id), None).unwrap();
        let root_field = tree.insert(FieldKind::Text, None, None).unwrap();

        let err = tree
            .update(root_field.id, FieldUpdate::new().with_key(nested.key.clone()))
            .unwrap_err();
        assert!(matches!(err, FormTreeError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_same_key_allowed_in_different_levels() {
        let mut tree = FieldTree::new();
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        let inner = tree.insert(FieldKind::Text, Some(object.id), None).unwrap();
        let outer = tree.insert(FieldKind::Text, None, None).unwrap();

        tree.update(inner.id, FieldUpdate::new().with_key("name")).unwrap();
        tree.update(outer.id, FieldUpdate::new().with_key("name")).unwrap();
    }

    #[test]
    fn test_update_replacement_children_reparented() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let child = FieldNode::new(FieldId::new(50), FieldKind::Text, "Extra", "extra");

        let updated = tree
            .update(group.id, FieldUpdate::new().with_children(vec![child]))
            .unwrap();
        assert_eq!(updated.children[0].parent_id, Some(group.id));

        // Allocator moves past adopted ids
        let next = tree.insert(FieldKind::Text, None, None).unwrap();
        assert_eq!(next.id, FieldId::new(51));
    }

    #[test]
    fn test_update_replacement_children_cannot_steal_ids() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let other = tree.insert(FieldKind::Text, None, None).unwrap();
        let clash = FieldNode::new(other.id, FieldKind::Text, "Clash", "clash");

        let err = tree
            .update(group.id, FieldUpdate::new().with_children(vec![clash]))
            .unwrap_err();
        assert!(matches!(
            err,
            FormTreeError::ValidationFailed(ValidationError::DuplicateId(_))
        ));
    }

    // ===== editing helpers =====

    #[test]
    fn test_enum_option_editing() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Radio, None, None).unwrap();

        tree.add_enum_option(field.id, "  Option 4 ").unwrap();
        tree.add_enum_option(field.id, "   ").unwrap();
        let node = tree.find_by_id(field.id).unwrap();
        assert_eq!(node.enum_options().unwrap().last(), Some(&json!("Option 4")));
        assert_eq!(node.enum_options().unwrap().len(), 4);

        for _ in 0..4 {
            tree.remove_enum_option(field.id, 0).unwrap();
        }
        assert!(tree.find_by_id(field.id).unwrap().data_schema.get("enum").is_none());
        assert!(tree.remove_enum_option(field.id, 0).is_err());
    }

    #[test]
    fn test_enum_option_on_plain_field() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Text, None, None).unwrap();
        let err = tree.add_enum_option(field.id, "x").unwrap_err();
        assert!(matches!(err, FormTreeError::InvalidTarget { .. }));
    }

    #[test]
    fn test_set_ui_option() {
        let mut tree = FieldTree::new();
        let field = tree.insert(FieldKind::Text, None, None).unwrap();

        tree.set_ui_option(field.id, "hidden", Some(json!(true))).unwrap();
        assert!(tree.find_by_id(field.id).unwrap().is_hidden());

        tree.set_ui_option(field.id, "hidden", Some(json!(false))).unwrap();
        let node = tree.find_by_id(field.id).unwrap();
        assert!(!node.is_hidden());
        assert!(node.ui_schema.get("options").is_none());

        let revision = tree.revision();
        tree.set_ui_option(field.id, "readonly", None).unwrap();
        assert_eq!(tree.revision(), revision);
    }

    // ===== replace_roots =====

    #[test]
    fn test_replace_roots_validates() {
        let mut tree = FieldTree::new();
        let a = FieldNode::new(FieldId::new(5), FieldKind::Text, "A", "a");
        let b = FieldNode::new(FieldId::new(5), FieldKind::Text, "B", "b");

        let err = tree.replace_roots(vec![a.clone(), b]).unwrap_err();
        assert!(matches!(
            err,
            FormTreeError::ValidationFailed(ValidationError::DuplicateId(_))
        ));
        assert!(tree.is_empty());
        assert_eq!(tree.revision(), 0);

        tree.replace_roots(vec![a]).unwrap();
        assert_eq!(tree.insert(FieldKind::Text, None, None).unwrap().id, FieldId::new(6));
    }

    #[test]
    fn test_replace_roots_rejects_duplicate_keys_per_level() {
        let mut tree = FieldTree::new();
        let mut layout =
            FieldNode::new(FieldId::new(1), FieldKind::VerticalLayout, "Layout", "layout_1");
        let mut nested = FieldNode::new(FieldId::new(2), FieldKind::Text, "Name", "name");
        nested.parent_id = Some(layout.id);
        layout.children.push(nested);
        let clash = FieldNode::new(FieldId::new(3), FieldKind::Email, "Name", "name");

        let err = tree.replace_roots(vec![layout.clone(), clash]).unwrap_err();
        assert!(matches!(
            err,
            FormTreeError::ValidationFailed(ValidationError::DuplicateKey { ref key, id })
                if key == "name" && id == FieldId::new(3)
        ));
        assert!(tree.is_empty());
        assert_eq!(tree.revision(), 0);

        // The same key inside an object is a different level
        let mut object = FieldNode::new(FieldId::new(4), FieldKind::Object, "Address", "address");
        let mut inner = FieldNode::new(FieldId::new(5), FieldKind::Text, "Name", "name");
        inner.parent_id = Some(object.id);
        object.children.push(inner);
        tree.replace_roots(vec![layout, object]).unwrap();
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_replace_roots_rejects_ids_past_range() {
        let mut tree = FieldTree::new();
        tree.insert(FieldKind::Text, None, None).unwrap();
        let revision = tree.revision();

        let huge = FieldNode::new(FieldId::new(u64::MAX), FieldKind::Text, "Huge", "huge");
        let err = tree.replace_roots(vec![huge]).unwrap_err();
        assert!(matches!(
            err,
            FormTreeError::ValidationFailed(ValidationError::IdOutOfRange(_))
        ));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.revision(), revision);
        assert_eq!(tree.insert(FieldKind::Text, None, None).unwrap().id, FieldId::new(2));
    }

    #[test]
    fn test_update_replacement_children_keep_keys_unique() {
        let mut tree = FieldTree::new();
        let object = tree.insert(FieldKind::Object, None, None).unwrap();
        let mut first = FieldNode::new(FieldId::new(20), FieldKind::Text, "City", "city");
        let mut second = FieldNode::new(FieldId::new(21), FieldKind::Text, "Town", "city");
        first.parent_id = Some(object.id);
        second.parent_id = Some(object.id);

        let err = tree
            .update(object.id, FieldUpdate::new().with_children(vec![first, second]))
            .unwrap_err();
        assert!(matches!(
            err,
            FormTreeError::ValidationFailed(ValidationError::DuplicateKey { .. })
        ));
        assert!(tree.find_by_id(object.id).unwrap().children.is_empty());
    }

    #[test]
    fn test_find_by_id_free_function() {
        let mut tree = FieldTree::new();
        let group = tree.insert(FieldKind::Group, None, None).unwrap();
        let child = tree.insert(FieldKind::Date, Some(group.id), None).unwrap();

        assert_eq!(find_by_id(tree.roots(), child.id).map(|n| n.kind), Some(FieldKind::Date));
        assert_eq!(collect_ids(&tree), vec![group.id, child.id]);
    }
}
