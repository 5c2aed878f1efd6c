//! Tests for TreeBuilder

use rstest::rstest;

use treewalk::domain::{
    inorder, level_order, IdAllocator, InputMode, NodeId, Side, Tree, TreeBuilder,
};

fn build(values: &[Option<i64>], mode: InputMode) -> Tree<i64> {
    TreeBuilder::new().build(values, mode)
}

fn values_of(tree: &Tree<i64>) -> Vec<i64> {
    level_order(tree).into_iter().map(|n| n.value).collect()
}

#[test]
fn given_level_array_with_gap_when_building_then_skips_absent_child() {
    // Arrange
    let values = [Some(1), Some(2), Some(3), None, Some(4)];

    // Act
    let tree = build(&values, InputMode::Level);

    // Assert
    let root = tree.root().expect("root");
    assert_eq!(root.value, 1);
    let two = root.child(Side::Left).expect("left");
    assert_eq!(two.value, 2);
    assert!(two.left().is_none());
    assert_eq!(two.right().map(|n| n.value), Some(4));
    assert_eq!(root.right().map(|n| n.value), Some(3));
    assert_eq!(tree.height(), 3);
    assert_eq!(tree.len(), 4);
}

#[test]
fn given_level_array_when_building_then_level_order_reproduces_present_values() {
    // Arrange
    let values = [Some(1), Some(2), Some(3), None, Some(4)];

    // Act
    let tree = build(&values, InputMode::Level);

    // Assert
    assert_eq!(values_of(&tree), vec![1, 2, 3, 4]);
}

#[rstest]
#[case(vec![])]
#[case(vec![None])]
#[case(vec![None, Some(1), Some(2)])]
fn given_empty_or_absent_root_when_building_level_then_tree_is_empty(
    #[case] values: Vec<Option<i64>>,
) {
    // Act
    let tree = build(&values, InputMode::Level);

    // Assert
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.len(), 0);
}

#[test]
fn given_children_of_absent_slots_when_building_level_then_they_are_not_attached() {
    // Arrange: 2 is absent so only 3 consumes the next pair
    let values = [Some(1), None, Some(3), Some(6), Some(7), Some(99)];

    // Act
    let tree = build(&values, InputMode::Level);

    // Assert
    let root = tree.root().expect("root");
    assert!(root.left().is_none());
    let three = root.right().expect("right");
    assert_eq!(three.left().map(|n| n.value), Some(6));
    assert_eq!(three.right().map(|n| n.value), Some(7));
    // 99 would be 6's left child
    assert_eq!(tree.node(2).and_then(|n| n.left()).map(|n| n.value), Some(99));
}

#[test]
fn given_trailing_slots_after_queue_runs_dry_when_building_level_then_ignored() {
    // Arrange: root has no children, so 5 and 6 have no parent
    let values = [Some(1), None, None, Some(5), Some(6)];

    // Act
    let tree = build(&values, InputMode::Level);

    // Assert
    assert_eq!(tree.len(), 1);
}

#[test]
fn given_preorder_array_when_building_then_nulls_terminate_branches() {
    // Arrange:   1
    //           / \
    //          2   3
    //           \
    //            4
    let values = [Some(1), Some(2), None, Some(4), None, None, Some(3), None, None];

    // Act
    let tree = build(&values, InputMode::Preorder);

    // Assert
    let inorder_values: Vec<i64> = inorder(&tree).into_iter().map(|n| n.value).collect();
    assert_eq!(inorder_values, vec![2, 4, 1, 3]);
    assert_eq!(tree.height(), 3);
}

#[test]
fn given_truncated_preorder_array_when_building_then_missing_tokens_are_absent() {
    // Act
    let tree = build(&[Some(1), Some(2)], InputMode::Preorder);

    // Assert
    let root = tree.root().expect("root");
    assert_eq!(root.left().map(|n| n.value), Some(2));
    assert!(root.right().is_none());
}

#[rstest]
#[case(InputMode::Level, vec![Some(1), Some(2), Some(3), Some(4)], vec![0, 1, 2, 3])]
#[case(InputMode::Preorder, vec![Some(1), Some(2), None, None, Some(3)], vec![0, 1, 2])]
fn given_fresh_allocator_when_building_then_ids_follow_creation_order(
    #[case] mode: InputMode,
    #[case] values: Vec<Option<i64>>,
    #[case] expected: Vec<NodeId>,
) {
    // Act
    let tree = build(&values, mode);

    // Assert: level mode creates breadth first, preorder mode in recursion order
    let ids: Vec<NodeId> = match mode {
        InputMode::Level => level_order(&tree).into_iter().map(|n| n.id).collect(),
        InputMode::Preorder => tree.nodes().map(|n| n.id).collect(),
    };
    assert_eq!(ids, expected);
}

#[test]
fn given_resetting_allocator_when_rebuilding_then_ids_restart() {
    // Arrange
    let mut builder = TreeBuilder::with_ids(IdAllocator::new(true));
    builder.build_level_order(&[Some(1), Some(2)]);

    // Act
    let second = builder.build_level_order(&[Some(9)]);

    // Assert
    assert_eq!(second.root().map(|n| n.id), Some(0));
}

#[test]
fn given_continuing_allocator_when_rebuilding_then_ids_stay_unique() {
    // Arrange
    let mut builder = TreeBuilder::with_ids(IdAllocator::new(false));
    let first = builder.build_level_order(&[Some(1), Some(2)]);

    // Act
    let second = builder.build_level_order(&[Some(9)]);

    // Assert
    assert_eq!(first.len(), 2);
    assert_eq!(second.root().map(|n| n.id), Some(2));
    assert_eq!(builder.ids().peek(), 3);
}

#[rstest]
#[case("level", InputMode::Level)]
#[case("BFS", InputMode::Level)]
#[case("pre-order", InputMode::Preorder)]
fn given_mode_name_when_parsing_then_maps_to_mode(#[case] raw: &str, #[case] expected: InputMode) {
    assert_eq!(raw.parse::<InputMode>().expect("known mode"), expected);
}

#[test]
fn given_unknown_mode_name_when_parsing_then_errors() {
    assert!("spiral".parse::<InputMode>().is_err());
}
