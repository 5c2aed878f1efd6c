//! Tests for the four traversal orders

use std::collections::HashSet;

use rstest::rstest;

use treewalk::domain::{
    traverse, InputMode, TraversalKind, Traversals, Tree, TreeBuilder,
};

fn sample() -> Tree<i64> {
    //        1
    //       / \
    //      2   3
    //     / \   \
    //    4   5   6
    TreeBuilder::new().build(
        &[Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(6)],
        InputMode::Level,
    )
}

fn values(tree: &Tree<i64>, kind: TraversalKind) -> Vec<i64> {
    traverse(tree, kind).into_iter().map(|n| n.value).collect()
}

#[rstest]
#[case(TraversalKind::Inorder, vec![4, 2, 5, 1, 3, 6])]
#[case(TraversalKind::Preorder, vec![1, 2, 4, 5, 3, 6])]
#[case(TraversalKind::Postorder, vec![4, 5, 2, 6, 3, 1])]
#[case(TraversalKind::LevelOrder, vec![1, 2, 3, 4, 5, 6])]
fn given_sample_tree_when_traversing_then_visits_in_order(
    #[case] kind: TraversalKind,
    #[case] expected: Vec<i64>,
) {
    // Arrange
    let tree = sample();

    // Act
    let visited = values(&tree, kind);

    // Assert
    assert_eq!(visited, expected);
}

#[rstest]
fn given_any_kind_when_traversing_then_each_node_appears_exactly_once(
    #[values(
        TraversalKind::Inorder,
        TraversalKind::Preorder,
        TraversalKind::Postorder,
        TraversalKind::LevelOrder
    )]
    kind: TraversalKind,
) {
    // Arrange
    let tree = sample();

    // Act
    let ids: Vec<usize> = traverse(&tree, kind).into_iter().map(|n| n.id).collect();

    // Assert
    let unique: HashSet<usize> = ids.iter().copied().collect();
    assert_eq!(ids.len(), tree.len());
    assert_eq!(unique.len(), tree.len());
}

#[test]
fn given_left_degenerate_tree_when_traversing_inorder_then_deepest_first() {
    // Arrange
    let tree = TreeBuilder::new().build(
        &[Some(3), Some(2), None, Some(1)],
        InputMode::Level,
    );

    // Act
    let visited = values(&tree, TraversalKind::Inorder);

    // Assert
    assert_eq!(visited, vec![1, 2, 3]);
}

#[rstest]
fn given_empty_tree_when_traversing_then_sequence_is_empty(
    #[values(
        TraversalKind::Inorder,
        TraversalKind::Preorder,
        TraversalKind::Postorder,
        TraversalKind::LevelOrder
    )]
    kind: TraversalKind,
) {
    assert!(traverse(&Tree::<i64>::new(), kind).is_empty());
}

#[test]
fn given_sample_tree_when_summarising_then_formats_array_literals() {
    // Arrange
    let tree = sample();

    // Act
    let summary = Traversals::from_tree(&tree);

    // Assert
    assert_eq!(summary.format(TraversalKind::Inorder), "[4,2,5,1,3,6]");
    assert_eq!(summary.format(TraversalKind::LevelOrder), "[1,2,3,4,5,6]");
    assert_eq!(summary.get(TraversalKind::Postorder), &[4, 5, 2, 6, 3, 1]);
}

#[test]
fn given_empty_tree_when_summarising_then_formats_empty_arrays() {
    let summary = Traversals::from_tree(&Tree::<i64>::new());
    assert_eq!(summary.format(TraversalKind::Preorder), "[]");
}

#[rstest]
#[case("in", TraversalKind::Inorder)]
#[case("PostOrder", TraversalKind::Postorder)]
#[case("level-order", TraversalKind::LevelOrder)]
fn given_kind_name_when_parsing_then_maps_to_kind(
    #[case] raw: &str,
    #[case] expected: TraversalKind,
) {
    assert_eq!(raw.parse::<TraversalKind>().expect("known kind"), expected);
}

#[test]
fn given_kind_when_displayed_then_round_trips_through_parse() {
    for kind in TraversalKind::ALL {
        assert_eq!(kind.to_string().parse::<TraversalKind>().expect("parse"), kind);
    }
}
