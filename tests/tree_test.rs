//! Tests for the tree model and its terminal rendering

use rstest::rstest;

use treewalk::domain::{InputMode, Tree, TreeBuilder, TreeNodeConvert};

fn level(values: &[Option<i64>]) -> Tree<i64> {
    TreeBuilder::new().build(values, InputMode::Level)
}

#[test]
fn given_built_tree_when_listing_edges_then_every_non_root_has_one_parent() {
    // Arrange
    let tree = level(&[Some(1), Some(2), Some(3), Some(4), None, Some(5), Some(6)]);

    // Act
    let edges = tree.edges();

    // Assert
    assert_eq!(edges.len(), tree.len() - 1);
    for node in tree.nodes().skip(1) {
        let parents = edges.iter().filter(|(_, child)| *child == node.id).count();
        assert_eq!(parents, 1, "node {}", node.id);
    }
}

#[test]
fn given_built_tree_when_rendering_then_prints_values_top_down() {
    // Arrange
    let tree = level(&[Some(1), Some(2), Some(3)]);

    // Act
    let rendered = tree.to_tree_string().to_string();

    // Assert
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "1");
    assert!(lines[1].ends_with('2'));
    assert!(lines[2].ends_with('3'));
}

#[test]
fn given_lone_right_child_when_rendering_then_left_slot_is_marked() {
    // Arrange
    let tree = level(&[Some(1), None, Some(2)]);

    // Act
    let rendered = tree.to_tree_string().to_string();

    // Assert
    let lines: Vec<&str> = rendered.lines().collect();
    assert!(lines[1].ends_with('·'), "rendered:\n{}", rendered);
    assert!(lines[2].ends_with('2'));
}

#[test]
fn given_deep_degenerate_tree_when_measuring_then_no_recursion_limit() {
    // Arrange: a right spine, encoded level by level
    let mut values = vec![Some(0)];
    for i in 1..2000 {
        values.push(None);
        values.push(Some(i));
    }

    // Act
    let tree = level(&values);

    // Assert
    assert_eq!(tree.len(), 2000);
    assert_eq!(tree.height(), 2000);
    assert_eq!(tree.depth_of(1999), Some(1999));
}

/// A chain of `len` nodes: a right spine for level order, a left spine for preorder.
fn chain_values(len: i64, mode: InputMode) -> Vec<Option<i64>> {
    match mode {
        InputMode::Level => std::iter::once(Some(0))
            .chain((1..len).flat_map(|i| [None, Some(i)]))
            .collect(),
        InputMode::Preorder => (0..len)
            .map(Some)
            .chain(std::iter::repeat(None).take(len as usize + 1))
            .collect(),
    }
}

#[rstest]
#[case(InputMode::Level)]
#[case(InputMode::Preorder)]
fn given_chain_of_200k_nodes_when_building_cloning_and_dropping_then_stack_survives(
    #[case] mode: InputMode,
) {
    // Arrange
    let values = chain_values(200_000, mode);

    // Act
    let tree = TreeBuilder::new().build(&values, mode);
    let copy = tree.clone();

    // Assert
    assert_eq!(tree.len(), 200_000);
    assert_eq!(tree.height(), 200_000);
    assert!(copy == tree);
    drop(tree);
    let mut copy = copy;
    copy.clear();
    assert!(copy.is_empty());
}
