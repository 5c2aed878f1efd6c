//! Binary tree model.
//!
//! Every node owns its children exclusively, so the structure is acyclic by
//! construction. Trees are only ever created or replaced wholesale by the
//! [`TreeBuilder`](crate::domain::TreeBuilder).

use std::collections::VecDeque;
use std::fmt;

use termtree::Tree as DisplayTree;

/// Identifier issued by an [`IdAllocator`](crate::domain::IdAllocator) during a build.
pub type NodeId = usize;

/// Which child slot of a parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode<T> {
    pub id: NodeId,
    pub value: T,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T> TreeNode<T> {
    pub fn new(id: NodeId, value: T) -> Self {
        Self {
            id,
            value,
            left: None,
            right: None,
        }
    }

    pub fn left(&self) -> Option<&TreeNode<T>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&TreeNode<T>> {
        self.right.as_deref()
    }

    pub fn child(&self, side: Side) -> Option<&TreeNode<T>> {
        match side {
            Side::Left => self.left(),
            Side::Right => self.right(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// Present children, left before right.
    pub fn children(&self) -> impl Iterator<Item = &TreeNode<T>> {
        self.left().into_iter().chain(self.right())
    }
}

/// A binary tree; empty exactly when it has no root.
///
/// Clone, equality and drop walk the nodes with an explicit stack, so a
/// degenerate chain of any length never exhausts the thread stack.
#[derive(Debug)]
pub struct Tree<T> {
    root: Option<Box<TreeNode<T>>>,
}

impl<T> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Tree<T> {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn from_root(root: TreeNode<T>) -> Self {
        Self {
            root: Some(Box::new(root)),
        }
    }

    pub fn root(&self) -> Option<&TreeNode<T>> {
        self.root.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Discard the whole structure.
    pub fn clear(&mut self) {
        dismantle(self.root.take());
    }

    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Number of levels: 0 for an empty tree, 1 for a lone root.
    pub fn height(&self) -> usize {
        self.nodes_with_depth()
            .map(|(_, depth)| depth + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn node(&self, id: NodeId) -> Option<&TreeNode<T>> {
        self.nodes().find(|node| node.id == id)
    }

    /// Depth of a node, root at 0.
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        self.nodes_with_depth()
            .find(|(node, _)| node.id == id)
            .map(|(_, depth)| depth)
    }

    /// Parent → child pairs in preorder.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes()
            .flat_map(|node| node.children().map(move |child| (node.id, child.id)))
            .collect()
    }

    /// Nodes in preorder. Stack based, so deep trees do not recurse.
    pub fn nodes(&self) -> NodeIterator<'_, T> {
        NodeIterator::new(self)
    }

    /// Nodes paired with their depth, breadth first.
    pub fn nodes_with_depth(&self) -> impl Iterator<Item = (&TreeNode<T>, usize)> {
        let mut queue: VecDeque<(&TreeNode<T>, usize)> =
            self.root().map(|r| (r, 0)).into_iter().collect();
        std::iter::from_fn(move || {
            let (node, depth) = queue.pop_front()?;
            for child in node.children() {
                queue.push_back((child, depth + 1));
            }
            Some((node, depth))
        })
    }
}

/// Unlink every node before it is freed so no drop recurses into children.
fn dismantle<T>(root: Option<Box<TreeNode<T>>>) {
    let mut stack: Vec<Box<TreeNode<T>>> = root.into_iter().collect();
    while let Some(mut node) = stack.pop() {
        stack.extend(node.left.take());
        stack.extend(node.right.take());
    }
}

impl<T> Drop for Tree<T> {
    fn drop(&mut self) {
        dismantle(self.root.take());
    }
}

impl<T: Clone> Clone for Tree<T> {
    /// Rebuilds bottom-up from reversed preorder: each subtree is finished
    /// before its parent, with the left subtree on top of the right one.
    fn clone(&self) -> Self {
        let order: Vec<&TreeNode<T>> = self.nodes().collect();
        let mut finished: Vec<Box<TreeNode<T>>> = Vec::new();
        for node in order.into_iter().rev() {
            let mut copy = TreeNode::new(node.id, node.value.clone());
            if node.left.is_some() {
                copy.left = finished.pop();
            }
            if node.right.is_some() {
                copy.right = finished.pop();
            }
            finished.push(Box::new(copy));
        }
        Self {
            root: finished.pop(),
        }
    }
}

impl<T: PartialEq> PartialEq for Tree<T> {
    /// Preorder plus child presence pins down the shape.
    fn eq(&self, other: &Self) -> bool {
        let mut lhs = self.nodes();
        let mut rhs = other.nodes();
        loop {
            match (lhs.next(), rhs.next()) {
                (None, None) => return true,
                (Some(a), Some(b))
                    if a.id == b.id
                        && a.value == b.value
                        && a.left.is_some() == b.left.is_some()
                        && a.right.is_some() == b.right.is_some() => {}
                _ => return false,
            }
        }
    }
}

impl<T: Eq> Eq for Tree<T> {}

pub struct NodeIterator<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> NodeIterator<'a, T> {
    fn new(tree: &'a Tree<T>) -> Self {
        Self {
            stack: tree.root().into_iter().collect(),
        }
    }
}

impl<'a, T> Iterator for NodeIterator<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Right first so that left is popped first
        if let Some(right) = node.right() {
            self.stack.push(right);
        }
        if let Some(left) = node.left() {
            self.stack.push(left);
        }
        Some(node)
    }
}

/// Conversion into a printable `termtree` structure.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> DisplayTree<String>;
}

impl<T: fmt::Display> TreeNodeConvert for TreeNode<T> {
    fn to_tree_string(&self) -> DisplayTree<String> {
        let mut tree = DisplayTree::new(self.value.to_string());
        // A lone child is ambiguous without a marker for the missing side
        if !self.is_leaf() {
            for side in [Side::Left, Side::Right] {
                match self.child(side) {
                    Some(child) => tree.push(child.to_tree_string()),
                    None => tree.push(DisplayTree::new("·".to_string())),
                };
            }
        }
        tree
    }
}

impl<T: fmt::Display> TreeNodeConvert for Tree<T> {
    fn to_tree_string(&self) -> DisplayTree<String> {
        match self.root() {
            Some(root) => root.to_tree_string(),
            None => DisplayTree::new("Empty tree".to_string()),
        }
    }
}
