//! Traversal algorithms.
//!
//! All four orders yield node references so callers can read id, value and
//! children. Each is a permutation of the tree's nodes. Depth-first orders
//! keep an explicit stack bounded by the tree height, level order keeps a
//! queue bounded by the widest level.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::tree::{Tree, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraversalKind {
    Inorder,
    Preorder,
    Postorder,
    #[serde(rename = "levelorder")]
    LevelOrder,
}

impl TraversalKind {
    pub const ALL: [TraversalKind; 4] = [
        TraversalKind::Inorder,
        TraversalKind::Preorder,
        TraversalKind::Postorder,
        TraversalKind::LevelOrder,
    ];
}

impl fmt::Display for TraversalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalKind::Inorder => "inorder",
            TraversalKind::Preorder => "preorder",
            TraversalKind::Postorder => "postorder",
            TraversalKind::LevelOrder => "levelorder",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TraversalKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "in" | "inorder" => Ok(TraversalKind::Inorder),
            "pre" | "preorder" => Ok(TraversalKind::Preorder),
            "post" | "postorder" => Ok(TraversalKind::Postorder),
            "level" | "levelorder" | "level-order" | "bfs" => Ok(TraversalKind::LevelOrder),
            other => Err(DomainError::UnknownTraversal(other.to_string())),
        }
    }
}

/// Node, then left subtree, then right subtree.
pub struct PreorderIter<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for PreorderIter<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Push right first for left-to-right order
        self.stack.extend(node.right());
        self.stack.extend(node.left());
        Some(node)
    }
}

/// Left subtree, then node, then right subtree.
pub struct InorderIter<'a, T> {
    stack: Vec<&'a TreeNode<T>>,
    current: Option<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for InorderIter<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.current {
            self.stack.push(node);
            self.current = node.left();
        }
        let node = self.stack.pop()?;
        self.current = node.right();
        Some(node)
    }
}

/// Left subtree, then right subtree, then node.
pub struct PostorderIter<'a, T> {
    stack: Vec<(&'a TreeNode<T>, bool)>,
}

impl<'a, T> Iterator for PostorderIter<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, expanded)) = self.stack.pop() {
            if expanded {
                return Some(node);
            }
            self.stack.push((node, true));
            if let Some(right) = node.right() {
                self.stack.push((right, false));
            }
            if let Some(left) = node.left() {
                self.stack.push((left, false));
            }
        }
        None
    }
}

/// Breadth first from the root.
pub struct LevelOrderIter<'a, T> {
    queue: VecDeque<&'a TreeNode<T>>,
}

impl<'a, T> Iterator for LevelOrderIter<'a, T> {
    type Item = &'a TreeNode<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children());
        Some(node)
    }
}

pub fn preorder_iter<T>(tree: &Tree<T>) -> PreorderIter<'_, T> {
    PreorderIter {
        stack: tree.root().into_iter().collect(),
    }
}

pub fn inorder_iter<T>(tree: &Tree<T>) -> InorderIter<'_, T> {
    InorderIter {
        stack: Vec::new(),
        current: tree.root(),
    }
}

pub fn postorder_iter<T>(tree: &Tree<T>) -> PostorderIter<'_, T> {
    PostorderIter {
        stack: tree.root().map(|root| (root, false)).into_iter().collect(),
    }
}

pub fn level_order_iter<T>(tree: &Tree<T>) -> LevelOrderIter<'_, T> {
    LevelOrderIter {
        queue: tree.root().into_iter().collect(),
    }
}

pub fn inorder<T>(tree: &Tree<T>) -> Vec<&TreeNode<T>> {
    inorder_iter(tree).collect()
}

pub fn preorder<T>(tree: &Tree<T>) -> Vec<&TreeNode<T>> {
    preorder_iter(tree).collect()
}

pub fn postorder<T>(tree: &Tree<T>) -> Vec<&TreeNode<T>> {
    postorder_iter(tree).collect()
}

pub fn level_order<T>(tree: &Tree<T>) -> Vec<&TreeNode<T>> {
    level_order_iter(tree).collect()
}

pub fn traverse<T>(tree: &Tree<T>, kind: TraversalKind) -> Vec<&TreeNode<T>> {
    match kind {
        TraversalKind::Inorder => inorder(tree),
        TraversalKind::Preorder => preorder(tree),
        TraversalKind::Postorder => postorder(tree),
        TraversalKind::LevelOrder => level_order(tree),
    }
}

/// Value sequences of all four orders, computed once per build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Traversals<T> {
    pub inorder: Vec<T>,
    pub preorder: Vec<T>,
    pub postorder: Vec<T>,
    pub level_order: Vec<T>,
}

impl<T: Clone> Traversals<T> {
    pub fn from_tree(tree: &Tree<T>) -> Self {
        let values = |nodes: Vec<&TreeNode<T>>| -> Vec<T> {
            nodes.into_iter().map(|n| n.value.clone()).collect()
        };
        Self {
            inorder: values(inorder(tree)),
            preorder: values(preorder(tree)),
            postorder: values(postorder(tree)),
            level_order: values(level_order(tree)),
        }
    }
}

impl<T> Traversals<T> {
    pub fn get(&self, kind: TraversalKind) -> &[T] {
        match kind {
            TraversalKind::Inorder => &self.inorder,
            TraversalKind::Preorder => &self.preorder,
            TraversalKind::Postorder => &self.postorder,
            TraversalKind::LevelOrder => &self.level_order,
        }
    }
}

impl<T: fmt::Display> Traversals<T> {
    /// Array literal form, e.g. `[4,2,5,1,3]`.
    pub fn format(&self, kind: TraversalKind) -> String {
        format!("[{}]", self.get(kind).iter().join(","))
    }
}
