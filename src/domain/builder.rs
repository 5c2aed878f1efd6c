//! Tree builder for flattened array encodings.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::tree::{NodeId, Side, Tree, TreeNode};

/// Flattened encoding of the input array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Breadth first, children consumed two slots at a time
    #[default]
    Level,
    /// Recursive descent with `null` terminating a branch
    Preorder,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::Level => write!(f, "level"),
            InputMode::Preorder => write!(f, "preorder"),
        }
    }
}

impl FromStr for InputMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "level" | "levelorder" | "level-order" | "bfs" => Ok(InputMode::Level),
            "pre" | "preorder" | "pre-order" => Ok(InputMode::Preorder),
            other => Err(DomainError::UnknownInputMode(other.to_string())),
        }
    }
}

/// Issues node identifiers for one construction session.
///
/// Whether identifiers restart at zero on every build is decided by the owner
/// through `reset_on_rebuild`.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: NodeId,
    reset_on_rebuild: bool,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl IdAllocator {
    pub fn new(reset_on_rebuild: bool) -> Self {
        Self {
            next: 0,
            reset_on_rebuild,
        }
    }

    pub fn resets_on_rebuild(&self) -> bool {
        self.reset_on_rebuild
    }

    /// Called once at the start of every build.
    pub fn begin_build(&mut self) {
        if self.reset_on_rebuild {
            self.next = 0;
        }
    }

    pub fn issue(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The identifier the next node would receive.
    pub fn peek(&self) -> NodeId {
        self.next
    }
}

/// Constructs trees from level-order or preorder encodings.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    ids: IdAllocator,
}

/// Node under construction, children referenced by creation index.
struct Pending<T> {
    id: NodeId,
    value: T,
    left: Option<usize>,
    right: Option<usize>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: IdAllocator) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &IdAllocator {
        &self.ids
    }

    pub fn build<T: Clone + fmt::Debug>(
        &mut self,
        values: &[Option<T>],
        mode: InputMode,
    ) -> Tree<T> {
        match mode {
            InputMode::Level => self.build_level_order(values),
            InputMode::Preorder => self.build_preorder(values),
        }
    }

    /// Build from a level-order encoding.
    ///
    /// Slots after the root are consumed two at a time (left, right) for each
    /// node dequeued in creation order. Absent slots produce no node and are
    /// never enqueued. Slots left over once the queue runs dry are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn build_level_order<T: Clone + fmt::Debug>(&mut self, values: &[Option<T>]) -> Tree<T> {
        self.ids.begin_build();
        let Some(Some(root_value)) = values.first() else {
            debug!("build_level_order: empty input or absent root");
            return Tree::new();
        };

        let mut pending = vec![Pending {
            id: self.ids.issue(),
            value: root_value.clone(),
            left: None,
            right: None,
        }];
        let mut queue = VecDeque::from([0usize]);
        let mut slots = values[1..].iter();

        while let Some(parent) = queue.pop_front() {
            let Some(left) = slots.next() else { break };
            if let Some(value) = left {
                let idx = self.push_pending(&mut pending, value.clone());
                pending[parent].left = Some(idx);
                queue.push_back(idx);
            }
            let Some(right) = slots.next() else { break };
            if let Some(value) = right {
                let idx = self.push_pending(&mut pending, value.clone());
                pending[parent].right = Some(idx);
                queue.push_back(idx);
            }
        }

        let ignored = slots.count();
        if ignored > 0 {
            debug!("build_level_order: ignored {} trailing slots", ignored);
        }
        assemble(pending).map(Tree::from_root).unwrap_or_default()
    }

    /// Build from a preorder encoding with absent markers.
    ///
    /// Each absent token terminates a branch and consumes exactly one slot.
    /// Running out of tokens closes every open branch. Tokens remaining after
    /// the tree is complete are ignored.
    #[instrument(level = "debug", skip(self))]
    pub fn build_preorder<T: Clone + fmt::Debug>(&mut self, values: &[Option<T>]) -> Tree<T> {
        self.ids.begin_build();
        let Some(Some(root_value)) = values.first() else {
            debug!("build_preorder: empty input or absent root");
            return Tree::new();
        };

        let mut pending = vec![Pending {
            id: self.ids.issue(),
            value: root_value.clone(),
            left: None,
            right: None,
        }];
        // Open child slots, innermost on top
        let mut open = vec![(0usize, Side::Left)];
        let mut tokens = values[1..].iter();

        while let Some((parent, side)) = open.pop() {
            let Some(token) = tokens.next() else { break };
            if side == Side::Left {
                open.push((parent, Side::Right));
            }
            if let Some(value) = token {
                let idx = self.push_pending(&mut pending, value.clone());
                match side {
                    Side::Left => pending[parent].left = Some(idx),
                    Side::Right => pending[parent].right = Some(idx),
                }
                open.push((idx, Side::Left));
            }
        }

        let ignored = tokens.count();
        if ignored > 0 {
            debug!("build_preorder: ignored {} trailing tokens", ignored);
        }
        assemble(pending).map(Tree::from_root).unwrap_or_default()
    }

    fn push_pending<T>(&mut self, pending: &mut Vec<Pending<T>>, value: T) -> usize {
        pending.push(Pending {
            id: self.ids.issue(),
            value,
            left: None,
            right: None,
        });
        pending.len() - 1
    }
}

/// Turn index-linked nodes into owned boxes.
///
/// Children are always created after their parent, so walking backwards
/// finishes every child before its parent needs it.
fn assemble<T>(pending: Vec<Pending<T>>) -> Option<TreeNode<T>> {
    let mut built: Vec<Option<TreeNode<T>>> = Vec::with_capacity(pending.len());
    built.resize_with(pending.len(), || None);

    for (idx, p) in pending.into_iter().enumerate().rev() {
        let mut node = TreeNode::new(p.id, p.value);
        node.left = p.left.and_then(|c| built[c].take()).map(Box::new);
        node.right = p.right.and_then(|c| built[c].take()).map(Box::new);
        built[idx] = Some(node);
    }

    built.into_iter().next().flatten()
}
