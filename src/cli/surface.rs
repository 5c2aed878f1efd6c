//! Terminal render surface: one coloured tree snapshot per frame.

use std::fmt::Display;

use termtree::Tree as DisplayTree;

use crate::application::{RenderFrame, RenderSurface};
use crate::cli::output;
use crate::domain::{Side, Tree, TreeNode};

/// Prints frames to stdout using the tree shape captured at construction.
pub struct TerminalSurface<T> {
    tree: Tree<T>,
    frames: usize,
}

impl<T> TerminalSurface<T> {
    pub fn new(tree: Tree<T>) -> Self {
        Self { tree, frames: 0 }
    }

    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl<T: Display> TerminalSurface<T> {
    fn colour(&self, node: &TreeNode<T>, frame: &RenderFrame<T>) -> DisplayTree<String> {
        let state = frame.node(node.id).map(|n| n.state).unwrap_or_default();
        let label = output::node_label(&node.value.to_string(), state);
        let mut out = DisplayTree::new(label.to_string());
        if !node.is_leaf() {
            for side in [Side::Left, Side::Right] {
                match node.child(side) {
                    Some(child) => out.push(self.colour(child, frame)),
                    None => out.push(DisplayTree::new("·".to_string())),
                };
            }
        }
        out
    }
}

impl<T: Display> RenderSurface<T> for TerminalSurface<T> {
    fn render(&mut self, frame: &RenderFrame<T>) {
        self.frames += 1;
        output::header(&format!("[{}/{}] {}", frame.cursor, frame.total, frame.state));
        if let Some(root) = self.tree.root() {
            output::info(&self.colour(root, frame));
        }
        if !frame.summary.is_empty() {
            output::detail(&frame.summary);
        }
        if !frame.output.is_empty() {
            let values: Vec<String> = frame.output.iter().map(|v| v.to_string()).collect();
            output::detail(&format!("output: [{}]", values.join(", ")));
        }
        if frame.max_depth > 0 {
            output::detail(&format!(
                "depth {} (max {})",
                frame.stack.len(),
                frame.max_depth
            ));
        }
    }
}
