//! Rendering-surface contract.
//!
//! The core hands a surface everything it needs to draw one frame and asks
//! nothing back. How nodes and edges are drawn is the surface's business.

use serde::Serialize;

use crate::application::playback::{PlaybackController, PlaybackState};
use crate::domain::{Layout, NodeId, StackFrame, Tree};

/// Per-node visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    #[default]
    Default,
    /// Current node of a plain traversal
    Active,
    /// Already passed by a plain traversal
    Visited,
    /// Trace: call entered
    Call,
    /// Trace: node processed
    Process,
    /// Trace: call returning
    Return,
    /// Trace: call finished
    Done,
}

/// Traffic direction on a parent → child edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeDirection {
    #[default]
    None,
    Call,
    Return,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderNode<T> {
    pub id: NodeId,
    pub value: T,
    pub x: f64,
    pub y: f64,
    pub state: VisualState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderEdge {
    pub parent_id: NodeId,
    pub child_id: NodeId,
    pub direction: EdgeDirection,
}

/// Everything a surface needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame<T> {
    pub nodes: Vec<RenderNode<T>>,
    pub edges: Vec<RenderEdge>,
    pub state: PlaybackState,
    /// Steps applied so far
    pub cursor: usize,
    /// Length of the active step sequence, 0 when idle
    pub total: usize,
    pub summary: String,
    pub output: Vec<T>,
    pub stack: Vec<StackFrame<T>>,
    pub max_depth: usize,
}

impl<T: Clone> RenderFrame<T> {
    /// Combine tree shape, positions and playback view into one frame.
    pub fn compose(tree: &Tree<T>, layout: &Layout, controller: &PlaybackController<T>) -> Self {
        let view = controller.session().map(|s| s.view());

        let nodes = tree
            .nodes()
            .map(|node| {
                let (x, y) = layout.get(node.id).map(|p| (p.x, p.y)).unwrap_or_default();
                RenderNode {
                    id: node.id,
                    value: node.value.clone(),
                    x,
                    y,
                    state: view.map(|v| v.node_state(node.id)).unwrap_or_default(),
                }
            })
            .collect();

        let edges = tree
            .edges()
            .into_iter()
            .map(|(parent_id, child_id)| RenderEdge {
                parent_id,
                child_id,
                direction: view
                    .map(|v| v.edge_direction(parent_id, child_id))
                    .unwrap_or_default(),
            })
            .collect();

        Self {
            nodes,
            edges,
            state: controller.state(),
            cursor: controller.session().map(|s| s.index()).unwrap_or(0),
            total: controller.session().map(|s| s.len()).unwrap_or(0),
            summary: view.map(|v| v.summary().to_string()).unwrap_or_default(),
            output: view.map(|v| v.output().to_vec()).unwrap_or_default(),
            stack: view.map(|v| v.stack().frames().to_vec()).unwrap_or_default(),
            max_depth: view.map(|v| v.stack().max_depth()).unwrap_or(0),
        }
    }
}

impl<T> RenderFrame<T> {
    pub fn node(&self, id: NodeId) -> Option<&RenderNode<T>> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// A consumer of frames. Implemented by the terminal front end and by tests.
pub trait RenderSurface<T> {
    fn render(&mut self, frame: &RenderFrame<T>);
}
