//! Execution trace generation.
//!
//! A trace is the chronological CALL / PROCESS / RETURN record of a simulated
//! walk, richer than the plain visit order. Depth-first traces follow the
//! recursive call structure: frames pushed on CALL and popped on RETURN
//! always equal the path from the root to the current node.
//!
//! Breadth-first traces are a simplification, not a call-stack model: every
//! dequeued node emits CALL, PROCESS and RETURN back to back, so the live
//! stack never holds more than one frame. This keeps the stack panel
//! meaningful for both modes.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::error::DomainError;
use crate::domain::traversal::TraversalKind;
use crate::domain::tree::{NodeId, Tree, TreeNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceAlgorithm {
    Preorder,
    Inorder,
    Postorder,
    Bfs,
}

impl fmt::Display for TraceAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraceAlgorithm::Preorder => "preorder",
            TraceAlgorithm::Inorder => "inorder",
            TraceAlgorithm::Postorder => "postorder",
            TraceAlgorithm::Bfs => "bfs",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TraceAlgorithm {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pre" | "preorder" => Ok(TraceAlgorithm::Preorder),
            "in" | "inorder" => Ok(TraceAlgorithm::Inorder),
            "post" | "postorder" => Ok(TraceAlgorithm::Postorder),
            "bfs" | "level" | "levelorder" => Ok(TraceAlgorithm::Bfs),
            other => Err(DomainError::UnknownTraceAlgorithm(other.to_string())),
        }
    }
}

impl From<TraversalKind> for TraceAlgorithm {
    fn from(kind: TraversalKind) -> Self {
        match kind {
            TraversalKind::Inorder => TraceAlgorithm::Inorder,
            TraversalKind::Preorder => TraceAlgorithm::Preorder,
            TraversalKind::Postorder => TraceAlgorithm::Postorder,
            TraversalKind::LevelOrder => TraceAlgorithm::Bfs,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Phase {
    Call,
    Process,
    Return,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Call => write!(f, "CALL"),
            Phase::Process => write!(f, "PROCESS"),
            Phase::Return => write!(f, "RETURN"),
        }
    }
}

/// One record of a trace. `parent_id` identifies the edge the call travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TraceEvent {
    pub sequence_index: usize,
    pub node_id: NodeId,
    pub phase: Phase,
    pub depth: usize,
    pub parent_id: Option<NodeId>,
}

/// A virtual call-stack entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackFrame<T> {
    pub node_id: NodeId,
    pub value: T,
}

/// Immutable output of one generator run, consumed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace<T> {
    algorithm: TraceAlgorithm,
    events: Vec<TraceEvent>,
    values: HashMap<NodeId, T>,
}

impl<T> Trace<T> {
    pub fn algorithm(&self) -> TraceAlgorithm {
        self.algorithm
    }

    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn value_of(&self, id: NodeId) -> Option<&T> {
        self.values.get(&id)
    }
}

impl<T: Clone> Trace<T> {
    pub fn frame(&self, id: NodeId) -> Option<StackFrame<T>> {
        self.value_of(id).map(|value| StackFrame {
            node_id: id,
            value: value.clone(),
        })
    }

    /// Node ids in PROCESS order.
    pub fn processed(&self) -> Vec<NodeId> {
        self.events
            .iter()
            .filter(|e| e.phase == Phase::Process)
            .map(|e| e.node_id)
            .collect()
    }
}

struct Emitter {
    events: Vec<TraceEvent>,
}

impl Emitter {
    fn emit(&mut self, node_id: NodeId, phase: Phase, depth: usize, parent_id: Option<NodeId>) {
        let sequence_index = self.events.len();
        self.events.push(TraceEvent {
            sequence_index,
            node_id,
            phase,
            depth,
            parent_id,
        });
    }
}

/// Simulate a walk of `tree`. An empty tree yields an empty trace.
#[instrument(level = "debug", skip(tree))]
pub fn generate_trace<T: Clone>(tree: &Tree<T>, algorithm: TraceAlgorithm) -> Trace<T> {
    let mut emitter = Emitter { events: Vec::new() };
    if let Some(root) = tree.root() {
        match algorithm {
            TraceAlgorithm::Bfs => emit_bfs(root, &mut emitter),
            order => emit_dfs(root, order, &mut emitter),
        }
    }
    debug!("generate_trace: {} events", emitter.events.len());

    Trace {
        algorithm,
        events: emitter.events,
        values: tree.nodes().map(|n| (n.id, n.value.clone())).collect(),
    }
}

/// Where a simulated call resumes when its frame is popped again.
#[derive(Clone, Copy)]
enum Resume {
    Enter,
    AfterLeft,
    AfterRight,
}

/// Depth-first emitter driven by an explicit frame stack, so chains of any
/// depth are traced without recursing.
fn emit_dfs<T>(root: &TreeNode<T>, order: TraceAlgorithm, emitter: &mut Emitter) {
    let mut frames: Vec<(&TreeNode<T>, usize, Option<NodeId>, Resume)> =
        vec![(root, 0, None, Resume::Enter)];

    while let Some((node, depth, parent_id, resume)) = frames.pop() {
        match resume {
            Resume::Enter => {
                emitter.emit(node.id, Phase::Call, depth, parent_id);
                if order == TraceAlgorithm::Preorder {
                    emitter.emit(node.id, Phase::Process, depth, parent_id);
                }
                frames.push((node, depth, parent_id, Resume::AfterLeft));
                if let Some(left) = node.left() {
                    frames.push((left, depth + 1, Some(node.id), Resume::Enter));
                }
            }
            Resume::AfterLeft => {
                if order == TraceAlgorithm::Inorder {
                    emitter.emit(node.id, Phase::Process, depth, parent_id);
                }
                frames.push((node, depth, parent_id, Resume::AfterRight));
                if let Some(right) = node.right() {
                    frames.push((right, depth + 1, Some(node.id), Resume::Enter));
                }
            }
            Resume::AfterRight => {
                if order == TraceAlgorithm::Postorder {
                    emitter.emit(node.id, Phase::Process, depth, parent_id);
                }
                emitter.emit(node.id, Phase::Return, depth, parent_id);
            }
        }
    }
}

fn emit_bfs<T>(root: &TreeNode<T>, emitter: &mut Emitter) {
    let mut queue = VecDeque::from([(root, 0usize, None)]);
    while let Some((node, depth, parent_id)) = queue.pop_front() {
        emitter.emit(node.id, Phase::Call, depth, parent_id);
        emitter.emit(node.id, Phase::Process, depth, parent_id);
        emitter.emit(node.id, Phase::Return, depth, parent_id);
        for child in node.children() {
            queue.push_back((child, depth + 1, Some(node.id)));
        }
    }
}

/// Virtual call stack replayed from trace events, with a depth tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct CallStack<T> {
    frames: Vec<StackFrame<T>>,
    max_depth: usize,
}

impl<T> Default for CallStack<T> {
    fn default() -> Self {
        Self {
            frames: Vec::new(),
            max_depth: 0,
        }
    }
}

impl<T: Clone> CallStack<T> {
    /// Push on CALL, pop on RETURN; PROCESS leaves the stack alone.
    pub fn apply(&mut self, event: &TraceEvent, trace: &Trace<T>) {
        match event.phase {
            Phase::Call => {
                if let Some(frame) = trace.frame(event.node_id) {
                    self.frames.push(frame);
                    self.max_depth = self.max_depth.max(self.frames.len());
                }
            }
            Phase::Return => {
                self.frames.pop();
            }
            Phase::Process => {}
        }
    }
}

impl<T> CallStack<T> {
    pub fn frames(&self) -> &[StackFrame<T>] {
        &self.frames
    }

    /// Number of live frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Deepest the stack has been since creation.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn top(&self) -> Option<&StackFrame<T>> {
        self.frames.last()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.max_depth = 0;
    }
}
