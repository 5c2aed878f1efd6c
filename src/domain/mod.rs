//! Domain layer: tree model and pure algorithms
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod error;
pub mod input;
pub mod layout;
pub mod trace;
pub mod traversal;
pub mod tree;

pub use builder::{IdAllocator, InputMode, TreeBuilder};
pub use error::DomainError;
pub use input::parse_array;
pub use layout::{compute_layout, compute_trace_layout, Layout, LayoutConfig, Position, TraceBox};
pub use trace::{generate_trace, CallStack, Phase, StackFrame, Trace, TraceAlgorithm, TraceEvent};
pub use traversal::{
    inorder, level_order, postorder, preorder, traverse, TraversalKind, Traversals,
};
pub use tree::{NodeId, Side, Tree, TreeNode, TreeNodeConvert};
