//! Node layout: collision-free 2-D coordinates for every node.
//!
//! Vertical position depends on depth only. Horizontal position is assigned
//! top-down: children sit at `±spread(d)` from their parent, where
//! `spread(d) = max(base_spacing × 2^(H−d−2), min_spread)`.
//!
//! Sibling subtrees stay disjoint as long as `min_spread < 2 × base_spacing`:
//! the offset at any level then exceeds the sum of all offsets below it, so a
//! subtree never reaches across its parent. [`LayoutConfig::validate`] rejects
//! configurations that break this.
//!
//! The exponent is capped at [`MAX_SPREAD_EXPONENT`]. Trees up to
//! `MAX_SPREAD_EXPONENT + 2` levels get the exact series and the disjointness
//! guarantee. Taller trees keep a constant spread above that band: every
//! coordinate stays finite (and integral for integral settings) and every
//! child still sits at least `min_spread` from its parent.
//!
//! The recursion panel layout (one row per call) lives here as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::trace::{Phase, Trace};
use crate::domain::tree::{NodeId, Tree, TreeNode};

/// Layout tuning, loaded from the `[layout]` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// y of the root row
    pub base_offset: f64,
    /// Vertical distance between levels
    pub level_gap: f64,
    /// Multiplier of the geometric spread series
    pub base_spacing: f64,
    /// Lower bound for every level's spread; must stay below `2 × base_spacing`
    pub min_spread: f64,
    /// Left padding used when the tree does not fit the viewport
    pub left_margin: f64,
    /// Width of the rendering viewport
    pub viewport_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_offset: 60.0,
            level_gap: 90.0,
            base_spacing: 35.0,
            min_spread: 40.0,
            left_margin: 50.0,
            viewport_width: 1200.0,
        }
    }
}

/// Highest power of two applied to `base_spacing`.
pub const MAX_SPREAD_EXPONENT: i32 = 24;

impl LayoutConfig {
    /// Horizontal offset of children below a node at `depth` in a tree of `height` levels.
    pub fn spread(&self, height: usize, depth: usize) -> f64 {
        let exponent = (height as i64 - depth as i64 - 2).min(MAX_SPREAD_EXPONENT as i64) as i32;
        (self.base_spacing * 2f64.powi(exponent)).max(self.min_spread)
    }

    /// Check the settings can produce a collision-free layout.
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("base_offset", self.base_offset),
            ("level_gap", self.level_gap),
            ("base_spacing", self.base_spacing),
            ("min_spread", self.min_spread),
            ("left_margin", self.left_margin),
            ("viewport_width", self.viewport_width),
        ];
        if let Some((name, value)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("layout.{name} must be finite, got {value}"));
        }
        if self.base_spacing <= 0.0 || self.min_spread <= 0.0 {
            return Err("layout.base_spacing and layout.min_spread must be positive".to_string());
        }
        if self.min_spread >= 2.0 * self.base_spacing {
            return Err(format!(
                "layout.min_spread ({}) must be below twice layout.base_spacing ({})",
                self.min_spread, self.base_spacing
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub node_id: NodeId,
    pub x: f64,
    pub y: f64,
    pub depth: usize,
}

/// Positions of all nodes of one build. Recomputed from scratch on every build.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Layout {
    positions: BTreeMap<NodeId, Position>,
    min_x: f64,
    max_x: f64,
    canvas_width: f64,
    canvas_height: f64,
}

impl Layout {
    pub fn get(&self, id: NodeId) -> Option<&Position> {
        self.positions.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.positions.values()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Horizontal extent from leftmost to rightmost node.
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn min_x(&self) -> f64 {
        self.min_x
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    /// Drawing surface size: at least the viewport, larger if the tree overflows.
    pub fn canvas(&self) -> (f64, f64) {
        (self.canvas_width, self.canvas_height)
    }
}

/// Assign coordinates to every node of `tree`. Empty trees yield an empty layout.
#[instrument(level = "debug", skip(tree))]
pub fn compute_layout<T>(tree: &Tree<T>, config: &LayoutConfig) -> Layout {
    let Some(root) = tree.root() else {
        return Layout::default();
    };
    let height = tree.height();

    let mut positions = BTreeMap::new();
    let mut stack: Vec<(&TreeNode<T>, f64, usize)> = vec![(root, 0.0, 0)];
    while let Some((node, x, depth)) = stack.pop() {
        positions.insert(
            node.id,
            Position {
                node_id: node.id,
                x,
                y: config.base_offset + depth as f64 * config.level_gap,
                depth,
            },
        );
        let spread = config.spread(height, depth);
        if let Some(left) = node.left() {
            stack.push((left, x - spread, depth + 1));
        }
        if let Some(right) = node.right() {
            stack.push((right, x + spread, depth + 1));
        }
    }

    let (min_x, max_x) = positions
        .values()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
    let tree_width = max_x - min_x;

    let offset = if tree_width < config.viewport_width {
        config.viewport_width / 2.0 - (min_x + max_x) / 2.0
    } else {
        config.left_margin - min_x
    };
    debug!(
        "compute_layout: nodes={} height={} width={} offset={}",
        positions.len(),
        height,
        tree_width,
        offset
    );

    for position in positions.values_mut() {
        position.x += offset;
    }

    Layout {
        positions,
        min_x: min_x + offset,
        max_x: max_x + offset,
        canvas_width: config.viewport_width.max(tree_width + 150.0),
        canvas_height: height as f64 * config.level_gap + 150.0,
    }
}

/// Indent per call depth in the recursion panel.
pub const TRACE_INDENT: f64 = 50.0;
/// Left edge of depth-0 call boxes.
pub const TRACE_LEFT: f64 = 40.0;
/// First row of the recursion panel.
pub const TRACE_TOP: f64 = 40.0;
/// Distance between call rows.
pub const TRACE_ROW_GAP: f64 = 70.0;
/// Return boxes sit to the right of their call box.
pub const TRACE_RETURN_SHIFT: f64 = 130.0;

/// One box of the recursion panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TraceBox {
    pub sequence_index: usize,
    pub node_id: NodeId,
    pub phase: Phase,
    pub x: f64,
    pub y: f64,
}

/// Place CALL and RETURN events of a trace into rows.
///
/// Each CALL opens a new row indented by depth; its RETURN lands on the same
/// row further right. PROCESS events have no box of their own.
pub fn compute_trace_layout<T>(trace: &Trace<T>) -> Vec<TraceBox> {
    let mut boxes = Vec::new();
    let mut open_rows: BTreeMap<NodeId, (f64, f64)> = BTreeMap::new();
    let mut cursor_y = TRACE_TOP;

    for event in trace.events() {
        match event.phase {
            Phase::Call => {
                let x = TRACE_LEFT + event.depth as f64 * TRACE_INDENT;
                open_rows.insert(event.node_id, (x, cursor_y));
                boxes.push(TraceBox {
                    sequence_index: event.sequence_index,
                    node_id: event.node_id,
                    phase: Phase::Call,
                    x,
                    y: cursor_y,
                });
                cursor_y += TRACE_ROW_GAP;
            }
            Phase::Return => {
                if let Some((x, y)) = open_rows.remove(&event.node_id) {
                    boxes.push(TraceBox {
                        sequence_index: event.sequence_index,
                        node_id: event.node_id,
                        phase: Phase::Return,
                        x: x + TRACE_RETURN_SHIFT,
                        y,
                    });
                }
            }
            Phase::Process => {}
        }
    }
    boxes
}
