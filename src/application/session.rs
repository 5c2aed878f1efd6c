//! Session context: one tree, its layout and one playback controller.
//!
//! Everything that used to be ambient state lives here and is passed
//! explicitly. A rebuild replaces tree, layout and traversal summary together
//! and forces the controller back to Idle, so no step can refer to a
//! superseded tree.

use std::time::Duration;

use tracing::{debug, info, instrument};

use crate::application::error_ext::IoResultExt;
use crate::application::playback::{PlaybackController, PlaybackState, StepEffect, TimerHandle};
use crate::application::render::{RenderFrame, RenderSurface};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    compute_layout, compute_trace_layout, generate_trace, parse_array, IdAllocator, InputMode,
    Layout, LayoutConfig, Trace, TraceAlgorithm, TraceBox, TraversalKind, Traversals, Tree,
    TreeBuilder,
};
use crate::infrastructure::traits::{SlotStore, Ticker};

/// Slot used to hand the last array over to another instance.
pub const DEFAULT_SLOT: &str = "treeData";

pub struct Session {
    layout_config: LayoutConfig,
    default_mode: InputMode,
    builder: TreeBuilder,
    tree: Tree<i64>,
    layout: Layout,
    traversals: Traversals<i64>,
    trace: Option<Trace<i64>>,
    controller: PlaybackController<i64>,
    last_input: Option<String>,
}

impl Session {
    pub fn new(settings: &Settings) -> Self {
        Self {
            layout_config: settings.layout.clone(),
            default_mode: settings.builder.default_mode,
            builder: TreeBuilder::with_ids(IdAllocator::new(settings.builder.reset_ids_on_rebuild)),
            tree: Tree::new(),
            layout: Layout::default(),
            traversals: Traversals::default(),
            trace: None,
            controller: PlaybackController::new(settings.playback.interval()),
            last_input: None,
        }
    }

    pub fn tree(&self) -> &Tree<i64> {
        &self.tree
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn traversals(&self) -> &Traversals<i64> {
        &self.traversals
    }

    pub fn controller(&self) -> &PlaybackController<i64> {
        &self.controller
    }

    pub fn state(&self) -> PlaybackState {
        self.controller.state()
    }

    pub fn default_mode(&self) -> InputMode {
        self.default_mode
    }

    /// Raw text of the last successful build.
    pub fn last_input(&self) -> Option<&str> {
        self.last_input.as_deref()
    }

    /// The trace of the last `start_trace`, if any.
    pub fn trace(&self) -> Option<&Trace<i64>> {
        self.trace.as_ref()
    }

    /// Parse `raw` and replace the tree.
    ///
    /// Malformed input is rejected before anything changes.
    #[instrument(level = "debug", skip(self))]
    pub fn build(&mut self, raw: &str, mode: InputMode) -> ApplicationResult<&Tree<i64>> {
        let values = parse_array(raw)?;
        self.replace_tree(&values, mode);
        self.last_input = Some(raw.trim().to_string());
        Ok(&self.tree)
    }

    /// Build from already parsed values.
    pub fn build_values(&mut self, values: &[Option<i64>], mode: InputMode) -> &Tree<i64> {
        self.replace_tree(values, mode);
        self.last_input = Some(format_values(values));
        &self.tree
    }

    fn replace_tree(&mut self, values: &[Option<i64>], mode: InputMode) {
        self.controller.invalidate();
        self.trace = None;
        self.tree = self.builder.build(values, mode);
        self.layout = compute_layout(&self.tree, &self.layout_config);
        self.traversals = Traversals::from_tree(&self.tree);
        info!(
            "build: {} nodes, height {} ({} mode)",
            self.tree.len(),
            self.tree.height(),
            mode
        );
    }

    /// Lay the current tree out again for a different viewport width.
    pub fn set_viewport_width(&mut self, width: f64) {
        self.layout_config.viewport_width = width;
        self.layout = compute_layout(&self.tree, &self.layout_config);
    }

    pub fn start(&mut self, kind: TraversalKind) -> Option<TimerHandle> {
        self.trace = None;
        self.controller.start(&self.tree, kind)
    }

    pub fn start_trace(&mut self, algorithm: TraceAlgorithm) -> Option<TimerHandle> {
        let trace = generate_trace(&self.tree, algorithm);
        self.trace = Some(trace.clone());
        self.controller.start_trace(trace)
    }

    pub fn pause(&mut self) -> bool {
        self.controller.pause()
    }

    pub fn step(&mut self) -> Option<StepEffect> {
        self.controller.step()
    }

    pub fn tick(&mut self, handle: TimerHandle) -> Option<StepEffect> {
        self.controller.tick(handle)
    }

    pub fn reset(&mut self) {
        self.controller.reset();
    }

    pub fn set_interval(&mut self, interval: Duration) -> Option<TimerHandle> {
        self.controller.set_interval(interval)
    }

    /// Boxes of the recursion panel for the current trace.
    pub fn trace_layout(&self) -> Vec<TraceBox> {
        self.trace.as_ref().map(compute_trace_layout).unwrap_or_default()
    }

    pub fn frame(&self) -> RenderFrame<i64> {
        RenderFrame::compose(&self.tree, &self.layout, &self.controller)
    }

    pub fn render_to(&self, surface: &mut dyn RenderSurface<i64>) {
        surface.render(&self.frame());
    }

    /// Tick until the timer stops, rendering after every applied step.
    ///
    /// Returns the number of steps applied.
    pub fn run_automatic(
        &mut self,
        ticker: &dyn Ticker,
        surface: &mut dyn RenderSurface<i64>,
    ) -> usize {
        let mut applied = 0;
        while let Some(handle) = self.controller.timer() {
            ticker.wait(handle.interval());
            if self.controller.tick(handle).is_some() {
                applied += 1;
                self.render_to(surface);
            }
        }
        debug!("run_automatic: applied {} steps, now {}", applied, self.state());
        applied
    }

    /// Save the last successful input under `key`. Returns false if nothing was built yet.
    pub fn export_to(&self, store: &dyn SlotStore, key: &str) -> ApplicationResult<bool> {
        let Some(raw) = self.last_input.as_deref() else {
            debug!("export_to: nothing built yet");
            return Ok(false);
        };
        store.put(key, raw).with_slot_context("save slot", key)?;
        info!("export_to: saved slot {}", key);
        Ok(true)
    }

    /// Rebuild from the value stored under `key`.
    ///
    /// A missing slot is `Ok(None)` and leaves the session untouched.
    pub fn import_from(
        &mut self,
        store: &dyn SlotStore,
        key: &str,
        mode: InputMode,
    ) -> ApplicationResult<Option<&Tree<i64>>> {
        let Some(entry) = store.get(key).with_slot_context("read slot", key)? else {
            debug!("import_from: slot {} is empty", key);
            return Ok(None);
        };
        self.build(&entry.value, mode).map(Some)
    }
}

fn format_values(values: &[Option<i64>]) -> String {
    let items: Vec<String> = values
        .iter()
        .map(|v| v.map_or_else(|| "null".to_string(), |n| n.to_string()))
        .collect();
    format!("[{}]", items.join(", "))
}
