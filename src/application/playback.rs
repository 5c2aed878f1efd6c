//! Playback controller: the state machine that steps through a precomputed program.
//!
//! ```text
//!            start                pause
//!   Idle ───────────→ Running ───────────→ Paused ──┐ step
//!    ↑                   │                   │  ↑   │
//!    │ reset/rebuild     │ last tick         │  └───┘
//!    │                   ↓                   │ last step
//!    └──────────────  Completed  ←───────────┘
//! ```
//!
//! Automatic ticks and manual steps both pull the next effect from the same
//! [`PlaybackSession`] iterator, so their per-step side effects are identical.
//! Every transition that cancels the timer bumps a generation counter; a tick
//! carrying an older generation is stale and dropped without touching state.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use itertools::Itertools;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::application::render::{EdgeDirection, VisualState};
use crate::domain::{traverse, CallStack, NodeId, Phase, Trace, TraversalKind, Tree};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Idle,
    Running,
    Paused,
    Completed,
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Running => "running",
            PlaybackState::Paused => "paused",
            PlaybackState::Completed => "completed",
        };
        write!(f, "{}", name)
    }
}

/// Permission for one automatic tick, valid until the timer is cancelled or restarted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    generation: u64,
    interval: Duration,
}

impl TimerHandle {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// One entry of a plain traversal sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit<T> {
    pub node_id: NodeId,
    pub value: T,
}

/// The precomputed step sequence a session walks through.
#[derive(Debug, Clone, PartialEq)]
pub enum StepProgram<T> {
    /// Plain visit order of a traversal
    Visits(Vec<Visit<T>>),
    /// CALL / PROCESS / RETURN events
    Trace(Trace<T>),
}

impl<T> StepProgram<T> {
    pub fn len(&self) -> usize {
        match self {
            StepProgram::Visits(visits) => visits.len(),
            StepProgram::Trace(trace) => trace.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn node_at(&self, index: usize) -> Option<NodeId> {
        match self {
            StepProgram::Visits(visits) => visits.get(index).map(|v| v.node_id),
            StepProgram::Trace(trace) => trace.events().get(index).map(|e| e.node_id),
        }
    }
}

/// Accumulated visual effects of the steps applied so far.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState<T> {
    node_states: BTreeMap<NodeId, VisualState>,
    edge_directions: BTreeMap<(NodeId, NodeId), EdgeDirection>,
    active: Option<NodeId>,
    output: Vec<T>,
    summary: String,
    stack: CallStack<T>,
}

impl<T> Default for ViewState<T> {
    fn default() -> Self {
        Self {
            node_states: BTreeMap::new(),
            edge_directions: BTreeMap::new(),
            active: None,
            output: Vec::new(),
            summary: String::new(),
            stack: CallStack::default(),
        }
    }
}

impl<T> ViewState<T> {
    pub fn node_state(&self, id: NodeId) -> VisualState {
        self.node_states.get(&id).copied().unwrap_or_default()
    }

    pub fn edge_direction(&self, parent_id: NodeId, child_id: NodeId) -> EdgeDirection {
        self.edge_directions
            .get(&(parent_id, child_id))
            .copied()
            .unwrap_or_default()
    }

    pub fn active(&self) -> Option<NodeId> {
        self.active
    }

    /// Values in processing order.
    pub fn output(&self) -> &[T] {
        &self.output
    }

    /// Human readable "current / visited so far" line.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn stack(&self) -> &CallStack<T> {
        &self.stack
    }
}

impl<T: Clone + fmt::Display> ViewState<T> {
    fn apply_visit(&mut self, visits: &[Visit<T>], index: usize) {
        let visit = &visits[index];
        if let Some(previous) = self.active.replace(visit.node_id) {
            self.node_states.insert(previous, VisualState::Visited);
        }
        self.node_states.insert(visit.node_id, VisualState::Active);
        self.output.push(visit.value.clone());

        let visited = visits[..index].iter().map(|v| &v.value).join(" → ");
        self.summary = format!(
            "Current: {} | Visited: {}",
            visit.value,
            if visited.is_empty() { "—".to_string() } else { visited }
        );
    }

    fn apply_event(&mut self, trace: &Trace<T>, index: usize) {
        let event = trace.events()[index];

        // A call that returned on the previous step is now finished
        if let Some(previous) = self.active.take() {
            if self.node_state(previous) == VisualState::Return {
                self.node_states.insert(previous, VisualState::Done);
            }
        }

        let state = match event.phase {
            Phase::Call => VisualState::Call,
            Phase::Process => VisualState::Process,
            Phase::Return => VisualState::Return,
        };
        self.node_states.insert(event.node_id, state);

        if let Some(parent_id) = event.parent_id {
            match event.phase {
                Phase::Call => {
                    self.edge_directions
                        .insert((parent_id, event.node_id), EdgeDirection::Call);
                }
                Phase::Return => {
                    self.edge_directions
                        .insert((parent_id, event.node_id), EdgeDirection::Return);
                }
                Phase::Process => {}
            }
        }

        if event.phase == Phase::Process {
            if let Some(value) = trace.value_of(event.node_id) {
                self.output.push(value.clone());
            }
        }

        self.stack.apply(&event, trace);
        self.active = Some(event.node_id);

        let value = trace
            .value_of(event.node_id)
            .map(|v| v.to_string())
            .unwrap_or_default();
        let frames = self.stack.frames().iter().map(|f| &f.value).join(" → ");
        self.summary = format!(
            "{}({}) | depth {} | stack: {}",
            event.phase,
            value,
            self.stack.depth(),
            if frames.is_empty() { "—".to_string() } else { frames }
        );
    }

    /// Settle the final node once the sequence is exhausted.
    fn finish(&mut self, is_trace: bool) {
        if let Some(last) = self.active.take() {
            let settled = if is_trace {
                VisualState::Done
            } else {
                VisualState::Visited
            };
            self.node_states.insert(last, settled);
        }
    }
}

/// Result of applying one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepEffect {
    pub index: usize,
    pub node_id: NodeId,
    /// This step exhausted the sequence
    pub completed: bool,
}

/// Active program, cursor and view. Iterating applies one step per item.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSession<T> {
    program: StepProgram<T>,
    index: usize,
    view: ViewState<T>,
}

impl<T> PlaybackSession<T> {
    pub fn new(program: StepProgram<T>) -> Self {
        Self {
            program,
            index: 0,
            view: ViewState::default(),
        }
    }

    pub fn program(&self) -> &StepProgram<T> {
        &self.program
    }

    /// Number of steps applied so far.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.program.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.is_empty()
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.program.len()
    }

    pub fn view(&self) -> &ViewState<T> {
        &self.view
    }
}

impl<T: Clone + fmt::Display> Iterator for PlaybackSession<T> {
    type Item = StepEffect;

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.index;
        let node_id = self.program.node_at(index)?;

        let is_trace = match &self.program {
            StepProgram::Visits(visits) => {
                self.view.apply_visit(visits, index);
                false
            }
            StepProgram::Trace(trace) => {
                self.view.apply_event(trace, index);
                true
            }
        };
        self.index += 1;

        let completed = self.is_exhausted();
        if completed {
            self.view.finish(is_trace);
        }
        Some(StepEffect {
            index,
            node_id,
            completed,
        })
    }
}

/// Drives a [`PlaybackSession`] under automatic timing or manual stepping.
#[derive(Debug, Clone)]
pub struct PlaybackController<T> {
    state: PlaybackState,
    session: Option<PlaybackSession<T>>,
    generation: u64,
    interval: Duration,
}

impl<T> PlaybackController<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: PlaybackState::Idle,
            session: None,
            generation: 0,
            interval,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session(&self) -> Option<&PlaybackSession<T>> {
        self.session.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The pending automatic tick, if running.
    pub fn timer(&self) -> Option<TimerHandle> {
        (self.state == PlaybackState::Running).then_some(TimerHandle {
            generation: self.generation,
            interval: self.interval,
        })
    }

    /// Stop automatic stepping. Only manual stepping continues from Paused.
    pub fn pause(&mut self) -> bool {
        if self.state != PlaybackState::Running {
            return false;
        }
        self.cancel_timer();
        self.state = PlaybackState::Paused;
        debug!("pause: at step {}", self.session.as_ref().map_or(0, |s| s.index()));
        true
    }

    /// Back to Idle: clears cursor, node markers and output.
    pub fn reset(&mut self) {
        self.cancel_timer();
        self.session = None;
        self.state = PlaybackState::Idle;
        debug!("reset: idle");
    }

    /// The tree was replaced: drop everything that refers to the old one.
    pub fn invalidate(&mut self) {
        if self.state != PlaybackState::Idle {
            info!("invalidate: abandoning {} playback", self.state);
        }
        self.reset();
    }

    /// Change the tick interval. A running timer restarts at the current step.
    pub fn set_interval(&mut self, interval: Duration) -> Option<TimerHandle> {
        self.interval = interval;
        if self.state == PlaybackState::Running {
            self.cancel_timer();
            debug!("set_interval: restarted timer at {:?}", interval);
        }
        self.timer()
    }

    fn cancel_timer(&mut self) {
        self.generation += 1;
    }
}

impl<T: Clone + fmt::Display> PlaybackController<T> {
    /// Begin automatic playback of the plain visit order of `kind`.
    ///
    /// No-op on an empty tree. Accepted from any state; an existing session is replaced.
    pub fn start(&mut self, tree: &Tree<T>, kind: TraversalKind) -> Option<TimerHandle> {
        if tree.is_empty() {
            debug!("start: empty tree, nothing to play");
            return None;
        }
        let visits = traverse(tree, kind)
            .into_iter()
            .map(|node| Visit {
                node_id: node.id,
                value: node.value.clone(),
            })
            .collect();
        info!("start: {} traversal", kind);
        self.begin(StepProgram::Visits(visits))
    }

    /// Begin automatic playback of a recursion trace. No-op on an empty trace.
    pub fn start_trace(&mut self, trace: Trace<T>) -> Option<TimerHandle> {
        if trace.is_empty() {
            debug!("start_trace: empty trace, nothing to play");
            return None;
        }
        info!("start_trace: {} trace with {} events", trace.algorithm(), trace.len());
        self.begin(StepProgram::Trace(trace))
    }

    fn begin(&mut self, program: StepProgram<T>) -> Option<TimerHandle> {
        self.cancel_timer();
        self.session = Some(PlaybackSession::new(program));
        self.state = PlaybackState::Running;
        self.timer()
    }

    /// Advance exactly one step by hand.
    ///
    /// Stepping while Running pauses first. Idle and Completed ignore the call.
    pub fn step(&mut self) -> Option<StepEffect> {
        match self.state {
            PlaybackState::Running => {
                self.pause();
            }
            PlaybackState::Paused => {}
            PlaybackState::Idle | PlaybackState::Completed => return None,
        }
        self.advance()
    }

    /// Automatic tick. Dropped unless `handle` belongs to the live timer.
    pub fn tick(&mut self, handle: TimerHandle) -> Option<StepEffect> {
        if self.state != PlaybackState::Running || handle.generation != self.generation {
            trace!(
                "tick: dropping stale tick (generation {} vs {})",
                handle.generation,
                self.generation
            );
            return None;
        }
        self.advance()
    }

    fn advance(&mut self) -> Option<StepEffect> {
        let effect = self.session.as_mut()?.next()?;
        trace!("advance: step {} node {}", effect.index, effect.node_id);
        if effect.completed {
            self.cancel_timer();
            self.state = PlaybackState::Completed;
            info!("advance: completed after {} steps", effect.index + 1);
        }
        Some(effect)
    }
}
