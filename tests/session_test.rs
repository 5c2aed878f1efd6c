//! Tests for the session context

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use treewalk::application::{
    EdgeDirection, PlaybackState, RenderFrame, RenderSurface, Session, VisualState, DEFAULT_SLOT,
};
use treewalk::config::Settings;
use treewalk::domain::{DomainError, InputMode, TraceAlgorithm, TraversalKind};
use treewalk::infrastructure::di::ServiceContainer;
use treewalk::infrastructure::{FileSlotStore, InstantTicker, MemorySlotStore, SlotStore};
use treewalk::application::ApplicationError;

/// Collects every frame it is handed.
#[derive(Default)]
struct RecordingSurface {
    frames: Vec<RenderFrame<i64>>,
}

impl RenderSurface<i64> for RecordingSurface {
    fn render(&mut self, frame: &RenderFrame<i64>) {
        self.frames.push(frame.clone());
    }
}

fn session() -> Session {
    Session::new(&Settings::default())
}

#[test]
fn given_array_when_building_then_tree_layout_and_traversals_are_ready() {
    // Arrange
    let mut session = session();

    // Act
    session.build("[1,2,3,null,4]", InputMode::Level).expect("build");

    // Assert
    assert_eq!(session.tree().len(), 4);
    assert_eq!(session.layout().len(), 4);
    assert_eq!(session.traversals().format(TraversalKind::LevelOrder), "[1,2,3,4]");
    assert_eq!(session.last_input(), Some("[1,2,3,null,4]"));
}

#[test]
fn given_built_tree_when_bad_input_arrives_then_tree_is_unchanged() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3]", InputMode::Level).expect("build");

    // Act
    let result = session.build("[1, two]", InputMode::Level);

    // Assert
    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::InvalidInput { .. }))
    ));
    assert_eq!(session.tree().len(), 3);
    assert_eq!(session.last_input(), Some("[1,2,3]"));
}

#[test]
fn given_running_playback_when_rebuilding_then_idle_and_old_tick_ignored() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3]", InputMode::Level).expect("build");
    let handle = session.start(TraversalKind::Inorder).expect("timer");
    session.tick(handle);
    let pending = session.controller().timer().expect("timer");

    // Act
    session.build("[7,8]", InputMode::Level).expect("rebuild");
    let effect = session.tick(pending);

    // Assert
    assert!(effect.is_none());
    assert_eq!(session.state(), PlaybackState::Idle);
    let frame = session.frame();
    assert!(frame.nodes.iter().all(|n| n.state == VisualState::Default));
    assert!(frame.output.is_empty());
}

#[test]
fn given_default_settings_when_rebuilding_then_ids_restart_at_zero() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3]", InputMode::Level).expect("build");

    // Act
    session.build("[5]", InputMode::Level).expect("rebuild");

    // Assert
    assert_eq!(session.tree().root().map(|n| n.id), Some(0));
}

#[test]
fn given_started_traversal_when_running_automatically_then_renders_every_step() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3,4,5]", InputMode::Level).expect("build");
    session.start(TraversalKind::Preorder);
    let mut surface = RecordingSurface::default();

    // Act
    let applied = session.run_automatic(&InstantTicker, &mut surface);

    // Assert
    assert_eq!(applied, 5);
    assert_eq!(surface.frames.len(), 5);
    assert_eq!(session.state(), PlaybackState::Completed);
    let last = surface.frames.last().expect("frame");
    assert_eq!(last.output, vec![1, 2, 4, 5, 3]);
    assert_eq!((last.cursor, last.total), (5, 5));
    assert_eq!(last.state, PlaybackState::Completed);
}

#[test]
fn given_manual_and_automatic_runs_when_comparing_frames_then_identical() {
    // Arrange
    let mut auto = session();
    let mut manual = session();
    for s in [&mut auto, &mut manual] {
        s.build("[4,2,6,1,3,5,7]", InputMode::Level).expect("build");
        s.start_trace(TraceAlgorithm::Inorder);
    }
    manual.pause();
    let mut auto_frames = RecordingSurface::default();

    // Act
    auto.run_automatic(&InstantTicker, &mut auto_frames);
    let mut manual_frames = Vec::new();
    while manual.step().is_some() {
        manual_frames.push(manual.frame());
    }

    // Assert
    assert_eq!(manual_frames.len(), auto_frames.frames.len());
    for (m, a) in manual_frames.iter().zip(&auto_frames.frames) {
        assert_eq!(m.nodes, a.nodes);
        assert_eq!(m.edges, a.edges);
        assert_eq!(m.output, a.output);
        assert_eq!(m.stack, a.stack);
        assert_eq!(m.summary, a.summary);
    }
    assert_eq!(manual.frame().output, vec![1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn given_trace_step_when_composing_frame_then_edges_and_stack_are_reported() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3]", InputMode::Level).expect("build");
    session.start_trace(TraceAlgorithm::Preorder);
    session.pause();

    // Act: CALL(1), PROCESS(1), CALL(2)
    session.step();
    session.step();
    session.step();
    let frame = session.frame();

    // Assert
    let edge = frame
        .edges
        .iter()
        .find(|e| (e.parent_id, e.child_id) == (0, 1))
        .expect("edge 0 → 1");
    assert_eq!(edge.direction, EdgeDirection::Call);
    assert_eq!(frame.stack.iter().map(|f| f.value).collect::<Vec<_>>(), vec![1, 2]);
    assert_eq!(frame.max_depth, 2);
    assert_eq!(frame.node(1).map(|n| n.state), Some(VisualState::Call));
    assert_eq!(frame.output, vec![1]);
}

#[test]
fn given_started_trace_when_laying_out_panel_then_one_row_per_call() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3]", InputMode::Level).expect("build");

    // Act
    session.start_trace(TraceAlgorithm::Bfs);
    let boxes = session.trace_layout();

    // Assert
    assert_eq!(boxes.len(), 6);
    assert!(session.trace().is_some());
}

#[test]
fn given_narrow_viewport_when_overriding_then_layout_is_recomputed() {
    // Arrange
    let mut session = session();
    session.build("[1,2,3,4,5,6,7]", InputMode::Level).expect("build");
    let centred_root = session.layout().get(0).map(|p| p.x);

    // Act
    session.set_viewport_width(100.0);

    // Assert
    assert_eq!(centred_root, Some(600.0));
    assert_eq!(session.layout().min_x(), 50.0);
}

#[test]
fn given_running_when_changing_interval_then_timer_uses_new_interval() {
    // Arrange
    let mut session = session();
    session.build("[1,2]", InputMode::Level).expect("build");
    session.start(TraversalKind::Inorder);

    // Act
    let handle = session.set_interval(Duration::from_millis(10));

    // Assert
    assert_eq!(handle.map(|h| h.interval()), Some(Duration::from_millis(10)));
}

#[test]
fn given_built_tree_when_exporting_and_importing_then_tree_is_restored() {
    // Arrange
    let store = MemorySlotStore::new();
    let mut source = session();
    source.build("[1,null,2]", InputMode::Level).expect("build");
    let mut target = session();

    // Act
    let saved = source.export_to(&store, DEFAULT_SLOT).expect("export");
    let imported = target
        .import_from(&store, DEFAULT_SLOT, InputMode::Level)
        .expect("import")
        .map(|t| t.len());

    // Assert
    assert!(saved);
    assert_eq!(imported, Some(2));
    assert_eq!(target.traversals().format(TraversalKind::Inorder), "[1,2]");
}

#[test]
fn given_nothing_built_when_exporting_then_nothing_saved() {
    // Arrange
    let store = MemorySlotStore::new();

    // Act
    let saved = session().export_to(&store, DEFAULT_SLOT).expect("export");

    // Assert
    assert!(!saved);
    assert!(store.get(DEFAULT_SLOT).expect("get").is_none());
}

#[test]
fn given_empty_slot_when_importing_then_none_and_session_untouched() {
    // Arrange
    let store = MemorySlotStore::new();
    let mut session = session();
    session.build("[9]", InputMode::Level).expect("build");

    // Act
    let imported = session
        .import_from(&store, DEFAULT_SLOT, InputMode::Level)
        .expect("import")
        .is_some();

    // Assert
    assert!(!imported);
    assert_eq!(session.tree().len(), 1);
}

#[test]
fn given_container_with_file_store_when_round_tripping_then_other_session_sees_tree() {
    // Arrange
    let temp = TempDir::new().expect("tempdir");
    let settings = Settings {
        base_dir: temp.path().to_path_buf(),
        ..Settings::default()
    };
    let store: Arc<dyn SlotStore> = Arc::new(FileSlotStore::new(settings.slots_dir()));
    let container = ServiceContainer::with_deps(settings, store, Arc::new(InstantTicker));
    let mut first = container.session();
    first.build("[3,1,4]", InputMode::Level).expect("build");

    // Act
    first.export_to(container.slots.as_ref(), "demo").expect("export");
    let mut second = container.session();
    second
        .import_from(container.slots.as_ref(), "demo", InputMode::Level)
        .expect("import");

    // Assert
    assert_eq!(second.tree().len(), 3);
    assert!(temp.path().join("slots").join("demo.toml").exists());
}
