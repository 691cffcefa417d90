//! Viewer lifecycle, loading and interaction against recording fakes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use approx::assert_relative_eq;
use stlview_core::engine::{InputKind, ListenerTarget};
use stlview_core::{
    Camera, Engine, FetchError, Host, HostError, InputEvent, Light, LoadCompletion, LoadError, LoadOutcome,
    LoadTicket, Material, NormalizedMesh, Overlay, Rgb, RotationState, Theme, Viewer, ViewerConfig,
};

// ---------------------------------------------------------------------------
// Recording engine
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct EngineLog {
    mounts: usize,
    disposals: usize,
    lights: Vec<Light>,
    backgrounds: Vec<Rgb>,
    uploaded: usize,
    attached: Vec<u32>,
    disposed_meshes: Vec<u32>,
    rotations: BTreeMap<u32, RotationState>,
    renders: usize,
    sizes: Vec<(u32, u32)>,
    fail_mount: bool,
    /// Set by a mount that got as far as attaching its surface.
    surface_attached: bool,
}

#[derive(Debug, thiserror::Error)]
#[error("fake engine failure")]
struct FakeEngineError;

struct FakeEngine {
    log: Rc<RefCell<EngineLog>>,
    next_mesh: u32,
}

impl Engine for FakeEngine {
    type Mesh = u32;
    type Error = FakeEngineError;

    fn mount(&mut self, width: u32, height: u32, _pixel_ratio: f32) -> Result<(), FakeEngineError> {
        let mut log = self.log.borrow_mut();
        log.mounts += 1;
        log.surface_attached = true;
        if log.fail_mount {
            return Err(FakeEngineError);
        }
        log.sizes.push((width, height));
        Ok(())
    }

    fn add_light(&mut self, light: &Light) {
        self.log.borrow_mut().lights.push(*light);
    }

    fn set_background(&mut self, color: Rgb) {
        self.log.borrow_mut().backgrounds.push(color);
    }

    fn upload_mesh(&mut self, _mesh: &NormalizedMesh, _material: &Material) -> Result<u32, FakeEngineError> {
        self.next_mesh += 1;
        self.log.borrow_mut().uploaded += 1;
        Ok(self.next_mesh)
    }

    fn attach(&mut self, mesh: &u32) {
        let mut log = self.log.borrow_mut();
        assert!(!log.attached.contains(mesh), "mesh {mesh} attached twice");
        log.attached.push(*mesh);
    }

    fn detach(&mut self, mesh: &u32) {
        self.log.borrow_mut().attached.retain(|m| m != mesh);
    }

    fn dispose_mesh(&mut self, mesh: u32) {
        let mut log = self.log.borrow_mut();
        assert!(!log.attached.contains(&mesh), "disposed mesh {mesh} while attached");
        log.disposed_meshes.push(mesh);
    }

    fn set_mesh_rotation(&mut self, mesh: &u32, rotation: &RotationState) {
        self.log.borrow_mut().rotations.insert(*mesh, *rotation);
    }

    fn resize(&mut self, width: u32, height: u32, _pixel_ratio: f32) {
        self.log.borrow_mut().sizes.push((width, height));
    }

    fn render(&mut self, _camera: &Camera) -> Result<(), FakeEngineError> {
        let mut log = self.log.borrow_mut();
        assert!(log.attached.len() <= 1, "more than one mesh attached");
        log.renders += 1;
        Ok(())
    }

    fn dispose(&mut self) {
        let mut log = self.log.borrow_mut();
        log.disposals += 1;
        log.surface_attached = false;
    }
}

// ---------------------------------------------------------------------------
// Recording host
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct HostLog {
    active: BTreeMap<u64, (ListenerTarget, InputKind)>,
    added: usize,
    removed: usize,
    pending_frame: Option<u64>,
    frames_requested: usize,
    frames_cancelled: usize,
    fetches: Vec<LoadTicket>,
    fail_listen: Option<InputKind>,
}

impl HostLog {
    fn active_of(&self, target: ListenerTarget, kind: InputKind) -> usize {
        self.active.values().filter(|&&entry| entry == (target, kind)).count()
    }
}

struct FakeHost {
    log: Rc<RefCell<HostLog>>,
    next_id: u64,
    size: (u32, u32),
}

impl Host for FakeHost {
    type Listener = u64;
    type Frame = u64;

    fn listen(&mut self, target: ListenerTarget, kind: InputKind) -> Result<u64, HostError> {
        let mut log = self.log.borrow_mut();
        if log.fail_listen == Some(kind) {
            return Err(HostError::Listen {
                kind: kind.event_name(),
                reason: "refused".to_string(),
            });
        }
        self.next_id += 1;
        log.active.insert(self.next_id, (target, kind));
        log.added += 1;
        Ok(self.next_id)
    }

    fn unlisten(&mut self, listener: u64) {
        let mut log = self.log.borrow_mut();
        assert!(log.active.remove(&listener).is_some(), "unknown listener {listener}");
        log.removed += 1;
    }

    fn request_frame(&mut self) -> Result<u64, HostError> {
        let mut log = self.log.borrow_mut();
        assert!(log.pending_frame.is_none(), "two frames scheduled at once");
        self.next_id += 1;
        log.pending_frame = Some(self.next_id);
        log.frames_requested += 1;
        Ok(self.next_id)
    }

    fn cancel_frame(&mut self, frame: u64) {
        let mut log = self.log.borrow_mut();
        assert_eq!(log.pending_frame, Some(frame));
        log.pending_frame = None;
        log.frames_cancelled += 1;
    }

    fn start_fetch(&mut self, ticket: LoadTicket) {
        self.log.borrow_mut().fetches.push(ticket);
    }

    fn surface_size(&self) -> (u32, u32) {
        self.size
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

type TestViewer = Viewer<FakeEngine, FakeHost>;

struct Fixture {
    viewer: TestViewer,
    engine: Rc<RefCell<EngineLog>>,
    host: Rc<RefCell<HostLog>>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(ViewerConfig::default())
    }

    fn with_config(config: ViewerConfig) -> Self {
        let engine = Rc::new(RefCell::new(EngineLog::default()));
        let host = Rc::new(RefCell::new(HostLog::default()));
        let viewer = Viewer::new(
            config,
            FakeEngine {
                log: engine.clone(),
                next_mesh: 0,
            },
            FakeHost {
                log: host.clone(),
                next_id: 0,
                size: (800, 600),
            },
        );
        Self { viewer, engine, host }
    }

    fn mounted() -> Self {
        let mut fixture = Self::new();
        fixture.viewer.mount().unwrap();
        fixture
    }

    /// Run the scheduled frame callback, as the host would.
    fn tick(&mut self) {
        let pending = self.host.borrow_mut().pending_frame.take();
        assert!(pending.is_some(), "no frame scheduled");
        self.viewer.frame();
    }

    fn complete(&mut self, ticket: LoadTicket, bytes: Result<Vec<u8>, FetchError>) -> LoadOutcome {
        self.viewer.finish_load(LoadCompletion { ticket, bytes })
    }
}

fn binary_stl(header: &[u8], triangles: usize) -> Vec<u8> {
    let mut data = vec![0u8; 80];
    data[..header.len()].copy_from_slice(header);
    data.extend_from_slice(&(triangles as u32).to_le_bytes());
    for i in 0..triangles {
        let f = i as f32;
        let values = [0.0, 0.0, 1.0, f, 0.0, 0.0, f + 1.0, 0.0, 0.0, f, 1.0, 0.0];
        for v in values {
            data.extend_from_slice(&f32::to_le_bytes(v));
        }
        data.extend_from_slice(&[0, 0]);
    }
    data
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

#[test]
fn mount_builds_scene_and_registers_listeners() {
    let fixture = Fixture::mounted();
    let host = fixture.host.borrow();
    let engine = fixture.engine.borrow();

    assert!(fixture.viewer.is_mounted());
    assert_eq!(engine.mounts, 1);
    assert_eq!(engine.sizes, vec![(800, 600)]);
    assert_eq!(engine.lights.len(), 4);
    assert_eq!(engine.backgrounds, vec![ViewerConfig::default().light_background]);

    assert_eq!(host.active.len(), 5);
    assert_eq!(host.active_of(ListenerTarget::Canvas, InputKind::PointerDown), 1);
    assert_eq!(host.active_of(ListenerTarget::Canvas, InputKind::Wheel), 1);
    assert_eq!(host.active_of(ListenerTarget::Document, InputKind::PointerMove), 1);
    assert_eq!(host.active_of(ListenerTarget::Document, InputKind::PointerUp), 1);
    assert_eq!(host.active_of(ListenerTarget::Container, InputKind::Resize), 1);
    assert!(host.pending_frame.is_some());

    assert_relative_eq!(fixture.viewer.camera().aspect, 800.0 / 600.0);
}

#[test]
fn mount_is_idempotent() {
    let mut fixture = Fixture::mounted();
    fixture.viewer.mount().unwrap();

    assert_eq!(fixture.engine.borrow().mounts, 1);
    assert_eq!(fixture.host.borrow().added, 5);
    assert_eq!(fixture.host.borrow().frames_requested, 1);
}

#[test]
fn repeated_mount_unmount_does_not_drift() {
    let mut fixture = Fixture::new();
    for cycle in 1..=4 {
        fixture.viewer.mount().unwrap();
        fixture.tick();
        fixture.viewer.unmount();

        let host = fixture.host.borrow();
        assert!(host.active.is_empty(), "cycle {cycle} leaked listeners");
        assert_eq!(host.added, host.removed);
        assert_eq!(host.added, 5 * cycle);
        assert!(host.pending_frame.is_none());
        assert_eq!(host.frames_cancelled, cycle);

        let engine = fixture.engine.borrow();
        assert_eq!(engine.mounts, cycle);
        assert_eq!(engine.disposals, cycle);
    }
}

#[test]
fn unmount_releases_mesh_renderer_and_frame() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("part.stl");
    fixture.complete(ticket, Ok(binary_stl(b"", 3)));
    assert!(fixture.viewer.has_mesh());

    fixture.viewer.unmount();
    fixture.viewer.unmount();

    let engine = fixture.engine.borrow();
    assert!(engine.attached.is_empty());
    assert_eq!(engine.disposed_meshes, vec![1]);
    assert_eq!(engine.disposals, 1);
    assert!(fixture.host.borrow().pending_frame.is_none());
    assert!(!fixture.viewer.has_mesh());
}

#[test]
fn dropping_a_mounted_viewer_unmounts_it() {
    let fixture = Fixture::mounted();
    let (engine, host) = (fixture.engine.clone(), fixture.host.clone());
    drop(fixture);

    assert!(host.borrow().active.is_empty());
    assert!(host.borrow().pending_frame.is_none());
    assert_eq!(engine.borrow().disposals, 1);
}

#[test]
fn failed_mount_rolls_back() {
    let mut fixture = Fixture::new();
    fixture.host.borrow_mut().fail_listen = Some(InputKind::PointerUp);

    let err = fixture.viewer.mount().unwrap_err();
    assert!(err.to_string().contains("pointerup"));
    assert!(!fixture.viewer.is_mounted());

    let host = fixture.host.borrow();
    assert!(host.active.is_empty());
    assert_eq!(host.added, host.removed);
    assert!(host.pending_frame.is_none());
    assert_eq!(fixture.engine.borrow().disposals, 1);
}

#[test]
fn failed_engine_mount_releases_partial_surface() {
    let mut fixture = Fixture::new();
    fixture.engine.borrow_mut().fail_mount = true;

    let err = fixture.viewer.mount().unwrap_err();
    assert!(err.to_string().contains("fake engine failure"));
    assert!(!fixture.viewer.is_mounted());

    let engine = fixture.engine.borrow();
    assert_eq!(engine.mounts, 1);
    assert_eq!(engine.disposals, 1);
    assert!(!engine.surface_attached);
    assert!(engine.lights.is_empty());

    let host = fixture.host.borrow();
    assert_eq!(host.added, 0);
    assert!(host.pending_frame.is_none());
}

#[test]
fn mount_succeeds_after_engine_failure_clears() {
    let mut fixture = Fixture::new();
    fixture.engine.borrow_mut().fail_mount = true;
    assert!(fixture.viewer.mount().is_err());

    fixture.engine.borrow_mut().fail_mount = false;
    fixture.viewer.mount().unwrap();
    assert!(fixture.viewer.is_mounted());
    assert!(fixture.engine.borrow().surface_attached);

    fixture.viewer.unmount();
    let engine = fixture.engine.borrow();
    assert_eq!(engine.disposals, 2);
    assert!(!engine.surface_attached);
}

#[test]
fn resize_updates_projection_without_resetting_view() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("part.stl");
    fixture.complete(ticket, Ok(binary_stl(b"", 2)));
    fixture.viewer.zoom_in();
    let distance = fixture.viewer.camera().distance();

    fixture.viewer.handle_input(InputEvent::Resize { width: 1000, height: 500 });

    assert_relative_eq!(fixture.viewer.camera().aspect, 2.0);
    assert_relative_eq!(fixture.viewer.camera().distance(), distance);
    assert!(fixture.viewer.has_mesh());
    assert_eq!(fixture.engine.borrow().sizes.last(), Some(&(1000, 500)));
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn source_set_before_mount_loads_on_mount() {
    let mut fixture = Fixture::new();
    assert!(!fixture.viewer.set_source("model.stl"));
    assert!(fixture.host.borrow().fetches.is_empty());

    fixture.viewer.mount().unwrap();
    let fetches = &fixture.host.borrow().fetches;
    assert_eq!(fetches.len(), 1);
    assert_eq!(fetches[0].url, "model.stl");
    assert!(fixture.viewer.state().loading);
    assert_eq!(fixture.viewer.status().overlay, Overlay::Loading);
}

#[test]
fn source_change_while_mounted_reloads_without_rebootstrap() {
    let mut fixture = Fixture::mounted();
    assert!(fixture.viewer.set_source("a.stl"));
    assert!(!fixture.viewer.set_source("a.stl"));
    assert!(fixture.viewer.set_source("b.stl"));

    let urls: Vec<_> = fixture.host.borrow().fetches.iter().map(|t| t.url.clone()).collect();
    assert_eq!(urls, vec!["a.stl", "b.stl"]);
    assert_eq!(fixture.engine.borrow().mounts, 1);
}

#[test]
fn fifty_triangle_binary_loads() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("part.stl");
    let data = binary_stl(b"", 50);
    assert_eq!(data.len(), 2584);

    assert_eq!(fixture.complete(ticket, Ok(data)), LoadOutcome::Applied { triangles: 50 });
    let status = fixture.viewer.status();
    assert_eq!(status.triangles, Some(50));
    assert_eq!(status.overlay, Overlay::None);
    assert!(!fixture.viewer.state().loading);
}

#[test]
fn binary_with_solid_header_loads_without_error() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("exported.stl");

    let outcome = fixture.complete(ticket, Ok(binary_stl(b"solid exported", 6)));
    assert_eq!(outcome, LoadOutcome::Applied { triangles: 6 });
    assert!(fixture.viewer.state().error.is_none());
}

#[test]
fn loading_same_url_twice_leaves_one_mesh() {
    let mut fixture = Fixture::mounted();
    for _ in 0..2 {
        let ticket = fixture.viewer.load("part.stl");
        fixture.complete(ticket, Ok(binary_stl(b"", 4)));
    }

    let engine = fixture.engine.borrow();
    assert_eq!(engine.attached, vec![2]);
    assert_eq!(engine.uploaded, 2);
    assert_eq!(engine.disposed_meshes, vec![1]);
}

#[test]
fn stale_completion_does_not_clobber_newer_load() {
    let mut fixture = Fixture::mounted();
    let first = fixture.viewer.load("old.stl");
    let second = fixture.viewer.load("new.stl");

    assert_eq!(
        fixture.complete(second, Ok(binary_stl(b"", 7))),
        LoadOutcome::Applied { triangles: 7 }
    );
    assert_eq!(fixture.complete(first, Ok(binary_stl(b"", 3))), LoadOutcome::Superseded);

    assert_eq!(fixture.viewer.status().triangles, Some(7));
    assert_eq!(fixture.engine.borrow().uploaded, 1);
}

#[test]
fn stale_failure_is_ignored_while_newer_load_is_pending() {
    let mut fixture = Fixture::mounted();
    let first = fixture.viewer.load("old.stl");
    let _second = fixture.viewer.load("new.stl");

    let outcome = fixture.complete(first, Err(FetchError::Status(500)));
    assert_eq!(outcome, LoadOutcome::Superseded);
    assert!(fixture.viewer.state().loading);
    assert!(fixture.viewer.state().error.is_none());
}

#[test]
fn fetch_failure_clears_scene_and_offers_retry() {
    let mut fixture = Fixture::mounted();
    fixture.viewer.set_source("part.stl");
    let ticket = fixture.host.borrow().fetches[0].clone();
    fixture.complete(ticket, Ok(binary_stl(b"", 2)));

    fixture.viewer.set_source("broken.stl");
    let ticket = fixture.host.borrow().fetches[1].clone();
    let outcome = fixture.complete(ticket, Err(FetchError::Network("offline".into())));

    assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Fetch(_))));
    assert!(!fixture.viewer.has_mesh());
    assert!(fixture.engine.borrow().attached.is_empty());
    assert_eq!(fixture.engine.borrow().disposed_meshes, vec![1]);

    let status = fixture.viewer.status();
    assert!(!fixture.viewer.state().loading);
    assert!(matches!(status.overlay, Overlay::Error { .. }));
    assert_eq!(status.pill, "Failed to load model");

    let retry = fixture.viewer.retry().unwrap();
    assert_eq!(retry.url, "broken.stl");
    assert_eq!(fixture.host.borrow().fetches.len(), 3);
    assert!(fixture.viewer.state().error.is_none());
    assert!(fixture.viewer.state().loading);
}

#[test]
fn parse_failure_is_reported() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("bad.stl");
    let mut data = binary_stl(b"", 2);
    data[80..84].copy_from_slice(&9u32.to_le_bytes());

    let outcome = fixture.complete(ticket, Ok(data));
    assert!(matches!(outcome, LoadOutcome::Failed(LoadError::Parse(_))));
    assert!(fixture.viewer.state().error.is_some());
}

#[test]
fn load_finishing_after_unmount_is_discarded() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("slow.stl");
    fixture.viewer.unmount();

    assert_eq!(fixture.complete(ticket, Ok(binary_stl(b"", 1))), LoadOutcome::Superseded);
    assert_eq!(fixture.engine.borrow().uploaded, 0);
}

#[test]
fn show_geometry_supersedes_pending_load() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("slow.stl");
    let triangles = fixture
        .viewer
        .show_geometry(stlview_core::TriangleGeometry::cube(2.0))
        .unwrap();
    assert_eq!(triangles, 12);
    assert!(!fixture.viewer.state().loading);

    assert_eq!(fixture.complete(ticket, Ok(binary_stl(b"", 1))), LoadOutcome::Superseded);
    assert_eq!(fixture.viewer.status().triangles, Some(12));
}

// ---------------------------------------------------------------------------
// Render loop and interaction
// ---------------------------------------------------------------------------

#[test]
fn frame_renders_empty_scene_and_reschedules() {
    let mut fixture = Fixture::mounted();
    for _ in 0..3 {
        fixture.tick();
    }

    assert_eq!(fixture.engine.borrow().renders, 3);
    assert_eq!(fixture.host.borrow().frames_requested, 4);
    assert!(fixture.engine.borrow().rotations.is_empty());
}

#[test]
fn frame_after_unmount_does_nothing() {
    let mut fixture = Fixture::mounted();
    fixture.viewer.unmount();
    fixture.viewer.frame();

    assert_eq!(fixture.engine.borrow().renders, 0);
    assert!(fixture.host.borrow().pending_frame.is_none());
}

#[test]
fn auto_rotate_advances_yaw_each_frame() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("part.stl");
    fixture.complete(ticket, Ok(binary_stl(b"", 2)));

    for _ in 0..4 {
        fixture.tick();
    }
    let yaw = fixture.engine.borrow().rotations[&1].y;
    assert_relative_eq!(yaw, 4.0 * ViewerConfig::default().auto_rotate_step, epsilon = 1e-6);

    fixture.viewer.toggle_auto_rotate();
    fixture.tick();
    assert_relative_eq!(fixture.engine.borrow().rotations[&1].y, yaw);
}

#[test]
fn drag_rotates_mesh_by_sum_of_deltas() {
    let mut fixture = Fixture::mounted();
    let ticket = fixture.viewer.load("part.stl");
    fixture.complete(ticket, Ok(binary_stl(b"", 2)));

    fixture.viewer.handle_input(InputEvent::PointerDown { x: 200.0, y: 100.0 });
    for x in [210.0, 220.0, 230.0] {
        fixture.viewer.handle_input(InputEvent::PointerMove { x, y: 100.0 });
    }
    fixture.tick();

    // Auto-rotate was switched off by the drag, so only the drag contributes.
    let rotation = fixture.engine.borrow().rotations[&1];
    assert_relative_eq!(rotation.y, 0.15, epsilon = 1e-6);
    assert_relative_eq!(rotation.x, 0.0);

    // The release arrives at the document level, outside the canvas.
    fixture.viewer.handle_input(InputEvent::PointerUp);
    fixture.viewer.handle_input(InputEvent::PointerMove { x: 400.0, y: 400.0 });
    fixture.tick();
    assert_relative_eq!(fixture.engine.borrow().rotations[&1].y, 0.15, epsilon = 1e-6);
    assert!(!fixture.viewer.state().auto_rotate);
}

#[test]
fn wheel_zooms_and_reports_level() {
    let mut fixture = Fixture::mounted();
    let start = fixture.viewer.camera().distance();

    fixture.viewer.handle_input(InputEvent::Wheel { delta_y: -100.0 });
    fixture.viewer.handle_input(InputEvent::Wheel { delta_y: -100.0 });
    assert!(fixture.viewer.camera().distance() < start);
    assert_eq!(fixture.viewer.status().zoom_percent, 121);

    fixture.viewer.handle_input(InputEvent::Wheel { delta_y: 100.0 });
    fixture.viewer.handle_input(InputEvent::Wheel { delta_y: 100.0 });
    assert_relative_eq!(fixture.viewer.camera().distance(), start, epsilon = 1e-4);

    fixture.viewer.zoom_out();
    fixture.viewer.reset_view();
    assert_relative_eq!(fixture.viewer.camera().distance(), start, epsilon = 1e-4);
}

#[test]
fn input_is_ignored_while_unmounted() {
    let mut fixture = Fixture::new();
    let start = fixture.viewer.camera().distance();
    fixture.viewer.handle_input(InputEvent::Wheel { delta_y: -1.0 });
    fixture.viewer.handle_input(InputEvent::PointerDown { x: 0.0, y: 0.0 });

    assert_relative_eq!(fixture.viewer.camera().distance(), start);
    assert!(!fixture.viewer.state().dragging);
}

#[test]
fn theme_toggle_updates_background() {
    let mut fixture = Fixture::mounted();
    assert_eq!(fixture.viewer.toggle_theme(), Theme::Dark);
    assert_eq!(
        fixture.engine.borrow().backgrounds.last(),
        Some(&ViewerConfig::default().dark_background)
    );
    assert_eq!(fixture.viewer.toggle_theme(), Theme::Light);
}

#[test]
fn dark_theme_from_config() {
    let config = ViewerConfig {
        dark_theme: true,
        auto_rotate: false,
        ..ViewerConfig::default()
    };
    let mut fixture = Fixture::with_config(config.clone());
    fixture.viewer.mount().unwrap();

    assert_eq!(fixture.engine.borrow().backgrounds, vec![config.dark_background]);
    assert!(!fixture.viewer.state().auto_rotate);
}
