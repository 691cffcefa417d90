/// Seams to the rendering engine and the host environment.
///
/// The viewer only needs a narrow slice of a 3D engine (create a surface,
/// upload and attach meshes, render through a camera, dispose) and of its
/// host (event listeners, per-frame callbacks, a byte fetch). Terminal and
/// browser front ends implement these traits; tests use recording fakes.
use std::fmt;

use crate::error::HostError;
use crate::geometry::NormalizedMesh;
use crate::loader::LoadTicket;
use crate::projection::Camera;
use crate::scene::{Light, Material, Rgb};
use crate::transform::RotationState;

/// The subset of a retained-mode 3D engine the viewer drives.
pub trait Engine {
    /// Handle to an uploaded mesh. Consumed by [`Engine::dispose_mesh`].
    type Mesh;
    type Error: std::error::Error + 'static;

    /// Create the drawing surface at the given size and attach it to the host element.
    ///
    /// When this fails the viewer calls [`Engine::dispose`] straight away, so
    /// `dispose` must also release a partially mounted surface.
    fn mount(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), Self::Error>;

    fn add_light(&mut self, light: &Light);

    fn set_background(&mut self, color: Rgb);

    /// Upload geometry with a material. The mesh is not visible until attached.
    fn upload_mesh(&mut self, mesh: &NormalizedMesh, material: &Material) -> Result<Self::Mesh, Self::Error>;

    fn attach(&mut self, mesh: &Self::Mesh);

    fn detach(&mut self, mesh: &Self::Mesh);

    /// Release the buffers behind a detached mesh.
    fn dispose_mesh(&mut self, mesh: Self::Mesh);

    fn set_mesh_rotation(&mut self, mesh: &Self::Mesh, rotation: &RotationState);

    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32);

    fn render(&mut self, camera: &Camera) -> Result<(), Self::Error>;

    /// Release the renderer and remove the drawing surface from the host element.
    fn dispose(&mut self);
}

/// Where a listener is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Canvas,
    /// The host element the drawing surface is mounted in
    Container,
    Document,
}

/// The kind of raw input a listener receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    Resize,
}

impl InputKind {
    /// DOM event name
    pub fn event_name(self) -> &'static str {
        match self {
            InputKind::PointerDown => "pointerdown",
            InputKind::PointerMove => "pointermove",
            InputKind::PointerUp => "pointerup",
            InputKind::Wheel => "wheel",
            InputKind::Resize => "resize",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.event_name())
    }
}

/// Listeners registered on mount, removed on unmount.
///
/// Pointer-move and pointer-up live on the document so a drag that leaves
/// the canvas still ends. Resize watches the container, which can change
/// size without the window doing so.
pub const LISTENERS: [(ListenerTarget, InputKind); 5] = [
    (ListenerTarget::Canvas, InputKind::PointerDown),
    (ListenerTarget::Canvas, InputKind::Wheel),
    (ListenerTarget::Document, InputKind::PointerMove),
    (ListenerTarget::Document, InputKind::PointerUp),
    (ListenerTarget::Container, InputKind::Resize),
];

/// Raw input delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32 },
    PointerMove { x: f32, y: f32 },
    PointerUp,
    /// Positive `delta_y` scrolls away from the user (zoom out).
    Wheel { delta_y: f32 },
    Resize { width: u32, height: u32 },
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerDown { .. } => InputKind::PointerDown,
            InputEvent::PointerMove { .. } => InputKind::PointerMove,
            InputEvent::PointerUp => InputKind::PointerUp,
            InputEvent::Wheel { .. } => InputKind::Wheel,
            InputEvent::Resize { .. } => InputKind::Resize,
        }
    }
}

/// The host environment: event listeners, frame scheduling and model fetches.
///
/// Implementations route listener callbacks to `Viewer::handle_input`,
/// frame callbacks to `Viewer::frame`, and fetch results to
/// `Viewer::finish_load`.
pub trait Host {
    /// Registration handle returned by [`Host::listen`].
    type Listener;
    /// Handle for a scheduled frame callback.
    type Frame;

    fn listen(&mut self, target: ListenerTarget, kind: InputKind) -> Result<Self::Listener, HostError>;

    fn unlisten(&mut self, listener: Self::Listener);

    /// Schedule one frame callback.
    fn request_frame(&mut self) -> Result<Self::Frame, HostError>;

    fn cancel_frame(&mut self, frame: Self::Frame);

    /// Start fetching the bytes for `ticket`; the result is handed back later.
    fn start_fetch(&mut self, ticket: LoadTicket);

    /// Current size of the host element in CSS pixels (or cells).
    fn surface_size(&self) -> (u32, u32);

    fn pixel_ratio(&self) -> f32 {
        1.0
    }
}
