/// stlview Core Library - engine-agnostic interactive STL viewer
///
/// This library parses STL models, normalizes them for display and drives an
/// interactive scene (orbit, zoom, auto-rotate, theming) through the
/// `Engine` and `Host` traits, releasing every resource it acquires.

pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod projection;
pub mod scene;
pub mod state;
pub mod stl;
pub mod transform;
pub mod viewer;

// Re-export commonly used types
pub use config::ViewerConfig;
pub use engine::{Engine, Host, InputEvent, InputKind, ListenerTarget};
pub use error::{FetchError, HostError, LoadError, StlError, ViewerError};
pub use geometry::{BoundingBox, NormalizedMesh, Triangle, TriangleGeometry};
pub use loader::{fetch_completion, Fetch, LoadCompletion, LoadOutcome, LoadTicket};
pub use projection::Camera;
pub use scene::{Light, LightRig, Material, Rgb, Theme};
pub use state::{Overlay, ViewerState, ViewerStatus};
pub use transform::RotationState;
pub use viewer::Viewer;
