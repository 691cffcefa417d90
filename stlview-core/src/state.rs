/// Mutable viewer state and the status snapshot shown to the user
use crate::error::LoadError;
use crate::scene::Theme;
use crate::transform::RotationState;

/// State that lives for as long as the viewer is mounted.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerState {
    pub mounted: bool,
    /// Orientation of the attached mesh
    pub rotation: RotationState,
    pub auto_rotate: bool,
    pub dragging: bool,
    /// Pointer position at the last drag update
    pub last_pointer: Option<(f32, f32)>,
    pub theme: Theme,
    pub loading: bool,
    pub error: Option<LoadError>,
    /// Model URL currently requested
    pub source: Option<String>,
}

impl ViewerState {
    pub fn new(auto_rotate: bool, theme: Theme) -> Self {
        Self {
            mounted: false,
            rotation: RotationState::zero(),
            auto_rotate,
            dragging: false,
            last_pointer: None,
            theme,
            loading: false,
            error: None,
            source: None,
        }
    }
}

/// What the overlay above the canvas should show
#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    None,
    Loading,
    /// Error text plus a retry action
    Error { message: String, detail: String },
}

/// Point-in-time summary for the overlay, status pill and inline controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerStatus {
    pub overlay: Overlay,
    pub pill: String,
    /// Camera zoom relative to the initial distance, 100 at mount
    pub zoom_percent: u32,
    pub triangles: Option<usize>,
    pub theme: Theme,
    pub auto_rotate: bool,
    pub dragging: bool,
}

impl ViewerStatus {
    pub fn new(state: &ViewerState, zoom_level: f32, triangles: Option<usize>) -> Self {
        let overlay = if state.loading {
            Overlay::Loading
        } else if let Some(error) = &state.error {
            Overlay::Error {
                message: error.user_message().to_string(),
                detail: error.to_string(),
            }
        } else {
            Overlay::None
        };

        let zoom_percent = (zoom_level * 100.0).round().max(0.0) as u32;
        let pill = status_pill(state, &overlay, zoom_percent, triangles);

        Self {
            overlay,
            pill,
            zoom_percent,
            triangles,
            theme: state.theme,
            auto_rotate: state.auto_rotate,
            dragging: state.dragging,
        }
    }
}

fn status_pill(state: &ViewerState, overlay: &Overlay, zoom_percent: u32, triangles: Option<usize>) -> String {
    match (overlay, triangles) {
        (Overlay::Loading, _) => "Loading model...".to_string(),
        (Overlay::Error { message, .. }, _) => message.clone(),
        (Overlay::None, None) => "No model loaded".to_string(),
        (Overlay::None, Some(count)) => {
            let mode = if state.dragging {
                "Rotating"
            } else if state.auto_rotate {
                "Auto-rotate"
            } else {
                "Drag to rotate"
            };
            format!("{mode} | {count} triangles | {zoom_percent}%")
        }
    }
}
