/// Pointer and wheel interaction: drag-to-orbit, zoom and auto-rotate
use crate::config::ViewerConfig;
use crate::projection::Camera;
use crate::state::ViewerState;

/// Converts pointer input into mesh rotation and camera distance.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub sensitivity: f32,
    pub auto_rotate_step: f32,
    pub zoom_step: f32,
    pub initial_distance: f32,
}

impl OrbitControls {
    pub fn new(config: &ViewerConfig) -> Self {
        Self {
            sensitivity: config.drag_sensitivity,
            auto_rotate_step: config.auto_rotate_step,
            zoom_step: config.zoom_step,
            initial_distance: config.camera_distance,
        }
    }

    /// Start a drag. Auto-rotate is switched off and stays off after the drag ends.
    pub fn begin_drag(&self, state: &mut ViewerState, x: f32, y: f32) {
        state.dragging = true;
        state.auto_rotate = false;
        state.last_pointer = Some((x, y));
    }

    /// Apply the delta since the last pointer position. Returns false when no drag is active.
    pub fn drag_to(&self, state: &mut ViewerState, x: f32, y: f32) -> bool {
        if !state.dragging {
            return false;
        }
        let Some((last_x, last_y)) = state.last_pointer else {
            state.last_pointer = Some((x, y));
            return false;
        };

        let dx = x - last_x;
        let dy = y - last_y;
        state.rotation.orbit(dy * self.sensitivity, dx * self.sensitivity);
        state.last_pointer = Some((x, y));
        true
    }

    pub fn end_drag(&self, state: &mut ViewerState) {
        state.dragging = false;
        state.last_pointer = None;
    }

    /// Per-frame yaw increment. Does nothing while dragging or with auto-rotate off.
    pub fn advance_auto_rotate(&self, state: &mut ViewerState) -> bool {
        if !state.auto_rotate || state.dragging {
            return false;
        }
        state.rotation.orbit(0.0, self.auto_rotate_step);
        true
    }

    pub fn zoom_in(&self, camera: &mut Camera) {
        self.set_distance(camera, camera.distance() / self.zoom_step);
    }

    pub fn zoom_out(&self, camera: &mut Camera) {
        self.set_distance(camera, camera.distance() * self.zoom_step);
    }

    /// One zoom step per wheel event; the sign of `delta_y` picks the direction.
    pub fn wheel(&self, camera: &mut Camera, delta_y: f32) {
        if delta_y < 0.0 {
            self.zoom_in(camera);
        } else if delta_y > 0.0 {
            self.zoom_out(camera);
        }
    }

    /// Zoom factor relative to the initial distance (1.0 at mount, larger when closer).
    pub fn zoom_level(&self, camera: &Camera) -> f32 {
        let distance = camera.distance();
        if distance <= f32::EPSILON {
            return 1.0;
        }
        self.initial_distance / distance
    }

    pub fn reset(&self, camera: &mut Camera, state: &mut ViewerState) {
        camera.set_distance(self.initial_distance);
        state.rotation = Default::default();
    }

    /// Zoom steps are never capped; only a distance that collapsed to zero or overflowed is refused.
    fn set_distance(&self, camera: &mut Camera, distance: f32) {
        if distance.is_finite() && distance > 0.0 {
            camera.set_distance(distance);
        } else {
            log::debug!("ignoring zoom to degenerate distance {distance}");
        }
    }
}
