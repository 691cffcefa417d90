/// Tunable viewer constants
use crate::scene::{Material, Rgb};
use crate::stl::DEFAULT_TEXT_SIZE_LIMIT;

/// Every constant the viewer uses, with the stock values in [`Default`].
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Camera distance from the origin at mount and after a view reset
    pub camera_distance: f32,
    /// Longest bounding-box dimension after normalization
    pub target_size: f32,
    /// Radians of rotation per pixel of pointer travel
    pub drag_sensitivity: f32,
    /// Radians of yaw added per frame while auto-rotating
    pub auto_rotate_step: f32,
    pub auto_rotate: bool,
    /// Zoom-in divides the camera distance by this, zoom-out multiplies by it
    pub zoom_step: f32,
    /// ASCII detection is skipped for buffers at or above this size
    pub text_size_limit: usize,
    pub material: Material,
    pub light_background: Rgb,
    pub dark_background: Rgb,
    pub dark_theme: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_distance: 5.0,
            target_size: 3.0,
            drag_sensitivity: 0.005,
            auto_rotate_step: 0.005,
            auto_rotate: true,
            zoom_step: 1.1,
            text_size_limit: DEFAULT_TEXT_SIZE_LIMIT,
            material: Material::default(),
            light_background: Rgb::new(0.96, 0.96, 0.97),
            dark_background: Rgb::new(0.07, 0.08, 0.10),
            dark_theme: false,
        }
    }
}
