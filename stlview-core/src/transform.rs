/// Mesh orientation: accumulated Euler angles and the model matrix they produce
use nalgebra::{Matrix4, Rotation3, Vector3};

/// Orientation of the displayed mesh, in radians.
///
/// `x` is pitch (vertical drag), `y` is yaw (horizontal drag and
/// auto-rotate), `z` is roll and stays zero in normal use. Angles are
/// not wrapped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RotationState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl RotationState {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    /// Add pitch and yaw deltas.
    pub fn orbit(&mut self, pitch: f32, yaw: f32) {
        self.x += pitch;
        self.y += yaw;
    }

    /// Rotates about X first, then Y, then Z.
    pub fn rotation(&self) -> Rotation3<f32> {
        Rotation3::from_euler_angles(self.x, self.y, self.z)
    }

    /// Model matrix for a mesh centered at the origin
    pub fn matrix(&self) -> Matrix4<f32> {
        self.rotation().to_homogeneous()
    }

    /// Rotate a direction such as a face normal.
    pub fn rotate_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.rotation() * vector
    }
}
