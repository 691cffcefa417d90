/// ASCII rasterizer implementing the viewer's engine seam
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;
use stlview_core::{Camera, Engine, Light, LightRig, Material, NormalizedMesh, RotationState, Rgb, TriangleGeometry};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Terminal cells are about twice as tall as they are wide. Surface heights
/// are given in half-rows so the camera aspect matches what is on screen.
pub const ROW_SCALE: u32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("renderer is not mounted")]
    NotMounted,
    #[error("unknown mesh handle {0}")]
    UnknownMesh(usize),
}

/// Handle to an uploaded mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshId(usize);

struct AsciiMesh {
    geometry: TriangleGeometry,
    material: Material,
    rotation: RotationState,
}

/// Renders attached meshes into a character grid with per-cell colors.
pub struct AsciiEngine {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Rgb>,
    meshes: Vec<Option<AsciiMesh>>,
    attached: Vec<MeshId>,
    lights: LightRig,
    background: Rgb,
    mounted: bool,
}

impl AsciiEngine {
    pub fn new() -> Self {
        Self {
            width: 0,
            height: 0,
            depth_buffer: Vec::new(),
            char_buffer: Vec::new(),
            color_buffer: Vec::new(),
            meshes: Vec::new(),
            attached: Vec::new(),
            lights: LightRig::new(),
            background: Rgb::new(0.0, 0.0, 0.0),
            mounted: false,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Grid size in cells
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of uploaded meshes that have not been disposed
    pub fn live_meshes(&self) -> usize {
        self.meshes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn attached(&self) -> &[MeshId] {
        &self.attached
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.char_buffer[y * self.width + x])
    }

    /// Number of cells covered by geometry in the last render
    pub fn covered_cells(&self) -> usize {
        self.depth_buffer.iter().filter(|d| d.is_finite()).count()
    }

    fn allocate(&mut self, width: u32, height: u32) {
        self.width = width as usize;
        self.height = (height / ROW_SCALE) as usize;
        let size = self.width * self.height;
        self.depth_buffer = vec![f32::INFINITY; size];
        self.char_buffer = vec![' '; size];
        self.color_buffer = vec![self.background; size];
    }

    fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(self.background);
    }

    fn render_mesh(&mut self, id: MeshId, camera: &Camera) -> Result<(), AsciiError> {
        let mesh = self
            .meshes
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(AsciiError::UnknownMesh(id.0))?;

        let model = mesh.rotation.matrix();
        let mvp: Matrix4<f32> = camera.projection_matrix() * camera.view_matrix() * model;
        let view_dir = (camera.position - camera.target)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::z);

        let mut faces = Vec::with_capacity(mesh.geometry.triangle_count());
        'triangles: for triangle in mesh.geometry.triangles() {
            let mut screen_coords = [(0.0, 0.0, 0.0); 3];
            for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
                match camera.project_with(&mvp, vertex, self.width as u32, self.height as u32) {
                    Some(coords) => *slot = coords,
                    None => continue 'triangles, // Triangle is clipped
                }
            }

            let normal = mesh.rotation.rotate_vector(&triangle.shading_normal());
            let color = self.lights.shade(&mesh.material, &normal, &view_dir);
            faces.push((screen_coords, color));
        }

        for (coords, color) in faces {
            self.rasterize_triangle(&coords, shade_char(color.luminance()), color);
        }
        Ok(())
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Rgb) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.char_buffer[idx] = character;
                    self.color_buffer[idx] = color;
                }
            }
        }
    }

    /// Write the last rendered frame, one terminal row per grid row.
    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.queue(SetBackgroundColor(to_color(self.background)))?;
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = to_color(self.color_buffer[idx]);
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

impl Default for AsciiEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for AsciiEngine {
    type Mesh = MeshId;
    type Error = AsciiError;

    fn mount(&mut self, width: u32, height: u32, _pixel_ratio: f32) -> Result<(), AsciiError> {
        self.lights.clear();
        self.allocate(width, height);
        self.mounted = true;
        log::debug!("ascii surface {}x{} cells", self.width, self.height);
        Ok(())
    }

    fn add_light(&mut self, light: &Light) {
        self.lights.push(*light);
    }

    fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    fn upload_mesh(&mut self, mesh: &NormalizedMesh, material: &Material) -> Result<MeshId, AsciiError> {
        if !self.mounted {
            return Err(AsciiError::NotMounted);
        }
        let entry = AsciiMesh {
            geometry: mesh.geometry.clone(),
            material: *material,
            rotation: RotationState::zero(),
        };

        // Reuse a disposed slot before growing.
        match self.meshes.iter().position(Option::is_none) {
            Some(index) => {
                self.meshes[index] = Some(entry);
                Ok(MeshId(index))
            }
            None => {
                self.meshes.push(Some(entry));
                Ok(MeshId(self.meshes.len() - 1))
            }
        }
    }

    fn attach(&mut self, mesh: &MeshId) {
        if !self.attached.contains(mesh) {
            self.attached.push(*mesh);
        }
    }

    fn detach(&mut self, mesh: &MeshId) {
        self.attached.retain(|id| id != mesh);
    }

    fn dispose_mesh(&mut self, mesh: MeshId) {
        self.detach(&mesh);
        if let Some(slot) = self.meshes.get_mut(mesh.0) {
            *slot = None;
        }
    }

    fn set_mesh_rotation(&mut self, mesh: &MeshId, rotation: &RotationState) {
        if let Some(Some(entry)) = self.meshes.get_mut(mesh.0) {
            entry.rotation = *rotation;
        }
    }

    fn resize(&mut self, width: u32, height: u32, _pixel_ratio: f32) {
        if self.mounted {
            self.allocate(width, height);
        }
    }

    fn render(&mut self, camera: &Camera) -> Result<(), AsciiError> {
        if !self.mounted {
            return Err(AsciiError::NotMounted);
        }
        self.clear();
        for id in self.attached.clone() {
            self.render_mesh(id, camera)?;
        }
        Ok(())
    }

    fn dispose(&mut self) {
        self.mounted = false;
        self.meshes.clear();
        self.attached.clear();
        self.lights.clear();
        self.allocate(0, 0);
    }
}

/// Map brightness to a ramp character. Covered cells never use the blank.
fn shade_char(brightness: f32) -> char {
    let steps = (LUMINOSITY_RAMP.len() - 2) as f32;
    let index = 1 + (brightness.clamp(0.0, 1.0) * steps).round() as usize;
    LUMINOSITY_RAMP[index.min(LUMINOSITY_RAMP.len() - 1)]
}

fn to_color(rgb: Rgb) -> Color {
    let [r, g, b] = rgb.to_rgb8();
    Color::Rgb { r, g, b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(v0: (f32, f32), v1: (f32, f32), v2: (f32, f32), p: (f32, f32)) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
