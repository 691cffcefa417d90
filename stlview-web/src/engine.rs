/// 2D canvas engine: painter's-algorithm rendering of flat-shaded meshes
use stlview_core::{Camera, Engine, Light, LightRig, Material, NormalizedMesh, RotationState, Rgb, TriangleGeometry};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlElement};

use crate::painter::{project_faces, sort_back_to_front, Face, MeshView};

#[derive(Debug, thiserror::Error)]
pub enum CanvasError {
    #[error("canvas is not mounted")]
    NotMounted,
    #[error("2d canvas context unavailable")]
    NoContext,
    #[error("canvas call failed: {0}")]
    Js(String),
}

impl From<JsValue> for CanvasError {
    fn from(value: JsValue) -> Self {
        CanvasError::Js(crate::describe(&value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshId(usize);

struct CanvasMesh {
    geometry: TriangleGeometry,
    material: Material,
    rotation: RotationState,
}

pub struct CanvasEngine {
    container: HtmlElement,
    canvas: HtmlCanvasElement,
    context: Option<CanvasRenderingContext2d>,
    meshes: Vec<Option<CanvasMesh>>,
    attached: Vec<MeshId>,
    lights: LightRig,
    background: Rgb,
    width: u32,
    height: u32,
    faces: Vec<Face>,
}

impl CanvasEngine {
    pub fn new(container: HtmlElement, canvas: HtmlCanvasElement) -> Self {
        Self {
            container,
            canvas,
            context: None,
            meshes: Vec::new(),
            attached: Vec::new(),
            lights: LightRig::new(),
            background: Rgb::WHITE,
            width: 0,
            height: 0,
            faces: Vec::new(),
        }
    }

    /// Size the backing store in device pixels and the element in CSS pixels.
    fn size_canvas(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), CanvasError> {
        let ratio = if pixel_ratio > 0.0 { pixel_ratio } else { 1.0 };
        self.width = width;
        self.height = height;
        self.canvas.set_width((width as f32 * ratio).round() as u32);
        self.canvas.set_height((height as f32 * ratio).round() as u32);

        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px"))?;
        style.set_property("height", &format!("{height}px"))?;
        style.set_property("display", "block")?;
        style.set_property("touch-action", "none")?;

        if let Some(context) = &self.context {
            context.set_transform(ratio as f64, 0.0, 0.0, ratio as f64, 0.0, 0.0)?;
        }
        Ok(())
    }

    fn paint(&self, context: &CanvasRenderingContext2d) {
        context.set_fill_style_str(&self.background.to_css());
        context.fill_rect(0.0, 0.0, self.width as f64, self.height as f64);
        context.set_line_width(0.5);

        for face in &self.faces {
            let css = face.color.to_css();
            context.set_fill_style_str(&css);
            context.set_stroke_style_str(&css);

            let [(x0, y0), (x1, y1), (x2, y2)] = face.points;
            context.begin_path();
            context.move_to(x0 as f64, y0 as f64);
            context.line_to(x1 as f64, y1 as f64);
            context.line_to(x2 as f64, y2 as f64);
            context.close_path();
            context.fill();
            // Stroking with the fill color hides antialiasing seams between faces.
            context.stroke();
        }
    }
}

impl Engine for CanvasEngine {
    type Mesh = MeshId;
    type Error = CanvasError;

    fn mount(&mut self, width: u32, height: u32, pixel_ratio: f32) -> Result<(), CanvasError> {
        self.container.append_child(&self.canvas)?;
        let context = self
            .canvas
            .get_context("2d")?
            .ok_or(CanvasError::NoContext)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| CanvasError::NoContext)?;
        self.context = Some(context);
        self.lights.clear();
        self.size_canvas(width, height, pixel_ratio)?;
        log::debug!("canvas mounted at {width}x{height} (ratio {pixel_ratio})");
        Ok(())
    }

    fn add_light(&mut self, light: &Light) {
        self.lights.push(*light);
    }

    fn set_background(&mut self, color: Rgb) {
        self.background = color;
    }

    fn upload_mesh(&mut self, mesh: &NormalizedMesh, material: &Material) -> Result<MeshId, CanvasError> {
        if self.context.is_none() {
            return Err(CanvasError::NotMounted);
        }
        let entry = CanvasMesh {
            geometry: mesh.geometry.clone(),
            material: *material,
            rotation: RotationState::zero(),
        };
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

    fn resize(&mut self, width: u32, height: u32, pixel_ratio: f32) {
        if self.context.is_none() {
            return;
        }
        if let Err(e) = self.size_canvas(width, height, pixel_ratio) {
            log::warn!("canvas resize failed: {e}");
        }
    }

    fn render(&mut self, camera: &Camera) -> Result<(), CanvasError> {
        let context = self.context.clone().ok_or(CanvasError::NotMounted)?;

        let mut faces = std::mem::take(&mut self.faces);
        faces.clear();
        for id in &self.attached {
            let Some(Some(mesh)) = self.meshes.get(id.0) else {
                continue;
            };
            let view = MeshView {
                geometry: &mesh.geometry,
                rotation: &mesh.rotation,
                material: &mesh.material,
            };
            project_faces(&view, &self.lights, camera, self.width, self.height, &mut faces);
        }
        sort_back_to_front(&mut faces);
        self.faces = faces;

        self.paint(&context);
        Ok(())
    }

    fn dispose(&mut self) {
        self.canvas.remove();
        self.context = None;
        self.meshes.clear();
        self.attached.clear();
        self.lights.clear();
        self.faces = Vec::new();
    }
}
