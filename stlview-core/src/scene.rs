/// Scene contents: colors, material, light rig, theme and the mesh slot
use nalgebra::{Point3, Vector3};

use crate::config::ViewerConfig;

/// Linear RGB color with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::new(self.r * factor, self.g * factor, self.b * factor).clamped()
    }

    pub fn add(self, other: Rgb) -> Self {
        Self::new(self.r + other.r, self.g + other.g, self.b + other.b).clamped()
    }

    fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
        )
    }

    pub fn to_rgb8(self) -> [u8; 3] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
        ]
    }

    /// CSS `rgb()` notation
    pub fn to_css(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("rgb({r}, {g}, {b})")
    }

    /// Perceived brightness, used to pick contrasting text colors
    pub fn luminance(self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }
}

/// Solid-color material with a specular highlight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Rgb,
    pub specular: Rgb,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: Rgb::new(0.35, 0.55, 0.85),
            specular: Rgb::new(0.25, 0.25, 0.25),
            shininess: 30.0,
        }
    }
}

/// A light in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Ambient { color: Rgb, intensity: f32 },
    /// Shines from `position` toward the origin
    Directional { color: Rgb, intensity: f32, position: Point3<f32> },
}

/// Lights added to the scene at bootstrap
#[derive(Debug, Clone, PartialEq)]
pub struct LightRig {
    lights: Vec<Light>,
}

impl LightRig {
    pub fn new() -> Self {
        Self { lights: Vec::new() }
    }

    /// Ambient fill plus key, rim and under lights at fixed positions.
    pub fn three_point() -> Self {
        Self {
            lights: vec![
                Light::Ambient { color: Rgb::WHITE, intensity: 0.45 },
                Light::Directional {
                    color: Rgb::WHITE,
                    intensity: 0.8,
                    position: Point3::new(5.0, 5.0, 5.0),
                },
                Light::Directional {
                    color: Rgb::WHITE,
                    intensity: 0.4,
                    position: Point3::new(-5.0, 3.0, -5.0),
                },
                Light::Directional {
                    color: Rgb::WHITE,
                    intensity: 0.2,
                    position: Point3::new(0.0, -5.0, 2.0),
                },
            ],
        }
    }

    pub fn push(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn clear(&mut self) {
        self.lights.clear();
    }

    /// Flat-shaded color of a face with world-space `normal`, seen from `view_dir`
    /// (unit vector from the surface toward the camera).
    pub fn shade(&self, material: &Material, normal: &Vector3<f32>, view_dir: &Vector3<f32>) -> Rgb {
        let mut diffuse = Rgb::new(0.0, 0.0, 0.0);
        let mut specular = Rgb::new(0.0, 0.0, 0.0);

        for light in &self.lights {
            match *light {
                Light::Ambient { color, intensity } => {
                    diffuse = diffuse.add(Rgb::new(
                        material.color.r * color.r * intensity,
                        material.color.g * color.g * intensity,
                        material.color.b * color.b * intensity,
                    ));
                }
                Light::Directional { color, intensity, position } => {
                    let Some(to_light) = position.coords.try_normalize(f32::EPSILON) else {
                        continue;
                    };
                    let lambert = normal.dot(&to_light).max(0.0) * intensity;
                    diffuse = diffuse.add(Rgb::new(
                        material.color.r * color.r * lambert,
                        material.color.g * color.g * lambert,
                        material.color.b * color.b * lambert,
                    ));

                    if lambert > 0.0 {
                        let half = (to_light + view_dir).try_normalize(f32::EPSILON);
                        if let Some(half) = half {
                            let highlight = normal.dot(&half).max(0.0).powf(material.shininess) * intensity;
                            specular = specular.add(material.specular.scaled(highlight));
                        }
                    }
                }
            }
        }

        diffuse.add(specular)
    }
}

impl Default for LightRig {
    fn default() -> Self {
        Self::three_point()
    }
}

/// Background preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn background(self, config: &ViewerConfig) -> Rgb {
        match self {
            Theme::Light => config.light_background,
            Theme::Dark => config.dark_background,
        }
    }
}

/// Holds the one mesh attached to the scene, if any.
#[derive(Debug)]
pub struct MeshSlot<M> {
    mesh: Option<M>,
    triangles: usize,
}

impl<M> MeshSlot<M> {
    pub fn new() -> Self {
        Self {
            mesh: None,
            triangles: 0,
        }
    }

    pub fn get(&self) -> Option<&M> {
        self.mesh.as_ref()
    }

    pub fn is_occupied(&self) -> bool {
        self.mesh.is_some()
    }

    pub fn triangles(&self) -> Option<usize> {
        self.mesh.as_ref().map(|_| self.triangles)
    }

    /// Store `mesh`, handing back the previous occupant.
    pub fn replace(&mut self, mesh: M, triangles: usize) -> Option<M> {
        self.triangles = triangles;
        self.mesh.replace(mesh)
    }

    pub fn take(&mut self) -> Option<M> {
        self.triangles = 0;
        self.mesh.take()
    }
}

impl<M> Default for MeshSlot<M> {
    fn default() -> Self {
        Self::new()
    }
}
