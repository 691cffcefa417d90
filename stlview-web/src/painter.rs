/// Flat-shaded triangle projection for 2D canvas drawing.
///
/// The browser engine has no depth buffer, so faces are projected,
/// shaded and then painted back to front.
use nalgebra::Vector3;
use stlview_core::{Camera, LightRig, Material, RotationState, Rgb, TriangleGeometry};

/// A projected, shaded triangle in CSS pixels
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub points: [(f32, f32); 3],
    /// Mean normalized depth, larger is farther
    pub depth: f32,
    pub color: Rgb,
}

/// Everything needed to shade one mesh
pub struct MeshView<'a> {
    pub geometry: &'a TriangleGeometry,
    pub rotation: &'a RotationState,
    pub material: &'a Material,
}

/// Project every triangle of `mesh` into `out`. Triangles with a vertex
/// behind the camera or outside the depth range are skipped.
pub fn project_faces(
    mesh: &MeshView<'_>,
    lights: &LightRig,
    camera: &Camera,
    width: u32,
    height: u32,
    out: &mut Vec<Face>,
) {
    let model = mesh.rotation.matrix();
    let mvp = camera.projection_matrix() * camera.view_matrix() * model;
    let view_dir = (camera.position - camera.target)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3::z);

    out.reserve(mesh.geometry.triangle_count());
    'triangles: for triangle in mesh.geometry.triangles() {
        let mut points = [(0.0, 0.0); 3];
        let mut depth = 0.0;
        for (point, vertex) in points.iter_mut().zip(&triangle.vertices) {
            let Some((x, y, z)) = camera.project_with(&mvp, vertex, width, height) else {
                continue 'triangles;
            };
            *point = (x, y);
            depth += z / 3.0;
        }

        let normal = mesh.rotation.rotate_vector(&triangle.shading_normal());
        out.push(Face {
            points,
            depth,
            color: lights.shade(mesh.material, &normal, &view_dir),
        });
    }
}

/// Painter's order: farthest face first.
pub fn sort_back_to_front(faces: &mut [Face]) {
    faces.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        let mut camera = Camera::default();
        camera.set_viewport(400, 300);
        camera
    }

    fn project(geometry: &TriangleGeometry, rotation: RotationState) -> Vec<Face> {
        let material = Material::default();
        let mesh = MeshView {
            geometry,
            rotation: &rotation,
            material: &material,
        };
        let mut faces = Vec::new();
        project_faces(&mesh, &LightRig::three_point(), &camera(), 400, 300, &mut faces);
        faces
    }

    #[test]
    fn test_cube_projects_every_face_on_screen() {
        let cube = TriangleGeometry::cube(2.0).normalized(3.0).geometry;
        let faces = project(&cube, RotationState::new(0.3, 0.5, 0.0));

        assert_eq!(faces.len(), 12);
        for face in &faces {
            for &(x, y) in &face.points {
                assert!((0.0..=400.0).contains(&x), "x = {x}");
                assert!((0.0..=300.0).contains(&y), "y = {y}");
            }
        }
    }

    #[test]
    fn test_faces_behind_camera_are_skipped() {
        let mut geometry = TriangleGeometry::new();
        geometry.push_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        geometry.push_triangle([0.0, 0.0, 1.0], [[0.0, 0.0, 8.0], [1.0, 0.0, 8.0], [0.0, 1.0, 8.0]]);

        assert_eq!(project(&geometry, RotationState::zero()).len(), 1);
    }

    #[test]
    fn test_sort_back_to_front() {
        let cube = TriangleGeometry::cube(2.0).normalized(3.0).geometry;
        let mut faces = project(&cube, RotationState::new(0.2, 0.9, 0.0));
        sort_back_to_front(&mut faces);

        assert!(faces.windows(2).all(|pair| pair[0].depth >= pair[1].depth));
    }

    #[test]
    fn test_front_face_is_lit_more_than_back_face() {
        let cube = TriangleGeometry::cube(2.0).normalized(3.0).geometry;
        let mut faces = project(&cube, RotationState::zero());
        sort_back_to_front(&mut faces);

        let back = faces.first().map(|f| f.color.luminance()).unwrap_or_default();
        let front = faces.last().map(|f| f.color.luminance()).unwrap_or_default();
        assert!(front > back);
    }
}
