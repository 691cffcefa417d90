/// Triangle-soup geometry, bounding boxes and normalization
use nalgebra::{Point3, Vector3};

/// Geometry stored as parallel position/normal arrays, three floats per vertex.
///
/// Triangles are consecutive vertex triples. Every vertex carries a normal,
/// so both arrays always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleGeometry {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
}

impl TriangleGeometry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(triangles * 9),
            normals: Vec::with_capacity(triangles * 9),
        }
    }

    pub fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3]) {
        self.positions.extend_from_slice(&position);
        self.normals.extend_from_slice(&normal);
    }

    /// Append a triangle, broadcasting the facet normal to all three vertices.
    pub fn push_triangle(&mut self, normal: [f32; 3], vertices: [[f32; 3]; 3]) {
        for vertex in vertices {
            self.push_vertex(vertex, normal);
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// True when the arrays are parallel and hold only whole triangles.
    pub fn is_consistent(&self) -> bool {
        self.positions.len() == self.normals.len() && self.positions.len() % 9 == 0
    }

    pub fn position(&self, index: usize) -> Point3<f32> {
        let i = index * 3;
        Point3::new(self.positions[i], self.positions[i + 1], self.positions[i + 2])
    }

    pub fn normal(&self, index: usize) -> Vector3<f32> {
        let i = index * 3;
        Vector3::new(self.normals[i], self.normals[i + 1], self.normals[i + 2])
    }

    /// Iterate whole triangles in insertion order.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.triangle_count()).map(move |t| {
            let base = t * 3;
            Triangle {
                vertices: [
                    self.position(base),
                    self.position(base + 1),
                    self.position(base + 2),
                ],
                normal: self.normal(base),
            }
        })
    }

    /// Axis-aligned bounds of every vertex, `None` for empty geometry.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut points = self.positions.chunks_exact(3).map(|p| Point3::new(p[0], p[1], p[2]));
        let first = points.next()?;
        Some(points.fold(BoundingBox::from_point(first), |mut bbox, p| {
            bbox.include(&p);
            bbox
        }))
    }

    /// Center the geometry on its bounding-box centroid and scale it uniformly
    /// so its longest dimension equals `target_size`.
    ///
    /// A zero-extent box (a single point, or empty geometry) keeps scale 1.
    pub fn normalized(mut self, target_size: f32) -> NormalizedMesh {
        let Some(bbox) = self.bounding_box() else {
            return NormalizedMesh {
                geometry: self,
                center: Point3::origin(),
                scale: 1.0,
            };
        };

        let center = bbox.center();
        let max_dimension = bbox.max_dimension();
        let scale = if max_dimension > f32::EPSILON {
            target_size / max_dimension
        } else {
            1.0
        };

        for p in self.positions.chunks_exact_mut(3) {
            p[0] = (p[0] - center.x) * scale;
            p[1] = (p[1] - center.y) * scale;
            p[2] = (p[2] - center.z) * scale;
        }

        NormalizedMesh {
            geometry: self,
            center,
            scale,
        }
    }

    /// Closed cube centered on the origin, used as a placeholder model.
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut geometry = Self::with_capacity(12);

        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]]),
            ([0.0, 0.0, -1.0], [[h, -h, -h], [-h, -h, -h], [-h, h, -h], [h, h, -h]]),
            ([0.0, 1.0, 0.0], [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]]),
            ([0.0, -1.0, 0.0], [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]]),
            ([1.0, 0.0, 0.0], [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]]),
            ([-1.0, 0.0, 0.0], [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]]),
        ];

        for (normal, [a, b, c, d]) in faces {
            geometry.push_triangle(normal, [a, b, c]);
            geometry.push_triangle(normal, [a, c, d]);
        }

        geometry
    }
}

/// A triangle read back out of a [`TriangleGeometry`]
#[derive(Debug, Clone, Copy)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub normal: Vector3<f32>,
}

impl Triangle {
    /// Calculate the face normal from the triangle's winding
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let edge1 = self.vertices[1] - self.vertices[0];
        let edge2 = self.vertices[2] - self.vertices[0];
        edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::zeros)
    }

    /// Stored normal, falling back to the winding normal when the file left it zeroed.
    pub fn shading_normal(&self) -> Vector3<f32> {
        self.normal
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| self.calculate_normal())
    }
}

/// Smallest axis-aligned box containing a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn from_point(point: Point3<f32>) -> Self {
        Self { min: point, max: point }
    }

    pub fn include(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max()
    }
}

/// Geometry after centering and uniform scaling.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMesh {
    pub geometry: TriangleGeometry,
    /// Bounding-box center of the source geometry, in source units.
    pub center: Point3<f32>,
    /// Factor applied to source units.
    pub scale: f32,
}

impl NormalizedMesh {
    pub fn triangle_count(&self) -> usize {
        self.geometry.triangle_count()
    }
}
