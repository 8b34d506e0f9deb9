/// Geometry primitives for 3D rendering
use nalgebra::{Point3, Vector3};

/// Opaque RGB color, no alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale every channel by the same intensity, clamped to `[0, 1]`
    pub fn scale(self, intensity: f32) -> Self {
        let k = if intensity.is_nan() { 0.0 } else { intensity.clamp(0.0, 1.0) };
        let channel = |c: u8| (c as f32 * k).round() as u8;
        Self::new(channel(self.r), channel(self.g), channel(self.b))
    }

    /// Relative luminance in `[0, 1]`
    pub fn luminance(self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }
}

/// Clear color
pub const BASE: Rgb = Rgb::new(0, 0, 0);
/// Wireframe and overlay color
pub const LINE: Rgb = Rgb::new(255, 0, 0);
/// Default face color
pub const PRIMARY: Rgb = Rgb::new(255, 255, 255);

/// A triangle face: three positions and one color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Point3<f32>; 3],
    pub color: Rgb,
}

impl Triangle {
    pub fn new(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self::with_color(v0, v1, v2, PRIMARY)
    }

    pub fn with_color(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>, color: Rgb) -> Self {
        Self {
            vertices: [v0, v1, v2],
            color,
        }
    }

    fn from_coords(v: [[f32; 3]; 3]) -> Self {
        Self::new(
            Point3::from(v[0]),
            Point3::from(v[1]),
            Point3::from(v[2]),
        )
    }

    /// Unit face normal `(v1 - v0) x (v2 - v0)`.
    ///
    /// Collinear or non-finite vertices have no normal and yield `None`.
    pub fn face_normal(&self) -> Option<Vector3<f32>> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        let normal = edge1.cross(&edge2);
        let len = normal.norm();
        if !len.is_finite() || len <= f32::EPSILON * f32::EPSILON {
            return None;
        }
        Some(normal / len)
    }

    /// Mean z of the three vertices
    pub fn average_depth(&self) -> f32 {
        let [v0, v1, v2] = self.vertices;
        (v0.z + v1.z + v2.z) / 3.0
    }

    /// Same triangle with the opposite winding order
    pub fn reversed(&self) -> Self {
        let [v0, v1, v2] = self.vertices;
        Self::with_color(v0, v2, v1, self.color)
    }

    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite())
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// The demo cube spanning `[0, 1]` on every axis.
    ///
    /// Winding is chosen so every face normal points out of the cube.
    pub fn unit_cube() -> Self {
        const FACES: [[[f32; 3]; 3]; 12] = [
            // South (z = 0)
            [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
            [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
            // East (x = 1)
            [[1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, 1.0]],
            [[1.0, 0.0, 0.0], [1.0, 1.0, 1.0], [1.0, 0.0, 1.0]],
            // North (z = 1)
            [[1.0, 0.0, 1.0], [1.0, 1.0, 1.0], [0.0, 1.0, 1.0]],
            [[1.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 0.0, 1.0]],
            // West (x = 0)
            [[0.0, 0.0, 1.0], [0.0, 1.0, 1.0], [0.0, 1.0, 0.0]],
            [[0.0, 0.0, 1.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]],
            // Top (y = 1)
            [[0.0, 1.0, 0.0], [0.0, 1.0, 1.0], [1.0, 1.0, 1.0]],
            [[0.0, 1.0, 0.0], [1.0, 1.0, 1.0], [1.0, 1.0, 0.0]],
            // Bottom (y = 0)
            [[1.0, 0.0, 1.0], [0.0, 0.0, 1.0], [0.0, 0.0, 0.0]],
            [[1.0, 0.0, 1.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0]],
        ];

        let mut mesh = Self::with_capacity(FACES.len());
        for face in FACES {
            mesh.add_triangle(Triangle::from_coords(face));
        }
        mesh
    }

    /// Cube of edge `size` centered on the origin, same winding as `unit_cube`
    pub fn cube(size: f32) -> Self {
        let mut mesh = Self::unit_cube();
        for triangle in &mut mesh.triangles {
            for v in &mut triangle.vertices {
                *v = Point3::new((v.x - 0.5) * size, (v.y - 0.5) * size, (v.z - 0.5) * size);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_scale() {
        assert_eq!(PRIMARY.scale(1.0), PRIMARY);
        assert_eq!(PRIMARY.scale(0.0), BASE);
        assert_eq!(PRIMARY.scale(-0.5), BASE);
        assert_eq!(PRIMARY.scale(2.0), PRIMARY);
        assert_eq!(PRIMARY.scale(f32::NAN), BASE);
        assert_eq!(Rgb::new(200, 100, 0).scale(0.5), Rgb::new(100, 50, 0));
    }

    #[test]
    fn test_face_normal() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );
        let normal = tri.face_normal().unwrap();
        assert!((normal - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-6);

        let flipped = tri.reversed().face_normal().unwrap();
        assert!((flipped + normal).norm() < 1e-6);
    }

    #[test]
    fn test_degenerate_normal() {
        let collinear = Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(2.0, 2.0, 2.0),
        );
        assert!(collinear.face_normal().is_none());

        let point = Point3::new(3.0, 3.0, 3.0);
        assert!(Triangle::new(point, point, point).face_normal().is_none());

        let nan = Triangle::new(
            Point3::new(f32::NAN, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        );
        assert!(nan.face_normal().is_none());
        assert!(!nan.is_finite());
    }

    #[test]
    fn test_average_depth() {
        let tri = Triangle::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(0.0, 0.0, 6.0),
        );
        assert!((tri.average_depth() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_unit_cube() {
        let cube = Mesh::unit_cube();
        assert_eq!(cube.len(), 12);
        assert!(cube.triangles.iter().all(|t| t.color == PRIMARY));
        assert!(cube.triangles.iter().all(|t| t.face_normal().is_some()));
    }

    #[test]
    fn test_centered_cube() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.len(), 12);
        for tri in &cube.triangles {
            for v in &tri.vertices {
                assert_eq!(v.x.abs(), 1.0);
                assert_eq!(v.y.abs(), 1.0);
                assert_eq!(v.z.abs(), 1.0);
            }
            // Normals point outward
            let normal = tri.face_normal().unwrap();
            let center = (tri.vertices[0].coords + tri.vertices[1].coords + tri.vertices[2].coords) / 3.0;
            assert!(normal.dot(&center) > 0.0);
        }
    }
}
