/// 3D transformation matrices and frame rotation state
///
/// Matrices use the row-vector convention: a point is the row `[x y z 1]`
/// multiplied on the left, so translation lives in row 3 and the homogeneous
/// `w` comes out of column 3.
use nalgebra::{Matrix4, Point3, RowVector4};

use crate::geometry::Triangle;

/// Accumulated rotation angle driving the animation (in radians)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameState {
    pub theta: f32,
}

impl FrameState {
    pub fn new(theta: f32) -> Self {
        Self { theta }
    }

    /// Advance the angle by `elapsed * angular_rate`.
    ///
    /// Steps that would not move the angle forward (negative or non-finite
    /// elapsed time, a negative rate) are ignored so the angle only grows.
    pub fn advance(&mut self, elapsed_seconds: f32, angular_rate: f32) {
        let delta = elapsed_seconds * angular_rate;
        if elapsed_seconds.is_finite() && delta.is_finite() && delta > 0.0 {
            self.theta += delta;
        }
    }

    /// Explicit restart back to the initial pose
    pub fn reset(&mut self) {
        self.theta = 0.0;
    }
}

/// Transform builder; every factory sets all 16 entries
pub struct Transform;

impl Transform {
    #[rustfmt::skip]
    pub fn identity() -> Matrix4<f32> {
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation about the Z axis, embedded in the x/y block
    #[rustfmt::skip]
    pub fn rotation_z(theta: f32) -> Matrix4<f32> {
        let (s, c) = theta.sin_cos();
        Matrix4::new(
            c, s, 0.0, 0.0,
            -s, c, 0.0, 0.0,
            0.0, 0.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Rotation about the X axis, embedded in the y/z block
    #[rustfmt::skip]
    pub fn rotation_x(theta: f32) -> Matrix4<f32> {
        let (s, c) = theta.sin_cos();
        Matrix4::new(
            1.0, 0.0, 0.0, 0.0,
            0.0, c, s, 0.0,
            0.0, -s, c, 0.0,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    /// Perspective projection for a left-handed view looking down +z.
    ///
    /// Maps z = near to 0 and z = far to 1 after the w-divide. No parameter
    /// checks happen here; see `ProjectionParams::validate`.
    #[rustfmt::skip]
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
        let fov_rad = 1.0 / (fov_degrees * 0.5).to_radians().tan();
        let depth = far / (far - near);
        Matrix4::new(
            aspect * fov_rad, 0.0, 0.0, 0.0,
            0.0, fov_rad, 0.0, 0.0,
            0.0, 0.0, depth, 1.0,
            0.0, 0.0, -near * depth, 0.0,
        )
    }
}

/// Multiply `[x y z 1]` by `matrix`, then divide by `w` when it is non-zero
pub fn transform_point(point: &Point3<f32>, matrix: &Matrix4<f32>) -> Point3<f32> {
    let row = RowVector4::new(point.x, point.y, point.z, 1.0) * matrix;
    let w = row[3];
    if w != 0.0 {
        Point3::new(row[0] / w, row[1] / w, row[2] / w)
    } else {
        Point3::new(row[0], row[1], row[2])
    }
}

/// Apply `transform_point` to each vertex, keeping the color
pub fn transform_triangle(triangle: &Triangle, matrix: &Matrix4<f32>) -> Triangle {
    Triangle {
        vertices: triangle.vertices.map(|v| transform_point(&v, matrix)),
        color: triangle.color,
    }
}
