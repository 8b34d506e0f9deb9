/// Camera, perspective projection and viewport mapping
use nalgebra::{Matrix4, Point3};

use crate::error::{Error, Result};
use crate::transform::Transform;

/// Zoom the camera returns to on reset
pub const RESET_ZOOM: f32 = 8.0;

/// Inputs to the perspective projection matrix
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionParams {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Screen height divided by screen width
    pub aspect: f32,
}

impl ProjectionParams {
    pub fn new(fov_degrees: f32, near: f32, far: f32, aspect: f32) -> Self {
        Self {
            fov_degrees,
            near,
            far,
            aspect,
        }
    }

    /// Reject parameters that would produce a degenerate or depth-inverted matrix
    pub fn validate(&self) -> Result<()> {
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(Error::InvalidProjection(format!(
                "near plane must be positive, got {}",
                self.near
            )));
        }
        if !(self.far.is_finite() && self.near < self.far) {
            return Err(Error::InvalidProjection(format!(
                "near plane ({}) must be closer than far plane ({})",
                self.near, self.far
            )));
        }
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(Error::InvalidProjection(format!(
                "field of view must be within (0, 180) degrees, got {}",
                self.fov_degrees
            )));
        }
        if !(self.aspect.is_finite() && self.aspect > 0.0) {
            return Err(Error::InvalidProjection(format!(
                "aspect ratio must be positive, got {}",
                self.aspect
            )));
        }
        Ok(())
    }

    /// Validated projection matrix
    pub fn matrix(&self) -> Result<Matrix4<f32>> {
        self.validate()?;
        Ok(Transform::perspective(
            self.fov_degrees,
            self.aspect,
            self.near,
            self.far,
        ))
    }
}

impl Default for ProjectionParams {
    fn default() -> Self {
        Self::new(90.0, 0.1, 1000.0, 1.0)
    }
}

/// Fixed camera at the origin looking down +z.
///
/// `zoom` is the forward offset added to every transformed z and stands in
/// for the camera distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Point3<f32>,
    pub zoom: f32,
}

impl Camera {
    pub fn new(zoom: f32) -> Self {
        Self {
            position: Point3::origin(),
            zoom,
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom *= 0.9;
    }

    pub fn zoom_out(&mut self) {
        self.zoom *= 1.1;
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = RESET_ZOOM;
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(3.0)
    }
}

/// Screen dimensions in pixels (or terminal cells)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    /// Map NDC x/y in `[-1, 1]` to screen coordinates; z is kept as is
    pub fn to_screen(&self, ndc: &Point3<f32>) -> Point3<f32> {
        Point3::new(
            (ndc.x + 1.0) * 0.5 * self.width,
            (ndc.y + 1.0) * 0.5 * self.height,
            ndc.z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform_point;

    #[test]
    fn test_default_projection_matrix() {
        let m = ProjectionParams::default().matrix().unwrap();
        assert!((m[(0, 0)] - 1.0).abs() < 1e-5);
        assert!((m[(1, 1)] - 1.0).abs() < 1e-5);
        assert!((m[(2, 2)] - 1000.0 / 999.9).abs() < 1e-5);
        assert!((m[(3, 2)] + 100.0 / 999.9).abs() < 1e-5);
        assert_eq!(m[(2, 3)], 1.0);
        assert_eq!(m[(3, 3)], 0.0);
        assert_eq!(m[(0, 1)], 0.0);
        assert_eq!(m[(3, 0)], 0.0);
    }

    #[test]
    fn test_aspect_scales_x() {
        let m = ProjectionParams::new(90.0, 0.1, 1000.0, 0.5).matrix().unwrap();
        assert!((m[(0, 0)] - 0.5).abs() < 1e-5);
        assert!((m[(1, 1)] - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_near_and_far_depth() {
        for (near, far, fov) in [(0.1, 1000.0, 90.0), (1.0, 10.0, 60.0), (0.5, 50.0, 120.0)] {
            let m = ProjectionParams::new(fov, near, far, 1.0).matrix().unwrap();
            let at_near = transform_point(&Point3::new(0.0, 0.0, near), &m);
            let at_far = transform_point(&Point3::new(0.0, 0.0, far), &m);
            assert!(at_near.z.abs() < 1e-4, "near -> {}", at_near.z);
            assert!((at_far.z - 1.0).abs() < 1e-4, "far -> {}", at_far.z);
        }
    }

    #[test]
    fn test_invalid_projection() {
        let bad = [
            ProjectionParams::new(90.0, 0.0, 1000.0, 1.0),
            ProjectionParams::new(90.0, -1.0, 1000.0, 1.0),
            ProjectionParams::new(90.0, 10.0, 10.0, 1.0),
            ProjectionParams::new(90.0, 10.0, 1.0, 1.0),
            ProjectionParams::new(0.0, 0.1, 1000.0, 1.0),
            ProjectionParams::new(180.0, 0.1, 1000.0, 1.0),
            ProjectionParams::new(f32::NAN, 0.1, 1000.0, 1.0),
            ProjectionParams::new(90.0, 0.1, 1000.0, 0.0),
        ];
        for params in bad {
            assert!(
                matches!(params.matrix(), Err(Error::InvalidProjection(_))),
                "{:?} accepted",
                params
            );
        }
    }

    #[test]
    fn test_camera_zoom() {
        let mut camera = Camera::default();
        assert_eq!(camera.position, Point3::origin());
        assert_eq!(camera.zoom, 3.0);

        camera.zoom_in();
        assert!((camera.zoom - 2.7).abs() < 1e-6);
        camera.zoom_out();
        assert!((camera.zoom - 2.97).abs() < 1e-5);
        camera.reset_zoom();
        assert_eq!(camera.zoom, RESET_ZOOM);
    }

    #[test]
    fn test_viewport_mapping() {
        let viewport = Viewport::new(800, 600);
        let corner = viewport.to_screen(&Point3::new(-1.0, -1.0, 0.25));
        assert_eq!(corner, Point3::new(0.0, 0.0, 0.25));
        let center = viewport.to_screen(&Point3::new(0.0, 0.0, 0.5));
        assert_eq!(center, Point3::new(400.0, 300.0, 0.5));
        let far_corner = viewport.to_screen(&Point3::new(1.0, 1.0, 1.0));
        assert_eq!(far_corner, Point3::new(800.0, 600.0, 1.0));
    }
}
