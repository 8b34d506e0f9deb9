/// Per-frame transform, cull, light, project and sort pipeline
///
/// Each triangle moves through
/// `Model -> RotatedZ -> RotatedZX -> Translated -> {Culled | Lit -> Projected -> Viewport}`
/// and every stage returns a new `Triangle`. Triangles are independent of
/// each other up to `depth_sort`, which needs the whole frame.
use nalgebra::{Matrix4, Point3, Vector3};

use crate::config::EngineConfig;
use crate::error::Result;
use crate::geometry::{Mesh, Triangle, BASE};
use crate::painter::{depth_sort, emit, DisplayOptions, ScreenTriangle};
use crate::projection::{Camera, ProjectionParams, Viewport};
use crate::renderer::Renderer;
use crate::transform::{transform_triangle, FrameState, Transform};

/// The X rotation runs at half the Z rate so the mesh tumbles
const X_RATE_FACTOR: f32 = 0.5;

/// Direction the light travels, pointing back at the camera
pub fn light_direction() -> Vector3<f32> {
    Vector3::new(0.0, 0.0, -1.0).normalize()
}

/// Rotate about Z, then about X
pub fn rotate(triangle: &Triangle, rot_z: &Matrix4<f32>, rot_x: &Matrix4<f32>) -> Triangle {
    let rotated_z = transform_triangle(triangle, rot_z);
    transform_triangle(&rotated_z, rot_x)
}

/// Push every vertex forward by `zoom`
pub fn translate(triangle: &Triangle, zoom: f32) -> Triangle {
    let offset = Vector3::new(0.0, 0.0, zoom);
    Triangle {
        vertices: triangle.vertices.map(|v| v + offset),
        color: triangle.color,
    }
}

/// True when the face normal points back toward the camera
pub fn is_front_facing(normal: &Vector3<f32>, p0: &Point3<f32>, camera: &Point3<f32>) -> bool {
    normal.dot(&(p0 - camera)) < 0.0
}

/// Flat-shading intensity in `[0, 1]`
pub fn shade(normal: &Vector3<f32>, light: &Vector3<f32>) -> f32 {
    normal.dot(light).clamp(0.0, 1.0)
}

/// View space to NDC, including the w-divide
pub fn project(triangle: &Triangle, projection: &Matrix4<f32>) -> Triangle {
    transform_triangle(triangle, projection)
}

/// NDC to screen coordinates
pub fn to_viewport(triangle: &Triangle, viewport: &Viewport) -> Triangle {
    Triangle {
        vertices: triangle.vertices.map(|v| viewport.to_screen(&v)),
        color: triangle.color,
    }
}

/// Counters for one pass over the mesh
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub total: usize,
    pub culled: usize,
    /// Zero-area faces and vertices that projected to non-finite values
    pub degenerate: usize,
    pub emitted: usize,
}

/// Output of `Pipeline::process`, ready to emit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    pub triangles: Vec<ScreenTriangle>,
    pub stats: FrameStats,
}

/// Frame pipeline configured once at startup
#[derive(Debug, Clone)]
pub struct Pipeline {
    params: ProjectionParams,
    projection: Matrix4<f32>,
    viewport: Viewport,
    pixel_aspect: f32,
    light: Vector3<f32>,
    angular_rate: f32,
    pub camera: Camera,
    pub display: DisplayOptions,
}

impl Pipeline {
    /// Validate the config and build the projection matrix.
    ///
    /// Invalid projection or screen settings fail here rather than
    /// producing a degenerate frame later.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;
        let params = config.projection();
        let projection = params.matrix()?;
        log::debug!(
            "[PIPELINE] {}x{} fov={} near={} far={} aspect={:.3} zoom={}",
            config.screen_width,
            config.screen_height,
            params.fov_degrees,
            params.near,
            params.far,
            params.aspect,
            config.zoom
        );

        Ok(Self {
            params,
            projection,
            viewport: config.viewport(),
            pixel_aspect: config.pixel_aspect,
            light: light_direction(),
            angular_rate: config.angular_rate,
            camera: config.camera(),
            display: config.display(),
        })
    }

    pub fn projection(&self) -> ProjectionParams {
        self.params
    }

    pub fn projection_matrix(&self) -> &Matrix4<f32> {
        &self.projection
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Change the output size and rebuild the projection for its aspect.
    ///
    /// On error the previous viewport and projection stay in place.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        let params = ProjectionParams {
            aspect: viewport.height * self.pixel_aspect / viewport.width,
            ..self.params
        };
        self.projection = params.matrix()?;
        self.params = params;
        self.viewport = viewport;
        log::debug!(
            "[PIPELINE] viewport {}x{} aspect={:.3}",
            viewport.width,
            viewport.height,
            params.aspect
        );
        Ok(())
    }

    /// One scheduler tick: advance the angle, clear, process and emit
    pub fn update<R: Renderer + ?Sized>(
        &self,
        state: &mut FrameState,
        mesh: &Mesh,
        elapsed_seconds: f32,
        renderer: &mut R,
    ) -> FrameStats {
        state.advance(elapsed_seconds, self.angular_rate);
        let frame = self.process(mesh, state);

        renderer.clear(BASE);
        emit(&frame.triangles, self.display, renderer);

        log::trace!(
            "[FRAME] theta={:.3} total={} culled={} degenerate={} emitted={}",
            state.theta,
            frame.stats.total,
            frame.stats.culled,
            frame.stats.degenerate,
            frame.stats.emitted
        );
        frame.stats
    }

    /// Run the whole mesh through the pipeline at the given angle.
    ///
    /// With faces shown, back faces are culled and the result is sorted
    /// farthest first. In wireframe mode culling is skipped and mesh order
    /// is kept.
    pub fn process(&self, mesh: &Mesh, state: &FrameState) -> Frame {
        let rot_z = Transform::rotation_z(state.theta);
        let rot_x = Transform::rotation_x(state.theta * X_RATE_FACTOR);

        let mut stats = FrameStats {
            total: mesh.len(),
            ..FrameStats::default()
        };
        let mut triangles = Vec::with_capacity(mesh.len());

        for triangle in &mesh.triangles {
            let translated = translate(&rotate(triangle, &rot_z, &rot_x), self.camera.zoom);

            let Some(normal) = translated.face_normal() else {
                stats.degenerate += 1;
                continue;
            };

            if self.display.show_faces
                && !is_front_facing(&normal, &translated.vertices[0], &self.camera.position)
            {
                stats.culled += 1;
                continue;
            }

            let lit = Triangle {
                color: translated.color.scale(shade(&normal, &self.light)),
                ..translated
            };

            let projected = project(&lit, &self.projection);
            if !projected.is_finite() {
                stats.degenerate += 1;
                continue;
            }
            let screen = to_viewport(&projected, &self.viewport);

            triangles.push(ScreenTriangle {
                points: screen.vertices,
                color: screen.color,
                depth: translated.average_depth(),
            });
        }

        if self.display.show_faces {
            depth_sort(&mut triangles);
        }
        stats.emitted = triangles.len();

        Frame { triangles, stats }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rgb, PRIMARY};

    fn facing_camera() -> Triangle {
        // Normal (0, 0, -1) at z = 0
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
        )
    }

    #[test]
    fn test_translate() {
        let moved = translate(&facing_camera(), 3.0);
        for (a, b) in moved.vertices.iter().zip(facing_camera().vertices.iter()) {
            assert_eq!(a.x, b.x);
            assert_eq!(a.y, b.y);
            assert_eq!(a.z, b.z + 3.0);
        }
    }

    #[test]
    fn test_rotate_zero_angle() {
        let tri = facing_camera();
        let out = rotate(&tri, &Transform::rotation_z(0.0), &Transform::rotation_x(0.0));
        for (a, b) in out.vertices.iter().zip(tri.vertices.iter()) {
            assert!((a - b).norm() < 1e-6);
        }
        assert_eq!(out.color, tri.color);
    }

    #[test]
    fn test_winding_flips_culling() {
        let camera = Point3::origin();
        let tri = translate(&facing_camera(), 3.0);
        let reversed = tri.reversed();

        let n = tri.face_normal().unwrap();
        let r = reversed.face_normal().unwrap();
        assert!(is_front_facing(&n, &tri.vertices[0], &camera));
        assert!(!is_front_facing(&r, &reversed.vertices[0], &camera));
    }

    #[test]
    fn test_shade_clamp() {
        let light = light_direction();
        assert_eq!(shade(&Vector3::new(0.0, 0.0, -1.0), &light), 1.0);
        assert_eq!(shade(&Vector3::new(1.0, 0.0, 0.0), &light), 0.0);
        assert_eq!(shade(&Vector3::new(0.0, 0.0, 1.0), &light), 0.0);

        assert_eq!(PRIMARY.scale(shade(&Vector3::new(0.0, 0.0, -1.0), &light)), PRIMARY);
        assert_eq!(
            PRIMARY.scale(shade(&Vector3::new(0.0, 1.0, 0.0), &light)),
            Rgb::new(0, 0, 0)
        );
    }

    #[test]
    fn test_degenerate_triangles_are_dropped() {
        let point = Point3::new(0.5, 0.5, 0.5);
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(point, point, point));
        mesh.add_triangle(facing_camera());

        let pipeline = Pipeline::new(&EngineConfig::default()).unwrap();
        let frame = pipeline.process(&mesh, &FrameState::default());
        assert_eq!(frame.stats.degenerate, 1);
        assert_eq!(frame.triangles.len(), 1);
        assert!(frame.triangles[0]
            .points
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite()));
    }

    #[test]
    fn test_non_finite_projection_is_dropped() {
        // A near-zero zoom leaves w tiny enough that the divide overflows
        let config = EngineConfig {
            zoom: 1e-38,
            ..EngineConfig::default()
        };
        let mut mesh = Mesh::new();
        mesh.add_triangle(Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.0, 1e3, 0.0),
            Point3::new(1e3, 1e3, 0.0),
        ));

        let pipeline = Pipeline::new(&config).unwrap();
        let frame = pipeline.process(&mesh, &FrameState::default());
        assert_eq!(
            frame.stats,
            FrameStats {
                total: 1,
                culled: 0,
                degenerate: 1,
                emitted: 0,
            }
        );
        assert!(frame.triangles.is_empty());
    }

    #[test]
    fn test_projection_follows_viewport() {
        let mut pipeline = Pipeline::new(&EngineConfig::default()).unwrap();
        assert_eq!(
            *pipeline.projection_matrix(),
            ProjectionParams::default().matrix().unwrap()
        );
        assert_eq!(pipeline.viewport(), Viewport::new(900, 900));

        pipeline.set_viewport(Viewport::new(1800, 900)).unwrap();
        assert_eq!(pipeline.viewport(), Viewport::new(1800, 900));
        assert!((pipeline.projection().aspect - 0.5).abs() < 1e-6);
        assert!((pipeline.projection_matrix()[(0, 0)] - 0.5).abs() < 1e-5);
        assert!((pipeline.projection_matrix()[(1, 1)] - 1.0).abs() < 1e-5);

        // A zero-width viewport is refused and the old state kept
        assert!(pipeline.set_viewport(Viewport::new(0, 900)).is_err());
        assert_eq!(pipeline.viewport(), Viewport::new(1800, 900));
        assert!((pipeline.projection().aspect - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_screen_mapping_of_facing_triangle() {
        let mut mesh = Mesh::new();
        mesh.add_triangle(facing_camera());
        let pipeline = Pipeline::new(&EngineConfig::default()).unwrap();
        let frame = pipeline.process(&mesh, &FrameState::default());

        let tri = frame.triangles[0];
        assert_eq!(tri.color, PRIMARY);
        assert!((tri.depth - 3.0).abs() < 1e-6);
        // (0, 0, 3) projects to NDC (0, 0) which is the screen center
        assert!((tri.points[0].x - 450.0).abs() < 1e-3);
        assert!((tri.points[0].y - 450.0).abs() < 1e-3);
        // (1, 1, 3) lands at NDC (1/3, 1/3)
        assert!((tri.points[2].x - 600.0).abs() < 1e-2);
        assert!((tri.points[2].y - 600.0).abs() < 1e-2);
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = EngineConfig {
            near: 10.0,
            far: 1.0,
            ..EngineConfig::default()
        };
        assert!(Pipeline::new(&config).is_err());
    }
}
