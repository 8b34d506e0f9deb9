/// Back-to-front ordering and emission of screen-space triangles
use nalgebra::{Point2, Point3};

use crate::geometry::{Rgb, LINE};
use crate::renderer::{Renderer, Triangle2d};

/// What the emitter draws for each triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayOptions {
    /// Shaded, filled faces; when off every triangle is drawn as a wireframe
    pub show_faces: bool,
    /// Overlay triangle edges in the line color on top of shaded faces
    pub show_lines: bool,
}

impl DisplayOptions {
    pub fn toggle_faces(&mut self) {
        self.show_faces = !self.show_faces;
    }

    pub fn toggle_lines(&mut self) {
        self.show_lines = !self.show_lines;
    }
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_faces: true,
            show_lines: false,
        }
    }
}

/// A lit, projected triangle in screen space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenTriangle {
    /// Screen x/y, NDC z
    pub points: [Point3<f32>; 3],
    pub color: Rgb,
    /// Average view-space z, the painter's sort key
    pub depth: f32,
}

impl ScreenTriangle {
    pub fn to_2d(&self) -> Triangle2d {
        self.points.map(|p| Point2::new(p.x, p.y))
    }
}

/// Sort farthest first. The sort is stable, so equal depths keep mesh order.
pub fn depth_sort(triangles: &mut [ScreenTriangle]) {
    triangles.sort_by(|a, b| b.depth.total_cmp(&a.depth));
}

/// Issue draw calls for already sorted triangles
pub fn emit<R: Renderer + ?Sized>(
    triangles: &[ScreenTriangle],
    options: DisplayOptions,
    renderer: &mut R,
) {
    for triangle in triangles {
        let points = triangle.to_2d();
        if options.show_faces {
            renderer.fill(&points, triangle.color);
            // Same-colored edge closes the hairline gaps between neighbours
            renderer.outline(&points, triangle.color);
            if options.show_lines {
                renderer.outline(&points, LINE);
            }
        } else {
            renderer.outline(&points, LINE);
        }
    }
}
