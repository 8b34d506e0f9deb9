/// Drawing capability the frame pipeline emits into
use nalgebra::Point2;

use crate::geometry::Rgb;

/// Screen-space triangle handed to a renderer
pub type Triangle2d = [Point2<f32>; 3];

/// Backend that owns the actual pixel operations.
///
/// Every primitive takes an explicit color; there is no default.
pub trait Renderer {
    /// Wipe the whole target with `color`
    fn clear(&mut self, color: Rgb);

    /// Solid triangle
    fn fill(&mut self, triangle: &Triangle2d, color: Rgb);

    /// The three edges of a triangle
    fn outline(&mut self, triangle: &Triangle2d, color: Rgb);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear(Rgb),
    Fill(Triangle2d, Rgb),
    Outline(Triangle2d, Rgb),
}

/// Headless renderer that keeps every call in order
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub commands: Vec<DrawCommand>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill commands only, in emission order
    pub fn fills(&self) -> Vec<(Triangle2d, Rgb)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Fill(t, color) => Some((*t, *color)),
                _ => None,
            })
            .collect()
    }

    pub fn outlines(&self) -> Vec<(Triangle2d, Rgb)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Outline(t, color) => Some((*t, *color)),
                _ => None,
            })
            .collect()
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self, color: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill(&mut self, triangle: &Triangle2d, color: Rgb) {
        self.commands.push(DrawCommand::Fill(*triangle, color));
    }

    fn outline(&mut self, triangle: &Triangle2d, color: Rgb) {
        self.commands.push(DrawCommand::Outline(*triangle, color));
    }
}
