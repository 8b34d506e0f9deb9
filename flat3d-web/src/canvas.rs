/// `Renderer` over a browser 2D canvas context
use flat3d_core::{Renderer, Rgb, Triangle2d};
use web_sys::CanvasRenderingContext2d;

/// CSS color string for a canvas style
pub fn css_color(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.r, color.g, color.b)
}

pub struct CanvasRenderer {
    context: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl CanvasRenderer {
    pub fn new(context: CanvasRenderingContext2d, width: u32, height: u32) -> Self {
        Self {
            context,
            width: f64::from(width),
            height: f64::from(height),
        }
    }

    fn trace(&self, triangle: &Triangle2d) {
        let [a, b, c] = *triangle;
        self.context.begin_path();
        self.context.move_to(f64::from(a.x), f64::from(a.y));
        self.context.line_to(f64::from(b.x), f64::from(b.y));
        self.context.line_to(f64::from(c.x), f64::from(c.y));
        self.context.close_path();
    }
}

impl Renderer for CanvasRenderer {
    fn clear(&mut self, color: Rgb) {
        self.context.set_fill_style_str(&css_color(color));
        self.context.fill_rect(0.0, 0.0, self.width, self.height);
    }

    fn fill(&mut self, triangle: &Triangle2d, color: Rgb) {
        self.trace(triangle);
        self.context.set_fill_style_str(&css_color(color));
        self.context.fill();
    }

    fn outline(&mut self, triangle: &Triangle2d, color: Rgb) {
        self.trace(triangle);
        self.context.set_stroke_style_str(&css_color(color));
        self.context.stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_color() {
        assert_eq!(css_color(flat3d_core::LINE), "rgb(255, 0, 0)");
        assert_eq!(css_color(Rgb::new(1, 2, 3)), "rgb(1, 2, 3)");
    }
}
