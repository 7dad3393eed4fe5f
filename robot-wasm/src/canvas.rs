use robot_core::render::{Rgb, Surface};
use robot_core::Position;
use web_sys::CanvasRenderingContext2d;

/// Renders simulation frames through a 2D canvas context
pub struct CanvasSurface<'a> {
    context: &'a CanvasRenderingContext2d,
}

impl<'a> CanvasSurface<'a> {
    pub fn new(context: &'a CanvasRenderingContext2d) -> Self {
        Self { context }
    }
}

impl Surface for CanvasSurface<'_> {
    fn fill_rect(&mut self, origin: Position, width: f32, height: f32, color: Rgb) {
        self.context.set_fill_style_str(&color.to_string());
        self.context
            .fill_rect(origin.x as f64, origin.y as f64, width as f64, height as f64);
    }

    fn line(&mut self, from: Position, to: Position, width: f32, color: Rgb) {
        self.context.set_stroke_style_str(&color.to_string());
        self.context.set_line_width(width as f64);
        self.context.begin_path();
        self.context.move_to(from.x as f64, from.y as f64);
        self.context.line_to(to.x as f64, to.y as f64);
        self.context.stroke();
    }

    fn fill_circle(&mut self, center: Position, radius: f32, color: Rgb) {
        self.context.set_fill_style_str(&color.to_string());
        self.context.begin_path();
        if self
            .context
            .arc(
                center.x as f64,
                center.y as f64,
                radius as f64,
                0.0,
                std::f64::consts::PI * 2.0,
            )
            .is_ok()
        {
            self.context.fill();
        }
    }

    // One canvas path for the whole trail so joins render cleanly
    fn polyline<I>(&mut self, points: I, width: f32, color: Rgb)
    where
        I: Iterator<Item = Position>,
    {
        self.context.set_stroke_style_str(&color.to_string());
        self.context.set_line_width(width as f64);
        self.context.begin_path();
        for (index, point) in points.enumerate() {
            if index == 0 {
                self.context.move_to(point.x as f64, point.y as f64);
            } else {
                self.context.line_to(point.x as f64, point.y as f64);
            }
        }
        self.context.stroke();
    }
}
