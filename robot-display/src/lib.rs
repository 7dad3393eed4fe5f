#![cfg_attr(not(feature = "std"), no_std)]

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
};
use robot_core::render::{self, Rgb, Surface};
use robot_core::{Position, Simulation};

#[cfg(feature = "std")]
mod framebuffer;

#[cfg(feature = "std")]
pub use framebuffer::FrameBuffer;

pub fn to_rgb565(color: Rgb) -> Rgb565 {
    Rgb565::new(color.r >> 3, color.g >> 2, color.b >> 3)
}

/// Adapts any RGB565 draw target to the simulation renderer.
///
/// Simulation units are scaled uniformly so the whole surface fits the
/// shorter side of the target. Primitives that fail to draw are skipped,
/// a frame is best-effort.
pub struct DrawTargetSurface<'a, D> {
    target: &'a mut D,
    origin: Point,
    scale: f32,
}

impl<'a, D> DrawTargetSurface<'a, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    pub fn new(target: &'a mut D, sim_size: f32) -> Self {
        let area = target.bounding_box();
        let side = area.size.width.min(area.size.height) as f32;
        let scale = if sim_size > 0.0 { side / sim_size } else { 1.0 };

        Self {
            target,
            origin: area.top_left,
            scale,
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    fn point(&self, position: Position) -> Point {
        self.origin
            + Point::new(
                libm::roundf(position.x * self.scale) as i32,
                libm::roundf(position.y * self.scale) as i32,
            )
    }

    fn length(&self, units: f32) -> u32 {
        (libm::roundf(units * self.scale) as u32).max(1)
    }
}

impl<D> Surface for DrawTargetSurface<'_, D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn fill_rect(&mut self, origin: Position, width: f32, height: f32, color: Rgb) {
        let size = Size::new(self.length(width), self.length(height));
        Rectangle::new(self.point(origin), size)
            .into_styled(PrimitiveStyle::with_fill(to_rgb565(color)))
            .draw(&mut *self.target)
            .ok();
    }

    fn line(&mut self, from: Position, to: Position, width: f32, color: Rgb) {
        Line::new(self.point(from), self.point(to))
            .into_styled(PrimitiveStyle::with_stroke(to_rgb565(color), self.length(width)))
            .draw(&mut *self.target)
            .ok();
    }

    fn fill_circle(&mut self, center: Position, radius: f32, color: Rgb) {
        Circle::with_center(self.point(center), self.length(radius * 2.0))
            .into_styled(PrimitiveStyle::with_fill(to_rgb565(color)))
            .draw(&mut *self.target)
            .ok();
    }
}

/// Draws the current frame of `sim` onto `target`.
pub fn draw_simulation<D>(sim: &Simulation, target: &mut D)
where
    D: DrawTarget<Color = Rgb565>,
{
    let mut surface = DrawTargetSurface::new(target, sim.config().size);
    render::render_frame(sim, &mut surface);
}
