//! Frame drawing, independent of the backend.

use core::fmt;

use crate::sim::Simulation;
use crate::Position;

/// 24-bit colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from `0xRRGGBB`.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }
}

/// CSS notation, e.g. `#3b82f6`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

pub mod palette {
    use super::Rgb;

    pub const BACKGROUND: Rgb = Rgb::from_hex(0xffffff);
    pub const GRID: Rgb = Rgb::from_hex(0xe5e7eb);
    pub const PATH: Rgb = Rgb::from_hex(0x3b82f6);
    pub const TARGET: Rgb = Rgb::from_hex(0x22c55e);
    pub const AGENT: Rgb = Rgb::from_hex(0xef4444);
}

pub const GRID_LINE_WIDTH: f32 = 1.0;
pub const PATH_LINE_WIDTH: f32 = 2.0;

/// Drawing primitives a backend must provide. Coordinates are surface units.
pub trait Surface {
    fn fill_rect(&mut self, origin: Position, width: f32, height: f32, color: Rgb);

    fn line(&mut self, from: Position, to: Position, width: f32, color: Rgb);

    fn fill_circle(&mut self, center: Position, radius: f32, color: Rgb);

    /// Connected line through `points`. A single point draws nothing.
    fn polyline<I>(&mut self, points: I, width: f32, color: Rgb)
    where
        I: Iterator<Item = Position>,
    {
        let mut previous: Option<Position> = None;
        for point in points {
            if let Some(from) = previous {
                self.line(from, point, width, color);
            }
            previous = Some(point);
        }
    }
}

/// Endpoints of the reference grid: `divisions + 1` vertical lines followed
/// by as many horizontal ones.
pub fn grid_lines(size: f32, divisions: u32) -> impl Iterator<Item = (Position, Position)> {
    let divisions = divisions.max(1);
    let vertical = (0..=divisions).map(move |i| {
        let at = i as f32 * size / divisions as f32;
        (Position::new(at, 0.0), Position::new(at, size))
    });
    let horizontal = (0..=divisions).map(move |i| {
        let at = i as f32 * size / divisions as f32;
        (Position::new(0.0, at), Position::new(size, at))
    });
    vertical.chain(horizontal)
}

/// Draws one complete frame of `sim` onto `surface`.
pub fn render_frame<S: Surface>(sim: &Simulation, surface: &mut S) {
    let config = sim.config();
    let size = config.size;
    let half = config.agent_size / 2.0;

    surface.fill_rect(Position::zero(), size, size, palette::BACKGROUND);

    for (from, to) in grid_lines(size, config.grid_divisions) {
        surface.line(from, to, GRID_LINE_WIDTH, palette::GRID);
    }

    surface.polyline(
        sim.path().points().iter().map(|p| p.offset(half)),
        PATH_LINE_WIDTH,
        palette::PATH,
    );

    surface.fill_circle(sim.target().offset(half), half, palette::TARGET);

    surface.fill_rect(
        sim.position(),
        config.agent_size,
        config.agent_size,
        palette::AGENT,
    );
}

/// Renders when a surface is available, otherwise skips the frame.
/// Returns whether anything was drawn.
pub fn render_if_available<S: Surface>(sim: &Simulation, surface: Option<&mut S>) -> bool {
    match surface {
        Some(surface) => {
            render_frame(sim, surface);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimConfig;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Rect(Position, f32, f32, Rgb),
        Line(Position, Position, Rgb),
        Circle(Position, f32, Rgb),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn fill_rect(&mut self, origin: Position, width: f32, height: f32, color: Rgb) {
            self.ops.push(Op::Rect(origin, width, height, color));
        }

        fn line(&mut self, from: Position, to: Position, _width: f32, color: Rgb) {
            self.ops.push(Op::Line(from, to, color));
        }

        fn fill_circle(&mut self, center: Position, radius: f32, color: Rgb) {
            self.ops.push(Op::Circle(center, radius, color));
        }
    }

    #[test]
    fn test_rgb_display() {
        assert_eq!(format!("{}", palette::PATH), "#3b82f6");
        assert_eq!(format!("{}", Rgb::new(0, 10, 255)), "#000aff");
    }

    #[test]
    fn test_grid_lines() {
        let lines: Vec<_> = grid_lines(500.0, 10).collect();
        assert_eq!(lines.len(), 22);
        assert_eq!(lines[1], (Position::new(50.0, 0.0), Position::new(50.0, 500.0)));
        assert_eq!(lines[21], (Position::new(0.0, 500.0), Position::new(500.0, 500.0)));
    }

    #[test]
    fn test_frame_order() {
        let mut sim = Simulation::new(SimConfig::default());
        sim.step();
        sim.step();

        let mut recorder = Recorder::default();
        render_frame(&sim, &mut recorder);
        let ops = recorder.ops;

        // background, 22 grid lines, 2 path segments, target, agent
        assert_eq!(ops.len(), 1 + 22 + 2 + 1 + 1);
        assert_eq!(
            ops[0],
            Op::Rect(Position::zero(), 500.0, 500.0, palette::BACKGROUND)
        );
        assert!(ops[1..23]
            .iter()
            .all(|op| matches!(op, Op::Line(_, _, c) if *c == palette::GRID)));

        match &ops[23] {
            Op::Line(from, _, color) => {
                assert_eq!(*from, Position::new(15.0, 15.0));
                assert_eq!(*color, palette::PATH);
            }
            other => panic!("expected path segment, got {:?}", other),
        }

        assert_eq!(
            ops[25],
            Op::Circle(Position::new(365.0, 465.0), 15.0, palette::TARGET)
        );
        assert_eq!(
            ops[26],
            Op::Rect(sim.position(), 30.0, 30.0, palette::AGENT)
        );
    }

    #[test]
    fn test_single_point_path_draws_no_segment() {
        let sim = Simulation::new(SimConfig::default());
        let mut recorder = Recorder::default();
        render_frame(&sim, &mut recorder);
        assert_eq!(recorder.ops.len(), 1 + 22 + 1 + 1);
    }

    #[test]
    fn test_missing_surface_skips_frame() {
        let sim = Simulation::new(SimConfig::default());
        assert!(!render_if_available::<Recorder>(&sim, None));

        let mut recorder = Recorder::default();
        assert!(render_if_available(&sim, Some(&mut recorder)));
        assert!(!recorder.ops.is_empty());
    }
}
