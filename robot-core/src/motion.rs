//! Single-step pursuit of a fixed target.

use crate::{Position, Vector2D};

/// Valid range for a top-left anchored agent on a square surface.
///
/// Both axes share the same range `[0, size - agent_size]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f32,
    pub max: f32,
}

impl Bounds {
    pub fn new(size: f32, agent_size: f32) -> Self {
        Self {
            min: 0.0,
            max: (size - agent_size).max(0.0),
        }
    }

    pub fn clamp(&self, position: Position) -> Position {
        Position::new(
            position.x.max(self.min).min(self.max),
            position.y.max(self.min).min(self.max),
        )
    }

    pub fn contains(&self, position: Position) -> bool {
        (self.min..=self.max).contains(&position.x) && (self.min..=self.max).contains(&position.y)
    }
}

/// Displacement of magnitude `speed` pointing from `position` toward `target`.
///
/// Returns the zero vector when the two coincide.
pub fn displacement(position: Position, target: Position, speed: f32) -> Vector2D {
    (target - position).normalize() * speed
}

/// Next position after one step.
///
/// Snaps onto the target once it is closer than one step, otherwise moves a
/// full step and clamps each axis into `bounds`.
pub fn next_position(
    position: Position,
    target: Position,
    speed: f32,
    bounds: &Bounds,
) -> Position {
    if position.distance(&target) < speed {
        return bounds.clamp(target);
    }

    bounds.clamp(position + displacement(position, target, speed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SIZE: f32 = 500.0;
    const AGENT: f32 = 30.0;

    #[test]
    fn test_bounds_new() {
        let bounds = Bounds::new(SIZE, AGENT);
        assert_eq!(bounds.min, 0.0);
        assert_eq!(bounds.max, 470.0);
    }

    #[test]
    fn test_bounds_agent_larger_than_surface() {
        let bounds = Bounds::new(20.0, AGENT);
        assert_eq!(bounds.max, 0.0);
        assert_eq!(bounds.clamp(Position::new(5.0, 5.0)), Position::zero());
    }

    #[test]
    fn test_displacement_zero_distance() {
        let p = Position::new(350.0, 450.0);
        assert_eq!(displacement(p, p, 5.0), Vector2D::zero());
    }

    #[test]
    fn test_displacement_has_step_magnitude() {
        let d = displacement(Position::zero(), Position::new(350.0, 450.0), 5.0);
        assert!((d.magnitude() - 5.0).abs() < 1e-4);
        assert!((d.x - 3.0697).abs() < 1e-3);
        assert!((d.y - 3.9468).abs() < 1e-3);
    }

    #[test]
    fn test_first_step_from_origin() {
        let bounds = Bounds::new(SIZE, AGENT);
        let next = next_position(Position::zero(), Position::new(350.0, 450.0), 5.0, &bounds);
        assert!((next.magnitude() - 5.0).abs() < 1e-4);
        assert!(next.x > 0.0 && next.y > next.x);
    }

    #[test]
    fn test_snap_within_one_step() {
        let bounds = Bounds::new(SIZE, AGENT);
        let target = Position::new(350.0, 450.0);
        let position = Position::new(347.0, 450.0);
        assert_eq!(next_position(position, target, 5.0, &bounds), target);
    }

    #[test]
    fn test_exact_step_distance_does_not_snap() {
        let bounds = Bounds::new(SIZE, AGENT);
        let target = Position::new(100.0, 0.0);
        let position = Position::new(95.0, 0.0);
        let next = next_position(position, target, 5.0, &bounds);
        assert!((next.x - 100.0).abs() < 1e-4);
        assert_eq!(next.y, 0.0);
    }

    #[test]
    fn test_clamps_each_axis() {
        let bounds = Bounds::new(SIZE, AGENT);
        let next = next_position(
            Position::new(468.0, 10.0),
            Position::new(600.0, 10.0),
            5.0,
            &bounds,
        );
        assert_eq!(next, Position::new(470.0, 10.0));
    }

    proptest! {
        #[test]
        fn prop_steps_stay_in_bounds(
            sx in 0.0f32..470.0,
            sy in 0.0f32..470.0,
            tx in -200.0f32..700.0,
            ty in -200.0f32..700.0,
            speed in 0.5f32..50.0,
            steps in 1usize..200,
        ) {
            let bounds = Bounds::new(SIZE, AGENT);
            let target = Position::new(tx, ty);
            let mut position = Position::new(sx, sy);
            for _ in 0..steps {
                position = next_position(position, target, speed, &bounds);
                prop_assert!(bounds.contains(position));
            }
        }

        #[test]
        fn prop_snaps_without_overshoot(
            tx in 50.0f32..400.0,
            ty in 50.0f32..400.0,
            angle in 0.0f32..6.28,
            fraction in 0.0f32..0.99,
        ) {
            let bounds = Bounds::new(SIZE, AGENT);
            let speed = 5.0;
            let target = Position::new(tx, ty);
            let reach = speed * fraction;
            let position = Position::new(tx + angle.cos() * reach, ty + angle.sin() * reach);
            prop_assume!(position.distance(&target) < speed);
            prop_assert_eq!(next_position(position, target, speed, &bounds), target);
        }
    }
}
