#![cfg_attr(not(feature = "std"), no_std)]

pub mod duty;
pub mod motion;
pub mod path;
pub mod render;
pub mod sim;

pub use duty::{DutyCycle, MotionState};
pub use motion::Bounds;
pub use path::PathRecorder;
pub use sim::{Event, Schedule, SimConfig, Simulation, StepOutcome, Tick};

/// A 2D vector used for positions and displacements
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f32,
    pub y: f32,
}

/// Positions live in surface units, anchored at the agent's top-left corner.
pub type Position = Vector2D;

impl Vector2D {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f32 {
        sqrt(self.x * self.x + self.y * self.y)
    }

    pub fn normalize(&self) -> Self {
        let mag = self.magnitude();
        if mag > 0.0 {
            Self {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Self::zero()
        }
    }

    pub fn distance(&self, other: &Vector2D) -> f32 {
        (*self - *other).magnitude()
    }

    /// Shift by the same amount on both axes.
    pub fn offset(&self, amount: f32) -> Self {
        Self {
            x: self.x + amount,
            y: self.y + amount,
        }
    }
}

pub(crate) fn sqrt(value: f32) -> f32 {
    #[cfg(feature = "std")]
    {
        value.sqrt()
    }
    #[cfg(not(feature = "std"))]
    {
        libm::sqrtf(value)
    }
}

impl core::ops::Add for Vector2D {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl core::ops::Sub for Vector2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl core::ops::Mul<f32> for Vector2D {
    type Output = Self;

    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}
