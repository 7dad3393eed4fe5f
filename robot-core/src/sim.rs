//! Simulation state and its transition function.

use crate::duty::{DutyCycle, MotionState};
use crate::motion::{self, Bounds};
use crate::path::PathRecorder;
use crate::{Position, Vector2D};

/// Configuration for the robot simulation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Side of the square surface in surface units.
    pub size: f32,
    pub agent_size: f32,
    /// Distance covered by one accepted step.
    pub speed: f32,
    pub move_interval_ms: u32,
    pub pause_interval_ms: u32,
    /// Target as a fraction of `size` on each axis.
    pub target_fraction: (f32, f32),
    pub start: Position,
    /// Grid cells per axis. Each cell is one metre in the status text.
    pub grid_divisions: u32,
    pub path_cap: Option<usize>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            size: 500.0,
            agent_size: 30.0,
            speed: 5.0,
            move_interval_ms: 100,
            pause_interval_ms: 2000,
            target_fraction: (0.7, 0.9),
            start: Position::zero(),
            grid_divisions: 10,
            path_cap: None,
        }
    }
}

impl SimConfig {
    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.size, self.agent_size)
    }

    /// Target position, clamped so the agent can actually stand on it.
    pub fn target(&self) -> Position {
        let (fx, fy) = self.target_fraction;
        self.bounds().clamp(Vector2D::new(self.size * fx, self.size * fy))
    }

    /// Converts surface units to metres.
    pub fn to_metres(&self, position: Position) -> (f32, f32) {
        let divisions = self.grid_divisions as f32;
        (
            position.x * divisions / self.size,
            position.y * divisions / self.size,
        )
    }
}

/// Inputs delivered by the host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Display-synchronised animation callback.
    Frame,
    /// One-shot timer armed for the moving phase fired.
    MoveElapsed,
    /// One-shot timer armed for the paused phase fired.
    PauseElapsed,
}

/// Timer the host must arm after handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schedule {
    None,
    MoveTimer { ms: u32 },
    PauseTimer { ms: u32 },
}

/// Result of a single motion step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Moved a full step toward the target.
    Advanced,
    /// Snapped onto the target during this step.
    Arrived,
    /// Already on the target; nothing recorded.
    AtRest,
    /// Duty cycle is paused; nothing recorded.
    Paused,
    /// The simulation has been shut down.
    Disposed,
}

/// Result of [`Simulation::tick`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub outcome: StepOutcome,
    /// Duty cycle phase changes during the elapsed time.
    pub transitions: u32,
}

/// The complete widget state.
///
/// Only [`Simulation::handle`], [`Simulation::step`] and [`Simulation::tick`]
/// mutate it. Renderers receive `&Simulation`, so they always see the state
/// between two whole transitions.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: SimConfig,
    bounds: Bounds,
    target: Position,
    position: Position,
    path: PathRecorder,
    duty: DutyCycle,
    disposed: bool,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let bounds = config.bounds();
        let target = config.target();
        let position = bounds.clamp(config.start);
        let path = match config.path_cap {
            Some(cap) => PathRecorder::with_cap(position, cap),
            None => PathRecorder::new(position),
        };

        Self {
            config,
            bounds,
            target,
            position,
            path,
            duty: DutyCycle::new(config.move_interval_ms, config.pause_interval_ms),
            disposed: false,
        }
    }

    /// Timer to arm when the widget mounts.
    pub fn start(&self) -> Schedule {
        if self.disposed {
            return Schedule::None;
        }
        match self.duty.state() {
            MotionState::Moving => Schedule::MoveTimer {
                ms: self.duty.remaining_ms(),
            },
            MotionState::Paused => Schedule::PauseTimer {
                ms: self.duty.remaining_ms(),
            },
        }
    }

    /// Applies one host event. Timer events that do not match the current
    /// phase are stale and ignored.
    pub fn handle(&mut self, event: Event) -> Schedule {
        if self.disposed {
            return Schedule::None;
        }

        match (event, self.duty.state()) {
            (Event::Frame, _) => {
                self.step();
                Schedule::None
            }
            (Event::MoveElapsed, MotionState::Moving) => {
                self.duty.expire();
                Schedule::PauseTimer {
                    ms: self.duty.interval_ms(),
                }
            }
            (Event::PauseElapsed, MotionState::Paused) => {
                self.duty.expire();
                Schedule::MoveTimer {
                    ms: self.duty.interval_ms(),
                }
            }
            _ => Schedule::None,
        }
    }

    /// Advances the agent by one step if the duty cycle allows it.
    pub fn step(&mut self) -> StepOutcome {
        if self.disposed {
            return StepOutcome::Disposed;
        }
        if !self.duty.state().is_moving() {
            return StepOutcome::Paused;
        }
        if self.position == self.target {
            return StepOutcome::AtRest;
        }

        let next = motion::next_position(
            self.position,
            self.target,
            self.config.speed,
            &self.bounds,
        );
        self.position = next;
        self.path.record(next);

        if next == self.target {
            StepOutcome::Arrived
        } else {
            StepOutcome::Advanced
        }
    }

    /// Fixed-step driver: one frame followed by `dt_ms` of elapsed time.
    pub fn tick(&mut self, dt_ms: u32) -> Tick {
        let outcome = self.step();
        let transitions = if self.disposed {
            0
        } else {
            self.duty.advance(dt_ms)
        };
        Tick {
            outcome,
            transitions,
        }
    }

    /// Marks the widget as torn down. Every later call is a no-op.
    pub fn shutdown(&mut self) {
        self.disposed = true;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn target(&self) -> Position {
        self.target
    }

    pub fn path(&self) -> &PathRecorder {
        &self.path
    }

    pub fn state(&self) -> MotionState {
        self.duty.state()
    }

    pub fn duty(&self) -> &DutyCycle {
        &self.duty
    }

    pub fn at_target(&self) -> bool {
        self.position == self.target
    }

    pub fn position_metres(&self) -> (f32, f32) {
        self.config.to_metres(self.position)
    }
}
