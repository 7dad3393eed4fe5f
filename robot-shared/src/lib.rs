use std::fmt;

use robot_core::{path::MIN_PATH_CAP, SimConfig, Simulation};
use serde::{Deserialize, Serialize};

/// Represents a 2D position in surface units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<Position> for robot_core::Position {
    fn from(p: Position) -> Self {
        robot_core::Position::new(p.x, p.y)
    }
}

impl From<robot_core::Position> for Position {
    fn from(p: robot_core::Position) -> Self {
        Position::new(p.x, p.y)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("surface size must be a positive number, got {0}")]
    InvalidSize(f32),
    #[error("agent size {agent} must be positive and smaller than the surface {size}")]
    InvalidAgentSize { agent: f32, size: f32 },
    #[error("speed must be a positive number, got {0}")]
    InvalidSpeed(f32),
    #[error("{0} interval must be at least 1ms")]
    ZeroInterval(&'static str),
    #[error("target fraction ({0}, {1}) must lie within [0, 1]")]
    TargetOutOfRange(f32, f32),
    #[error("start position ({0}, {1}) is not a finite coordinate")]
    InvalidStart(f32, f32),
    #[error("grid needs at least one division")]
    ZeroGridDivisions,
    #[error("path cap {0} is below the minimum of {min}", min = MIN_PATH_CAP)]
    PathCapTooSmall(usize),
    #[error("malformed settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulation configuration as exchanged with hosts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulationSettings {
    pub size: f32,
    pub agent_size: f32,
    pub speed: f32,
    pub move_interval_ms: u32,
    pub pause_interval_ms: u32,
    /// Target as a fraction of `size`, `[x, y]`.
    pub target_fraction: [f32; 2],
    pub start: Position,
    pub grid_divisions: u32,
    pub path_cap: Option<usize>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let config = SimConfig::default();
        Self {
            size: config.size,
            agent_size: config.agent_size,
            speed: config.speed,
            move_interval_ms: config.move_interval_ms,
            pause_interval_ms: config.pause_interval_ms,
            target_fraction: [config.target_fraction.0, config.target_fraction.1],
            start: config.start.into(),
            grid_divisions: config.grid_divisions,
            path_cap: config.path_cap,
        }
    }
}

impl SimulationSettings {
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(SettingsError::InvalidSize(self.size));
        }
        if !(self.agent_size.is_finite() && self.agent_size > 0.0 && self.agent_size < self.size) {
            return Err(SettingsError::InvalidAgentSize {
                agent: self.agent_size,
                size: self.size,
            });
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(SettingsError::InvalidSpeed(self.speed));
        }
        if self.move_interval_ms == 0 {
            return Err(SettingsError::ZeroInterval("move"));
        }
        if self.pause_interval_ms == 0 {
            return Err(SettingsError::ZeroInterval("pause"));
        }
        let [fx, fy] = self.target_fraction;
        if !((0.0..=1.0).contains(&fx) && (0.0..=1.0).contains(&fy)) {
            return Err(SettingsError::TargetOutOfRange(fx, fy));
        }
        if !(self.start.x.is_finite() && self.start.y.is_finite()) {
            return Err(SettingsError::InvalidStart(self.start.x, self.start.y));
        }
        if self.grid_divisions == 0 {
            return Err(SettingsError::ZeroGridDivisions);
        }
        if let Some(cap) = self.path_cap {
            if cap < MIN_PATH_CAP {
                return Err(SettingsError::PathCapTooSmall(cap));
            }
        }
        Ok(())
    }

    /// Validates and converts into the core configuration.
    pub fn to_config(&self) -> Result<SimConfig, SettingsError> {
        self.validate()?;
        Ok(SimConfig {
            size: self.size,
            agent_size: self.agent_size,
            speed: self.speed,
            move_interval_ms: self.move_interval_ms,
            pause_interval_ms: self.pause_interval_ms,
            target_fraction: (self.target_fraction[0], self.target_fraction[1]),
            start: self.start.into(),
            grid_divisions: self.grid_divisions,
            path_cap: self.path_cap,
        })
    }
}

/// Observable widget status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StatusSnapshot {
    pub moving: bool,
    /// Position in metres, one grid cell per metre.
    pub position_m: Position,
    pub target: Position,
    pub path_len: usize,
    pub total_steps: usize,
    pub at_target: bool,
}

impl From<&Simulation> for StatusSnapshot {
    fn from(sim: &Simulation) -> Self {
        let (x, y) = sim.position_metres();
        Self {
            moving: sim.state().is_moving(),
            position_m: Position::new(x, y),
            target: sim.target().into(),
            path_len: sim.path().len(),
            // the start position is not a step
            total_steps: sim.path().total_recorded() - 1,
            at_target: sim.at_target(),
        }
    }
}

impl StatusSnapshot {
    pub fn state_label(&self) -> &'static str {
        if self.moving {
            "Moving"
        } else {
            "Stopped"
        }
    }

    pub fn status_line(&self) -> String {
        format!("Robot Status: {}", self.state_label())
    }

    /// Metres to one decimal, ties rounded away from zero.
    pub fn position_line(&self) -> String {
        format!(
            "Position: ({:.1}m, {:.1}m)",
            tenths(self.position_m.x),
            tenths(self.position_m.y)
        )
    }
}

fn tenths(metres: f32) -> f64 {
    (f64::from(metres) * 10.0).round() / 10.0
}

/// Both status lines separated by a newline.
impl fmt::Display for StatusSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.status_line())?;
        f.write_str(&self.position_line())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_core::Event;

    #[test]
    fn test_position_conversions() {
        let core: robot_core::Position = Position::new(3.0, 4.0).into();
        assert_eq!(core, robot_core::Position::new(3.0, 4.0));
        assert_eq!(Position::from(core), Position::new(3.0, 4.0));
    }

    #[test]
    fn test_default_settings_match_core() {
        let config = SimulationSettings::default().to_config().unwrap();
        assert_eq!(config, SimConfig::default());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = SimulationSettings::from_json(r#"{"speed": 10.0, "path_cap": 64}"#).unwrap();
        assert_eq!(settings.speed, 10.0);
        assert_eq!(settings.path_cap, Some(64));
        assert_eq!(settings.size, 500.0);
        assert_eq!(settings.target_fraction, [0.7, 0.9]);
    }

    #[test]
    fn test_malformed_json() {
        let err = SimulationSettings::from_json("{ speed: ").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_validation_errors() {
        let bad_agent = SimulationSettings {
            agent_size: 600.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            bad_agent.validate(),
            Err(SettingsError::InvalidAgentSize { .. })
        ));

        let bad_speed = SimulationSettings {
            speed: 0.0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            bad_speed.validate(),
            Err(SettingsError::InvalidSpeed(_))
        ));

        let bad_pause = SimulationSettings {
            pause_interval_ms: 0,
            ..SimulationSettings::default()
        };
        assert!(matches!(
            bad_pause.validate(),
            Err(SettingsError::ZeroInterval("pause"))
        ));

        let bad_target = SimulationSettings {
            target_fraction: [1.2, 0.5],
            ..SimulationSettings::default()
        };
        assert!(matches!(
            bad_target.validate(),
            Err(SettingsError::TargetOutOfRange(_, _))
        ));

        let bad_cap = SimulationSettings {
            path_cap: Some(2),
            ..SimulationSettings::default()
        };
        assert!(matches!(
            bad_cap.to_config(),
            Err(SettingsError::PathCapTooSmall(2))
        ));
    }

    #[test]
    fn test_status_text() {
        let mut sim = Simulation::new(SimConfig::default());
        let status = StatusSnapshot::from(&sim);
        assert_eq!(status.status_line(), "Robot Status: Moving");
        assert_eq!(status.position_line(), "Position: (0.0m, 0.0m)");
        assert_eq!(status.total_steps, 0);

        sim.handle(Event::Frame);
        sim.handle(Event::MoveElapsed);
        let status = StatusSnapshot::from(&sim);
        assert_eq!(status.status_line(), "Robot Status: Stopped");
        // (3.07, 3.95) units is (0.06m, 0.08m)
        assert_eq!(status.position_line(), "Position: (0.1m, 0.1m)");
        assert_eq!(status.path_len, 2);
        assert_eq!(status.total_steps, 1);
        assert_eq!(
            status.to_string(),
            "Robot Status: Stopped\nPosition: (0.1m, 0.1m)"
        );
    }

    #[test]
    fn test_position_line_rounds_ties_up() {
        let config = SimConfig {
            start: robot_core::Position::new(12.5, 37.5),
            ..SimConfig::default()
        };
        let status = StatusSnapshot::from(&Simulation::new(config));
        assert_eq!(status.position_m, Position::new(0.25, 0.75));
        assert_eq!(status.position_line(), "Position: (0.3m, 0.8m)");
        assert_eq!(
            status.to_string(),
            "Robot Status: Moving\nPosition: (0.3m, 0.8m)"
        );
    }

    #[test]
    fn test_status_serializes() {
        let sim = Simulation::new(SimConfig::default());
        let json = serde_json::to_value(StatusSnapshot::from(&sim)).unwrap();
        assert_eq!(json["moving"], true);
        assert_eq!(json["path_len"], 1);
        assert_eq!(json["target"]["x"], 350.0);
    }
}
