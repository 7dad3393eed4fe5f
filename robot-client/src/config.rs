use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use robot_shared::SimulationSettings;

/// Reads settings from a JSON file, or returns the defaults without one.
pub fn load_settings(path: Option<&Path>) -> Result<SimulationSettings> {
    let Some(path) = path else {
        return Ok(SimulationSettings::default());
    };

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let settings = SimulationSettings::from_json(&json)
        .with_context(|| format!("Invalid settings in {}", path.display()))?;

    log::debug!("Loaded settings from {}", path.display());
    Ok(settings)
}

/// Command line values that take precedence over the settings file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub size: Option<f32>,
    pub speed: Option<f32>,
    pub path_cap: Option<usize>,
}

impl Overrides {
    pub fn apply(&self, settings: &mut SimulationSettings) {
        if let Some(size) = self.size {
            settings.size = size;
        }
        if let Some(speed) = self.speed {
            settings.speed = speed;
        }
        if let Some(cap) = self.path_cap {
            settings.path_cap = Some(cap);
        }
    }
}
