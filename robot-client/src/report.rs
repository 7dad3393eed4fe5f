use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use robot_core::Simulation;
use robot_display::{draw_simulation, FrameBuffer};
use robot_shared::StatusSnapshot;
use serde::Serialize;

use crate::runner::RunSummary;

/// Pixel side of the offscreen final frame, whatever the surface size.
pub const FRAME_SIDE: u32 = 500;

/// Renders the final frame offscreen, scaled to `FRAME_SIDE`.
pub fn render_final_frame(sim: &Simulation) -> FrameBuffer {
    let mut frame = FrameBuffer::new(FRAME_SIDE, FRAME_SIDE);
    draw_simulation(sim, &mut frame);
    frame
}

/// Final state written by `--snapshot`
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: StatusSnapshot,
    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(sim: &Simulation, summary: RunSummary) -> Self {
        Self {
            status: StatusSnapshot::from(sim),
            summary,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create snapshot {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        writer.flush()?;
        Ok(())
    }
}
