use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use robot_client::config::{self, Overrides};
use robot_client::report::{self, RunReport};
use robot_client::runner::{self, Runner};
use robot_core::render::palette;
use robot_core::Simulation;
use robot_display::to_rgb565;
use robot_shared::StatusSnapshot;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless warehouse robot simulation", long_about = None)]
struct Args {
    /// JSON settings file; omitted fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Surface side in units (overrides the settings file)
    #[arg(long)]
    size: Option<f32>,

    /// Distance covered per frame while moving (overrides the settings file)
    #[arg(long)]
    speed: Option<f32>,

    /// Keep at most this many path points, decimating older ones
    #[arg(long)]
    path_cap: Option<usize>,

    /// Milliseconds between animation frames
    #[arg(short, long, default_value_t = 16, value_parser = clap::value_parser!(u32).range(1..))]
    frame_ms: u32,

    /// How long to run before shutting down
    #[arg(short, long, default_value_t = 10)]
    duration_secs: u64,

    /// Simulate the whole duration immediately instead of in real time
    #[arg(long)]
    fixed_step: bool,

    /// Write the final status as JSON to this file
    #[arg(short, long)]
    snapshot: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

async fn wait_for_stop(duration: Duration) {
    tokio::select! {
        _ = tokio::time::sleep(duration) => log::info!("Run duration elapsed"),
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                log::warn!("Failed to listen for Ctrl-C: {}", e);
            }
            log::info!("Interrupted");
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    let mut settings = config::load_settings(args.config.as_deref())?;
    Overrides {
        size: args.size,
        speed: args.speed,
        path_cap: args.path_cap,
    }
    .apply(&mut settings);
    let sim_config = settings
        .to_config()
        .context("Invalid simulation settings")?;

    log::info!("Robot simulation starting...");
    log::info!("Surface: {0}x{0}, speed {1}", sim_config.size, sim_config.speed);

    let mut sim = Simulation::new(sim_config);
    let target = sim.target();
    log::info!("Target: ({:.1}, {:.1})", target.x, target.y);

    let total = Duration::from_secs(args.duration_secs);
    let summary = if args.fixed_step {
        runner::run_fixed(&mut sim, args.frame_ms, total.as_millis() as u64)
    } else {
        let mut runner = Runner::new(sim, Duration::from_millis(args.frame_ms.into()));
        let summary = runner.run_until(wait_for_stop(total)).await;
        sim = runner.into_simulation();
        summary
    };
    sim.shutdown();

    let status = StatusSnapshot::from(&sim);
    log::info!(
        "Finished after {} frames and {} duty cycle transitions",
        summary.frames,
        summary.transitions
    );
    log::info!("{}", status.status_line());
    log::info!("{}", status.position_line());

    let frame = report::render_final_frame(&sim);
    log::debug!(
        "Final frame rendered, {} trail pixels",
        frame.count(to_rgb565(palette::PATH))
    );

    if let Some(path) = args.snapshot {
        RunReport::new(&sim, summary).write_to(&path)?;
        log::info!("Snapshot written to {}", path.display());
    }

    Ok(())
}
