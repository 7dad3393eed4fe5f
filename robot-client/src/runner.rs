use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use robot_core::{Event, Schedule, Simulation};
use robot_shared::StatusSnapshot;
use serde::Serialize;
use tokio::time::{self, MissedTickBehavior, Sleep};

/// Counters collected while the loop ran
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub frames: u64,
    pub transitions: u64,
}

/// Drives a [`Simulation`] from a frame interval and the two duty cycle
/// timers, the way a display-synchronised host would.
pub struct Runner {
    sim: Simulation,
    frame_interval: Duration,
    move_timer: Option<Pin<Box<Sleep>>>,
    pause_timer: Option<Pin<Box<Sleep>>>,
    summary: RunSummary,
}

impl Runner {
    pub fn new(sim: Simulation, frame_interval: Duration) -> Self {
        Self {
            sim,
            frame_interval,
            move_timer: None,
            pause_timer: None,
            summary: RunSummary::default(),
        }
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    pub fn summary(&self) -> RunSummary {
        self.summary
    }

    /// Armed duty cycle timers, zero once the runner has stopped.
    pub fn pending_timers(&self) -> usize {
        self.move_timer.is_some() as usize + self.pause_timer.is_some() as usize
    }

    /// Runs until `stop` completes, then tears the simulation down.
    pub async fn run_until<F>(&mut self, stop: F) -> RunSummary
    where
        F: Future<Output = ()>,
    {
        let schedule = self.sim.start();
        self.arm(schedule);

        let mut frames = time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(stop);

        log::info!("Simulation started, frame every {:?}", self.frame_interval);

        loop {
            tokio::select! {
                biased;

                _ = &mut stop => break,
                _ = wait(&mut self.move_timer) => {
                    self.move_timer = None;
                    self.on_timer(Event::MoveElapsed);
                }
                _ = wait(&mut self.pause_timer) => {
                    self.pause_timer = None;
                    self.on_timer(Event::PauseElapsed);
                }
                _ = frames.tick() => self.on_frame(),
            }
        }

        self.teardown();
        self.summary
    }

    fn on_frame(&mut self) {
        let was_at_target = self.sim.at_target();
        let schedule = self.sim.handle(Event::Frame);
        self.summary.frames += 1;
        self.arm(schedule);

        if !was_at_target && self.sim.at_target() {
            log::info!(
                "Target reached after {} steps",
                self.sim.path().total_recorded() - 1
            );
        }
    }

    fn on_timer(&mut self, event: Event) {
        let schedule = self.sim.handle(event);
        if schedule != Schedule::None {
            self.summary.transitions += 1;
            let status = StatusSnapshot::from(&self.sim);
            log::info!("{} | {}", status.status_line(), status.position_line());
        }
        self.arm(schedule);
    }

    fn arm(&mut self, schedule: Schedule) {
        match schedule {
            Schedule::None => {}
            Schedule::MoveTimer { ms } => {
                self.move_timer = Some(Box::pin(time::sleep(Duration::from_millis(ms.into()))));
            }
            Schedule::PauseTimer { ms } => {
                self.pause_timer = Some(Box::pin(time::sleep(Duration::from_millis(ms.into()))));
            }
        }
    }

    fn teardown(&mut self) {
        self.move_timer = None;
        self.pause_timer = None;
        self.sim.shutdown();
        log::debug!(
            "Runner stopped after {} frames, timers cancelled",
            self.summary.frames
        );
    }
}

async fn wait(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

/// Steps the simulation frame by frame without a clock: `frame_ms` of
/// simulated time passes after each frame until `total_ms` is covered.
pub fn run_fixed(sim: &mut Simulation, frame_ms: u32, total_ms: u64) -> RunSummary {
    let frame_ms = frame_ms.max(1);
    let mut summary = RunSummary::default();
    let mut elapsed = 0u64;

    while elapsed < total_ms && !sim.is_disposed() {
        let tick = sim.tick(frame_ms);
        summary.frames += 1;
        elapsed += u64::from(frame_ms);

        if tick.transitions > 0 {
            summary.transitions += u64::from(tick.transitions);
            log::debug!("{} at {}ms", sim.state().label(), elapsed);
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use robot_core::{MotionState, SimConfig};

    #[test]
    fn test_run_fixed_counts_transitions() {
        let mut sim = Simulation::new(SimConfig::default());
        // 100ms moving, 2000ms paused, 100ms moving, then paused again
        let summary = run_fixed(&mut sim, 20, 2200);

        assert_eq!(summary.frames, 110);
        assert_eq!(summary.transitions, 3);
        assert_eq!(sim.state(), MotionState::Paused);
        // five moving frames in each moving phase
        assert_eq!(sim.path().len(), 11);
    }

    #[test]
    fn test_run_fixed_frames_longer_than_a_phase() {
        let mut sim = Simulation::new(SimConfig::default());
        // each frame covers a whole move and pause phase
        let summary = run_fixed(&mut sim, 2100, 6300);

        assert_eq!(summary.frames, 3);
        assert_eq!(summary.transitions, 6);
        assert_eq!(sim.state(), MotionState::Moving);
        assert_eq!(sim.path().len(), 4);
    }

    #[test]
    fn test_run_fixed_stops_on_disposed() {
        let mut sim = Simulation::new(SimConfig::default());
        sim.shutdown();
        assert_eq!(run_fixed(&mut sim, 16, 1000).frames, 0);
    }
}
