//! Move/pause duty cycle.

/// Whether the agent advances on the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Moving,
    Paused,
}

impl MotionState {
    pub fn is_moving(&self) -> bool {
        matches!(self, MotionState::Moving)
    }

    /// Label shown in the status text.
    pub fn label(&self) -> &'static str {
        match self {
            MotionState::Moving => "Moving",
            MotionState::Paused => "Stopped",
        }
    }
}

/// Alternates between [`MotionState::Moving`] and [`MotionState::Paused`].
///
/// Starts moving. The cycle never terminates, reaching the target does not
/// change it. Hosts either fire [`DutyCycle::expire`] from a one-shot timer
/// armed for [`DutyCycle::remaining_ms`], or feed elapsed time through
/// [`DutyCycle::advance`].
#[derive(Debug, Clone, Copy)]
pub struct DutyCycle {
    state: MotionState,
    move_interval_ms: u32,
    pause_interval_ms: u32,
    elapsed_ms: u32,
}

impl DutyCycle {
    /// Intervals of zero are raised to 1ms so `advance` always makes progress.
    pub fn new(move_interval_ms: u32, pause_interval_ms: u32) -> Self {
        Self {
            state: MotionState::Moving,
            move_interval_ms: move_interval_ms.max(1),
            pause_interval_ms: pause_interval_ms.max(1),
            elapsed_ms: 0,
        }
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Length of the phase the cycle is currently in.
    pub fn interval_ms(&self) -> u32 {
        match self.state {
            MotionState::Moving => self.move_interval_ms,
            MotionState::Paused => self.pause_interval_ms,
        }
    }

    pub fn remaining_ms(&self) -> u32 {
        self.interval_ms().saturating_sub(self.elapsed_ms)
    }

    /// Ends the current phase immediately and returns the new state.
    pub fn expire(&mut self) -> MotionState {
        self.state = match self.state {
            MotionState::Moving => MotionState::Paused,
            MotionState::Paused => MotionState::Moving,
        };
        self.elapsed_ms = 0;
        self.state
    }

    /// Lets `dt_ms` pass, returning how many phase changes happened.
    pub fn advance(&mut self, dt_ms: u32) -> u32 {
        let mut left = dt_ms;
        let mut transitions = 0;

        loop {
            let remaining = self.remaining_ms();
            if left < remaining {
                self.elapsed_ms += left;
                return transitions;
            }
            left -= remaining;
            self.expire();
            transitions += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_moving() {
        let duty = DutyCycle::new(100, 2000);
        assert_eq!(duty.state(), MotionState::Moving);
        assert_eq!(duty.remaining_ms(), 100);
    }

    #[test]
    fn test_expire_alternates() {
        let mut duty = DutyCycle::new(100, 2000);
        assert_eq!(duty.expire(), MotionState::Paused);
        assert_eq!(duty.interval_ms(), 2000);
        assert_eq!(duty.expire(), MotionState::Moving);
        assert_eq!(duty.interval_ms(), 100);
    }

    #[test]
    fn test_advance_exact_intervals() {
        let mut duty = DutyCycle::new(100, 2000);

        assert_eq!(duty.advance(99), 0);
        assert_eq!(duty.state(), MotionState::Moving);

        assert_eq!(duty.advance(1), 1);
        assert_eq!(duty.state(), MotionState::Paused);

        assert_eq!(duty.advance(1999), 0);
        assert_eq!(duty.state(), MotionState::Paused);

        assert_eq!(duty.advance(1), 1);
        assert_eq!(duty.state(), MotionState::Moving);
    }

    #[test]
    fn test_advance_across_many_cycles() {
        let mut duty = DutyCycle::new(100, 2000);
        // ten full cycles plus 50ms into the next moving phase
        assert_eq!(duty.advance(10 * 2100 + 50), 20);
        assert_eq!(duty.state(), MotionState::Moving);
        assert_eq!(duty.remaining_ms(), 50);
    }

    #[test]
    fn test_zero_intervals_are_raised() {
        let mut duty = DutyCycle::new(0, 0);
        assert_eq!(duty.advance(3), 3);
    }

    #[test]
    fn test_labels() {
        assert_eq!(MotionState::Moving.label(), "Moving");
        assert_eq!(MotionState::Paused.label(), "Stopped");
        assert!(MotionState::Moving.is_moving());
        assert!(!MotionState::Paused.is_moving());
    }
}
