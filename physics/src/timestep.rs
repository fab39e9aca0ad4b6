use std::time::Duration;

/// Fixed-timestep accumulator.
///
/// Frame time goes in through [`Self::accumulate`]; whole steps come out through
/// [`Self::consume_step`]. A step is only consumed while the accumulated time is strictly
/// greater than the step duration, so feeding exactly one step's worth of time leaves it
/// banked until more arrives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedTimestep {
    step: Duration,
    accumulated: Duration,
}

impl FixedTimestep {
    /// # Panics
    /// If `steps_per_sec` is zero.
    pub fn from_rate(steps_per_sec: u32) -> Self {
        assert!(steps_per_sec > 0, "steps per second must be positive");
        Self {
            step: Duration::from_secs(1) / steps_per_sec,
            accumulated: Duration::ZERO,
        }
    }

    #[inline]
    pub fn step(&self) -> Duration {
        self.step
    }

    #[inline]
    pub fn accumulated(&self) -> Duration {
        self.accumulated
    }

    pub fn accumulate(&mut self, elapsed: Duration) {
        self.accumulated = self.accumulated.saturating_add(elapsed);
    }

    /// Take one step's worth of time out of the accumulator if enough is banked.
    pub fn consume_step(&mut self) -> bool {
        if self.accumulated > self.step {
            self.accumulated -= self.step;
            true
        } else {
            false
        }
    }
}
