//! Deterministic clock for timeout tests

use core::time::Duration;

use pflash_core::clock::Clock;

/// Clock that advances by a fixed step every time it is sampled
///
/// The first sample returns the start time. With a step of 1 ms and a
/// timeout of N ms the driver gives up on the N+1th status poll.
#[derive(Debug, Clone, Copy)]
pub struct StepClock {
    now: Duration,
    step: Duration,
}

impl StepClock {
    /// Create a clock starting at zero
    pub fn new(step: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            step,
        }
    }

    /// Create a clock that never advances
    pub fn frozen() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Number of times the clock was sampled so far, if it is not frozen
    pub fn samples(&self) -> Option<u128> {
        if self.step.is_zero() {
            None
        } else {
            Some(self.now.as_nanos() / self.step.as_nanos())
        }
    }
}

impl Clock for StepClock {
    fn now(&mut self) -> Duration {
        let now = self.now;
        self.now += self.step;
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_clock() {
        let mut clock = StepClock::new(Duration::from_millis(2));
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::from_millis(2));
        assert_eq!(clock.now(), Duration::from_millis(4));
        assert_eq!(clock.samples(), Some(3));
    }

    #[test]
    fn test_frozen_clock() {
        let mut clock = StepClock::frozen();
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.now(), Duration::ZERO);
        assert_eq!(clock.samples(), None);
    }
}
