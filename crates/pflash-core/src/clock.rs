//! Elapsed-time sources for the poll loop
//!
//! The driver never sleeps; it samples a [`Clock`] once when a program cycle
//! starts and once per poll to decide whether the timeout has passed.
//! Injecting the clock lets tests run timeouts without waiting for them.

use core::time::Duration;

/// Monotonic time source
pub trait Clock {
    /// Time since an arbitrary, fixed origin
    ///
    /// Successive calls must never go backwards.
    fn now(&mut self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &mut C {
    fn now(&mut self) -> Duration {
        (**self).now()
    }
}

/// Wall-clock time backed by [`std::time::Instant`]
#[cfg(feature = "std")]
#[derive(Debug, Clone, Copy)]
pub struct StdClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl StdClock {
    /// Create a clock whose origin is the current instant
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for StdClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for StdClock {
    fn now(&mut self) -> Duration {
        self.origin.elapsed()
    }
}

/// Measures time elapsed since it was started
#[derive(Debug, Clone, Copy)]
pub(crate) struct Stopwatch {
    start: Duration,
}

impl Stopwatch {
    pub(crate) fn start<C: Clock + ?Sized>(clock: &mut C) -> Self {
        Self { start: clock.now() }
    }

    pub(crate) fn elapsed<C: Clock + ?Sized>(&self, clock: &mut C) -> Duration {
        clock.now().saturating_sub(self.start)
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    struct Fixed(Duration);

    impl Clock for Fixed {
        fn now(&mut self) -> Duration {
            self.0
        }
    }

    #[test]
    fn test_stopwatch_elapsed() {
        let mut clock = Fixed(Duration::from_millis(10));
        let sw = Stopwatch::start(&mut clock);
        clock.0 = Duration::from_millis(35);
        assert_eq!(sw.elapsed(&mut clock), Duration::from_millis(25));
    }

    #[test]
    fn test_stopwatch_never_negative() {
        let mut clock = Fixed(Duration::from_millis(10));
        let sw = Stopwatch::start(&mut clock);
        clock.0 = Duration::from_millis(5);
        assert_eq!(sw.elapsed(&mut clock), Duration::ZERO);
    }

    #[test]
    fn test_std_clock_monotonic() {
        let mut clock = StdClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
