//! Monotonic time sources used to timestamp samples.

use core::cell::Cell;

use embassy_time::{Duration, Instant};

/// Monotonic microsecond clock
pub trait Clock {
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Clock backed by the embassy time driver of the application
#[cfg(feature = "time-driver")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "time-driver")]
impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Useful for simulation and for driving a tracker from timestamps captured
/// elsewhere (e.g. by a timer input capture).
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Cell<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::from_ticks(0))
    }

    pub fn starting_at(start: Instant) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn advance_micros(&self, micros: u64) {
        self.advance(Duration::from_micros(micros));
    }

    /// Jump to `at`; earlier instants are ignored so time never goes backwards
    pub fn set(&self, at: Instant) {
        if at > self.now.get() {
            self.now.set(at);
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Seconds elapsed from `earlier` to `later`, `None` if `later` precedes it
#[inline]
pub fn elapsed_secs(earlier: Instant, later: Instant) -> Option<f32> {
    later
        .checked_duration_since(earlier)
        .map(|d| d.as_micros() as f32 / 1_000_000.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        clock.advance_micros(250);
        assert_eq!(clock.now().duration_since(t0).as_micros(), 250);
        clock.advance(Duration::from_millis(1));
        assert_eq!(clock.now().duration_since(t0).as_micros(), 1250);
    }

    #[test]
    fn test_manual_clock_is_monotonic() {
        let clock = ManualClock::starting_at(Instant::from_micros(1_000));
        clock.set(Instant::from_micros(500));
        assert_eq!(clock.now(), Instant::from_micros(1_000));
        clock.set(Instant::from_micros(2_000));
        assert_eq!(clock.now(), Instant::from_micros(2_000));
    }

    #[test]
    fn test_elapsed_secs() {
        let a = Instant::from_micros(1_000);
        let b = Instant::from_micros(1_100);
        assert!((elapsed_secs(a, b).unwrap() - 0.0001).abs() < 1e-9);
        assert_eq!(elapsed_secs(b, a), None);
    }
}
