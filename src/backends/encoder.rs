//! Incremental encoder
//!
//! Converts a quadrature pulse count into a shaft angle. With an index
//! channel the zero reference is the count latched at the first index pulse,
//! and the sensor reports that a search is pending until then.

use core::f32::consts::TAU;

use crate::config::ConfigError;
use crate::sensor::RawAngleSource;

/// Quadrature counter of the application (timer in encoder mode, ISR, ...)
pub trait PulseCounter {
    /// Current signed pulse count
    fn count(&mut self) -> i32;

    /// Count latched at an index pulse since the last call, if any
    fn take_index(&mut self) -> Option<i32> {
        None
    }
}

/// Index channel configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndexMode {
    /// No index channel; zero is wherever counting started
    None,
    /// Zero is the first index pulse
    Search,
}

/// Incremental encoder
pub struct IncrementalEncoder<C> {
    counter: C,
    /// Pulses per revolution after quadrature decoding
    counts_per_rev: u32,
    index_mode: IndexMode,
    /// Count at the zero position
    index_offset: i32,
    index_found: bool,
}

impl<C: PulseCounter> IncrementalEncoder<C> {
    /// # Arguments
    /// * `counter` - pulse counter
    /// * `counts_per_rev` - counts per revolution (4 × PPR for quadrature)
    /// * `index_mode` - whether to search for the index pulse
    pub fn new(counter: C, counts_per_rev: u32, index_mode: IndexMode) -> Result<Self, ConfigError> {
        if counts_per_rev == 0 {
            return Err(ConfigError::ZeroCountsPerRev);
        }
        Ok(Self {
            counter,
            counts_per_rev,
            index_mode,
            index_offset: 0,
            index_found: false,
        })
    }

    pub fn counts_per_rev(&self) -> u32 {
        self.counts_per_rev
    }

    /// `true` once an index pulse has been latched
    pub fn index_found(&self) -> bool {
        self.index_found
    }

    /// Drop the index reference and start searching again
    pub fn restart_search(&mut self) {
        self.index_found = false;
        self.index_offset = 0;
    }

    pub fn counter_mut(&mut self) -> &mut C {
        &mut self.counter
    }

    fn poll_index(&mut self) {
        if self.index_mode != IndexMode::Search || self.index_found {
            return;
        }
        if let Some(at) = self.counter.take_index() {
            self.index_offset = at;
            self.index_found = true;
            info!("Encoder index found at count {}", at);
        }
    }

    /// Angle [rad] of a pulse count relative to the zero reference
    fn count_to_angle(&self, count: i32) -> f32 {
        let cpr = self.counts_per_rev as i64;
        let rel = (count as i64 - self.index_offset as i64).rem_euclid(cpr);
        let angle = rel as f32 / self.counts_per_rev as f32 * TAU;
        // cpr - 1 of a very fine encoder can round up to TAU
        if angle >= TAU {
            0.0
        } else {
            angle
        }
    }
}

impl<C: PulseCounter> RawAngleSource for IncrementalEncoder<C> {
    fn read_raw_angle(&mut self) -> f32 {
        self.poll_index();
        let count = self.counter.count();
        self.count_to_angle(count)
    }

    fn needs_search(&self) -> bool {
        self.index_mode == IndexMode::Search && !self.index_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeCounter {
        count: i32,
        index: Option<i32>,
    }

    impl PulseCounter for FakeCounter {
        fn count(&mut self) -> i32 {
            self.count
        }

        fn take_index(&mut self) -> Option<i32> {
            self.index.take()
        }
    }

    #[test]
    fn test_zero_cpr_rejected() {
        assert!(matches!(
            IncrementalEncoder::new(FakeCounter::default(), 0, IndexMode::None),
            Err(ConfigError::ZeroCountsPerRev)
        ));
    }

    #[test]
    fn test_count_to_angle() {
        let mut enc = IncrementalEncoder::new(FakeCounter::default(), 2048, IndexMode::None).unwrap();
        assert!(!enc.needs_search());

        enc.counter_mut().count = 512;
        assert!((enc.read_raw_angle() - TAU / 4.0).abs() < 1e-6);

        // one and a half turns forward
        enc.counter_mut().count = 3072;
        assert!((enc.read_raw_angle() - TAU / 2.0).abs() < 1e-6);

        // negative counts wrap into [0, TAU)
        enc.counter_mut().count = -512;
        assert!((enc.read_raw_angle() - 3.0 * TAU / 4.0).abs() < 1e-6);
    }

    #[test]
    fn test_index_search() {
        let mut enc = IncrementalEncoder::new(FakeCounter::default(), 1000, IndexMode::Search).unwrap();
        assert!(enc.needs_search());

        enc.counter_mut().count = 300;
        enc.read_raw_angle();
        assert!(enc.needs_search());

        enc.counter_mut().index = Some(250);
        enc.counter_mut().count = 500;
        let a = enc.read_raw_angle();
        assert!(!enc.needs_search());
        assert!(enc.index_found());
        assert!((a - 0.25 * TAU).abs() < 1e-6);

        // later index pulses do not move the reference
        enc.counter_mut().index = Some(1250);
        enc.counter_mut().count = 250;
        assert_eq!(enc.read_raw_angle(), 0.0);

        enc.restart_search();
        assert!(enc.needs_search());
    }

    #[test]
    fn test_index_ignored_without_search() {
        let mut enc = IncrementalEncoder::new(FakeCounter::default(), 1000, IndexMode::None).unwrap();
        enc.counter_mut().index = Some(250);
        enc.counter_mut().count = 250;
        assert!((enc.read_raw_angle() - 0.25 * TAU).abs() < 1e-6);
        assert!(!enc.index_found());
    }

    #[test]
    fn test_fine_encoder_stays_below_tau() {
        let mut enc = IncrementalEncoder::new(FakeCounter::default(), 1 << 30, IndexMode::None).unwrap();
        enc.counter_mut().count = (1 << 30) - 1;
        let a = enc.read_raw_angle();
        assert!((0.0..TAU).contains(&a));
    }
}
