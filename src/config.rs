//! Tracker configuration and default parameters

use core::fmt;

/// Minimum time between velocity updates [s] (100 µs = 10 kHz)
pub const DEFAULT_MIN_ELAPSED_TIME: f32 = 0.000_100;

/// Number of raw reads performed by `init` before the tracker is seeded
pub const INIT_SAMPLE_COUNT: usize = 4;

/// Largest supported magnetic encoder resolution [bit]
pub const MAX_MAGNETIC_RESOLUTION_BITS: u8 = 16;

/// Configuration rejected at construction time
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Minimum elapsed time is negative, NaN or infinite
    InvalidMinElapsedTime(f32),
    /// Encoder counts per revolution must be positive
    ZeroCountsPerRev,
    /// Magnetic encoder resolution outside 1..=16 bits
    InvalidResolution(u8),
    /// Hall sensor needs at least one pole pair
    ZeroPolePairs,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMinElapsedTime(t) => write!(f, "invalid minimum elapsed time: {t} s"),
            Self::ZeroCountsPerRev => f.write_str("counts per revolution must be positive"),
            Self::InvalidResolution(bits) => write!(f, "unsupported resolution: {bits} bit"),
            Self::ZeroPolePairs => f.write_str("pole pair count must be positive"),
        }
    }
}

/// Tunables of a [`PositionTracker`](crate::PositionTracker)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerConfig {
    /// Velocity is not recomputed until at least this much time [s] has passed
    /// since the previous velocity sample.
    pub min_elapsed_time: f32,
}

impl TrackerConfig {
    pub const fn new() -> Self {
        Self {
            min_elapsed_time: DEFAULT_MIN_ELAPSED_TIME,
        }
    }

    /// Set the velocity rate limit [s]
    pub fn with_min_elapsed_time(mut self, seconds: f32) -> Result<Self, ConfigError> {
        self.min_elapsed_time = validate_min_elapsed_time(seconds)?;
        Ok(self)
    }

    /// Check every field, returning the config unchanged when it is usable
    pub fn validate(self) -> Result<Self, ConfigError> {
        validate_min_elapsed_time(self.min_elapsed_time)?;
        Ok(self)
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_min_elapsed_time(seconds: f32) -> Result<f32, ConfigError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(ConfigError::InvalidMinElapsedTime(seconds))
    }
}
