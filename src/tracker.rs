//! Shaft position tracking
//!
//! Turns a bounded raw angle (0 ~ 2π) into an unbounded shaft position by
//! counting seam crossings, and derives angular velocity from timestamped
//! samples. All sensor backends share this logic.

use core::f32::consts::TAU;
use core::f64::consts::TAU as TAU_F64;

use embassy_time::Instant;

use crate::angle;
use crate::clock::{elapsed_secs, Clock};
use crate::config::{validate_min_elapsed_time, ConfigError, TrackerConfig, INIT_SAMPLE_COUNT};
use crate::sensor::{Direction, RawAngleSource};

/// Snapshot of everything the tracker knows.
///
/// Handed out by [`PositionTracker::state`] so wrappers (e.g. a smoothing
/// sensor extrapolating between slow reads) can work from the tracker's data
/// without reaching into it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrackerState {
    /// Last computed angular velocity [rad/s]
    pub velocity: f32,
    /// Raw angle of the latest refresh [rad] (0 ≤ angle < TAU)
    pub angle_prev: f32,
    /// Timestamp of `angle_prev`
    pub angle_prev_ts: Instant,
    /// Angle used as velocity baseline [rad]
    pub vel_angle_prev: f32,
    /// Timestamp of the velocity baseline
    pub vel_angle_prev_ts: Instant,
    /// Full turns (positive: forward, negative: backward)
    pub full_rotations: i32,
    /// `full_rotations` at the velocity baseline
    pub vel_full_rotations: i32,
}

impl TrackerState {
    pub const fn new() -> Self {
        Self {
            velocity: 0.0,
            angle_prev: 0.0,
            angle_prev_ts: Instant::from_ticks(0),
            vel_angle_prev: 0.0,
            vel_angle_prev_ts: Instant::from_ticks(0),
            full_rotations: 0,
            vel_full_rotations: 0,
        }
    }

    /// Full rotations plus shaft angle [rad]
    #[inline]
    pub fn angle(&self) -> f32 {
        self.full_rotations as f32 * TAU + self.angle_prev
    }

    /// Same as [`angle`](Self::angle) in double precision
    #[inline]
    pub fn precise_angle(&self) -> f64 {
        self.full_rotations as f64 * TAU_F64 + self.angle_prev as f64
    }

    /// Displacement since the velocity baseline [rad]
    #[inline]
    fn displacement_since_baseline(&self) -> f32 {
        (self.full_rotations - self.vel_full_rotations) as f32 * TAU
            + (self.angle_prev - self.vel_angle_prev)
    }

    fn rebase_velocity(&mut self) {
        self.vel_angle_prev = self.angle_prev;
        self.vel_angle_prev_ts = self.angle_prev_ts;
        self.vel_full_rotations = self.full_rotations;
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::new()
    }
}

/// Position tracker over a raw angle source.
///
/// `refresh` has to be called often enough that the shaft turns less than
/// half a revolution between two calls. Faster movement is counted in the
/// wrong direction and is not detected. Typically the FOC loop calls
/// `refresh` once per iteration.
pub struct PositionTracker<S, C> {
    source: S,
    clock: C,
    state: TrackerState,
    min_elapsed_time: f32,
}

impl<S, C> PositionTracker<S, C>
where
    S: RawAngleSource,
    C: Clock,
{
    /// Create a tracker with the default configuration
    pub fn new(source: S, clock: C) -> Self {
        Self {
            source,
            clock,
            state: TrackerState::new(),
            min_elapsed_time: TrackerConfig::new().min_elapsed_time,
        }
    }

    /// Create a tracker with a custom configuration
    pub fn with_config(source: S, clock: C, config: TrackerConfig) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let mut tracker = Self::new(source, clock);
        tracker.min_elapsed_time = config.min_elapsed_time;
        Ok(tracker)
    }

    /// Prime the tracker from the current sensor reading.
    ///
    /// Reads the source several times back to back, seeding the velocity
    /// baseline first and the refresh baseline last, so the first `refresh`
    /// does not see a jump from zero. Rotation count and velocity restart at 0.
    pub fn init(&mut self) {
        let mut angle = 0.0;
        for i in 0..INIT_SAMPLE_COUNT {
            angle = self.sample();
            if i == INIT_SAMPLE_COUNT / 2 - 1 {
                self.state.vel_angle_prev = angle;
                self.state.vel_angle_prev_ts = self.clock.now();
            }
        }
        self.state.angle_prev = angle;
        self.state.angle_prev_ts = self.clock.now();
        self.state.full_rotations = 0;
        self.state.vel_full_rotations = 0;
        self.state.velocity = 0.0;

        info!("Position tracker initialized: angle={} rad", angle);
    }

    /// Read the sensor and update angle, rotation count and timestamp
    pub fn refresh(&mut self) {
        let angle = self.sample();
        let step = angle::seam_crossing(self.state.angle_prev, angle);
        if step != 0 {
            self.state.full_rotations = self.state.full_rotations.wrapping_add(step);
            trace!(
                "Seam crossed: {} -> {} rad, full_rotations={}",
                self.state.angle_prev,
                angle,
                self.state.full_rotations
            );
        }
        self.state.angle_prev = angle;
        self.state.angle_prev_ts = self.clock.now();
    }

    /// Shaft angle of the latest refresh [rad] (0 ≤ angle < TAU)
    #[inline]
    pub fn mechanical_angle(&self) -> f32 {
        self.state.angle_prev
    }

    /// Full rotations plus shaft angle [rad].
    ///
    /// Resolution drops as the rotation count grows: an `f32` cannot hold a
    /// large multiple of TAU and a small shaft angle at the same time. Use
    /// [`precise_angle`](Self::precise_angle) when that matters.
    #[inline]
    pub fn angle(&self) -> f32 {
        self.state.angle()
    }

    /// Full rotations plus shaft angle [rad], in double precision
    #[inline]
    pub fn precise_angle(&self) -> f64 {
        self.state.precise_angle()
    }

    /// Number of full rotations
    #[inline]
    pub fn full_rotations(&self) -> i32 {
        self.state.full_rotations
    }

    /// Angular velocity [rad/s].
    ///
    /// Recomputed from the samples taken by `refresh` only once at least
    /// `min_elapsed_time` has passed since the previous computation; calls in
    /// between return the previous value. Only meaningful if `refresh` was
    /// called in the meantime.
    pub fn velocity(&mut self) -> f32 {
        let state = &mut self.state;
        let Some(elapsed) = elapsed_secs(state.vel_angle_prev_ts, state.angle_prev_ts) else {
            // baseline is newer than the last sample, start over from it
            state.rebase_velocity();
            return state.velocity;
        };
        if elapsed < self.min_elapsed_time || elapsed <= 0.0 {
            return state.velocity;
        }

        state.velocity = state.displacement_since_baseline() / elapsed;
        state.rebase_velocity();
        state.velocity
    }

    /// Direction of the last computed velocity
    pub fn direction(&self) -> Direction {
        Direction::from_velocity(self.state.velocity)
    }

    /// `true` while the sensor still needs an absolute zero search
    pub fn needs_search(&self) -> bool {
        self.source.needs_search()
    }

    /// Minimum time between velocity updates [s]
    pub fn min_elapsed_time(&self) -> f32 {
        self.min_elapsed_time
    }

    /// Set the minimum time between velocity updates [s]
    pub fn set_min_elapsed_time(&mut self, seconds: f32) -> Result<(), ConfigError> {
        self.min_elapsed_time = validate_min_elapsed_time(seconds)?;
        debug!("Velocity min elapsed time set to {} s", seconds);
        Ok(())
    }

    /// Copy of the internal state
    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Give back the sensor and clock
    pub fn into_inner(self) -> (S, C) {
        (self.source, self.clock)
    }

    fn sample(&mut self) -> f32 {
        let angle = self.source.read_raw_angle();
        debug_assert!(
            angle::is_bounded(angle),
            "raw angle outside [0, 2π): {}",
            angle
        );
        angle
    }
}
