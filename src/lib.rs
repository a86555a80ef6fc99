//! Hardware-agnostic shaft position sensing for FOC motor control.
//!
//! A [`PositionTracker`] wraps any [`RawAngleSource`] (incremental encoder,
//! magnetic encoder, Hall sensor, ...) and turns its bounded 0 ~ 2π reading
//! into a continuous shaft angle, a full rotation count and an angular
//! velocity. The control loop calls [`PositionTracker::refresh`] once per
//! iteration and queries the rest as needed.
//!
//! ```ignore
//! let mut tracker = PositionTracker::new(sensor, SystemClock);
//! tracker.init();
//! loop {
//!     tracker.refresh();
//!     let angle = tracker.angle();
//!     let velocity = tracker.velocity();
//!     // ...
//! }
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt;

pub mod angle;
pub mod backends;
pub mod clock;
pub mod config;
pub mod sensor;
pub mod tracker;

pub use clock::{Clock, ManualClock};
#[cfg(feature = "time-driver")]
pub use clock::SystemClock;
pub use config::{ConfigError, TrackerConfig};
pub use sensor::{Direction, RawAngleSource};
pub use tracker::{PositionTracker, TrackerState};
