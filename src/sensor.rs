//! Raw angle capability implemented by every sensor backend.

/// Something that can report the current shaft angle.
///
/// Implement this for a new kind of sensor and wrap it in a
/// [`PositionTracker`](crate::PositionTracker) to get rotation counting and
/// velocity for free.
pub trait RawAngleSource {
    /// Current shaft angle in radians, in [0, 2π) for one full turn.
    ///
    /// Calling this directly does not update any tracker state, use
    /// [`PositionTracker::refresh`](crate::PositionTracker::refresh) instead.
    fn read_raw_angle(&mut self) -> f32;

    /// `true` while an absolute zero search is still pending, e.g. an
    /// indexed encoder that has not seen its index pulse yet.
    fn needs_search(&self) -> bool {
        false
    }
}

impl<T: RawAngleSource + ?Sized> RawAngleSource for &mut T {
    fn read_raw_angle(&mut self) -> f32 {
        (**self).read_raw_angle()
    }

    fn needs_search(&self) -> bool {
        (**self).needs_search()
    }
}

/// Rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(i8)]
pub enum Direction {
    /// Clockwise
    Cw = 1,
    /// Counter clockwise
    Ccw = -1,
    /// Not yet known or invalid
    Unknown = 0,
}

impl Direction {
    /// Direction of a signed angular velocity; zero and NaN map to `Unknown`
    pub fn from_velocity(velocity: f32) -> Self {
        if velocity > 0.0 {
            Self::Cw
        } else if velocity < 0.0 {
            Self::Ccw
        } else {
            Self::Unknown
        }
    }

    /// +1, -1 or 0
    #[inline]
    pub fn sign(self) -> i8 {
        self as i8
    }

    pub fn reversed(self) -> Self {
        match self {
            Self::Cw => Self::Ccw,
            Self::Ccw => Self::Cw,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl Default for Direction {
    fn default() -> Self {
        Self::Unknown
    }
}
