//! Angle helpers shared by the tracker and the backends.

use core::f32::consts::{PI, TAU};

/// Normalize an angle into [0, TAU)
#[inline]
pub fn normalize(angle: f32) -> f32 {
    let normalized = angle - TAU * libm::floorf(angle / TAU);
    // a tiny negative angle rounds up to TAU in f32
    if normalized >= TAU || normalized < 0.0 {
        0.0
    } else {
        normalized
    }
}

/// Split a continuous position [rad] into full rotations and shaft angle
#[inline]
pub fn split(position: f32) -> (i32, f32) {
    let rotations = libm::floorf(position / TAU);
    (rotations as i32, normalize(position - rotations * TAU))
}

/// Shortest signed difference `to - from`, in [-π, π]
#[inline]
pub fn shortest_distance(from: f32, to: f32) -> f32 {
    let diff = to - from;
    if diff > PI {
        diff - TAU
    } else if diff < -PI {
        diff + TAU
    } else {
        diff
    }
}

/// Rotation count step implied by moving from `prev` to `next`, both in [0, TAU).
///
/// Any jump larger than half a turn is read as a seam crossing, so the real
/// movement between two samples has to stay below π.
#[inline]
pub fn seam_crossing(prev: f32, next: f32) -> i32 {
    let delta = next - prev;
    if delta < -PI {
        // forward: e.g. 6.0 -> 0.2
        1
    } else if delta > PI {
        // backward: e.g. 0.2 -> 6.0
        -1
    } else {
        0
    }
}

/// `true` when `angle` satisfies the raw reading contract
#[inline]
pub fn is_bounded(angle: f32) -> bool {
    (0.0..TAU).contains(&angle)
}
