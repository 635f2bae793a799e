//! Radial placement of free-floating layers around an anchored sibling.

use glam::DVec2;
use trellis_core::settings::round_to;

/// Angle of `to` seen from `from`, in degrees clockwise from up, using
/// screen coordinates (y grows downward).
///
/// Computed from the arctangent of the shorter over the longer offset and
/// corrected per quadrant, so the ratio never exceeds 1.
pub fn angle(from: DVec2, to: DVec2) -> f64 {
    let offset = to - from;
    let (dx, dy) = (offset.x.abs(), offset.y.abs());
    if dx == 0.0 && dy == 0.0 {
        return 0.0;
    }
    let base = (dx.min(dy) / dx.max(dy)).atan().to_degrees();
    // Angle away from the vertical axis.
    let from_vertical = if dy >= dx { base } else { 90.0 - base };

    let degrees = match (offset.x >= 0.0, offset.y < 0.0) {
        (true, true) => from_vertical,
        (true, false) => 180.0 - from_vertical,
        (false, false) => 180.0 + from_vertical,
        (false, true) => 360.0 - from_vertical,
    };
    round_to(degrees.rem_euclid(360.0), 2)
}

/// Distance between two centers, rounded to two decimals.
pub fn radius(from: DVec2, to: DVec2) -> f64 {
    round_to(from.distance(to), 2)
}
