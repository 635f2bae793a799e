//! Bias and per-axis rectangle helpers.

use trellis_core::settings::round_to;
use trellis_core::{Axis, BoxRect, Edge};

/// Distance from 0.5 under which a bias counts as centered.
pub const CENTER_TOLERANCE: f64 = 0.01;

/// Normalized position between two opposing reference edges:
/// `start / (start + end)`, rounded to two decimals.
///
/// A zero total gap gives 0 when the start gap is 0 and 1 otherwise.
pub fn bias(start: f64, end: f64) -> f64 {
    let total = start + end;
    if total.abs() < f64::EPSILON {
        return if start.abs() < f64::EPSILON { 0.0 } else { 1.0 };
    }
    round_to(start / total, 2).clamp(0.0, 1.0)
}

/// Gaps between `child` and the edges of `reference` along `axis`.
pub fn axis_gaps(child: &BoxRect, reference: &BoxRect, axis: Axis) -> (f64, f64) {
    (lead(child, axis) - lead(reference, axis), trail(reference, axis) - trail(child, axis))
}

/// Bias of `child` inside `reference` along `axis`.
pub fn axis_bias(child: &BoxRect, reference: &BoxRect, axis: Axis) -> f64 {
    let (start, end) = axis_gaps(child, reference, axis);
    bias(start, end)
}

pub fn is_centered(value: f64) -> bool {
    (value - 0.5).abs() <= CENTER_TOLERANCE
}

/// Leading and trailing edge names of an axis.
pub fn edges(axis: Axis) -> (Edge, Edge) {
    match axis {
        Axis::Horizontal => (Edge::Left, Edge::Right),
        Axis::Vertical => (Edge::Top, Edge::Bottom),
    }
}

pub fn cross(axis: Axis) -> Axis {
    match axis {
        Axis::Horizontal => Axis::Vertical,
        Axis::Vertical => Axis::Horizontal,
    }
}

pub fn lead(rect: &BoxRect, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => rect.left,
        Axis::Vertical => rect.top,
    }
}

pub fn trail(rect: &BoxRect, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => rect.right,
        Axis::Vertical => rect.bottom,
    }
}

pub fn center(rect: &BoxRect, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => rect.center_x(),
        Axis::Vertical => rect.center_y(),
    }
}

pub fn extent(rect: &BoxRect, axis: Axis) -> f64 {
    trail(rect, axis) - lead(rect, axis)
}

/// Gap between two rectangles across `axis` (0 when they overlap there).
pub fn cross_gap(a: &BoxRect, b: &BoxRect, axis: Axis) -> f64 {
    match axis {
        Axis::Horizontal => a.vertical_gap(b),
        Axis::Vertical => a.horizontal_gap(b),
    }
}

/// True when two rectangles share extent across `axis`.
pub fn cross_overlap(a: &BoxRect, b: &BoxRect, axis: Axis, tolerance: f64) -> bool {
    match axis {
        Axis::Horizontal => a.overlaps_vertically(b, tolerance),
        Axis::Vertical => a.overlaps_horizontally(b, tolerance),
    }
}
