//! Rectangle math for the node geometry model.
//!
//! Every node carries three rectangles in device-independent pixels:
//! the raw `bounds`, the margin-expanded `linear` rectangle and the
//! padding/border-contracted `box_rect`. Unit conversion never happens here.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle stored by its four edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoxRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoxRect {
    /// Create a rectangle from its edges.
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self { left, top, right, bottom }
    }

    /// Create a rectangle from position and size.
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(x, y, x + width, y + height)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Get the center X coordinate.
    pub fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// Get the center Y coordinate.
    pub fn center_y(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }

    /// Get the center point.
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.center_x(), self.center_y())
    }

    /// True when the rectangle has no rendered area.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Check whether `other` lies within this rectangle, allowing each edge
    /// to protrude by `tolerance`.
    pub fn contains(&self, other: &BoxRect, tolerance: f64) -> bool {
        other.left >= self.left - tolerance
            && other.top >= self.top - tolerance
            && other.right <= self.right + tolerance
            && other.bottom <= self.bottom + tolerance
    }

    /// Sum of the four edge gaps between this rectangle and an enclosed one.
    pub fn enclosing_gap(&self, inner: &BoxRect) -> f64 {
        (inner.left - self.left)
            + (inner.top - self.top)
            + (self.right - inner.right)
            + (self.bottom - inner.bottom)
    }

    /// Compute union (bounding box) with another rectangle.
    pub fn union(&self, other: &BoxRect) -> BoxRect {
        BoxRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// True when the horizontal extents share more than `tolerance` pixels.
    pub fn overlaps_horizontally(&self, other: &BoxRect, tolerance: f64) -> bool {
        self.left.max(other.left) < self.right.min(other.right) - tolerance
    }

    /// True when the vertical extents share more than `tolerance` pixels.
    pub fn overlaps_vertically(&self, other: &BoxRect, tolerance: f64) -> bool {
        self.top.max(other.top) < self.bottom.min(other.bottom) - tolerance
    }

    /// Distance between the horizontal extents (0 when they overlap).
    pub fn horizontal_gap(&self, other: &BoxRect) -> f64 {
        (other.left - self.right).max(self.left - other.right).max(0.0)
    }

    /// Distance between the vertical extents (0 when they overlap).
    pub fn vertical_gap(&self, other: &BoxRect) -> f64 {
        (other.top - self.bottom).max(self.top - other.bottom).max(0.0)
    }

    /// Grow every edge outward by the matching edge width.
    pub fn expand(&self, edges: &Edges) -> BoxRect {
        BoxRect::new(
            self.left - edges.left,
            self.top - edges.top,
            self.right + edges.right,
            self.bottom + edges.bottom,
        )
    }

    /// Shrink every edge inward by the matching edge width.
    pub fn contract(&self, edges: &Edges) -> BoxRect {
        let left = self.left + edges.left;
        let top = self.top + edges.top;
        BoxRect::new(
            left,
            top,
            (self.right - edges.right).max(left),
            (self.bottom - edges.bottom).max(top),
        )
    }
}

/// Widths on all four sides (margin, padding or border).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Edges {
    pub fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self { top, right, bottom, left }
    }

    /// Create uniform edges.
    pub fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Total horizontal width.
    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    /// Total vertical width.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Component-wise sum.
    pub fn add(&self, other: &Edges) -> Edges {
        Edges::new(
            self.top + other.top,
            self.right + other.right,
            self.bottom + other.bottom,
            self.left + other.left,
        )
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

/// The three derived rectangles of a node plus the edge widths they came from.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    /// Raw rendered rectangle.
    pub bounds: BoxRect,
    /// `bounds` expanded by margin.
    pub linear: BoxRect,
    /// `bounds` contracted by padding and border.
    pub box_rect: BoxRect,
    pub margin: Edges,
    pub padding: Edges,
    pub border: Edges,
}

impl Geometry {
    /// Derive the full geometry from a raw rectangle and edge widths.
    pub fn new(bounds: BoxRect, margin: Edges, padding: Edges, border: Edges) -> Self {
        let mut geometry = Self {
            bounds,
            linear: bounds,
            box_rect: bounds,
            margin,
            padding,
            border,
        };
        geometry.calibrate();
        geometry
    }

    /// Replace `bounds` and re-derive `linear` and `box_rect`.
    pub fn set_bounds(&mut self, bounds: BoxRect) {
        self.bounds = bounds;
        self.calibrate();
    }

    /// Re-derive `linear` and `box_rect` from the current `bounds`.
    pub fn calibrate(&mut self) {
        self.linear = self.bounds.expand(&self.margin);
        self.box_rect = self.bounds.contract(&self.padding.add(&self.border));
    }

    /// Grow `bounds` so that `box_rect` covers `content`. Returns true when
    /// anything changed.
    pub fn grow_to_cover(&mut self, content: &BoxRect) -> bool {
        if self.box_rect.contains(content, 0.0) {
            return false;
        }
        let inset = self.padding.add(&self.border);
        let covered = self.box_rect.union(content);
        self.set_bounds(covered.expand(&inset));
        true
    }
}
