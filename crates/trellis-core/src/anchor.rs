//! Symbolic anchor types and the per-node constraint scratch state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::node::NodeId;

/// Layout axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// An anchorable edge of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Top,
    Right,
    Bottom,
    Baseline,
}

impl Edge {
    pub fn axis(&self) -> Axis {
        match self {
            Self::Left | Self::Right => Axis::Horizontal,
            Self::Top | Self::Bottom | Self::Baseline => Axis::Vertical,
        }
    }

    /// The edge facing the other way on the same axis.
    pub fn opposite(&self) -> Edge {
        match self {
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Baseline => Self::Baseline,
        }
    }

    /// True for the edges that start an axis (left, top).
    pub fn is_leading(&self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// What an anchor attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnchorTarget {
    Parent,
    Node(NodeId),
}

/// "Attach `edge` of this node to `target_edge` of `target`", with the
/// resolved pixel margin between them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub edge: Edge,
    pub target: AnchorTarget,
    pub target_edge: Edge,
    pub margin: f64,
}

impl Anchor {
    pub fn new(edge: Edge, target: AnchorTarget, target_edge: Edge) -> Self {
        Self { edge, target, target_edge, margin: 0.0 }
    }

    pub fn with_margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    pub fn to_parent(edge: Edge) -> Self {
        Self::new(edge, AnchorTarget::Parent, edge)
    }
}

/// Circular placement around another node's center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub target: NodeId,
    pub radius: f64,
    /// Degrees clockwise from up.
    pub angle: f64,
}

/// Transient solver state for one child of a free-form container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstraintScratch {
    pub anchors: SmallVec<[Anchor; 4]>,
    /// Fully anchored on the horizontal axis.
    pub horizontal: bool,
    /// Fully anchored on the vertical axis.
    pub vertical: bool,
    pub horizontal_chain: Vec<NodeId>,
    pub vertical_chain: Vec<NodeId>,
    pub horizontal_bias: Option<f64>,
    pub vertical_bias: Option<f64>,
    pub circle: Option<Circle>,
    pub width_percent: Option<f64>,
    pub height_percent: Option<f64>,
    pub horizontal_weight: Option<f64>,
    pub vertical_weight: Option<f64>,
    pub min_width: Option<f64>,
    pub min_height: Option<f64>,
}

impl ConstraintScratch {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn anchor(&self, edge: Edge) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.edge == edge)
    }

    /// Insert an anchor, replacing any anchor already on the same edge.
    pub fn set_anchor(&mut self, anchor: Anchor) {
        match self.anchors.iter_mut().find(|a| a.edge == anchor.edge) {
            Some(existing) => *existing = anchor,
            None => self.anchors.push(anchor),
        }
    }

    /// Drop every anchor on an axis.
    pub fn clear_axis(&mut self, axis: Axis) {
        self.anchors.retain(|a| a.edge.axis() != axis);
        match axis {
            Axis::Horizontal => {
                self.horizontal = false;
                self.horizontal_bias = None;
            }
            Axis::Vertical => {
                self.vertical = false;
                self.vertical_bias = None;
            }
        }
    }

    /// Anchors on one axis.
    pub fn axis_anchors(&self, axis: Axis) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter().filter(move |a| a.edge.axis() == axis)
    }

    pub fn has_axis(&self, axis: Axis) -> bool {
        self.axis_anchors(axis).next().is_some()
    }

    pub fn is_anchored(&self, axis: Axis) -> bool {
        match axis {
            Axis::Horizontal => self.horizontal,
            Axis::Vertical => self.vertical,
        }
    }

    pub fn set_anchored(&mut self, axis: Axis, anchored: bool) {
        match axis {
            Axis::Horizontal => self.horizontal = anchored,
            Axis::Vertical => self.vertical = anchored,
        }
    }

    pub fn chain(&self, axis: Axis) -> &[NodeId] {
        match axis {
            Axis::Horizontal => &self.horizontal_chain,
            Axis::Vertical => &self.vertical_chain,
        }
    }
}
