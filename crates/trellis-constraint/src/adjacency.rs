//! Pairwise edge relations between the children of a free-form container.
//!
//! For every child and axis the pass lists the ways that axis could be
//! pinned, in priority order. The closure step later picks the first one
//! whose target is already resolved.

use smallvec::{smallvec, SmallVec};
use tracing::trace;
use trellis_core::{Anchor, AnchorTarget, Axis, BoxRect, Edge, NodeCache, NodeId, Settings};

use crate::bias::{axis_bias, cross_gap, cross_overlap, edges, is_centered, lead, trail, center};

/// Geometry of one child as the solver sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Member {
    pub id: NodeId,
    pub rect: BoxRect,
    /// Approximate text baseline for text-bearing, baseline-aligned nodes.
    pub baseline: Option<f64>,
    /// Out-of-flow child; relates only to the parent.
    pub layer: bool,
}

/// Content box of a container and its children in document order.
#[derive(Debug, Clone)]
pub struct Frame {
    pub container: NodeId,
    pub parent: BoxRect,
    pub members: Vec<Member>,
}

/// Ascent as a share of the font size when estimating baselines.
const ASCENT_RATIO: f64 = 0.8;
const DEFAULT_FONT_SIZE: f64 = 16.0;

impl Frame {
    /// Snapshot the render children of `container`; `layers` are flagged as
    /// out-of-flow.
    pub fn capture(cache: &NodeCache, container: NodeId, layers: &[NodeId]) -> Self {
        let members = cache
            .render_children(container)
            .iter()
            .map(|&id| {
                let node = &cache[id];
                let text_bearing = node.widget.is_text() || node.has_text();
                let baseline = (text_bearing && node.style.is_baseline_aligned()).then(|| {
                    let font_size = node.style.length("font-size").unwrap_or(DEFAULT_FONT_SIZE);
                    node.box_rect().top + font_size * ASCENT_RATIO
                });
                Member {
                    id,
                    rect: *node.bounds(),
                    baseline,
                    layer: layers.contains(&id),
                }
            })
            .collect();
        Self {
            container,
            parent: *cache[container].box_rect(),
            members,
        }
    }

    pub fn member(&self, id: NodeId) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    pub fn flow(&self) -> impl Iterator<Item = &Member> {
        self.members.iter().filter(|m| !m.layer)
    }
}

/// Relation kinds in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RelationKind {
    /// Edge coincides with the facing edge of a sibling, or the same edge
    /// of the parent.
    Touch,
    /// Edge coincides with the same edge of a nearby sibling.
    Align,
    /// Centers coincide; both sides anchored with bias 0.5.
    Center,
    /// Nearest sibling before the node along the axis, across a gap.
    Neighbor,
    /// Text baselines coincide.
    Baseline,
}

/// One way to pin an axis of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: RelationKind,
    pub target: AnchorTarget,
    pub anchors: SmallVec<[Anchor; 2]>,
    pub bias: Option<f64>,
}

impl Candidate {
    fn single(kind: RelationKind, anchor: Anchor) -> Self {
        Self { kind, target: anchor.target, anchors: smallvec![anchor], bias: None }
    }

    pub(crate) fn centered(target: AnchorTarget, axis: Axis) -> Self {
        let (leading, trailing) = edges(axis);
        Self {
            kind: RelationKind::Center,
            target,
            anchors: smallvec![
                Anchor::new(leading, target, leading),
                Anchor::new(trailing, target, trailing),
            ],
            bias: Some(0.5),
        }
    }
}

/// Candidates for one axis of `member`, highest priority first. Within a
/// kind the parent comes before siblings, siblings in document order.
pub fn candidates(frame: &Frame, member: &Member, axis: Axis, settings: &Settings) -> Vec<Candidate> {
    let (leading, trailing) = edges(axis);
    let rect = &member.rect;
    let parent = &frame.parent;
    let same = |a: f64, b: f64| settings.same_edge(a, b);

    let siblings: Vec<&Member> = if member.layer {
        Vec::new()
    } else {
        frame.flow().filter(|s| s.id != member.id).collect()
    };
    let near: Vec<&Member> = siblings
        .iter()
        .copied()
        .filter(|s| cross_gap(rect, &s.rect, axis) < settings.whitespace_tolerance)
        .collect();

    let mut out = Vec::new();

    // Touch: leading edge, then trailing edge.
    if same(lead(rect, axis), lead(parent, axis)) {
        let anchor = Anchor::to_parent(leading).with_margin(lead(rect, axis) - lead(parent, axis));
        out.push(Candidate::single(RelationKind::Touch, anchor));
    }
    for s in &near {
        if same(lead(rect, axis), trail(&s.rect, axis)) {
            let anchor = Anchor::new(leading, AnchorTarget::Node(s.id), trailing)
                .with_margin(lead(rect, axis) - trail(&s.rect, axis));
            out.push(Candidate::single(RelationKind::Touch, anchor));
        }
    }
    if same(trail(rect, axis), trail(parent, axis)) {
        let anchor = Anchor::to_parent(trailing).with_margin(trail(parent, axis) - trail(rect, axis));
        out.push(Candidate::single(RelationKind::Touch, anchor));
    }
    for s in &near {
        if same(trail(rect, axis), lead(&s.rect, axis)) {
            let anchor = Anchor::new(trailing, AnchorTarget::Node(s.id), leading)
                .with_margin(lead(&s.rect, axis) - trail(rect, axis));
            out.push(Candidate::single(RelationKind::Touch, anchor));
        }
    }

    // Align: same edge as a nearby sibling.
    for s in &near {
        if same(lead(rect, axis), lead(&s.rect, axis)) {
            let anchor = Anchor::new(leading, AnchorTarget::Node(s.id), leading)
                .with_margin(lead(rect, axis) - lead(&s.rect, axis));
            out.push(Candidate::single(RelationKind::Align, anchor));
        }
    }
    for s in &near {
        if same(trail(rect, axis), trail(&s.rect, axis)) {
            let anchor = Anchor::new(trailing, AnchorTarget::Node(s.id), trailing)
                .with_margin(trail(&s.rect, axis) - trail(rect, axis));
            out.push(Candidate::single(RelationKind::Align, anchor));
        }
    }

    // Center on the parent or on a nearby sibling.
    if is_centered(axis_bias(rect, parent, axis)) {
        out.push(Candidate::centered(AnchorTarget::Parent, axis));
    }
    for s in &near {
        if same(center(rect, axis), center(&s.rect, axis)) {
            out.push(Candidate::centered(AnchorTarget::Node(s.id), axis));
        }
    }

    // Nearest sibling entirely before this node, sharing cross extent.
    let neighbor = siblings
        .iter()
        .filter(|s| {
            trail(&s.rect, axis) <= lead(rect, axis) + settings.edge_tolerance
                && cross_overlap(rect, &s.rect, axis, settings.edge_tolerance)
        })
        .min_by(|a, b| {
            let gap_a = lead(rect, axis) - trail(&a.rect, axis);
            let gap_b = lead(rect, axis) - trail(&b.rect, axis);
            gap_a.total_cmp(&gap_b).then(a.id.cmp(&b.id))
        });
    if let Some(s) = neighbor {
        let anchor = Anchor::new(leading, AnchorTarget::Node(s.id), trailing)
            .with_margin(lead(rect, axis) - trail(&s.rect, axis));
        out.push(Candidate::single(RelationKind::Neighbor, anchor));
    }

    // Baseline: text-bearing siblings on the same line.
    if axis == Axis::Vertical {
        if let Some(baseline) = member.baseline {
            for s in &siblings {
                let on_line = s.rect.overlaps_vertically(rect, settings.edge_tolerance);
                if on_line && s.baseline.is_some_and(|b| same(b, baseline)) {
                    let anchor = Anchor::new(Edge::Baseline, AnchorTarget::Node(s.id), Edge::Baseline);
                    out.push(Candidate::single(RelationKind::Baseline, anchor));
                }
            }
        }
    }

    for candidate in &out {
        trace!(node = %member.id, ?axis, kind = ?candidate.kind, target = ?candidate.target, "adjacency");
    }
    out
}
