//! Chain detection and distribution.

use trellis_core::settings::round_to;
use trellis_core::{Anchor, AnchorTarget, Axis, ConstraintScratch, NodeId, Settings};

use crate::adjacency::{Frame, Member};
use crate::bias::{bias, cross, edges, extent, lead, trail};

/// How a chain shares the free space along its axis.
#[derive(Debug, Clone, PartialEq)]
pub enum Distribution {
    /// Flush against both parent edges; the slack sits between members.
    SpreadInside,
    /// Members packed together, the block placed by `bias`.
    Packed { bias: f64 },
    /// Members sized by their share of the parent extent.
    Percent(Vec<f64>),
    /// Elastic members sized by layout weights.
    Weighted(Vec<f64>),
}

impl Distribution {
    /// Platform chain style name.
    pub fn style(&self) -> &'static str {
        match self {
            Self::SpreadInside => "spread_inside",
            Self::Packed { .. } => "packed",
            Self::Percent(_) | Self::Weighted(_) => "spread",
        }
    }
}

/// An ordered run of siblings anchored head to tail along one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub axis: Axis,
    pub members: Vec<NodeId>,
    pub distribution: Distribution,
}

impl Chain {
    pub fn head(&self) -> Option<NodeId> {
        self.members.first().copied()
    }

    pub fn tail(&self) -> Option<NodeId> {
        self.members.last().copied()
    }
}

/// Chains along `axis`: runs of flow members that are each other's nearest
/// neighbor in both directions and share a common leading or trailing edge
/// on the cross axis.
pub fn detect_chains(frame: &Frame, axis: Axis, settings: &Settings) -> Vec<Vec<NodeId>> {
    let flow: Vec<&Member> = frame.flow().collect();
    let cross_axis = cross(axis);
    let lined_up = |a: &Member, b: &Member| {
        settings.same_edge(lead(&a.rect, cross_axis), lead(&b.rect, cross_axis))
            || settings.same_edge(trail(&a.rect, cross_axis), trail(&b.rect, cross_axis))
    };

    let next = |a: &Member| -> Option<NodeId> {
        flow.iter()
            .copied()
            .filter(|b| b.id != a.id && lined_up(a, *b))
            .filter(|b| lead(&b.rect, axis) >= trail(&a.rect, axis) - settings.edge_tolerance)
            .min_by(|x, y| lead(&x.rect, axis).total_cmp(&lead(&y.rect, axis)).then(x.id.cmp(&y.id)))
            .map(|b| b.id)
    };
    let previous = |b: &Member| -> Option<NodeId> {
        flow.iter()
            .copied()
            .filter(|a| a.id != b.id && lined_up(*a, b))
            .filter(|a| trail(&a.rect, axis) <= lead(&b.rect, axis) + settings.edge_tolerance)
            .max_by(|x, y| trail(&x.rect, axis).total_cmp(&trail(&y.rect, axis)).then(y.id.cmp(&x.id)))
            .map(|a| a.id)
    };
    let member = |id: NodeId| flow.iter().copied().find(|m| m.id == id);
    let mutual_next = |a: &Member| next(a).filter(|&b| member(b).and_then(|m| previous(m)) == Some(a.id));

    let mut chains = Vec::new();
    let mut seen: Vec<NodeId> = Vec::new();
    for &head in &flow {
        let has_mutual_previous = previous(head)
            .and_then(|p| member(p))
            .is_some_and(|p| mutual_next(p) == Some(head.id));
        if has_mutual_previous || seen.contains(&head.id) {
            continue;
        }
        let mut run = vec![head.id];
        let mut current = head;
        while let Some(following) = mutual_next(current).and_then(|id| member(id)) {
            if run.contains(&following.id) {
                break;
            }
            run.push(following.id);
            current = following;
        }
        seen.extend(run.iter().copied());
        if run.len() > 1 {
            chains.push(run);
        }
    }
    chains
}

/// Share of `total` for each segment, rounded cumulatively so rounding
/// error lands in the last segment.
pub fn cumulative_percents(segments: &[f64], total: f64, places: u32) -> Vec<f64> {
    if total <= 0.0 {
        return vec![0.0; segments.len()];
    }
    let mut shares = Vec::with_capacity(segments.len());
    let mut running = 0.0;
    let mut previous = 0.0;
    for &segment in segments {
        running += segment;
        let rounded = round_to(running / total, places);
        shares.push(round_to(rounded - previous, places));
        previous = rounded;
    }
    shares
}

/// Pick the distribution of a chain: flush to both edges, explicit even
/// request, packed when the slack is small, percent split otherwise.
pub fn distribute(
    frame: &Frame,
    members: &[NodeId],
    axis: Axis,
    even_request: bool,
    settings: &Settings,
) -> Distribution {
    let rects: Vec<_> = members
        .iter()
        .filter_map(|&id| frame.member(id))
        .map(|m| m.rect)
        .collect();
    let (Some(first), Some(last)) = (rects.first(), rects.last()) else {
        return Distribution::SpreadInside;
    };
    let start_gap = lead(first, axis) - lead(&frame.parent, axis);
    let end_gap = trail(&frame.parent, axis) - trail(last, axis);
    let total = extent(&frame.parent, axis);
    let sizes: Vec<f64> = rects.iter().map(|r| extent(r, axis)).collect();

    if settings.same_edge(start_gap, 0.0) && settings.same_edge(end_gap, 0.0) {
        return Distribution::SpreadInside;
    }
    if even_request {
        let equal = vec![1.0; sizes.len()];
        return Distribution::Percent(cumulative_percents(&equal, sizes.len() as f64, settings.percent_accuracy));
    }
    let slack = total - sizes.iter().sum::<f64>();
    if slack < settings.chain_packed_threshold {
        return Distribution::Packed { bias: bias(start_gap, end_gap) };
    }
    Distribution::Percent(cumulative_percents(&sizes, total, settings.percent_accuracy))
}

/// Anchors a chain assigns to the member at `index`.
pub fn chain_anchors(frame: &Frame, chain: &Chain, index: usize) -> Vec<Anchor> {
    let axis = chain.axis;
    let (leading, trailing) = edges(axis);
    let rect = |id: NodeId| frame.member(id).map(|m| m.rect).unwrap_or_default();
    let id = chain.members[index];
    let own = rect(id);
    let packed = matches!(chain.distribution, Distribution::Packed { .. });
    let mut anchors = Vec::with_capacity(2);

    if index == 0 {
        let margin = if packed { 0.0 } else { lead(&own, axis) - lead(&frame.parent, axis) };
        anchors.push(Anchor::to_parent(leading).with_margin(margin));
    } else {
        let previous = chain.members[index - 1];
        let margin = lead(&own, axis) - trail(&rect(previous), axis);
        anchors.push(Anchor::new(leading, AnchorTarget::Node(previous), trailing).with_margin(margin));
    }

    if index + 1 == chain.members.len() {
        let margin = if packed { 0.0 } else { trail(&frame.parent, axis) - trail(&own, axis) };
        anchors.push(Anchor::to_parent(trailing).with_margin(margin));
    } else {
        let next = chain.members[index + 1];
        anchors.push(Anchor::new(trailing, AnchorTarget::Node(next), leading));
    }
    anchors
}

/// Write chain anchors, membership, bias and sizing into a member's scratch.
pub fn apply_chain(frame: &Frame, chain: &Chain, index: usize, scratch: &mut ConstraintScratch, weighted: bool) {
    let axis = chain.axis;
    scratch.clear_axis(axis);
    for anchor in chain_anchors(frame, chain, index) {
        scratch.set_anchor(anchor);
    }
    scratch.set_anchored(axis, true);
    match axis {
        Axis::Horizontal => scratch.horizontal_chain = chain.members.clone(),
        Axis::Vertical => scratch.vertical_chain = chain.members.clone(),
    }

    if index == 0 {
        if let Distribution::Packed { bias } = chain.distribution {
            match axis {
                Axis::Horizontal => scratch.horizontal_bias = Some(bias),
                Axis::Vertical => scratch.vertical_bias = Some(bias),
            }
        }
    }

    match &chain.distribution {
        Distribution::Percent(shares) => {
            let share = shares.get(index).copied();
            match axis {
                Axis::Horizontal => {
                    scratch.width_percent = share;
                    scratch.horizontal_weight = share;
                }
                Axis::Vertical => {
                    scratch.height_percent = share;
                    scratch.vertical_weight = share;
                }
            }
        }
        Distribution::Weighted(weights) if weighted => {
            let weight = weights.get(index).copied().filter(|w| *w > 0.0);
            match axis {
                Axis::Horizontal => scratch.horizontal_weight = weight,
                Axis::Vertical => scratch.vertical_weight = weight,
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{BoxRect, Edge};

    fn frame(width: f64, rects: &[(f64, f64, f64, f64)]) -> Frame {
        Frame {
            container: NodeId(0),
            parent: BoxRect::from_xywh(0.0, 0.0, width, 100.0),
            members: rects
                .iter()
                .enumerate()
                .map(|(i, &(x, y, w, h))| Member {
                    id: NodeId(i as u32 + 1),
                    rect: BoxRect::from_xywh(x, y, w, h),
                    baseline: None,
                    layer: false,
                })
                .collect(),
        }
    }

    #[test]
    fn test_detect_row_chain() {
        let f = frame(300.0, &[(0.0, 0.0, 100.0, 20.0), (100.0, 0.0, 100.0, 20.0), (200.0, 0.0, 100.0, 20.0)]);
        let chains = detect_chains(&f, Axis::Horizontal, &Settings::default());
        assert_eq!(chains, vec![vec![NodeId(1), NodeId(2), NodeId(3)]]);
    }

    #[test]
    fn test_misaligned_members_do_not_chain() {
        let f = frame(300.0, &[(0.0, 0.0, 100.0, 20.0), (100.0, 30.0, 100.0, 25.0)]);
        assert!(detect_chains(&f, Axis::Horizontal, &Settings::default()).is_empty());
    }

    #[test]
    fn test_bottom_aligned_chain_with_gaps() {
        let f = frame(300.0, &[(0.0, 10.0, 50.0, 30.0), (80.0, 20.0, 50.0, 20.0)]);
        let chains = detect_chains(&f, Axis::Horizontal, &Settings::default());
        assert_eq!(chains, vec![vec![NodeId(1), NodeId(2)]]);
    }

    #[test]
    fn test_cumulative_percents() {
        assert_eq!(cumulative_percents(&[1.0, 1.0, 1.0], 3.0, 2), vec![0.33, 0.34, 0.33]);
        assert_eq!(cumulative_percents(&[100.0, 150.0], 500.0, 2), vec![0.2, 0.3]);
    }

    #[test]
    fn test_distribution_priority() {
        let settings = Settings::default();
        let flush = frame(250.0, &[(0.0, 0.0, 100.0, 20.0), (100.0, 0.0, 150.0, 20.0)]);
        let members = [NodeId(1), NodeId(2)];
        assert_eq!(distribute(&flush, &members, Axis::Horizontal, false, &settings), Distribution::SpreadInside);

        let tight = frame(260.0, &[(0.0, 0.0, 100.0, 20.0), (100.0, 0.0, 150.0, 20.0)]);
        assert_eq!(
            distribute(&tight, &members, Axis::Horizontal, false, &settings),
            Distribution::Packed { bias: 0.0 }
        );
        assert_eq!(
            distribute(&tight, &members, Axis::Horizontal, true, &settings),
            Distribution::Percent(vec![0.5, 0.5])
        );

        let loose = frame(500.0, &[(0.0, 0.0, 100.0, 20.0), (100.0, 0.0, 150.0, 20.0)]);
        assert_eq!(
            distribute(&loose, &members, Axis::Horizontal, false, &settings),
            Distribution::Percent(vec![0.2, 0.3])
        );
    }

    #[test]
    fn test_chain_anchors() {
        let f = frame(300.0, &[(0.0, 0.0, 100.0, 20.0), (110.0, 0.0, 80.0, 20.0), (200.0, 0.0, 100.0, 20.0)]);
        let chain = Chain {
            axis: Axis::Horizontal,
            members: vec![NodeId(1), NodeId(2), NodeId(3)],
            distribution: Distribution::SpreadInside,
        };
        let head = chain_anchors(&f, &chain, 0);
        assert_eq!(head[0], Anchor::to_parent(Edge::Left));
        assert_eq!(head[1].target, AnchorTarget::Node(NodeId(2)));
        let middle = chain_anchors(&f, &chain, 1);
        assert_eq!(middle[0].margin, 10.0);
        assert_eq!(middle[1].margin, 0.0);
        let tail = chain_anchors(&f, &chain, 2);
        assert_eq!(tail[1], Anchor::to_parent(Edge::Right));
    }
}
