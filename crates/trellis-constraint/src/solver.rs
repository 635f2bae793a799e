//! Anchor solving for one free-form container.
//!
//! The solver reads the render children of a container, picks a symbolic
//! relation per axis for every child and writes the result into each
//! child's [`ConstraintScratch`]. Nothing is floated: a child that cannot be
//! tied to the parent through its siblings falls back to literal offsets.

use indexmap::IndexMap;
use tracing::{debug, trace_span, warn};
use trellis_core::{
    Anchor, AnchorTarget, Axis, Circle, ConstraintScratch, Edge, Feature, NodeCache, NodeId, Result, Settings,
};

use crate::adjacency::{candidates, Candidate, Frame, Member};
use crate::bias::{axis_bias, axis_gaps, is_centered};
use crate::chain::{apply_chain, detect_chains, distribute, Chain, Distribution};
use crate::radial::{angle, radius};

/// Upper bound on closure passes. Each productive pass promotes at least one
/// node, so the bound is only reached on malformed input.
const MAX_CLOSURE_PASSES: usize = 512;

/// How a child ended up positioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Centered on the parent on both axes.
    Centered,
    /// Tied to the parent or siblings by adjacency.
    Adjacent,
    /// Literal offsets from the parent's left and top edges.
    Literal,
    /// Circle around an anchored sibling.
    Radial,
}

/// Outcome of solving one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSolution {
    pub container: NodeId,
    /// Placement per child, in document order.
    pub placements: IndexMap<NodeId, Placement>,
    pub chains: Vec<Chain>,
    /// A child is centered on the parent, so the parent should wrap its
    /// content rather than stretch.
    pub wrap_tightly: bool,
}

impl ContainerSolution {
    pub fn placement(&self, id: NodeId) -> Option<Placement> {
        self.placements.get(&id).copied()
    }

    pub fn chain_of(&self, id: NodeId, axis: Axis) -> Option<&Chain> {
        self.chains.iter().find(|c| c.axis == axis && c.members.contains(&id))
    }

    /// Children placed by a fallback rather than by adjacency.
    pub fn fallbacks(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.placements
            .iter()
            .filter(|(_, p)| matches!(p, Placement::Literal | Placement::Radial))
            .map(|(&id, _)| id)
    }
}

/// Solve the render children of `container`. `layers` lists the children
/// that are out of flow, in stacking order.
pub fn solve_container(
    cache: &mut NodeCache,
    container: NodeId,
    layers: &[NodeId],
    settings: &Settings,
) -> Result<ContainerSolution> {
    let span = trace_span!("solve", container = %container);
    let _guard = span.enter();

    cache.node(container)?;
    let frame = Frame::capture(cache, container, layers);
    for member in &frame.members {
        cache[member.id].constraint.clear();
    }

    let mut solution = ContainerSolution {
        container,
        placements: IndexMap::new(),
        chains: Vec::new(),
        wrap_tightly: false,
    };

    // Centered on both axes: pin all four sides with an even bias.
    let mut resolved: IndexMap<NodeId, [Candidate; 2]> = IndexMap::new();
    for member in &frame.members {
        let horizontal = axis_bias(&member.rect, &frame.parent, Axis::Horizontal);
        let vertical = axis_bias(&member.rect, &frame.parent, Axis::Vertical);
        if is_centered(horizontal) && is_centered(vertical) {
            resolved.insert(
                member.id,
                [
                    Candidate::centered(AnchorTarget::Parent, Axis::Horizontal),
                    Candidate::centered(AnchorTarget::Parent, Axis::Vertical),
                ],
            );
            solution.placements.insert(member.id, Placement::Centered);
            solution.wrap_tightly = true;
        }
    }

    let options: IndexMap<NodeId, [Vec<Candidate>; 2]> = frame
        .members
        .iter()
        .filter(|m| !resolved.contains_key(&m.id))
        .map(|m| {
            let horizontal = candidates(&frame, m, Axis::Horizontal, settings);
            let vertical = candidates(&frame, m, Axis::Vertical, settings);
            (m.id, [horizontal, vertical])
        })
        .collect();
    close(&mut resolved, &options);

    for (&id, [horizontal, vertical]) in &resolved {
        let scratch = &mut cache[id].constraint;
        for anchor in horizontal.anchors.iter().chain(vertical.anchors.iter()) {
            scratch.set_anchor(*anchor);
        }
        scratch.horizontal_bias = horizontal.bias;
        scratch.vertical_bias = vertical.bias;
        scratch.set_anchored(Axis::Horizontal, true);
        scratch.set_anchored(Axis::Vertical, true);
        solution.placements.entry(id).or_insert(Placement::Adjacent);
    }

    for member in frame.flow() {
        if solution.placements.contains_key(&member.id) {
            continue;
        }
        warn!(node = %member.id, "no anchor closure, using literal parent offsets");
        literal(&mut cache[member.id].constraint, &frame, member);
        solution.placements.insert(member.id, Placement::Literal);
    }

    solution.chains = build_chains(cache, &frame, settings);
    for chain in &solution.chains {
        debug!(
            container = %container,
            axis = ?chain.axis,
            members = chain.members.len(),
            style = chain.distribution.style(),
            "chain"
        );
        for (index, &id) in chain.members.iter().enumerate() {
            apply_chain(&frame, chain, index, &mut cache[id].constraint, settings.weighted_layout);
        }
    }

    let circular = settings.constraint_layout && settings.supports(Feature::CircularPositioning);
    for &layer in layers {
        if solution.placements.contains_key(&layer) {
            continue;
        }
        let Some(member) = frame.member(layer) else {
            continue;
        };
        let nearest = if circular { nearest_anchored(&frame, &solution, member) } else { None };
        match nearest {
            Some(target) => {
                let scratch = &mut cache[layer].constraint;
                scratch.clear();
                scratch.circle = Some(Circle {
                    target: target.id,
                    radius: radius(target.rect.center(), member.rect.center()),
                    angle: angle(target.rect.center(), member.rect.center()),
                });
                scratch.set_anchored(Axis::Horizontal, true);
                scratch.set_anchored(Axis::Vertical, true);
                solution.placements.insert(layer, Placement::Radial);
            }
            None => {
                warn!(node = %layer, "floating layer, using literal parent offsets");
                literal(&mut cache[layer].constraint, &frame, member);
                solution.placements.insert(layer, Placement::Literal);
            }
        }
    }

    for member in &frame.members {
        let node = &mut cache[member.id];
        node.constraint.min_width = node.style.length("min-width").filter(|w| *w > 0.0);
        node.constraint.min_height = node.style.length("min-height").filter(|h| *h > 0.0);
    }

    // Keep placements in document order for stable reporting.
    let rank = |id: &NodeId| frame.members.iter().position(|m| m.id == *id).unwrap_or(usize::MAX);
    solution.placements.sort_by(|a, _, b, _| rank(a).cmp(&rank(b)));

    debug!(
        container = %container,
        children = frame.members.len(),
        chains = solution.chains.len(),
        fallbacks = solution.fallbacks().count(),
        wrap_tightly = solution.wrap_tightly,
        "solved free-form container"
    );
    Ok(solution)
}

/// Promote nodes whose chosen relation on both axes targets the parent or an
/// already promoted node, until a pass promotes nothing.
fn close(resolved: &mut IndexMap<NodeId, [Candidate; 2]>, options: &IndexMap<NodeId, [Vec<Candidate>; 2]>) {
    for _ in 0..MAX_CLOSURE_PASSES {
        let mut changed = false;
        for (&id, [horizontal, vertical]) in options {
            if resolved.contains_key(&id) {
                continue;
            }
            let pick = |list: &[Candidate]| {
                list.iter()
                    .find(|c| match c.target {
                        AnchorTarget::Parent => true,
                        AnchorTarget::Node(target) => resolved.contains_key(&target),
                    })
                    .cloned()
            };
            if let (Some(h), Some(v)) = (pick(horizontal.as_slice()), pick(vertical.as_slice())) {
                resolved.insert(id, [h, v]);
                changed = true;
            }
        }
        if !changed {
            return;
        }
    }
    warn!(passes = MAX_CLOSURE_PASSES, "anchor closure hit its pass limit");
}

/// Flex containers chain their flow children along the main axis in source
/// order; other containers chain mutual neighbors on both axes.
fn build_chains(cache: &NodeCache, frame: &Frame, settings: &Settings) -> Vec<Chain> {
    let style = &cache[frame.container].style;
    let even_request = matches!(style.get("justify-content"), Some("space-evenly") | Some("space-around"));

    if style.is_flex_container() {
        let flex = style.flex_axis();
        let axis = if flex.horizontal { Axis::Horizontal } else { Axis::Vertical };
        let mut members: Vec<NodeId> = frame.flow().map(|m| m.id).collect();
        if flex.reverse {
            members.reverse();
        }
        if members.len() < 2 {
            return Vec::new();
        }
        let elastic = members.iter().any(|&id| cache[id].style.is_elastic());
        let distribution = if elastic && settings.weighted_layout {
            Distribution::Weighted(
                members
                    .iter()
                    .map(|&id| cache[id].style.number("flex-grow").unwrap_or(0.0))
                    .collect(),
            )
        } else {
            distribute(frame, &members, axis, even_request, settings)
        };
        return vec![Chain { axis, members, distribution }];
    }

    [Axis::Horizontal, Axis::Vertical]
        .into_iter()
        .flat_map(move |axis| {
            detect_chains(frame, axis, settings).into_iter().map(move |members| {
                let distribution = distribute(frame, &members, axis, even_request, settings);
                Chain { axis, members, distribution }
            })
        })
        .collect()
}

fn nearest_anchored<'a>(frame: &'a Frame, solution: &ContainerSolution, member: &Member) -> Option<&'a Member> {
    let origin = member.rect.center();
    frame
        .members
        .iter()
        .filter(|m| m.id != member.id && solution.placements.contains_key(&m.id))
        .min_by(|a, b| {
            let da = a.rect.center().distance_squared(origin);
            let db = b.rect.center().distance_squared(origin);
            da.total_cmp(&db).then(a.id.cmp(&b.id))
        })
}

fn literal(scratch: &mut ConstraintScratch, frame: &Frame, member: &Member) {
    scratch.clear_axis(Axis::Horizontal);
    scratch.clear_axis(Axis::Vertical);
    let (left, _) = axis_gaps(&member.rect, &frame.parent, Axis::Horizontal);
    let (top, _) = axis_gaps(&member.rect, &frame.parent, Axis::Vertical);
    scratch.set_anchor(Anchor::to_parent(Edge::Left).with_margin(left));
    scratch.set_anchor(Anchor::to_parent(Edge::Top).with_margin(top));
    scratch.set_anchored(Axis::Horizontal, true);
    scratch.set_anchored(Axis::Vertical, true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_core::{BoxRect, ElementId, Node, NodeOrigin, StyleMap};

    const PARENT: NodeId = NodeId(0);

    fn parent(style: StyleMap, width: f64, height: f64) -> NodeCache {
        let mut cache = NodeCache::new();
        cache.allocate(|id| {
            Node::new(
                id,
                NodeOrigin::Element(ElementId(1)),
                "div",
                style,
                BoxRect::from_xywh(0.0, 0.0, width, height),
            )
        });
        cache
    }

    fn child(cache: &mut NodeCache, style: StyleMap, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        let element = cache.len() as u64 + 1;
        let id = cache.allocate(|id| {
            Node::new(id, NodeOrigin::Element(ElementId(element)), "div", style, BoxRect::from_xywh(x, y, w, h))
        });
        cache[id].document_index = id.index();
        cache.set_render_parent(id, PARENT);
        id
    }

    fn block(cache: &mut NodeCache, x: f64, y: f64, w: f64, h: f64) -> NodeId {
        child(cache, StyleMap::default(), x, y, w, h)
    }

    #[test]
    fn test_centering_shortcut() {
        let mut cache = parent(StyleMap::default(), 200.0, 100.0);
        let id = block(&mut cache, 50.0, 25.0, 100.0, 50.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        assert!(solution.wrap_tightly);
        assert_eq!(solution.placement(id), Some(Placement::Centered));
        let scratch = &cache[id].constraint;
        assert_eq!(scratch.anchors.len(), 4);
        assert!(scratch.anchors.iter().all(|a| a.target == AnchorTarget::Parent));
        assert_eq!(scratch.horizontal_bias, Some(0.5));
        assert_eq!(scratch.vertical_bias, Some(0.5));
        assert!(scratch.is_anchored(Axis::Horizontal) && scratch.is_anchored(Axis::Vertical));
    }

    #[test]
    fn test_touching_row_spreads_inside() {
        let mut cache = parent(StyleMap::default(), 300.0, 100.0);
        let a = block(&mut cache, 0.0, 0.0, 100.0, 20.0);
        let b = block(&mut cache, 100.0, 0.0, 100.0, 20.0);
        let c = block(&mut cache, 200.0, 0.0, 100.0, 20.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        let chain = solution.chain_of(b, Axis::Horizontal).unwrap();
        assert_eq!(chain.members, vec![a, b, c]);
        assert_eq!(chain.distribution, Distribution::SpreadInside);
        assert_eq!(chain.distribution.style(), "spread_inside");

        assert_eq!(cache[a].constraint.anchor(Edge::Left), Some(&Anchor::to_parent(Edge::Left)));
        assert_eq!(cache[c].constraint.anchor(Edge::Right), Some(&Anchor::to_parent(Edge::Right)));
        let middle = &cache[b].constraint;
        assert_eq!(middle.anchor(Edge::Left).map(|x| x.target), Some(AnchorTarget::Node(a)));
        assert_eq!(middle.anchor(Edge::Right).map(|x| x.target), Some(AnchorTarget::Node(c)));
        assert_eq!(middle.chain(Axis::Horizontal), &[a, b, c]);
        assert!(solution.fallbacks().next().is_none());
    }

    #[test]
    fn test_floating_layer_keeps_literal_offsets() {
        let style: StyleMap = [("position", "absolute")].into_iter().collect();
        let mut cache = parent(StyleMap::default(), 300.0, 200.0);
        let layer = child(&mut cache, style, 40.0, 30.0, 20.0, 20.0);
        let solution = solve_container(&mut cache, PARENT, &[layer], &Settings::default()).unwrap();

        assert_eq!(solution.placement(layer), Some(Placement::Literal));
        let scratch = &cache[layer].constraint;
        assert_eq!(scratch.anchor(Edge::Left), Some(&Anchor::to_parent(Edge::Left).with_margin(40.0)));
        assert_eq!(scratch.anchor(Edge::Top), Some(&Anchor::to_parent(Edge::Top).with_margin(30.0)));
        assert_eq!(scratch.anchors.len(), 2);
        assert!(scratch.circle.is_none());
    }

    #[test]
    fn test_two_blocks_fill_parent() {
        let mut cache = parent(StyleMap::default(), 250.0, 50.0);
        let first = block(&mut cache, 0.0, 0.0, 100.0, 50.0);
        let second = block(&mut cache, 100.0, 0.0, 150.0, 50.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        let head = &cache[first].constraint;
        assert_eq!(head.anchor(Edge::Left), Some(&Anchor::to_parent(Edge::Left)));
        assert_eq!(head.anchor(Edge::Top).map(|a| a.target), Some(AnchorTarget::Parent));
        let tail = &cache[second].constraint;
        assert_eq!(
            tail.anchor(Edge::Left),
            Some(&Anchor::new(Edge::Left, AnchorTarget::Node(first), Edge::Right))
        );
        assert_eq!(tail.anchor(Edge::Right), Some(&Anchor::to_parent(Edge::Right)));
        assert_eq!(tail.anchor(Edge::Top).map(|a| a.target), Some(AnchorTarget::Parent));

        let chain = solution.chain_of(first, Axis::Horizontal).unwrap();
        assert_eq!(chain.distribution.style(), "spread_inside");
    }

    #[test]
    fn test_transitive_promotion() {
        let mut cache = parent(StyleMap::default(), 300.0, 300.0);
        let top = block(&mut cache, 0.0, 0.0, 80.0, 40.0);
        let below = block(&mut cache, 0.0, 50.0, 60.0, 30.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        assert_eq!(solution.placement(top), Some(Placement::Adjacent));
        assert_eq!(solution.placement(below), Some(Placement::Adjacent));
        let scratch = &cache[below].constraint;
        assert_eq!(scratch.anchor(Edge::Left).map(|a| a.target), Some(AnchorTarget::Parent));
        let vertical = scratch.anchor(Edge::Top).copied().unwrap();
        assert_eq!(vertical.target, AnchorTarget::Node(top));
        assert_eq!(vertical.target_edge, Edge::Bottom);
        assert_eq!(vertical.margin, 10.0);
    }

    #[test]
    fn test_mutual_references_fall_back() {
        let mut cache = parent(StyleMap::default(), 300.0, 200.0);
        let a = block(&mut cache, 50.0, 50.0, 50.0, 50.0);
        let b = block(&mut cache, 100.0, 50.0, 50.0, 50.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        assert_eq!(solution.placement(a), Some(Placement::Literal));
        assert_eq!(solution.placement(b), Some(Placement::Literal));
        assert_eq!(
            cache[b].constraint.anchor(Edge::Top),
            Some(&Anchor::to_parent(Edge::Top).with_margin(50.0))
        );
    }

    #[test]
    fn test_radial_layer() {
        let layer_style: StyleMap = [("position", "absolute")].into_iter().collect();
        let mut cache = parent(StyleMap::default(), 200.0, 200.0);
        let anchor = block(&mut cache, 0.0, 0.0, 50.0, 50.0);
        let layer = child(&mut cache, layer_style, 120.0, 90.0, 20.0, 20.0);
        let solution = solve_container(&mut cache, PARENT, &[layer], &Settings::default()).unwrap();

        assert_eq!(solution.placement(layer), Some(Placement::Radial));
        let circle = cache[layer].constraint.circle.unwrap();
        assert_eq!(circle.target, anchor);
        assert_eq!(circle.angle, 125.54);
        assert_eq!(circle.radius, 129.03);
    }

    #[test]
    fn test_radial_needs_capability() {
        let layer_style: StyleMap = [("position", "absolute")].into_iter().collect();
        let mut cache = parent(StyleMap::default(), 200.0, 200.0);
        block(&mut cache, 0.0, 0.0, 50.0, 50.0);
        let layer = child(&mut cache, layer_style, 120.0, 90.0, 20.0, 20.0);
        let settings = Settings { target_api: trellis_core::TargetApi::KitKat, ..Settings::default() };
        let solution = solve_container(&mut cache, PARENT, &[layer], &settings).unwrap();

        assert_eq!(solution.placement(layer), Some(Placement::Literal));
        assert!(cache[layer].constraint.circle.is_none());
    }

    #[test]
    fn test_flex_chain_follows_source_order() {
        let flex: StyleMap = [("display", "flex"), ("flex-direction", "row-reverse")].into_iter().collect();
        let mut cache = parent(flex, 400.0, 40.0);
        let first = block(&mut cache, 200.0, 0.0, 100.0, 40.0);
        let second = block(&mut cache, 0.0, 0.0, 100.0, 40.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        assert_eq!(solution.chains.len(), 1);
        assert_eq!(solution.chains[0].members, vec![second, first]);
        assert_eq!(solution.chains[0].distribution, Distribution::Percent(vec![0.25, 0.25]));
    }

    #[test]
    fn test_elastic_members_take_weights() {
        let flex: StyleMap = [("display", "flex")].into_iter().collect();
        let grow: StyleMap = [("flex-grow", "2")].into_iter().collect();
        let mut cache = parent(flex, 300.0, 40.0);
        let fixed = block(&mut cache, 0.0, 0.0, 100.0, 40.0);
        let elastic = child(&mut cache, grow, 100.0, 0.0, 150.0, 40.0);
        let solution = solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();

        assert_eq!(solution.chains[0].distribution, Distribution::Weighted(vec![0.0, 2.0]));
        assert_eq!(cache[elastic].constraint.horizontal_weight, Some(2.0));
        assert_eq!(cache[fixed].constraint.horizontal_weight, None);
    }

    #[test]
    fn test_min_size_overrides() {
        let style: StyleMap = [("min-width", "120px")].into_iter().collect();
        let mut cache = parent(StyleMap::default(), 300.0, 100.0);
        let id = child(&mut cache, style, 0.0, 0.0, 120.0, 30.0);
        solve_container(&mut cache, PARENT, &[], &Settings::default()).unwrap();
        assert_eq!(cache[id].constraint.min_width, Some(120.0));
        assert_eq!(cache[id].constraint.min_height, None);
    }
}
