//! Anchored children of free-form containers.
//!
//! The solver's anchors are written either as constraint attributes or,
//! when constraint anchoring is off, as relative-layout rules. Relative
//! rules cannot express chains, biases or circles: each axis keeps a single
//! rule, preferably on its leading edge, with the margin measured from the
//! rectangles.

use trellis_constraint::bias::{edges, lead, trail};
use trellis_constraint::{is_centered, ContainerSolution};
use trellis_core::settings::format_number;
use trellis_core::{Anchor, AnchorTarget, AttributeStore, Axis, BoxRect, Edge, Feature, Namespace, NodeCache, NodeId};

use super::{axis_name, size_key, Emitter, MATCH_CONSTRAINT};

pub(super) fn child(
    emitter: &Emitter<'_>,
    cache: &NodeCache,
    id: NodeId,
    solution: &ContainerSolution,
    out: &mut AttributeStore,
) {
    if emitter.settings.constraint_layout {
        constraint(emitter, cache, id, solution, out);
    } else {
        relative(emitter, cache, id, out);
    }
    let scratch = &cache[id].constraint;
    if let Some(width) = scratch.min_width {
        out.set(Namespace::Android, "minWidth", emitter.settings.format_dp(width));
    }
    if let Some(height) = scratch.min_height {
        out.set(Namespace::Android, "minHeight", emitter.settings.format_dp(height));
    }
}

fn reference(cache: &NodeCache, target: AnchorTarget) -> String {
    match target {
        AnchorTarget::Parent => "parent".to_string(),
        AnchorTarget::Node(node) => format!("@id/{}", cache[node].control_name()),
    }
}

fn constraint(
    emitter: &Emitter<'_>,
    cache: &NodeCache,
    id: NodeId,
    solution: &ContainerSolution,
    out: &mut AttributeStore,
) {
    let settings = emitter.settings;
    let scratch = &cache[id].constraint;

    for anchor in &scratch.anchors {
        let key = format!(
            "layout_constraint{}_to{}Of",
            emitter.edge_name(anchor.edge),
            emitter.edge_name(anchor.target_edge)
        );
        out.set(Namespace::App, key, reference(cache, anchor.target));
        emitter.set_margin(out, anchor.edge, anchor.margin);
    }

    for axis in [Axis::Horizontal, Axis::Vertical] {
        let name = axis_name(axis);
        let (bias, percent, weight, dimension) = match axis {
            Axis::Horizontal => (scratch.horizontal_bias, scratch.width_percent, scratch.horizontal_weight, "Width"),
            Axis::Vertical => (scratch.vertical_bias, scratch.height_percent, scratch.vertical_weight, "Height"),
        };
        if let Some(bias) = bias {
            out.set(Namespace::App, format!("layout_constraint{name}_bias"), format_number(bias));
        }
        if let Some(chain) = solution.chain_of(id, axis).filter(|c| c.head() == Some(id)) {
            out.set(Namespace::App, format!("layout_constraint{name}_chainStyle"), chain.distribution.style());
        }
        match (percent, weight) {
            (Some(percent), _) if settings.supports(Feature::PercentDimensions) => {
                out.set(Namespace::Android, size_key(axis), MATCH_CONSTRAINT);
                out.set(Namespace::App, format!("layout_constraint{dimension}_percent"), format_number(percent));
            }
            (Some(share), _) | (None, Some(share)) => {
                out.set(Namespace::Android, size_key(axis), MATCH_CONSTRAINT);
                out.set(Namespace::App, format!("layout_constraint{name}_weight"), format_number(share));
            }
            (None, None) => {}
        }
    }

    if let Some(circle) = scratch.circle {
        out.set(Namespace::App, "layout_constraintCircle", format!("@id/{}", cache[circle.target].control_name()));
        out.set(Namespace::App, "layout_constraintCircleRadius", settings.format_dp(circle.radius));
        out.set(Namespace::App, "layout_constraintCircleAngle", format_number(circle.angle));
    }
}

fn relative(emitter: &Emitter<'_>, cache: &NodeCache, id: NodeId, out: &mut AttributeStore) {
    let node = &cache[id];
    let Some(parent) = node.render_parent else {
        return;
    };
    let scratch = &node.constraint;
    let own = node.bounds();
    let content = cache[parent].box_rect();

    if scratch.circle.is_some() {
        for edge in [Edge::Left, Edge::Top] {
            set_rule(emitter, out, edge, AnchorTarget::Parent, edge, cache);
        }
        emitter.set_margin(out, Edge::Left, own.left - content.left);
        emitter.set_margin(out, Edge::Top, own.top - content.top);
        return;
    }

    let mut centered = [false; 2];
    for (slot, axis) in [Axis::Horizontal, Axis::Vertical].into_iter().enumerate() {
        let anchors: Vec<&Anchor> = scratch.axis_anchors(axis).collect();
        let bias = match axis {
            Axis::Horizontal => scratch.horizontal_bias,
            Axis::Vertical => scratch.vertical_bias,
        };
        let on_parent = anchors.len() == 2 && anchors.iter().all(|a| a.target == AnchorTarget::Parent);
        if on_parent && bias.is_some_and(is_centered) {
            centered[slot] = true;
            continue;
        }
        let Some(anchor) = anchors.iter().find(|a| a.edge.is_leading()).or_else(|| anchors.first()) else {
            continue;
        };
        set_rule(emitter, out, anchor.edge, anchor.target, anchor.target_edge, cache);
        let target = match anchor.target {
            AnchorTarget::Parent => *content,
            AnchorTarget::Node(other) => *cache[other].bounds(),
        };
        let margin = measured_margin(own, &target, anchor, axis);
        emitter.set_margin(out, anchor.edge, margin);
    }

    match centered {
        [true, true] => out.set(Namespace::Android, "layout_centerInParent", "true"),
        [true, false] => out.set(Namespace::Android, "layout_centerHorizontal", "true"),
        [false, true] => out.set(Namespace::Android, "layout_centerVertical", "true"),
        [false, false] => {}
    }
}

/// Gap between the anchored edge and the target edge, positive inward.
fn measured_margin(own: &BoxRect, target: &BoxRect, anchor: &Anchor, axis: Axis) -> f64 {
    let (leading, _) = edges(axis);
    let coordinate = |rect: &BoxRect, edge: Edge| {
        if edge == leading || edge == Edge::Baseline {
            lead(rect, axis)
        } else {
            trail(rect, axis)
        }
    };
    let own_edge = coordinate(own, anchor.edge);
    let target_edge = coordinate(target, anchor.target_edge);
    if anchor.edge.is_leading() {
        own_edge - target_edge
    } else {
        target_edge - own_edge
    }
}

fn set_rule(
    emitter: &Emitter<'_>,
    out: &mut AttributeStore,
    edge: Edge,
    target: AnchorTarget,
    target_edge: Edge,
    cache: &NodeCache,
) {
    let side = |e: Edge| emitter.edge_name(e);
    let key = match (target, edge, target_edge) {
        (AnchorTarget::Parent, Edge::Baseline, _) => "layout_alignParentTop".to_string(),
        (AnchorTarget::Parent, edge, _) => format!("layout_alignParent{}", side(edge)),
        (AnchorTarget::Node(_), Edge::Baseline, _) => "layout_alignBaseline".to_string(),
        (AnchorTarget::Node(_), Edge::Left, Edge::Right) => format!("layout_to{}Of", side(Edge::Right)),
        (AnchorTarget::Node(_), Edge::Right, Edge::Left) => format!("layout_to{}Of", side(Edge::Left)),
        (AnchorTarget::Node(_), Edge::Top, Edge::Bottom) => "layout_below".to_string(),
        (AnchorTarget::Node(_), Edge::Bottom, Edge::Top) => "layout_above".to_string(),
        (AnchorTarget::Node(_), edge, _) => format!("layout_align{}", side(edge)),
    };
    let value = match target {
        AnchorTarget::Parent => "true".to_string(),
        AnchorTarget::Node(_) => reference(cache, target),
    };
    out.set(Namespace::Android, key, value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;
    use trellis_constraint::{solve_container, Chain, Distribution, Placement};
    use trellis_core::{Circle, ElementId, Node, NodeOrigin, Settings, StyleMap, TargetApi};
    use trellis_layout::LayoutPlan;

    const PARENT: NodeId = NodeId(0);

    fn cache_with(rects: &[BoxRect]) -> NodeCache {
        let mut cache = NodeCache::new();
        cache.allocate(|id| {
            Node::new(id, NodeOrigin::Element(ElementId(1)), "div", StyleMap::default(), BoxRect::from_xywh(0.0, 0.0, 250.0, 50.0))
        });
        for rect in rects {
            let id = cache.allocate(|id| {
                Node::new(id, NodeOrigin::Element(ElementId(id.0 as u64 + 1)), "div", StyleMap::default(), *rect)
            });
            cache[id].document_index = id.index();
            cache.set_render_parent(id, PARENT);
        }
        cache
    }

    fn emit(settings: &Settings, cache: &NodeCache, solution: &ContainerSolution, id: NodeId) -> AttributeStore {
        let plan = LayoutPlan::default();
        let solutions = IndexMap::new();
        let mut out = AttributeStore::new();
        child(&Emitter::new(settings, &plan, &solutions), cache, id, solution, &mut out);
        out
    }

    fn empty_solution() -> ContainerSolution {
        ContainerSolution {
            container: PARENT,
            placements: IndexMap::new(),
            chains: Vec::new(),
            wrap_tightly: false,
        }
    }

    #[test]
    fn test_two_blocks_chain_attributes() {
        let settings = Settings::default();
        let mut cache = cache_with(&[BoxRect::from_xywh(0.0, 0.0, 100.0, 50.0), BoxRect::from_xywh(100.0, 0.0, 150.0, 50.0)]);
        let solution = solve_container(&mut cache, PARENT, &[], &settings).unwrap();

        let first = emit(&settings, &cache, &solution, NodeId(1));
        assert_eq!(first.get(Namespace::App, "layout_constraintLeft_toLeftOf"), Some("parent"));
        assert_eq!(first.get(Namespace::App, "layout_constraintRight_toLeftOf"), Some("@id/div_2"));
        assert_eq!(first.get(Namespace::App, "layout_constraintTop_toTopOf"), Some("parent"));
        assert_eq!(first.get(Namespace::App, "layout_constraintHorizontal_chainStyle"), Some("spread_inside"));

        let second = emit(&settings, &cache, &solution, NodeId(2));
        assert_eq!(second.get(Namespace::App, "layout_constraintLeft_toRightOf"), Some("@id/div_1"));
        assert_eq!(second.get(Namespace::App, "layout_constraintRight_toRightOf"), Some("parent"));
        assert!(!second.contains(Namespace::App, "layout_constraintHorizontal_chainStyle"));
        assert!(!second.contains(Namespace::Android, "layout_marginLeft"));
    }

    #[test]
    fn test_percent_falls_back_to_weight() {
        let mut cache = cache_with(&[BoxRect::from_xywh(0.0, 0.0, 100.0, 50.0)]);
        cache[NodeId(1)].constraint.width_percent = Some(0.4);
        cache[NodeId(1)].constraint.horizontal_weight = Some(0.4);
        let solution = empty_solution();

        let modern = emit(&Settings::default(), &cache, &solution, NodeId(1));
        assert_eq!(modern.get(Namespace::App, "layout_constraintWidth_percent"), Some("0.4"));
        assert_eq!(modern.get(Namespace::Android, "layout_width"), Some("0dp"));

        let legacy = Settings { target_api: TargetApi::KitKat, ..Settings::default() };
        let old = emit(&legacy, &cache, &solution, NodeId(1));
        assert!(!old.contains(Namespace::App, "layout_constraintWidth_percent"));
        assert_eq!(old.get(Namespace::App, "layout_constraintHorizontal_weight"), Some("0.4"));
    }

    #[test]
    fn test_circle_and_min_size() {
        let mut cache = cache_with(&[BoxRect::from_xywh(0.0, 0.0, 40.0, 40.0), BoxRect::from_xywh(100.0, 0.0, 20.0, 20.0)]);
        let scratch = &mut cache[NodeId(2)].constraint;
        scratch.circle = Some(Circle { target: NodeId(1), radius: 92.2, angle: 77.47 });
        scratch.min_width = Some(24.0);
        let out = emit(&Settings::default(), &cache, &empty_solution(), NodeId(2));
        assert_eq!(out.get(Namespace::App, "layout_constraintCircle"), Some("@id/div_1"));
        assert_eq!(out.get(Namespace::App, "layout_constraintCircleRadius"), Some("92.2dp"));
        assert_eq!(out.get(Namespace::App, "layout_constraintCircleAngle"), Some("77.47"));
        assert_eq!(out.get(Namespace::Android, "minWidth"), Some("24dp"));
    }

    #[test]
    fn test_relative_rules() {
        let settings = Settings { constraint_layout: false, ..Settings::default() };
        let mut cache = cache_with(&[BoxRect::from_xywh(0.0, 0.0, 100.0, 50.0), BoxRect::from_xywh(100.0, 0.0, 150.0, 50.0)]);
        let solution = solve_container(&mut cache, PARENT, &[], &settings).unwrap();

        let first = emit(&settings, &cache, &solution, NodeId(1));
        assert_eq!(first.get(Namespace::Android, "layout_alignParentLeft"), Some("true"));
        assert_eq!(first.get(Namespace::Android, "layout_alignParentTop"), Some("true"));
        assert!(!first.contains(Namespace::Android, "layout_toLeftOf"));

        let second = emit(&settings, &cache, &solution, NodeId(2));
        assert_eq!(second.get(Namespace::Android, "layout_toRightOf"), Some("@id/div_1"));
        assert!(!second.contains(Namespace::Android, "layout_alignParentRight"));
        assert!(second.namespace(Namespace::App).next().is_none());
    }

    #[test]
    fn test_relative_centering_and_rtl_names() {
        let settings = Settings { constraint_layout: false, locale_direction_rtl: true, ..Settings::default() };
        let mut cache = cache_with(&[BoxRect::from_xywh(75.0, 5.0, 100.0, 40.0)]);
        let solution = solve_container(&mut cache, PARENT, &[], &settings).unwrap();
        assert_eq!(solution.placement(NodeId(1)), Some(Placement::Centered));
        let out = emit(&settings, &cache, &solution, NodeId(1));
        assert_eq!(out.get(Namespace::Android, "layout_centerInParent"), Some("true"));

        let mut out = AttributeStore::new();
        let plan = LayoutPlan::default();
        let solutions = IndexMap::new();
        let emitter = Emitter::new(&settings, &plan, &solutions);
        set_rule(&emitter, &mut out, Edge::Left, AnchorTarget::Node(NodeId(1)), Edge::Right, &cache);
        assert_eq!(out.get(Namespace::Android, "layout_toEndOf"), Some("@id/div_1"));
    }

    #[test]
    fn test_chain_head_only_style() {
        let cache = cache_with(&[BoxRect::from_xywh(0.0, 0.0, 100.0, 50.0), BoxRect::from_xywh(100.0, 0.0, 150.0, 50.0)]);
        let mut solution = empty_solution();
        solution.chains.push(Chain {
            axis: Axis::Horizontal,
            members: vec![NodeId(2), NodeId(1)],
            distribution: Distribution::Packed { bias: 0.0 },
        });
        let head = emit(&Settings::default(), &cache, &solution, NodeId(2));
        assert_eq!(head.get(Namespace::App, "layout_constraintHorizontal_chainStyle"), Some("packed"));
        let tail = emit(&Settings::default(), &cache, &solution, NodeId(1));
        assert!(!tail.contains(Namespace::App, "layout_constraintHorizontal_chainStyle"));
    }
}
