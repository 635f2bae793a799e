//! Layout strategy selection.
//!
//! Every rendered container is classified as stacked, linear, grid or
//! free-form from two adjacency predicates over its flow children:
//!
//! | `linear_x` | `linear_y` | Strategy |
//! |---|---|---|
//! | true | true | Stacked |
//! | true | false | Linear, horizontal |
//! | false | true | Linear, vertical |
//! | false | false | Grid when a tabular shape is found, else free-form |
//!
//! Explicit tables go straight to positional grid inference. Flex
//! containers, elastic children and out-of-flow layers force free-form.

use indexmap::IndexMap;
use std::collections::VecDeque;
use tracing::{debug, warn};
use trellis_core::{
    NodeCache, NodeId, NodeOrigin, Orientation, Settings, Widget, WrapperKind,
};

use crate::grid::{commit_grid, infer_balanced, infer_positional, partition_rows, table_rows, GridMode};
use crate::wrappers::{wrap_radio_groups, wrap_scroll};

/// How a container arranges its flow children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Children are mutually disjoint; placed by offsets in a frame.
    Stacked,
    /// A single row or column.
    Linear(Orientation),
    /// Inferred tabular structure.
    Grid { columns: usize, rows: usize, mode: GridMode },
    /// Anchored by the constraint solver.
    FreeForm,
}

/// Decision for one container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerLayout {
    pub strategy: Strategy,
    /// Out-of-flow children, by stacking order then document order.
    pub layers: Vec<NodeId>,
}

/// Strategy decisions for every rendered container, in visit order.
#[derive(Debug, Clone, Default)]
pub struct LayoutPlan {
    containers: IndexMap<NodeId, ContainerLayout>,
}

impl LayoutPlan {
    pub fn get(&self, id: NodeId) -> Option<&ContainerLayout> {
        self.containers.get(&id)
    }

    pub fn strategy(&self, id: NodeId) -> Option<Strategy> {
        self.containers.get(&id).map(|c| c.strategy)
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &ContainerLayout)> {
        self.containers.iter().map(|(&id, layout)| (id, layout))
    }

    pub fn len(&self) -> usize {
        self.containers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.containers.is_empty()
    }

    /// Free-form containers in visit order.
    pub fn free_form(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.containers
            .iter()
            .filter(|(_, layout)| layout.strategy == Strategy::FreeForm)
            .map(|(&id, _)| id)
    }
}

/// True when no two nodes share horizontal extent, so they fit one row.
pub fn linear_x(cache: &NodeCache, ids: &[NodeId], settings: &Settings) -> bool {
    pairwise_disjoint(ids, |a, b| {
        !cache[a].linear().overlaps_horizontally(cache[b].linear(), settings.edge_tolerance)
    })
}

/// True when no two nodes share vertical extent, so they fit one column.
pub fn linear_y(cache: &NodeCache, ids: &[NodeId], settings: &Settings) -> bool {
    pairwise_disjoint(ids, |a, b| {
        !cache[a].linear().overlaps_vertically(cache[b].linear(), settings.edge_tolerance)
    })
}

fn pairwise_disjoint(ids: &[NodeId], disjoint: impl Fn(NodeId, NodeId) -> bool) -> bool {
    ids.iter()
        .enumerate()
        .all(|(i, &a)| ids[i + 1..].iter().all(|&b| disjoint(a, b)))
}

/// Insert scroll and radio-group wrappers, then classify every rendered
/// container top-down and assign widgets.
pub fn select_layouts(cache: &mut NodeCache, settings: &Settings) -> LayoutPlan {
    let elements: Vec<NodeId> = cache
        .ids()
        .filter(|&id| cache[id].is_rendered() && !cache[id].is_synthetic())
        .collect();
    for id in elements {
        wrap_scroll(cache, id);
    }

    let mut plan = LayoutPlan::default();
    let mut queue: VecDeque<NodeId> = cache
        .ids()
        .filter(|&id| cache[id].is_rendered() && cache[id].render_parent.is_none())
        .collect();

    while let Some(id) = queue.pop_front() {
        if !cache[id].is_synthetic() {
            wrap_radio_groups(cache, id);
        }
        if cache.render_children(id).is_empty() {
            if !cache[id].is_synthetic() {
                let node = &cache[id];
                let widget = Widget::classify(&node.tag, node.property("type"), node.has_text());
                cache[id].widget = widget;
            }
            continue;
        }

        let layout = classify_container(cache, id, settings);
        if !cache[id].is_synthetic() {
            cache[id].widget = match layout.strategy {
                Strategy::Stacked => Widget::Frame,
                Strategy::Linear(orientation) => Widget::Linear(orientation),
                Strategy::Grid { .. } => Widget::Grid,
                Strategy::FreeForm if settings.constraint_layout => Widget::Constraint,
                Strategy::FreeForm => Widget::Relative,
            };
        }
        debug!(
            container = %id,
            strategy = ?layout.strategy,
            children = cache.render_children(id).len(),
            layers = layout.layers.len(),
            "selected layout strategy"
        );
        plan.containers.insert(id, layout);
        queue.extend(cache.render_children(id).iter().copied());
    }
    plan
}

fn classify_container(cache: &mut NodeCache, id: NodeId, settings: &Settings) -> ContainerLayout {
    let children = cache.render_children(id).to_vec();
    let (mut layers, flow): (Vec<NodeId>, Vec<NodeId>) =
        children.iter().copied().partition(|&c| cache[c].is_out_of_flow());
    layers.sort_by_key(|&c| (cache[c].style.z_index(), cache[c].document_index, c));

    let strategy = match cache[id].origin {
        NodeOrigin::Wrapper(WrapperKind::Scroll) => Some(Strategy::Stacked),
        NodeOrigin::Wrapper(WrapperKind::GridSpan) => Some(Strategy::Linear(Orientation::Horizontal)),
        NodeOrigin::Wrapper(WrapperKind::RadioGroup) => {
            let horizontal = linear_x(cache, &flow, settings) && !linear_y(cache, &flow, settings);
            Some(Strategy::Linear(if horizontal { Orientation::Horizontal } else { Orientation::Vertical }))
        }
        _ => None,
    };
    if let Some(strategy) = strategy {
        return ContainerLayout { strategy, layers };
    }

    let node = &cache[id];
    let is_table = node.tag == "table" || node.style.is_table();
    let is_flex = node.style.is_flex_container();
    let strategy = if flow.is_empty() {
        Strategy::FreeForm
    } else if is_table {
        table_strategy(cache, id, settings)
    } else if is_flex
        // Layers are anchored by the constraint solver, which only a
        // free-form parent can host. The flow siblings lose their linear
        // or grid shape and are anchored by adjacency instead.
        || !layers.is_empty()
        || flow.iter().any(|&c| cache[c].style.is_elastic())
    {
        Strategy::FreeForm
    } else if flow.len() == 1 {
        Strategy::Stacked
    } else {
        match (linear_x(cache, &flow, settings), linear_y(cache, &flow, settings)) {
            (true, true) => Strategy::Stacked,
            (true, false) => Strategy::Linear(Orientation::Horizontal),
            (false, true) => Strategy::Linear(Orientation::Vertical),
            (false, false) => balanced_strategy(cache, id, &flow, settings),
        }
    };

    if strategy == Strategy::FreeForm && cache.expand_to_fit(id) {
        debug!(container = %id, "expanded free-form container to fit its content");
    }
    ContainerLayout { strategy, layers }
}

fn table_strategy(cache: &mut NodeCache, id: NodeId, settings: &Settings) -> Strategy {
    if !settings.grid_inference {
        return Strategy::FreeForm;
    }
    let (rows, structural) = table_rows(cache, id);
    match infer_positional(cache, &rows, settings) {
        Ok(mut plan) => {
            plan.excluded = structural;
            commit_grid(cache, id, &plan);
            Strategy::Grid { columns: plan.columns, rows: plan.row_count(), mode: plan.mode }
        }
        Err(reason) => {
            warn!(container = %id, %reason, "table grid inference abandoned, using free-form");
            Strategy::FreeForm
        }
    }
}

/// Balanced inference applies to block-level children of one tag.
fn balanced_strategy(cache: &mut NodeCache, id: NodeId, flow: &[NodeId], settings: &Settings) -> Strategy {
    let first_tag = &cache[flow[0]].tag;
    let uniform = flow
        .iter()
        .all(|&c| &cache[c].tag == first_tag && !cache[c].style.is("display", "inline"));
    if !settings.grid_inference || !uniform {
        return Strategy::FreeForm;
    }

    let rows = partition_rows(cache, flow, settings);
    match infer_balanced(cache, &rows, settings) {
        Ok(plan) => {
            commit_grid(cache, id, &plan);
            Strategy::Grid { columns: plan.columns, rows: plan.row_count(), mode: plan.mode }
        }
        Err(reason) => {
            warn!(container = %id, %reason, "grid inference abandoned, using free-form");
            Strategy::FreeForm
        }
    }
}
