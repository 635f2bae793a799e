//! Attribute emission.
//!
//! Translates the solved layout into the platform-neutral attribute model:
//! every rendered node gets an id, its sizes, its position inside its
//! parent's strategy, its box decoration and its content. Resources are
//! interned into the run's tables on the way.

mod common;
mod content;
mod flow;
mod free_form;

use indexmap::IndexMap;
use tracing::debug;
use trellis_constraint::ContainerSolution;
use trellis_core::{AttributeStore, Axis, Edge, Feature, Namespace, NodeCache, NodeId, Settings};
use trellis_layout::{LayoutPlan, Strategy};
use trellis_resources::ResourceTables;

/// Literal size keywords.
pub const MATCH_PARENT: &str = "match_parent";
pub const WRAP_CONTENT: &str = "wrap_content";
/// Size of a view stretched by weights, percents or constraints.
pub const MATCH_CONSTRAINT: &str = "0dp";

/// Emits attributes for one solved run.
pub struct Emitter<'a> {
    settings: &'a Settings,
    plan: &'a LayoutPlan,
    solutions: &'a IndexMap<NodeId, ContainerSolution>,
}

impl<'a> Emitter<'a> {
    pub fn new(
        settings: &'a Settings,
        plan: &'a LayoutPlan,
        solutions: &'a IndexMap<NodeId, ContainerSolution>,
    ) -> Self {
        Self { settings, plan, solutions }
    }

    /// Write attributes for every node of `order` into the cache.
    pub fn emit_all(&self, cache: &mut NodeCache, tables: &mut ResourceTables, order: &[NodeId]) {
        for &id in order {
            let attributes = self.emit_node(cache, tables, id);
            debug!(node = %id, widget = cache[id].widget.element_name(), attributes = attributes.len(), "emitted");
            cache[id].attributes = attributes;
        }
    }

    /// Attributes of one rendered node.
    pub fn emit_node(&self, cache: &NodeCache, tables: &mut ResourceTables, id: NodeId) -> AttributeStore {
        let node = &cache[id];
        let mut out = AttributeStore::new();
        out.set(Namespace::Android, "id", format!("@+id/{}", node.control_name()));
        out.set(Namespace::Android, "layout_width", common::size(self, cache, id, Axis::Horizontal));
        out.set(Namespace::Android, "layout_height", common::size(self, cache, id, Axis::Vertical));

        if let Some(parent) = node.render_parent {
            match self.plan.strategy(parent) {
                Some(Strategy::Stacked) => flow::stacked_child(self, cache, id, &mut out),
                Some(Strategy::Linear(orientation)) => flow::linear_child(self, cache, id, orientation, &mut out),
                Some(Strategy::Grid { .. }) => flow::grid_child(self, cache, id, &mut out),
                Some(Strategy::FreeForm) => {
                    if let Some(solution) = self.solutions.get(&parent) {
                        free_form::child(self, cache, id, solution, &mut out);
                    }
                }
                None => {}
            }
            let layered = self.plan.get(parent).is_some_and(|layout| layout.layers.contains(&id));
            let z = node.style.z_index();
            if layered && z > 0 && self.settings.supports(Feature::Elevation) {
                out.set(Namespace::Android, "elevation", self.settings.format_dp(f64::from(z)));
            }
        }

        match self.plan.strategy(id) {
            Some(Strategy::Linear(orientation)) => {
                out.set(Namespace::Android, "orientation", orientation.as_str());
            }
            Some(Strategy::Grid { columns, rows, .. }) => {
                out.set(Namespace::Android, "columnCount", columns.to_string());
                out.set(Namespace::Android, "rowCount", rows.to_string());
            }
            Some(Strategy::FreeForm) if node.render_parent.is_some() => {
                if self.solutions.get(&id).is_some_and(|s| s.wrap_tightly) {
                    wrap_tightly(&mut out);
                }
            }
            _ => {}
        }

        common::padding(self, node, &mut out);
        common::background(self, node, tables, &mut out);
        content::content(self, node, tables, &mut out);
        out
    }

    /// Start/end names replace left/right.
    fn rtl_primary(&self) -> bool {
        self.settings.locale_direction_rtl && self.settings.supports(Feature::RtlAttributes)
    }

    /// Edge name used in constraint and relative attribute names.
    fn edge_name(&self, edge: Edge) -> &'static str {
        match (edge, self.rtl_primary()) {
            (Edge::Left, true) => "Start",
            (Edge::Right, true) => "End",
            (Edge::Left, false) => "Left",
            (Edge::Right, false) => "Right",
            (Edge::Top, _) => "Top",
            (Edge::Bottom, _) => "Bottom",
            (Edge::Baseline, _) => "Baseline",
        }
    }

    /// Write `<prefix><Edge>` for a margin or padding side. Horizontal sides
    /// also get their start/end twin on targets that know it.
    fn set_side(&self, out: &mut AttributeStore, prefix: &str, edge: Edge, px: f64) {
        let value = self.settings.format_dp(px);
        let twin = match edge {
            Edge::Left => Some("Start"),
            Edge::Right => Some("End"),
            _ => None,
        };
        if self.rtl_primary() {
            out.set(Namespace::Android, format!("{prefix}{}", self.edge_name(edge)), value);
            return;
        }
        out.set(Namespace::Android, format!("{prefix}{}", self.edge_name(edge)), value.clone());
        if let (Some(twin), true) = (twin, self.settings.supports(Feature::RtlAttributes)) {
            out.set(Namespace::Android, format!("{prefix}{twin}"), value);
        }
    }

    /// Margin on `edge` unless it is negligible.
    fn set_margin(&self, out: &mut AttributeStore, edge: Edge, px: f64) {
        if edge != Edge::Baseline && px.abs() > self.settings.edge_tolerance {
            self.set_side(out, "layout_margin", edge, px);
        }
    }
}

/// A container centering its content hugs it instead of stretching.
fn wrap_tightly(out: &mut AttributeStore) {
    for key in ["layout_width", "layout_height"] {
        if out.get(Namespace::Android, key) != Some(MATCH_PARENT) {
            out.set(Namespace::Android, key, WRAP_CONTENT);
        }
    }
}

/// Attribute name of a size along `axis`.
fn size_key(axis: Axis) -> &'static str {
    match axis {
        Axis::Horizontal => "layout_width",
        Axis::Vertical => "layout_height",
    }
}

/// `Horizontal` / `Vertical` as used in constraint attribute names.
fn axis_name(axis: Axis) -> &'static str {
    match axis {
        Axis::Horizontal => "Horizontal",
        Axis::Vertical => "Vertical",
    }
}
