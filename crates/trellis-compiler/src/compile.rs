//! The `compile` entry point.

use indexmap::IndexMap;
use tracing::{debug, debug_span};
use trellis_constraint::bias::lead;
use trellis_constraint::solve_container;
use trellis_core::{Axis, CompileError, NodeCache, Orientation, Result, Settings};
use trellis_layout::{build_containment, build_render_tree, emission_order, flag_overflow, select_layouts, LayoutPlan, Strategy};
use trellis_resources::consolidate;

use crate::context::CompilationContext;
use crate::document::LayoutDocument;
use crate::emit::Emitter;
use crate::ingest::ingest;
use crate::snapshot::Snapshot;

/// Compile a page snapshot into a layout document.
///
/// Stages run in a fixed order: ingestion, containment, render tree,
/// strategy selection, free-form solving, overflow flagging, attribute
/// emission and style consolidation. Only broken input fails the run.
pub fn compile(snapshot: &Snapshot, settings: &Settings) -> Result<LayoutDocument> {
    let span = debug_span!("compile", nodes = snapshot.len());
    let _guard = span.enter();

    let mut context = CompilationContext::new(settings.clone(), ingest(snapshot)?);
    let CompilationContext { settings, cache, tables } = &mut context;

    build_containment(cache, settings)?;
    build_render_tree(cache);
    let plan = select_layouts(cache, settings);
    order_linear_children(cache, &plan);

    let mut solutions = IndexMap::new();
    for (id, layout) in plan.iter() {
        if layout.strategy == Strategy::FreeForm {
            solutions.insert(id, solve_container(cache, id, &layout.layers, settings)?);
        }
    }

    let overflowing = flag_overflow(cache, settings);
    if overflowing > 0 {
        debug!(overflowing, "nodes extend past their parents");
    }

    let order = emission_order(cache);
    Emitter::new(settings, &plan, &solutions).emit_all(cache, tables, &order);
    let report = consolidate(cache, tables);

    let root = cache
        .ids()
        .find(|&id| cache[id].is_rendered() && cache[id].render_parent.is_none())
        .ok_or(CompileError::NoRoot)?;
    debug!(
        rendered = order.len(),
        containers = plan.len(),
        resources = tables.len(),
        styles = report.styles.len(),
        "compiled"
    );
    Ok(LayoutDocument::new(context, plan, root, report))
}

/// Compile from JSON documents: a snapshot and a possibly partial settings
/// record.
pub fn compile_json(snapshot: &str, settings: &str) -> Result<LayoutDocument> {
    compile(&Snapshot::from_json(snapshot)?, &Settings::from_json(settings)?)
}

/// Linear containers lay their children out in list order, so that order
/// must follow position along the axis.
fn order_linear_children(cache: &mut NodeCache, plan: &LayoutPlan) {
    for (id, layout) in plan.iter() {
        let Strategy::Linear(orientation) = layout.strategy else {
            continue;
        };
        let axis = match orientation {
            Orientation::Horizontal => Axis::Horizontal,
            Orientation::Vertical => Axis::Vertical,
        };
        let mut children = std::mem::take(&mut cache[id].render_children);
        children.sort_by(|&a, &b| {
            lead(cache[a].bounds(), axis)
                .total_cmp(&lead(cache[b].bounds(), axis))
                .then(cache[a].document_index.cmp(&cache[b].document_index))
        });
        cache[id].render_children = children;
    }
}
