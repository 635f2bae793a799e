//! Positions inside stacked, linear and grid containers.

use trellis_constraint::bias::{cross, edges, lead, trail};
use trellis_core::{AttributeStore, Axis, Edge, Feature, Namespace, NodeCache, NodeId, Orientation, Widget};

use super::{size_key, Emitter, MATCH_CONSTRAINT};

/// Offsets from the parent's content box.
pub(super) fn stacked_child(emitter: &Emitter<'_>, cache: &NodeCache, id: NodeId, out: &mut AttributeStore) {
    let Some(parent) = cache[id].render_parent else {
        return;
    };
    let own = cache[id].bounds();
    let content = cache[parent].box_rect();
    emitter.set_margin(out, Edge::Left, own.left - content.left);
    emitter.set_margin(out, Edge::Top, own.top - content.top);
}

/// Gap to the previous child along the axis, offset on the cross axis and
/// layout weight for percentage sizes.
pub(super) fn linear_child(
    emitter: &Emitter<'_>,
    cache: &NodeCache,
    id: NodeId,
    orientation: Orientation,
    out: &mut AttributeStore,
) {
    let Some(parent) = cache[id].render_parent else {
        return;
    };
    let axis = match orientation {
        Orientation::Horizontal => Axis::Horizontal,
        Orientation::Vertical => Axis::Vertical,
    };
    let content = cache[parent].box_rect();
    let own = cache[id].bounds();
    let siblings = cache.render_children(parent);
    let previous = siblings
        .iter()
        .position(|&c| c == id)
        .and_then(|index| index.checked_sub(1))
        .map(|index| siblings[index]);
    let start = match previous {
        Some(previous) => trail(cache[previous].bounds(), axis),
        None => lead(content, axis),
    };

    let (leading, _) = edges(axis);
    let (cross_leading, _) = edges(cross(axis));
    emitter.set_margin(out, leading, lead(own, axis) - start);
    emitter.set_margin(out, cross_leading, lead(own, cross(axis)) - lead(content, cross(axis)));

    if emitter.settings.weighted_layout {
        let share = match axis {
            Axis::Horizontal => cache[id].style.percent("width"),
            Axis::Vertical => cache[id].style.percent("height"),
        };
        if let Some(share) = share.filter(|s| *s > 0.0) {
            out.set(Namespace::Android, size_key(axis), MATCH_CONSTRAINT);
            out.set(Namespace::Android, "layout_weight", trellis_core::settings::format_number(share));
        }
    }
}

/// Cell coordinates, spans, gaps to the neighbouring cells and column
/// weights.
pub(super) fn grid_child(emitter: &Emitter<'_>, cache: &NodeCache, id: NodeId, out: &mut AttributeStore) {
    let node = &cache[id];
    let (Some(parent), Some(cell)) = (node.render_parent, node.grid.as_ref()) else {
        return;
    };
    out.set(Namespace::Android, "layout_row", cell.row.to_string());
    out.set(Namespace::Android, "layout_column", cell.index.to_string());
    if cell.column_span > 1 {
        out.set(Namespace::Android, "layout_columnSpan", cell.column_span.to_string());
    }
    if cell.row_span > 1 {
        out.set(Namespace::Android, "layout_rowSpan", cell.row_span.to_string());
    }
    if node.widget == Widget::Space {
        return;
    }

    let content = cache[parent].box_rect();
    let own = node.bounds();
    let cells = cache.render_children(parent);
    let left = if cell.row_start {
        content.left
    } else {
        cells
            .iter()
            .position(|&c| c == id)
            .and_then(|index| index.checked_sub(1))
            .map_or(content.left, |index| cache[cells[index]].bounds().right)
    };
    let top = cells
        .iter()
        .filter_map(|&c| cache[c].grid.as_ref().map(|g| (c, g)))
        .filter(|(_, g)| g.row + g.row_span <= cell.row)
        .map(|(c, _)| cache[c].bounds().bottom)
        .fold(content.top, f64::max);
    emitter.set_margin(out, Edge::Left, own.left - left);
    emitter.set_margin(out, Edge::Top, own.top - top);

    let settings = emitter.settings;
    if settings.weighted_layout && settings.supports(Feature::GridWeights) {
        out.set(Namespace::Android, "layout_width", MATCH_CONSTRAINT);
        out.set(
            Namespace::Android,
            "layout_columnWeight",
            trellis_core::settings::format_number(cell.column_span as f64),
        );
    } else {
        out.set(Namespace::Android, "layout_width", settings.format_dp(own.width()));
    }
}
