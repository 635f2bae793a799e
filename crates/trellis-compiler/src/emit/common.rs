//! Attributes every rendered node carries: sizes, padding and background.

use trellis_constraint::bias::{extent, lead, trail};
use trellis_core::{AttributeStore, Axis, Edge, Namespace, Node, NodeCache, NodeId};
use trellis_layout::Strategy;
use trellis_resources::{Color, ResourceTables, ShapeDrawable, Stroke};

use super::{Emitter, MATCH_PARENT, WRAP_CONTENT};

/// `layout_width` / `layout_height` before strategy overrides.
pub(super) fn size(emitter: &Emitter<'_>, cache: &NodeCache, id: NodeId, axis: Axis) -> String {
    let node = &cache[id];
    let Some(parent) = node.render_parent else {
        return MATCH_PARENT.to_string();
    };
    let settings = emitter.settings;
    let own = node.bounds();
    let content = cache[parent].box_rect();
    let anchored = emitter.plan.strategy(parent) == Some(Strategy::FreeForm);
    if !anchored
        && settings.same_edge(lead(own, axis), lead(content, axis))
        && settings.same_edge(trail(own, axis), trail(content, axis))
    {
        return MATCH_PARENT.to_string();
    }

    let declared = match axis {
        Axis::Horizontal => node.style.length("width"),
        Axis::Vertical => node.style.length("height"),
    };
    let text_leaf = node.widget.is_text() && node.render_children.is_empty();
    if text_leaf && declared.is_none() {
        return WRAP_CONTENT.to_string();
    }
    settings.format_dp(extent(own, axis))
}

/// Padding plus border width, collapsed to `padding` when uniform.
pub(super) fn padding(emitter: &Emitter<'_>, node: &Node, out: &mut AttributeStore) {
    let inset = node.geometry.padding.add(&node.geometry.border);
    if inset.is_zero() {
        return;
    }
    let uniform = [inset.right, inset.bottom, inset.left]
        .iter()
        .all(|side| emitter.settings.same_edge(*side, inset.top));
    if uniform {
        out.set(Namespace::Android, "padding", emitter.settings.format_dp(inset.top));
        return;
    }
    for (edge, px) in [
        (Edge::Left, inset.left),
        (Edge::Top, inset.top),
        (Edge::Right, inset.right),
        (Edge::Bottom, inset.bottom),
    ] {
        if px > 0.0 {
            emitter.set_side(out, "padding", edge, px);
        }
    }
}

/// Background color, bordered or rounded shape, or background image.
pub(super) fn background(emitter: &Emitter<'_>, node: &Node, tables: &mut ResourceTables, out: &mut AttributeStore) {
    let settings = emitter.settings;
    let style = &node.style;
    let fill = style
        .get("background-color")
        .filter(|css| Color::parse(css).is_some_and(|c| c.a > 0));

    let border = node.geometry.border;
    let stroke_width = border.top.max(border.right).max(border.bottom).max(border.left);
    let stroke_color = style
        .get("border-top-color")
        .or_else(|| style.get("border-color"))
        .filter(|_| stroke_width > 0.0)
        .and_then(|css| tables.add_color(css));
    let radius = style
        .length("border-radius")
        .or_else(|| style.length("border-top-left-radius"))
        .filter(|r| *r > 0.0);

    if stroke_color.is_some() || radius.is_some() {
        let shape = ShapeDrawable {
            solid: fill.and_then(|css| tables.add_color(css)),
            stroke: stroke_color.map(|color| Stroke { width: settings.to_dp(stroke_width), color }),
            corner_radius: radius.map(|r| settings.to_dp(r)),
        };
        let name = tables.add_shape(shape);
        out.set(Namespace::Android, "background", format!("@drawable/{name}"));
        return;
    }
    if let Some(name) = fill.and_then(|css| tables.add_color(css)) {
        out.set(Namespace::Android, "background", format!("@color/{name}"));
        return;
    }
    if let Some(source) = style.get("background-image").and_then(css_url) {
        let name = tables.add_image(source);
        out.set(Namespace::Android, "background", format!("@drawable/{name}"));
    }
}

/// Path inside `url(...)`, without quotes.
fn css_url(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    let path = inner.trim().trim_matches(|c| c == '"' || c == '\'');
    (!path.is_empty()).then_some(path)
}
