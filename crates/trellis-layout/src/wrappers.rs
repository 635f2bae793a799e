//! Synthetic wrapper nodes inserted while selecting layout strategies.
//!
//! A wrapper is a freshly allocated node; wrapping only rewrites parent
//! ids, so `parent_original` keeps pointing at the pre-wrap parent.

use tracing::debug;
use trellis_core::{
    BoxRect, Edges, Geometry, Node, NodeCache, NodeId, NodeOrigin, Orientation, StyleMap, Widget,
    WrapperKind,
};

/// Allocate a wrapper node occupying `bounds` under `parent`.
pub fn allocate_wrapper(
    cache: &mut NodeCache,
    kind: WrapperKind,
    parent: Option<NodeId>,
    bounds: BoxRect,
    document_index: usize,
    widget: Widget,
) -> NodeId {
    let depth = parent.map_or(0, |p| cache[p].depth + 1);
    let id = cache.allocate(|id| {
        let mut node = Node::new(id, NodeOrigin::Wrapper(kind), wrapper_tag(kind), StyleMap::default(), bounds);
        node.geometry = Geometry::new(bounds, Edges::default(), Edges::default(), Edges::default());
        node.document_index = document_index;
        node.depth = depth;
        node.widget = widget;
        node
    });
    if let Some(parent) = parent {
        cache.reparent(id, parent);
        cache[id].parent_original = Some(parent);
    }
    id
}

fn wrapper_tag(kind: WrapperKind) -> &'static str {
    match kind {
        WrapperKind::Scroll => "scroll",
        WrapperKind::RadioGroup => "radiogroup",
        WrapperKind::GridSpan => "gridspan",
        WrapperKind::GridSpacer => "space",
    }
}

/// Re-home `children` under `wrapper` in both trees, keeping the original
/// parent intact.
fn adopt(cache: &mut NodeCache, wrapper: NodeId, children: &[NodeId]) {
    for &child in children {
        cache.reparent(child, wrapper);
        if cache[child].is_rendered() {
            cache.set_render_parent(child, wrapper);
        }
        shift_depth(cache, child, 1);
    }
}

fn shift_depth(cache: &mut NodeCache, id: NodeId, by: u32) {
    let mut stack = vec![id];
    while let Some(current) = stack.pop() {
        cache[current].depth += by;
        stack.extend(cache[current].children.iter().copied());
    }
}

fn is_radio(node: &Node) -> bool {
    node.tag == "input" && node.property("type") == Some("radio")
}

/// Group runs of two or more consecutive radio inputs sharing a `name` into
/// radio-group wrappers. Returns the created wrappers.
pub fn wrap_radio_groups(cache: &mut NodeCache, container: NodeId) -> Vec<NodeId> {
    let children = cache.render_children(container).to_vec();
    let mut runs: Vec<Vec<NodeId>> = Vec::new();
    let mut current: Vec<NodeId> = Vec::new();

    for child in children {
        let node = &cache[child];
        let continues = is_radio(node)
            && current
                .last()
                .is_some_and(|&prev| cache[prev].property("name") == node.property("name"));
        if continues {
            current.push(child);
            continue;
        }
        if current.len() > 1 {
            runs.push(std::mem::take(&mut current));
        }
        current.clear();
        if is_radio(node) && node.property("name").is_some() {
            current.push(child);
        }
    }
    if current.len() > 1 {
        runs.push(current);
    }

    let mut wrappers = Vec::new();
    for run in runs {
        let bounds = run
            .iter()
            .map(|&r| cache[r].geometry.linear)
            .reduce(|a, b| a.union(&b))
            .unwrap_or_default();
        let first = cache[run[0]].document_index;
        let wrapper = allocate_wrapper(
            cache,
            WrapperKind::RadioGroup,
            Some(container),
            bounds,
            first,
            Widget::RadioGroup,
        );
        cache.set_render_parent(wrapper, container);
        adopt(cache, wrapper, &run);
        reorder_render_children(cache, container);
        debug!(container = %container, wrapper = %wrapper, radios = run.len(), "wrapped radio group");
        wrappers.push(wrapper);
    }
    wrappers
}

/// Wrap a scrolling container whose content overflows its box in a scroll
/// node that takes its place in the render tree.
pub fn wrap_scroll(cache: &mut NodeCache, id: NodeId) -> Option<NodeId> {
    let (scroll_x, scroll_y) = cache[id].style.scrolls();
    if !scroll_x && !scroll_y {
        return None;
    }
    let extent = cache.content_extent(id)?;
    let viewport = *cache[id].box_rect();
    let orientation = if scroll_y && extent.bottom > viewport.bottom {
        Orientation::Vertical
    } else if scroll_x && extent.right > viewport.right {
        Orientation::Horizontal
    } else {
        return None;
    };

    let parent = cache[id].parent;
    let render_parent = cache[id].render_parent;
    let outer = cache[id].geometry;
    let document_index = cache[id].document_index;
    let wrapper = allocate_wrapper(
        cache,
        WrapperKind::Scroll,
        parent,
        outer.bounds,
        document_index,
        Widget::Scroll(orientation),
    );
    cache[wrapper].geometry = Geometry::new(outer.bounds, outer.margin, Edges::default(), Edges::default());
    if let Some(render_parent) = render_parent {
        cache.set_render_parent(wrapper, render_parent);
        reorder_render_children(cache, render_parent);
    }
    adopt(cache, wrapper, &[id]);

    // The scrolled content spans its full extent along the scrolling axis.
    let content = &mut cache[id].geometry;
    content.margin = Edges::default();
    content.calibrate();
    cache.expand_to_fit(id);
    debug!(node = %id, wrapper = %wrapper, ?orientation, "wrapped scroll container");
    Some(wrapper)
}

/// Restore document order among render children.
pub fn reorder_render_children(cache: &mut NodeCache, parent: NodeId) {
    let mut children = std::mem::take(&mut cache[parent].render_children);
    children.sort_by_key(|&c| (cache[c].document_index, c));
    cache[parent].render_children = children;
}
