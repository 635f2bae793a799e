//! Parent/child ownership from geometric nesting.
//!
//! In-flow nodes keep their source-tree parent. Out-of-flow nodes are
//! adopted by the tightest enclosing candidate, which may sit anywhere in
//! the tree.

use tracing::{debug, warn};
use trellis_core::{CompileError, NodeCache, NodeId, Result, Settings};

/// Tags that never own children in the output tree.
const LEAF_TAGS: &[&str] = &[
    "#text", "img", "input", "select", "textarea", "button", "svg", "canvas", "br", "hr", "video",
    "audio", "iframe",
];

/// Assign `parent`, `parent_original`, `depth` and sibling order for every
/// node in the registry.
pub fn build_containment(cache: &mut NodeCache, settings: &Settings) -> Result<()> {
    let ids: Vec<NodeId> = cache.ids().collect();

    for &id in &ids {
        let Some(element) = cache[id].source_parent else {
            continue;
        };
        let parent = cache
            .by_element(element)
            .ok_or_else(|| CompileError::UnknownParent {
                element: cache[id].element().unwrap_or(element),
                parent: element,
            })?;
        cache.reparent(id, parent);
    }

    for &id in &ids {
        if cache[id].hidden || !cache[id].is_out_of_flow() {
            continue;
        }
        let Some(source_parent) = cache[id].parent else {
            continue;
        };
        match tightest_enclosing(cache, id, source_parent, settings) {
            Some(parent) if parent != source_parent => {
                debug!(node = %id, from = %source_parent, to = %parent, "reparented out-of-flow node");
                cache.reparent(id, parent);
            }
            Some(_) => {}
            None => {
                warn!(node = %id, parent = %source_parent, "no enclosing candidate, keeping source parent");
            }
        }
    }

    for &id in &ids {
        let parent = cache[id].parent;
        cache[id].parent_original = parent;
    }

    assign_depths(cache);
    Ok(())
}

/// Candidate whose `linear` rectangle encloses the node's `box_rect` with
/// the smallest total edge gap. Ties go to the source parent, then to the
/// lowest id.
fn tightest_enclosing(
    cache: &NodeCache,
    id: NodeId,
    source_parent: NodeId,
    settings: &Settings,
) -> Option<NodeId> {
    let target = *cache[id].box_rect();
    let mut best: Option<(NodeId, f64)> = None;

    for candidate in cache.iter() {
        if candidate.id == id
            || candidate.hidden
            || LEAF_TAGS.contains(&candidate.tag.as_str())
            || cache.is_ancestor(id, candidate.id)
            || !candidate.linear().contains(&target, settings.edge_tolerance)
        {
            continue;
        }
        let gap = candidate.linear().enclosing_gap(&target);
        best = match best {
            None => Some((candidate.id, gap)),
            Some((current, current_gap)) => {
                if gap < current_gap - settings.edge_tolerance {
                    Some((candidate.id, gap))
                } else if (gap - current_gap).abs() <= settings.edge_tolerance
                    && candidate.id == source_parent
                {
                    Some((candidate.id, gap))
                } else {
                    Some((current, current_gap))
                }
            }
        };
    }

    best.map(|(candidate, _)| candidate)
}

/// Depth is parent depth + 1, walking down from the roots.
pub fn assign_depths(cache: &mut NodeCache) {
    let mut stack: Vec<(NodeId, u32)> = cache
        .ids()
        .filter(|&id| cache[id].parent.is_none())
        .map(|id| (id, 0))
        .collect();
    while let Some((id, depth)) = stack.pop() {
        cache[id].depth = depth;
        for &child in &cache[id].children {
            stack.push((child, depth + 1));
        }
    }
}

/// Rebuild render links from the source tree: every rendered node hangs
/// off its nearest rendered ancestor, in document order. Hidden and
/// excluded ancestors are skipped over; a collapsed one cuts the subtree.
pub fn build_render_tree(cache: &mut NodeCache) {
    for node in cache.iter_mut() {
        node.render_parent = None;
        node.render_children.clear();
    }
    let mut ids: Vec<NodeId> = cache.ids().filter(|&id| cache[id].is_rendered()).collect();
    ids.sort_by_key(|&id| (cache[id].document_index, id));

    for id in ids {
        let mut current = cache[id].parent;
        while let Some(parent) = current {
            if cache[parent].is_rendered() {
                break;
            }
            if cache[parent].collapsed {
                current = None;
                break;
            }
            current = cache[parent].parent;
        }
        if let Some(parent) = current {
            cache.set_render_parent(id, parent);
        }
    }
}

/// Stable traversal order: depth, then horizontal position bucket, then
/// original parent, then document order.
pub fn emission_order(cache: &NodeCache) -> Vec<NodeId> {
    let mut ids: Vec<NodeId> = cache.ids().filter(|&id| cache[id].is_rendered()).collect();
    ids.sort_by_key(|&id| {
        let node = &cache[id];
        (
            node.depth,
            node.linear().left.floor() as i64,
            node.parent_original.map_or(0, |p| p.0 + 1),
            node.document_index,
            id,
        )
    });
    ids
}

/// Flag rendered nodes whose `linear` rectangle escapes their render
/// parent's box. Returns the number of flagged nodes.
pub fn flag_overflow(cache: &mut NodeCache, settings: &Settings) -> usize {
    let mut flagged = 0;
    for id in cache.ids().collect::<Vec<_>>() {
        let Some(parent) = cache[id].render_parent else {
            continue;
        };
        let contained = cache[parent]
            .box_rect()
            .contains(cache[id].linear(), settings.edge_tolerance.max(1.0));
        cache[id].overflowing = !contained;
        if !contained {
            flagged += 1;
        }
    }
    flagged
}
