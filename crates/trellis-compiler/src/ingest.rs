//! Snapshot ingestion: one node per element, plus free-standing text nodes.

use std::collections::HashSet;

use tracing::debug;
use trellis_core::style::parse_px;
use trellis_core::{BoxRect, CompileError, ElementId, Node, NodeCache, NodeOrigin, Result, StyleMap};

use crate::snapshot::{ElementSnapshot, Snapshot};

/// Style properties a synthetic text node copies from its element.
const TEXT_STYLES: &[&str] = &[
    "color",
    "font-family",
    "font-size",
    "font-style",
    "font-weight",
    "line-height",
    "text-align",
    "text-decoration",
    "vertical-align",
];

const SIDES: &[&str] = &["top", "right", "bottom", "left"];

/// Allocate a node for every element of `snapshot`.
///
/// Elements under `display: none` are allocated but hidden and may omit
/// their bounds. Any other element without bounds is an input error.
pub fn ingest(snapshot: &Snapshot) -> Result<NodeCache> {
    let mut seen = HashSet::new();
    for element in &snapshot.elements {
        if !seen.insert(element.id) {
            return Err(CompileError::DuplicateElement { element: ElementId(element.id) });
        }
    }

    let with_children: HashSet<u64> = snapshot.elements.iter().filter_map(|e| e.parent).collect();
    let with_layers: HashSet<u64> = snapshot
        .elements
        .iter()
        .filter(|e| is_positioned(e))
        .filter_map(|e| e.parent)
        .collect();

    let mut suppressed: HashSet<u64> = HashSet::new();
    let mut cache = NodeCache::new();
    let mut document_index = 0;

    for element in &snapshot.elements {
        let style = StyleMap::new(element.style.clone());
        let collapsed = style.is("display", "none") || element.parent.is_some_and(|p| suppressed.contains(&p));
        if collapsed {
            suppressed.insert(element.id);
        }

        let bounds = match element.bounds {
            Some(rect) => rect.to_box(),
            None if collapsed => BoxRect::default(),
            None => return Err(CompileError::MissingGeometry { element: ElementId(element.id) }),
        };
        if !collapsed {
            validate_box_style(element, &style)?;
        }

        let empty = element.bounds.map_or(true, |b| b.area() <= 0.0);
        let hidden = collapsed || style.is_hidden() || (empty && !with_layers.contains(&element.id));
        let text = element.text.clone().filter(|t| !t.trim().is_empty());
        let split_text = with_children.contains(&element.id) && text.is_some() && element.text_bounds.is_some();

        let id = cache.allocate(|id| {
            let mut node = Node::new(id, NodeOrigin::Element(ElementId(element.id)), element.tag.to_ascii_lowercase(), style, bounds);
            node.source_parent = element.parent.map(ElementId);
            node.properties = element.attributes.clone();
            node.options = element.options.clone();
            node.text = if split_text { None } else { text.clone() };
            node.document_index = document_index;
            node.hidden = hidden;
            node.collapsed = collapsed;
            node
        });
        document_index += 1;

        if let (true, Some(text), Some(rect)) = (split_text, text, element.text_bounds) {
            let inherited: StyleMap = TEXT_STYLES
                .iter()
                .filter_map(|&name| cache[id].style.get(name).map(|v| (name, v.to_string())))
                .collect();
            let text_id = cache.allocate(|text_id| {
                let mut node = Node::new(text_id, NodeOrigin::Text(ElementId(element.id)), "#text", inherited, rect.to_box());
                node.source_parent = Some(ElementId(element.id));
                node.text = Some(text);
                node.document_index = document_index;
                node.hidden = hidden || rect.area() <= 0.0;
                node.collapsed = collapsed;
                node
            });
            document_index += 1;
            debug!(element = element.id, node = %text_id, "split free-standing text into its own node");
        }
    }

    let has_root = cache.iter().any(|n| n.source_parent.is_none() && !n.hidden);
    if !has_root {
        return Err(CompileError::NoRoot);
    }
    debug!(elements = snapshot.len(), nodes = cache.len(), "ingested snapshot");
    Ok(cache)
}

fn is_positioned(element: &ElementSnapshot) -> bool {
    matches!(
        element.style.get("position").map(|p| p.trim()),
        Some("absolute") | Some("fixed")
    )
}

/// Margins, paddings and border widths feed the geometry model, so they
/// must be pixel lengths, `auto` or percentages.
fn validate_box_style(element: &ElementSnapshot, style: &StyleMap) -> Result<()> {
    let properties = SIDES.iter().flat_map(|side| {
        [
            format!("margin-{side}"),
            format!("padding-{side}"),
            format!("border-{side}-width"),
        ]
    });
    for property in properties {
        let Some(value) = style.get(&property) else {
            continue;
        };
        let accepted = parse_px(value).is_some()
            || value.eq_ignore_ascii_case("auto")
            || value.ends_with('%')
            || (property.starts_with("border") && matches!(value, "thin" | "medium" | "thick"));
        if !accepted {
            return Err(CompileError::InvalidStyle {
                element: ElementId(element.id),
                property,
                value: value.to_string(),
            });
        }
    }
    Ok(())
}
