//! Layout nodes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::anchor::ConstraintScratch;
use crate::attributes::AttributeStore;
use crate::geometry::{BoxRect, Geometry};
use crate::grid::GridScratch;
use crate::style::StyleMap;
use crate::widget::Widget;

/// Arena index of a node, assigned in allocation order and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of an element in the upstream snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kind of synthetic node created during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapperKind {
    Scroll,
    RadioGroup,
    GridSpan,
    GridSpacer,
}

/// Where a node came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeOrigin {
    /// A visible or hidden element of the snapshot.
    Element(ElementId),
    /// Free-standing text of an element.
    Text(ElementId),
    /// Wrapper synthesized by the layout strategy selector.
    Wrapper(WrapperKind),
}

/// One rendered element or synthesized wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub origin: NodeOrigin,
    /// Lowercase source tag (`#text` for text nodes, the wrapper kind for wrappers).
    pub tag: String,
    pub style: StyleMap,
    pub geometry: Geometry,
    pub text: Option<String>,
    /// Source element attributes (`type`, `name`, `for`, `src`...).
    pub properties: IndexMap<String, String>,
    /// Option labels of a select element.
    pub options: Vec<String>,
    /// Parent element in the source tree.
    pub source_parent: Option<ElementId>,
    pub parent: Option<NodeId>,
    /// Parent before any synthetic wrapping.
    pub parent_original: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub render_parent: Option<NodeId>,
    pub render_children: Vec<NodeId>,
    pub depth: u32,
    /// Position in document order, captured once at ingestion.
    pub document_index: usize,
    /// Not drawn. Rendered descendants still hang off the nearest rendered
    /// ancestor.
    pub hidden: bool,
    /// Under `display: none`: the whole subtree is cut from the render tree.
    pub collapsed: bool,
    /// Kept in the tree but not rendered; children are hoisted.
    pub excluded: bool,
    /// Lies outside its parent's box after layout.
    pub overflowing: bool,
    pub widget: Widget,
    pub attributes: AttributeStore,
    pub constraint: ConstraintScratch,
    pub grid: Option<GridScratch>,
}

impl Node {
    /// Create a node with default tree links.
    pub fn new(id: NodeId, origin: NodeOrigin, tag: impl Into<String>, style: StyleMap, bounds: BoxRect) -> Self {
        let geometry = Geometry::new(bounds, style.margin(), style.padding(), style.border());
        Self {
            id,
            origin,
            tag: tag.into(),
            style,
            geometry,
            text: None,
            properties: IndexMap::new(),
            options: Vec::new(),
            source_parent: None,
            parent: None,
            parent_original: None,
            children: Vec::new(),
            render_parent: None,
            render_children: Vec::new(),
            depth: 0,
            document_index: 0,
            hidden: false,
            collapsed: false,
            excluded: false,
            overflowing: false,
            widget: Widget::View,
            attributes: AttributeStore::new(),
            constraint: ConstraintScratch::default(),
            grid: None,
        }
    }

    pub fn bounds(&self) -> &BoxRect {
        &self.geometry.bounds
    }

    pub fn linear(&self) -> &BoxRect {
        &self.geometry.linear
    }

    pub fn box_rect(&self) -> &BoxRect {
        &self.geometry.box_rect
    }

    /// Snapshot element this node represents, if any.
    pub fn element(&self) -> Option<ElementId> {
        match self.origin {
            NodeOrigin::Element(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        !matches!(self.origin, NodeOrigin::Element(_))
    }

    pub fn is_out_of_flow(&self) -> bool {
        self.style.is_out_of_flow()
    }

    /// Participates in the render tree.
    pub fn is_rendered(&self) -> bool {
        !self.hidden && !self.excluded
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// Stable resource-style name such as `div_12`.
    pub fn control_name(&self) -> String {
        let tag: String = self
            .tag
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        let tag = tag.trim_matches('_');
        if tag.is_empty() {
            format!("node_{}", self.id.0)
        } else {
            format!("{}_{}", tag, self.id.0)
        }
    }
}
