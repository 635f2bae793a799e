//! Append-only node registry for one compilation run.

use std::collections::HashMap;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{CompileError, Result};
use crate::geometry::BoxRect;
use crate::node::{ElementId, Node, NodeId};

/// Flat arena of every node in a run, doubling as the id lookup.
///
/// Nodes are never removed; ids index straight into the backing vector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeCache {
    nodes: Vec<Node>,
    #[serde(skip)]
    elements: HashMap<ElementId, NodeId>,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Id the next allocated node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId(self.nodes.len() as u32)
    }

    /// Allocate a node, building it with its assigned id.
    pub fn allocate(&mut self, build: impl FnOnce(NodeId) -> Node) -> NodeId {
        let id = self.next_id();
        let mut node = build(id);
        node.id = id;
        if let Some(element) = node.element() {
            self.elements.entry(element).or_insert(id);
        }
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// Checked lookup for ids that come from outside the registry.
    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.get(id).ok_or(CompileError::UnknownNode(id))
    }

    /// Node created for a snapshot element.
    pub fn by_element(&self, element: ElementId) -> Option<NodeId> {
        self.elements.get(&element).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Nodes without a parent that are not hidden.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none() && !n.hidden)
            .map(|n| n.id)
            .collect()
    }

    /// Visible source-tree children.
    pub fn visible_children(&self, id: NodeId) -> Vec<NodeId> {
        self[id]
            .children
            .iter()
            .copied()
            .filter(|&c| !self[c].hidden)
            .collect()
    }

    /// True when `ancestor` is on the parent chain of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = self[id].parent;
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.nodes.len() {
                break;
            }
            current = self[parent].parent;
        }
        false
    }

    /// Move `child` under `parent`, keeping sibling lists in document order.
    pub fn reparent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(previous) = self[child].parent {
            self[previous].children.retain(|&c| c != child);
        }
        self[child].parent = Some(parent);
        self[parent].children.push(child);
        self.sort_children(parent);
    }

    /// Re-apply document order to a child list.
    pub fn sort_children(&mut self, parent: NodeId) {
        let mut children = std::mem::take(&mut self[parent].children);
        children.sort_by_key(|&c| (self[c].document_index, c));
        self[parent].children = children;
    }

    /// Attach `child` to `parent` in the render tree.
    pub fn set_render_parent(&mut self, child: NodeId, parent: NodeId) {
        if let Some(previous) = self[child].render_parent {
            self[previous].render_children.retain(|&c| c != child);
        }
        self[child].render_parent = Some(parent);
        self[parent].render_children.push(child);
    }

    /// Render children in document order.
    pub fn render_children(&self, id: NodeId) -> &[NodeId] {
        &self[id].render_children
    }

    /// Union of the `linear` rectangles of rendered children.
    pub fn content_extent(&self, id: NodeId) -> Option<BoxRect> {
        self[id]
            .render_children
            .iter()
            .map(|&c| self[c].geometry.linear)
            .reduce(|a, b| a.union(&b))
    }

    /// Grow a container so its box covers every child's `linear` rectangle.
    /// Geometry is re-derived once; children are untouched.
    pub fn expand_to_fit(&mut self, id: NodeId) -> bool {
        let Some(extent) = self.content_extent(id) else {
            return false;
        };
        let grown = self[id].geometry.grow_to_cover(&extent);
        if grown {
            trace!(node = %id, bounds = ?self[id].geometry.bounds, "grew container to cover content");
        }
        grown
    }
}

impl Index<NodeId> for NodeCache {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}

impl IndexMut<NodeId> for NodeCache {
    fn index_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}
