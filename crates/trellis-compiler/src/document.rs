//! Compiled layout handed to the platform emitter.

use trellis_core::{ElementId, Namespace, Node, NodeCache, NodeId, Result, Settings};
use trellis_layout::{LayoutPlan, Strategy};
use trellis_resources::{ConsolidationReport, ResourceTables, STYLE_ATTRIBUTE};

use crate::context::CompilationContext;

/// Final node tree and resources of one run.
#[derive(Debug, Clone)]
pub struct LayoutDocument {
    settings: Settings,
    cache: NodeCache,
    tables: ResourceTables,
    plan: LayoutPlan,
    root: NodeId,
    report: ConsolidationReport,
}

impl LayoutDocument {
    pub(crate) fn new(context: CompilationContext, plan: LayoutPlan, root: NodeId, report: ConsolidationReport) -> Self {
        let CompilationContext { settings, cache, tables } = context;
        Self { settings, cache, tables, plan, root, report }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Result<&Node> {
        self.cache.node(id)
    }

    pub fn render_children(&self, id: NodeId) -> Result<&[NodeId]> {
        self.cache.node(id)?;
        Ok(self.cache.render_children(id))
    }

    /// Every node of the run, rendered or not.
    pub fn nodes(&self) -> &NodeCache {
        &self.cache
    }

    pub fn resources(&self) -> &ResourceTables {
        &self.tables
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn strategy(&self, id: NodeId) -> Option<Strategy> {
        self.plan.strategy(id)
    }

    pub fn consolidation(&self) -> &ConsolidationReport {
        &self.report
    }

    /// Node created for the snapshot element with identity `element`.
    pub fn element(&self, element: u64) -> Option<NodeId> {
        self.cache.by_element(ElementId(element))
    }

    /// Effective value of an attribute: the node's own, else the nearest
    /// definition along its style chain.
    pub fn attribute(&self, id: NodeId, namespace: Namespace, key: &str) -> Option<&str> {
        let node = self.cache.get(id)?;
        if let Some(value) = node.attributes.get(namespace, key) {
            return Some(value);
        }
        let qualified = namespace.qualify(key);
        let mut style = node
            .attributes
            .get(Namespace::Plain, STYLE_ATTRIBUTE)
            .and_then(|r| r.strip_prefix("@style/"));
        for _ in 0..=self.tables.styles.len() {
            let definition = self.tables.styles.get(style?)?;
            if let Some(value) = definition.attributes.get(&qualified) {
                return Some(value.as_str());
            }
            style = definition.parent.as_deref();
        }
        None
    }

    /// Indented text rendering: one line per rendered node with its element
    /// name and attributes sorted by qualified name.
    pub fn outline(&self) -> String {
        let mut lines = Vec::new();
        self.outline_node(self.root, 0, &mut lines);
        lines.join("\n")
    }

    fn outline_node(&self, id: NodeId, depth: usize, lines: &mut Vec<String>) {
        let node = &self.cache[id];
        let mut attributes: Vec<(String, &str)> = node
            .attributes
            .iter()
            .map(|(namespace, key, value)| (namespace.qualify(key), value))
            .collect();
        attributes.sort();

        let mut line = format!("{}{}", "  ".repeat(depth), node.widget.element_name());
        for (key, value) in attributes {
            line.push_str(&format!(" {key}=\"{value}\""));
        }
        lines.push(line);
        for &child in &node.render_children {
            self.outline_node(child, depth + 1, lines);
        }
    }
}
