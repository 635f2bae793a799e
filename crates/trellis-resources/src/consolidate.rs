//! Factoring repeated attribute sets into shared styles.
//!
//! Nodes are grouped by their platform element. Within a group every
//! `(attribute, value)` pair is keyed by the set of nodes carrying it. Two
//! pairs whose sets share more than one node form a candidate style scoped
//! to the shared nodes, and candidates on the same node set merge.
//! Candidates are taken largest support first, one per pass, since each
//! accepted style changes what the others see. A candidate is accepted only
//! when all of its nodes currently share the same innermost style, which
//! then becomes its parent. Existing `style` references are opaque and act
//! as that innermost style, so running the pass on its own output is a
//! no-op.

use indexmap::IndexMap;
use tracing::debug;
use trellis_core::{Namespace, NodeCache, NodeId};

use crate::tables::{ResourceTables, StyleDefinition};

/// Unprefixed attribute holding the style reference.
pub const STYLE_ATTRIBUTE: &str = "style";
const STYLE_PREFIX: &str = "@style/";

/// Attributes never factored out.
const UNSHARED: &[&str] = &["id"];

type Pair = (Namespace, String, String);

/// Styles created by one consolidation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolidationReport {
    pub styles: Vec<String>,
    pub styled_nodes: usize,
}

/// Move shared attributes of rendered nodes into style definitions.
pub fn consolidate(cache: &mut NodeCache, tables: &mut ResourceTables) -> ConsolidationReport {
    let mut kinds: IndexMap<&'static str, Vec<NodeId>> = IndexMap::new();
    for node in cache.iter().filter(|n| n.is_rendered()) {
        kinds.entry(node.widget.element_name()).or_default().push(node.id);
    }

    let mut report = ConsolidationReport::default();
    for (kind, nodes) in &kinds {
        if nodes.len() < 2 {
            continue;
        }
        consolidate_kind(cache, tables, kind, nodes, &mut report);
    }
    debug!(styles = report.styles.len(), nodes = report.styled_nodes, "consolidated styles");
    report
}

fn consolidate_kind(
    cache: &mut NodeCache,
    tables: &mut ResourceTables,
    kind: &str,
    nodes: &[NodeId],
    report: &mut ConsolidationReport,
) {
    let short = kind.rsplit('.').next().unwrap_or(kind);
    let initial: IndexMap<NodeId, Option<String>> = nodes.iter().map(|&id| (id, style_of(cache, id))).collect();
    let mut current = initial.clone();
    let mut rank = 0;

    // Every accepted style removes attributes, so the attribute count bounds
    // the number of passes.
    let limit = nodes.iter().map(|&id| cache[id].attributes.len()).sum::<usize>() + 1;
    for _ in 0..limit {
        let accepted = candidates(cache, nodes).into_iter().find(|(support, _)| {
            let parent = &current[&support[0]];
            support.iter().all(|id| &current[id] == parent)
        });
        let Some((support, pairs)) = accepted else {
            break;
        };

        rank += 1;
        let definition = StyleDefinition {
            attributes: pairs.iter().map(|(ns, key, value)| (ns.qualify(key), value.clone())).collect(),
            parent: current[&support[0]].clone(),
        };
        let name = tables.add_style(&format!("{short}_{rank}"), definition);
        debug!(kind, style = %name, nodes = support.len(), attributes = pairs.len(), "style");

        for &id in &support {
            for (namespace, key, _) in &pairs {
                cache[id].attributes.remove(*namespace, key);
            }
            current.insert(id, Some(name.clone()));
        }
        if !report.styles.contains(&name) {
            report.styles.push(name);
        }
    }

    for (&id, style) in &current {
        if *style == initial[&id] {
            continue;
        }
        if let Some(name) = style {
            cache[id].attributes.set(Namespace::Plain, STYLE_ATTRIBUTE, format!("{STYLE_PREFIX}{name}"));
            report.styled_nodes += 1;
        }
    }
}

/// Candidate styles keyed by supporting node set.
///
/// A pair carried by every node of the kind is a candidate on its own.
/// Otherwise two pairs whose supports share more than one node join the
/// candidate of that shared set, and all pairs meeting on the same set merge
/// into it. Ordered by support size, then attribute count, then first
/// appearance.
fn candidates(cache: &NodeCache, nodes: &[NodeId]) -> Vec<(Vec<NodeId>, Vec<Pair>)> {
    let mut support: IndexMap<Pair, Vec<NodeId>> = IndexMap::new();
    for &id in nodes {
        for (namespace, key, value) in cache[id].attributes.iter() {
            if namespace == Namespace::Plain || UNSHARED.contains(&key) {
                continue;
            }
            support
                .entry((namespace, key.to_string(), value.to_string()))
                .or_default()
                .push(id);
        }
    }
    let pairs: Vec<(Pair, Vec<NodeId>)> = support.into_iter().collect();

    let mut groups: IndexMap<Vec<NodeId>, Vec<usize>> = IndexMap::new();
    for (index, (_, ids)) in pairs.iter().enumerate() {
        if ids.len() == nodes.len() {
            groups.entry(ids.clone()).or_default().push(index);
        }
        for (offset, (_, other)) in pairs[index + 1..].iter().enumerate() {
            let shared: Vec<NodeId> = ids.iter().copied().filter(|id| other.contains(id)).collect();
            if shared.len() > 1 {
                let members = groups.entry(shared).or_default();
                members.extend([index, index + 1 + offset]);
            }
        }
    }

    let mut ordered: Vec<(Vec<NodeId>, Vec<Pair>)> = groups
        .into_iter()
        .map(|(ids, mut members)| {
            members.sort_unstable();
            members.dedup();
            (ids, members.into_iter().map(|i| pairs[i].0.clone()).collect())
        })
        .collect();
    ordered.sort_by(|(a_ids, a_pairs), (b_ids, b_pairs)| {
        b_ids.len().cmp(&a_ids.len()).then(b_pairs.len().cmp(&a_pairs.len()))
    });
    ordered
}

fn style_of(cache: &NodeCache, id: NodeId) -> Option<String> {
    cache[id]
        .attributes
        .get(Namespace::Plain, STYLE_ATTRIBUTE)
        .map(|value| value.strip_prefix(STYLE_PREFIX).unwrap_or(value).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use trellis_core::{BoxRect, ElementId, Node, NodeOrigin, StyleMap, Widget};

    fn node(cache: &mut NodeCache, widget: Widget, attributes: &[(&str, &str)]) -> NodeId {
        let element = cache.len() as u64 + 1;
        let id = cache.allocate(|id| {
            Node::new(
                id,
                NodeOrigin::Element(ElementId(element)),
                "p",
                StyleMap::default(),
                BoxRect::from_xywh(0.0, 0.0, 10.0, 10.0),
            )
        });
        cache[id].widget = widget;
        cache[id].attributes.set(Namespace::Android, "id", format!("@+id/p_{}", id.0));
        for (key, value) in attributes {
            cache[id].attributes.set(Namespace::Android, *key, *value);
        }
        id
    }

    fn style(cache: &NodeCache, id: NodeId) -> Option<&str> {
        cache[id].attributes.get(Namespace::Plain, STYLE_ATTRIBUTE)
    }

    #[test]
    fn test_universal_then_nested() {
        let mut cache = NodeCache::new();
        let mut tables = ResourceTables::new();
        let shared = [("textSize", "14sp"), ("textColor", "@color/black")];
        let a = node(&mut cache, Widget::Text, &[shared[0], shared[1], ("textStyle", "bold"), ("gravity", "center")]);
        let b = node(&mut cache, Widget::Text, &[shared[0], shared[1], ("textStyle", "bold"), ("gravity", "center")]);
        let c = node(&mut cache, Widget::Text, &[shared[0], shared[1], ("maxLines", "1")]);

        let report = consolidate(&mut cache, &mut tables);
        assert_eq!(report.styles, vec!["TextView_1".to_string(), "TextView_2".to_string()]);

        let base = tables.styles.get("TextView_1").unwrap();
        assert_eq!(base.attributes.get("android:textSize").map(String::as_str), Some("14sp"));
        assert_eq!(base.parent, None);
        let nested = tables.styles.get("TextView_2").unwrap();
        assert_eq!(nested.parent.as_deref(), Some("TextView_1"));
        assert_eq!(nested.attributes.len(), 2);

        assert_eq!(style(&cache, a), Some("@style/TextView_2"));
        assert_eq!(style(&cache, b), Some("@style/TextView_2"));
        assert_eq!(style(&cache, c), Some("@style/TextView_1"));
        assert_eq!(cache[c].attributes.get(Namespace::Android, "maxLines"), Some("1"));
        assert!(cache[a].attributes.get(Namespace::Android, "textSize").is_none());
        assert!(cache[a].attributes.contains(Namespace::Android, "id"));
    }

    #[test]
    fn test_single_attribute_overlap_stays_inline() {
        let mut cache = NodeCache::new();
        let mut tables = ResourceTables::new();
        let a = node(&mut cache, Widget::Button, &[("textSize", "12sp")]);
        node(&mut cache, Widget::Button, &[("textSize", "12sp")]);
        node(&mut cache, Widget::Button, &[("textSize", "18sp")]);

        let report = consolidate(&mut cache, &mut tables);
        assert!(report.styles.is_empty());
        assert_eq!(style(&cache, a), None);
    }

    #[test]
    fn test_kinds_are_separate() {
        let mut cache = NodeCache::new();
        let mut tables = ResourceTables::new();
        node(&mut cache, Widget::Text, &[("textSize", "12sp")]);
        node(&mut cache, Widget::Button, &[("textSize", "12sp")]);
        assert!(consolidate(&mut cache, &mut tables).styles.is_empty());
    }

    #[test]
    fn test_diverging_chains_stay_inline() {
        let mut cache = NodeCache::new();
        let mut tables = ResourceTables::new();
        let left = [("gravity", "start"), ("textStyle", "bold")];
        let right = [("maxLines", "2"), ("ellipsize", "end"), ("lines", "2")];
        node(&mut cache, Widget::Text, &left);
        let middle = node(&mut cache, Widget::Text, &[left[0], left[1], right[0], right[1], right[2]]);
        let last = node(&mut cache, Widget::Text, &right);

        consolidate(&mut cache, &mut tables);
        assert_eq!(style(&cache, middle), Some("@style/TextView_1"));
        assert_eq!(tables.styles.len(), 1);
        assert_eq!(cache[middle].attributes.get(Namespace::Android, "gravity"), Some("start"));
        assert_eq!(style(&cache, last), Some("@style/TextView_1"));
    }

    #[test]
    fn test_overlapping_supports_share_their_intersection() {
        let mut cache = NodeCache::new();
        let mut tables = ResourceTables::new();
        let a = node(&mut cache, Widget::Text, &[("textColor", "@color/red"), ("textStyle", "bold")]);
        let b = node(&mut cache, Widget::Text, &[("textColor", "@color/red"), ("textStyle", "bold")]);
        let c = node(&mut cache, Widget::Text, &[("textColor", "@color/red")]);
        let d = node(&mut cache, Widget::Text, &[("gravity", "center")]);

        let report = consolidate(&mut cache, &mut tables);
        assert_eq!(report.styles, vec!["TextView_1".to_string()]);
        let shared = tables.styles.get("TextView_1").unwrap();
        let keys: Vec<&str> = shared.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["android:textColor", "android:textStyle"]);
        assert_eq!(shared.parent, None);

        assert_eq!(style(&cache, a), Some("@style/TextView_1"));
        assert_eq!(style(&cache, b), Some("@style/TextView_1"));
        assert!(cache[a].attributes.get(Namespace::Android, "textColor").is_none());
        assert_eq!(style(&cache, c), None);
        assert_eq!(cache[c].attributes.get(Namespace::Android, "textColor"), Some("@color/red"));
        assert_eq!(style(&cache, d), None);
        assert_eq!(report.styled_nodes, 2);
    }

    const KEYS: [&str; 4] = ["textSize", "textColor", "gravity", "padding"];
    const VALUES: [&str; 3] = ["a", "b", "c"];

    fn run_twice(specs: &[(bool, Vec<(usize, usize)>)]) -> (NodeCache, ResourceTables, NodeCache, ResourceTables) {
        let mut cache = NodeCache::new();
        for (button, attrs) in specs {
            let widget = if *button { Widget::Button } else { Widget::Text };
            let pairs: Vec<(&str, &str)> = attrs.iter().map(|&(k, v)| (KEYS[k], VALUES[v])).collect();
            node(&mut cache, widget, &pairs);
        }
        let mut tables = ResourceTables::new();
        consolidate(&mut cache, &mut tables);
        let (once_cache, once_tables) = (cache.clone(), tables.clone());
        consolidate(&mut cache, &mut tables);
        (once_cache, once_tables, cache, tables)
    }

    proptest! {
        #[test]
        fn prop_consolidation_is_idempotent(
            specs in prop::collection::vec(
                (any::<bool>(), prop::collection::vec((0usize..4, 0usize..3), 0..4)),
                0..8,
            )
        ) {
            let (once_cache, once_tables, twice_cache, twice_tables) = run_twice(&specs);
            prop_assert_eq!(&once_tables, &twice_tables);
            for (before, after) in once_cache.iter().zip(twice_cache.iter()) {
                prop_assert_eq!(&before.attributes, &after.attributes);
            }
        }

        #[test]
        fn prop_attributes_are_preserved(
            specs in prop::collection::vec(
                (any::<bool>(), prop::collection::vec((0usize..4, 0usize..3), 0..4)),
                0..8,
            )
        ) {
            let (cache, tables, _, _) = run_twice(&specs);
            for node in cache.iter() {
                let mut resolved: IndexMap<String, String> = IndexMap::new();
                let mut style = cache[node.id]
                    .attributes
                    .get(Namespace::Plain, STYLE_ATTRIBUTE)
                    .and_then(|s| s.strip_prefix(STYLE_PREFIX))
                    .map(str::to_string);
                while let Some(name) = style {
                    let definition = tables.styles.get(&name).unwrap();
                    for (key, value) in &definition.attributes {
                        resolved.entry(key.clone()).or_insert_with(|| value.clone());
                    }
                    style = definition.parent.clone();
                }
                for (namespace, key, value) in node.attributes.iter() {
                    if namespace != Namespace::Plain {
                        prop_assert!(resolved.insert(namespace.qualify(key), value.to_string()).is_none());
                    }
                }
                let (_, attrs) = &specs[node.id.index()];
                for (k, _) in attrs {
                    let qualified = format!("android:{}", KEYS[*k]);
                    prop_assert!(resolved.contains_key(&qualified));
                }
            }
        }
    }
}
