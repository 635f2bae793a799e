//! Namespaced attribute store attached to every node.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Attribute namespace of the target markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Platform attributes (`android:`).
    Android,
    /// Extended-platform attributes from support libraries (`app:`).
    App,
    /// Unprefixed attributes such as `style`.
    Plain,
}

impl Namespace {
    pub fn prefix(&self) -> Option<&'static str> {
        match self {
            Self::Android => Some("android"),
            Self::App => Some("app"),
            Self::Plain => None,
        }
    }

    /// Qualified attribute name (`android:text`, `style`).
    pub fn qualify(&self, key: &str) -> String {
        match self.prefix() {
            Some(prefix) => format!("{prefix}:{key}"),
            None => key.to_string(),
        }
    }
}

/// Attribute key/value pairs grouped by namespace, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeStore {
    namespaces: IndexMap<Namespace, IndexMap<String, String>>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write an attribute. With `overwrite == false` an existing value is
    /// preserved. Returns the value stored afterwards.
    pub fn put(
        &mut self,
        namespace: Namespace,
        key: impl Into<String>,
        value: impl Into<String>,
        overwrite: bool,
    ) -> &str {
        let entries = self.namespaces.entry(namespace).or_default();
        let key = key.into();
        if overwrite || !entries.contains_key(&key) {
            entries.insert(key.clone(), value.into());
        }
        entries.get(&key).map(String::as_str).unwrap_or_default()
    }

    /// Overwriting write.
    pub fn set(&mut self, namespace: Namespace, key: impl Into<String>, value: impl Into<String>) {
        self.put(namespace, key, value, true);
    }

    /// Preserving write.
    pub fn set_if_absent(&mut self, namespace: Namespace, key: impl Into<String>, value: impl Into<String>) {
        self.put(namespace, key, value, false);
    }

    pub fn get(&self, namespace: Namespace, key: &str) -> Option<&str> {
        self.namespaces.get(&namespace)?.get(key).map(String::as_str)
    }

    pub fn contains(&self, namespace: Namespace, key: &str) -> bool {
        self.get(namespace, key).is_some()
    }

    /// Remove an attribute, returning its value.
    pub fn remove(&mut self, namespace: Namespace, key: &str) -> Option<String> {
        self.namespaces.get_mut(&namespace)?.shift_remove(key)
    }

    /// Iterate one namespace in insertion order.
    pub fn namespace(&self, namespace: Namespace) -> impl Iterator<Item = (&str, &str)> {
        self.namespaces
            .get(&namespace)
            .into_iter()
            .flat_map(|entries| entries.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    /// Iterate all attributes as `(namespace, key, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (Namespace, &str, &str)> {
        self.namespaces.iter().flat_map(|(ns, entries)| {
            entries.iter().map(move |(k, v)| (*ns, k.as_str(), v.as_str()))
        })
    }

    pub fn len(&self) -> usize {
        self.namespaces.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_policy() {
        let mut store = AttributeStore::new();
        store.set(Namespace::Android, "text", "a");
        assert_eq!(store.put(Namespace::Android, "text", "b", false), "a");
        assert_eq!(store.put(Namespace::Android, "text", "c", true), "c");
        store.set_if_absent(Namespace::App, "layout_constraintTop_toTopOf", "parent");
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove(Namespace::Android, "text").as_deref(), Some("c"));
        assert!(!store.contains(Namespace::Android, "text"));
    }

    #[test]
    fn test_qualify() {
        assert_eq!(Namespace::Android.qualify("id"), "android:id");
        assert_eq!(Namespace::Plain.qualify("style"), "style");
    }
}
