//! Name-keyed table with insertion deduplicated by value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Generated name to definition, in insertion order.
///
/// Inserting a value already present returns its existing name. A new value
/// whose generated name is taken gets the first free `_1`, `_2`... suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for Table<V> {
    fn default() -> Self {
        Self { entries: IndexMap::new() }
    }
}

impl<V: PartialEq> Table<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `value` under a name derived from `base`, or return the name
    /// it already has.
    pub fn intern(&mut self, base: &str, value: V) -> String {
        if let Some(name) = self.name_of(&value) {
            return name.to_string();
        }
        let name = self.unique_name(base);
        self.entries.insert(name.clone(), value);
        name
    }

    /// Name of an existing value.
    pub fn name_of(&self, value: &V) -> Option<&str> {
        self.entries.iter().find(|(_, v)| *v == value).map(|(k, _)| k.as_str())
    }

    /// `base` when free, else `base_N` for the smallest free N.
    pub fn unique_name(&self, base: &str) -> String {
        if !self.entries.contains_key(base) {
            return base.to_string();
        }
        let mut suffix = 1;
        loop {
            let candidate = format!("{base}_{suffix}");
            if !self.entries.contains_key(&candidate) {
                warn!(name = base, resolved = %candidate, "resource name collision, suffixing");
                return candidate;
            }
            suffix += 1;
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_collision_suffixes() {
        let mut table = Table::new();
        assert_eq!(table.intern("hello", "Hello".to_string()), "hello");
        assert_eq!(table.intern("hello", "hello!".to_string()), "hello_1");
        assert_eq!(table.intern("hello", "HELLO".to_string()), "hello_2");
        assert_eq!(table.intern("hello", "hello!".to_string()), "hello_1");
        assert_eq!(table.len(), 3);
    }

    proptest! {
        #[test]
        fn prop_same_value_same_name(value in "[a-z ]{0,12}", base in "[a-z]{1,4}") {
            let mut table = Table::new();
            let first = table.intern(&base, value.clone());
            let second = table.intern(&base, value);
            prop_assert_eq!(first, second);
            prop_assert_eq!(table.len(), 1);
        }

        #[test]
        fn prop_distinct_values_distinct_names(a in "[a-z]{1,8}", b in "[a-z]{1,8}", base in "[a-z]{1,4}") {
            prop_assume!(a != b);
            let mut table = Table::new();
            let first = table.intern(&base, a);
            let second = table.intern(&base, b);
            prop_assert_ne!(first, second);
        }
    }
}
