//! Name → value lookup tables
//!
//! Registries are owned by the caller (or by an [`AnchorSet`](crate::AnchorSet))
//! rather than living in global state. Registering a name that already exists
//! replaces the earlier entry.

use rustc_hash::FxHashMap;

/// A caller-owned name registry with last-write-wins semantics
#[derive(Clone, Debug)]
pub struct Registry<V> {
    entries: FxHashMap<String, V>,
}

impl<V> Default for Registry<V> {
    fn default() -> Self {
        Self {
            entries: FxHashMap::default(),
        }
    }
}

impl<V> Registry<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `value` under `name`, returning the value it replaced
    pub fn register(&mut self, name: impl Into<String>, value: V) -> Option<V> {
        let name = name.into();
        let previous = self.entries.insert(name.clone(), value);
        if previous.is_some() {
            tracing::debug!("Registry: '{}' re-registered, previous entry replaced", name);
        }
        previous
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut V> {
        self.entries.get_mut(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<V> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<V: PartialEq> Registry<V> {
    /// Remove `name` only while it still maps to `value`
    pub fn remove_if(&mut self, name: &str, value: &V) -> bool {
        if self.entries.get(name) == Some(value) {
            self.entries.remove(name);
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut registry = Registry::new();
        assert_eq!(registry.register("hero", 1), None);
        assert_eq!(registry.register("hero", 2), Some(1));
        assert_eq!(registry.get("hero"), Some(&2));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_remove_if_guards_replaced_entries() {
        let mut registry = Registry::new();
        registry.register("hero", 1);
        registry.register("hero", 2);
        assert!(!registry.remove_if("hero", &1));
        assert!(registry.contains("hero"));
        assert!(registry.remove_if("hero", &2));
        assert!(registry.is_empty());
    }
}
