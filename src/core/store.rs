//! Result store - task name to published output for the current run

use serde_json::{Map, Value};
use std::collections::HashMap;

/// Run-scoped registry of completed task outputs
#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    results: HashMap<String, Value>,
    // Publication order, for snapshots
    order: Vec<String>,
}

impl ResultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a task's output, replacing any earlier value under that name
    pub fn publish(&mut self, name: &str, value: Value) {
        if self.results.insert(name.to_string(), value).is_none() {
            self.order.push(name.to_string());
        }
        log::debug!("Published result from {}", name);
    }

    /// Output of `name`, if it has published
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.results.get(name)
    }

    /// Check whether `name` has published
    pub fn has(&self, name: &str) -> bool {
        self.results.contains_key(name)
    }

    /// Number of published results
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Names in the order they first published
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Copy of all results as a JSON object
    pub fn snapshot(&self) -> Map<String, Value> {
        self.order
            .iter()
            .filter_map(|name| {
                self.results
                    .get(name)
                    .map(|value| (name.clone(), value.clone()))
            })
            .collect()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.results.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_and_get() {
        let mut store = ResultStore::new();
        assert!(!store.has("parser"));
        assert!(store.get("parser").is_none());

        store.publish("parser", json!({"name": "serum"}));
        assert!(store.has("parser"));
        assert_eq!(store.get("parser"), Some(&json!({"name": "serum"})));
    }

    #[test]
    fn test_publish_overwrites() {
        let mut store = ResultStore::new();
        store.publish("a", json!(1));
        store.publish("b", json!(2));
        store.publish("a", json!(3));

        assert_eq!(store.len(), 2);
        assert_eq!(store.get("a"), Some(&json!(3)));
        assert_eq!(store.names(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_clear() {
        let mut store = ResultStore::new();
        store.publish("a", json!(1));
        store.clear();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }
}
