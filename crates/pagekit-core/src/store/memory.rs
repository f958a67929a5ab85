use std::collections::BTreeMap;

use super::KeyValueStore;
use crate::error::StoreError;

/// In-memory key-value store. Keys enumerate in sorted order.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.entries.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_delete() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a").unwrap(), None);

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));

        store.delete("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        // Deleting again is harmless
        store.delete("a").unwrap();
    }

    #[test]
    fn test_keys_with_prefix() {
        let mut store = MemoryStore::new();
        store.set("checkin_0_0", "true").unwrap();
        store.set("checkin_1_2", "false").unwrap();
        store.set("theme", "dark").unwrap();

        let keys = store.keys_with_prefix("checkin_").unwrap();
        assert_eq!(keys, vec!["checkin_0_0", "checkin_1_2"]);
        assert_eq!(store.len(), 3);
    }
}
