use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::StateStore;
use crate::error::StoreError;

/// Process-local store. Clones share the same map, which lets a test "restart"
/// an engine by building a new one over the same store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Backend("memory store poisoned".into()))
    }
}

impl StateStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_entries() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.set_raw("k", "v").unwrap();
        assert_eq!(other.get_raw("k").unwrap().as_deref(), Some("v"));
    }
}
