//! Shared application state.
//!
//! [`SharedState`] is the key-value store the host application exposes to
//! request handlers. Plugins never write to it directly; the application
//! drains the states they publish through the plugin manager and inserts
//! them here, so every key in the store traces back to exactly one producer.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use trellis_core::plugin::{PluginState, StateValue};

use crate::error::{RuntimeError, RuntimeResult};

/// A thread-safe, heterogeneous key-value store shared across the
/// application.
///
/// Cloning is cheap; all clones point at the same underlying map.
#[derive(Clone, Default)]
pub struct SharedState {
    inner: Arc<RwLock<HashMap<String, StateValue>>>,
}

impl SharedState {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a plugin-published state.
    ///
    /// Fails if the key is already present; keys are claimed exactly once.
    pub fn insert(&self, state: PluginState) -> RuntimeResult<()> {
        let mut map = self.inner.write();
        let key = state.key().to_string();
        if map.contains_key(&key) {
            return Err(RuntimeError::StateKeyExists(key));
        }
        map.insert(key, state.value().clone());
        Ok(())
    }

    /// Inserts a value under a key directly.
    pub fn insert_value<T: Any + Send + Sync>(
        &self,
        key: impl Into<String>,
        value: T,
    ) -> RuntimeResult<()> {
        let key = key.into();
        let mut map = self.inner.write();
        if map.contains_key(&key) {
            return Err(RuntimeError::StateKeyExists(key));
        }
        map.insert(key, Arc::new(value));
        Ok(())
    }

    /// Returns the value under `key` downcast to `T`, if present and of
    /// that type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        let map = self.inner.read();
        let value = map.get(key)?.clone();
        value.downcast::<T>().ok()
    }

    /// Returns the raw type-erased value under `key`.
    pub fn raw(&self, key: &str) -> Option<StateValue> {
        self.inner.read().get(key).cloned()
    }

    /// Returns whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Returns whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl std::fmt::Debug for SharedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let map = self.inner.read();
        f.debug_struct("SharedState")
            .field("keys", &map.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let state = SharedState::new();
        state.insert_value("answer", 42u32).unwrap();

        assert_eq!(state.get::<u32>("answer").as_deref(), Some(&42));
        assert!(state.get::<String>("answer").is_none());
        assert!(state.get::<u32>("missing").is_none());
    }

    #[test]
    fn test_duplicate_key_is_rejected() {
        let state = SharedState::new();
        state.insert_value("k", 1u8).unwrap();

        let err = state.insert_value("k", 2u8).unwrap_err();
        assert!(matches!(err, RuntimeError::StateKeyExists(key) if key == "k"));
        assert_eq!(state.get::<u8>("k").as_deref(), Some(&1));
    }

    #[test]
    fn test_clones_share_storage() {
        let state = SharedState::new();
        let clone = state.clone();
        state.insert_value("shared", "yes".to_string()).unwrap();

        assert!(clone.contains_key("shared"));
        assert_eq!(clone.len(), 1);
    }

    #[test]
    fn test_insert_plugin_state_preserves_value() {
        let state = SharedState::new();
        let value = Arc::new(vec![1u64, 2, 3]);
        state
            .insert(PluginState::from_value("numbers", value.clone()))
            .unwrap();

        let stored = state.get::<Vec<u64>>("numbers").unwrap();
        assert!(Arc::ptr_eq(&stored, &value));
    }
}
