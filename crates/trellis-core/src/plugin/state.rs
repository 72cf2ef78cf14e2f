//! Shared state published by plugins.

use std::any::Any;
use std::borrow::Cow;
use std::sync::Arc;

/// Type alias for the heterogeneous values stored in plugin states and the
/// host application's shared state map.
///
/// The inner `dyn Any` is an `Arc<T>` upcast to `Any` by [`PluginState::new`].
/// Consumers downcast it back with [`PluginState::downcast`] or
/// equivalent helpers on the host side.
pub type StateValue = Arc<dyn Any + Send + Sync>;

/// An immutable key/value pair a plugin emits to publish data (a client
/// handle, a connection pool, …) to the host application and other plugins.
///
/// Created by a plugin during `on_load` or `on_startup`; owned by the
/// [`PluginManager`](crate::manager::PluginManager) until the host drains it
/// via `clear_states`. Keys must be unique across everything the manager
/// currently holds — a duplicate key is a fatal configuration error.
#[derive(Clone)]
pub struct PluginState {
    key: Cow<'static, str>,
    value: StateValue,
}

impl PluginState {
    /// Creates a state entry from a key and any sendable value.
    pub fn new<T>(key: impl Into<Cow<'static, str>>, value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            key: key.into(),
            value: Arc::new(value),
        }
    }

    /// Creates a state entry from an already type-erased value.
    pub fn from_value(key: impl Into<Cow<'static, str>>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Returns the state key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the type-erased value.
    pub fn value(&self) -> &StateValue {
        &self.value
    }

    /// Attempts to recover the typed `Arc<T>` behind this state.
    ///
    /// Returns `None` when `T` does not match the published type.
    pub fn downcast<T>(&self) -> Option<Arc<T>>
    where
        T: Any + Send + Sync,
    {
        Arc::downcast(Arc::clone(&self.value)).ok()
    }
}

impl std::fmt::Debug for PluginState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginState")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
