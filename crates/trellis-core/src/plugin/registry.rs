//! Typed plugin registry.
//!
//! Resolution is a deterministic map lookup from [`PluginId`] to
//! [`PluginDescriptor`] — there is no dynamic module loading. Descriptors
//! are registered either programmatically via [`PluginRegistry::register`]
//! or at link time through the [`PLUGIN_DESCRIPTORS`] distributed slice,
//! which crates providing built-in plugins contribute to.

use std::collections::HashMap;

use linkme::distributed_slice;
use tracing::warn;

use crate::plugin::descriptor::PluginDescriptor;
use crate::plugin::id::PluginId;

/// Static registration table for built-in plugins.
///
/// Each crate that ships a plugin contributes one factory entry:
///
/// ```rust,ignore
/// #[distributed_slice(PLUGIN_DESCRIPTORS)]
/// static HTTP_CLIENT: fn() -> PluginDescriptor = http_client_descriptor;
/// ```
#[distributed_slice]
pub static PLUGIN_DESCRIPTORS: [fn() -> PluginDescriptor];

/// Deterministic mapping from plugin identifier to descriptor.
///
/// The registry is built by the host and handed to the
/// [`PluginManager`](crate::manager::PluginManager) constructor — resolution
/// never consults ambient global state beyond what was registered here.
#[derive(Default)]
pub struct PluginRegistry {
    descriptors: HashMap<PluginId, PluginDescriptor>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated from the [`PLUGIN_DESCRIPTORS`]
    /// link-time table.
    pub fn with_registered() -> Self {
        let mut registry = Self::new();
        for make in PLUGIN_DESCRIPTORS {
            registry.register(make());
        }
        registry
    }

    /// Registers a descriptor. The last registration for an id wins.
    pub fn register(&mut self, descriptor: PluginDescriptor) -> &mut Self {
        let id = descriptor.id();
        if self.descriptors.insert(id, descriptor).is_some() {
            warn!(plugin = %id, "Duplicate plugin registration — last registration wins");
        }
        self
    }

    /// Resolves an identifier to its descriptor.
    pub fn resolve(&self, id: PluginId) -> Option<&PluginDescriptor> {
        self.descriptors.get(&id)
    }

    /// Returns `true` when a descriptor is registered for `id`.
    pub fn contains(&self, id: PluginId) -> bool {
        self.descriptors.contains_key(&id)
    }

    /// Returns the number of registered descriptors.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterates over the registered identifiers in arbitrary order.
    pub fn ids(&self) -> impl Iterator<Item = PluginId> + '_ {
        self.descriptors.keys().copied()
    }
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("ids", &self.descriptors.keys().collect::<Vec<_>>())
            .finish()
    }
}
