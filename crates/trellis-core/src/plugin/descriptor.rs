//! Plugin descriptor — the factory record a registry hands to the manager.

use crate::error::BoxError;
use crate::plugin::core::BoxedPlugin;
use crate::plugin::id::PluginId;

/// Current Trellis plugin API version (1.0).
pub const TRELLIS_PLUGIN_API_VERSION: u32 = 0x0001_0000;

/// Factory producing a live plugin instance.
///
/// Construction may fail (missing system resource, bad build-time state);
/// the failure is surfaced as an "invalid plugin" error with the cause
/// attached, never silently dropped.
pub type PluginFactory = Box<dyn Fn() -> Result<BoxedPlugin, BoxError> + Send + Sync>;

/// Identifies and instantiates a plugin.
///
/// A descriptor is the registry's unit of registration: it binds a
/// [`PluginId`] to a factory plus the plugin API version the factory was
/// compiled against. The manager resolves an activation list to descriptors,
/// checks each descriptor's compatibility, and calls
/// [`instantiate`](Self::instantiate) exactly once per `load()`.
pub struct PluginDescriptor {
    api_version: u32,
    id: PluginId,
    create: PluginFactory,
}

impl PluginDescriptor {
    /// Creates a descriptor for `id` with the current API version.
    pub fn new<F>(id: PluginId, create: F) -> Self
    where
        F: Fn() -> Result<BoxedPlugin, BoxError> + Send + Sync + 'static,
    {
        Self {
            api_version: TRELLIS_PLUGIN_API_VERSION,
            id,
            create: Box::new(create),
        }
    }

    /// Overrides the API version this descriptor claims to be compiled
    /// against. Mainly useful for compatibility testing.
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Returns the plugin identifier this descriptor resolves.
    pub fn id(&self) -> PluginId {
        self.id
    }

    /// Returns the plugin API version this descriptor was compiled against.
    pub fn api_version(&self) -> u32 {
        self.api_version
    }

    /// Returns `true` if this descriptor's API version is compatible with
    /// the running framework.
    ///
    /// The major part must match exactly; the descriptor's minor part must
    /// be ≤ the host's minor part.
    pub fn is_compatible(&self) -> bool {
        let host_major = TRELLIS_PLUGIN_API_VERSION >> 16;
        let host_minor = TRELLIS_PLUGIN_API_VERSION & 0xFFFF;
        let desc_major = self.api_version >> 16;
        let desc_minor = self.api_version & 0xFFFF;
        desc_major == host_major && desc_minor <= host_minor
    }

    /// Creates the live plugin from the factory function.
    pub(crate) fn instantiate(&self) -> Result<BoxedPlugin, BoxError> {
        (self.create)()
    }
}

impl std::fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("api_version", &format_args!("{:#010x}", self.api_version))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::core::Plugin;

    struct NoopPlugin;
    impl Plugin for NoopPlugin {}

    fn descriptor() -> PluginDescriptor {
        PluginDescriptor::new(PluginId::HttpClient, || Ok(Box::new(NoopPlugin)))
    }

    #[test]
    fn test_current_version_is_compatible() {
        assert!(descriptor().is_compatible());
    }

    #[test]
    fn test_older_minor_is_compatible() {
        assert!(descriptor().with_api_version(0x0001_0000).is_compatible());
    }

    #[test]
    fn test_newer_minor_is_rejected() {
        assert!(!descriptor().with_api_version(0x0001_0001).is_compatible());
    }

    #[test]
    fn test_other_major_is_rejected() {
        assert!(!descriptor().with_api_version(0x0002_0000).is_compatible());
        assert!(!descriptor().with_api_version(0x0000_0000).is_compatible());
    }
}
