//! Error types for the plugin lifecycle core.

use thiserror::Error;

use crate::plugin::PluginId;

/// Type-erased error returned by plugin factories and lifecycle hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised by the [`PluginManager`](crate::manager::PluginManager).
///
/// Every variant is fatal to the lifecycle operation that raised it; the
/// manager performs no retries and exposes no partial activation.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The named plugin is unknown to the registry, failed its capability
    /// check, or could not be constructed. Wraps the causal error when one
    /// exists.
    #[error("invalid plugin '{plugin}': {message}")]
    InvalidPlugin {
        /// The failing plugin.
        plugin: PluginId,
        /// Human-readable failure description.
        message: String,
        /// Causal error, when construction failed.
        #[source]
        source: Option<BoxError>,
    },

    /// The named plugin's own precondition check returned false.
    #[error("pre-conditions not met for plugin '{plugin}'")]
    PreconditionNotMet {
        /// The failing plugin.
        plugin: PluginId,
    },

    /// A plugin published a state whose key is already held by the manager.
    /// Indicates a plugin-authoring bug: two plugins (or one plugin across
    /// hooks) chose the same key.
    #[error("duplicate plugin state key '{key}'")]
    DuplicateStateKey {
        /// The colliding key.
        key: String,
    },

    /// `load()` was called before `attach_application_context()`.
    #[error("application context not attached; call attach_application_context() before load()")]
    ContextNotAttached,

    /// A lifecycle hook returned an error.
    #[error("plugin '{plugin}' failed during {hook}")]
    Hook {
        /// The failing plugin.
        plugin: PluginId,
        /// Which hook failed (`on_load`, `on_startup`, `on_shutdown`).
        hook: &'static str,
        /// The error the hook returned.
        #[source]
        source: BoxError,
    },
}

impl PluginError {
    /// Creates an [`PluginError::InvalidPlugin`] without a causal error.
    pub fn invalid_plugin(plugin: PluginId, message: impl Into<String>) -> Self {
        Self::InvalidPlugin {
            plugin,
            message: message.into(),
            source: None,
        }
    }

    /// Creates an [`PluginError::InvalidPlugin`] wrapping a causal error.
    pub fn invalid_plugin_with_source(
        plugin: PluginId,
        message: impl Into<String>,
        source: BoxError,
    ) -> Self {
        Self::InvalidPlugin {
            plugin,
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Result type for plugin manager operations.
pub type PluginResult<T> = Result<T, PluginError>;
