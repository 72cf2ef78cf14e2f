//! Built-in plugins.
//!
//! Each built-in plugin lives behind a cargo feature and contributes its
//! descriptor to the link-time registration table, so enabling the feature
//! is all it takes for [`PluginRegistry::with_registered`] to see it.
//!
//! [`PluginRegistry::with_registered`]: trellis_core::plugin::PluginRegistry::with_registered

#[cfg(feature = "http-client")]
pub mod http_client;
