//! Plugin system for the Trellis framework.
//!
//! # Architecture
//!
//! Plugins are optional feature modules activated by name. Each plugin is a
//! concrete type implementing the [`Plugin`] capability contract — four
//! lifecycle hooks the [`PluginManager`](crate::manager::PluginManager)
//! drives in a deterministic order.
//!
//! A [`PluginDescriptor`] binds a [`PluginId`] to a factory; a
//! [`PluginRegistry`] is the deterministic identifier → descriptor map the
//! manager resolves against. Plugins publish data to the rest of the
//! application through [`PluginState`] values returned from their hooks.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use trellis_core::prelude::*;
//!
//! struct CachePlugin;
//!
//! #[async_trait::async_trait]
//! impl Plugin for CachePlugin {
//!     fn on_load(&self, app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
//!         Ok(vec![PluginState::new("cache", Cache::open(app.service_name())?)])
//!     }
//! }
//! ```

pub mod core;
pub mod descriptor;
pub mod id;
pub mod registry;
pub mod state;

pub use core::{BoxedPlugin, Plugin};
pub use descriptor::{PluginDescriptor, PluginFactory, TRELLIS_PLUGIN_API_VERSION};
pub use id::PluginId;
pub use registry::{PLUGIN_DESCRIPTORS, PluginRegistry};
pub use state::{PluginState, StateValue};
