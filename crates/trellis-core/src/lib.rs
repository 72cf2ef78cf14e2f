//! # Trellis Core
//!
//! The plugin lifecycle core of the Trellis service framework.
//!
//! This crate owns the one component with real state-machine behaviour in a
//! Trellis application: the [`PluginManager`](manager::PluginManager), which
//! activates a declared subset of optional feature modules, validates that
//! each satisfies the [`Plugin`](plugin::Plugin) capability contract and its
//! own pre-conditions, loads it, aggregates the state it publishes, and
//! drives its startup/shutdown hooks in a deterministic order.
//!
//! Everything around it — configuration files, HTTP serving, logging setup —
//! lives in `trellis-runtime` and exchanges well-defined values with this
//! core: an [`AppContext`](context::AppContext) going in, and
//! [`PluginState`](plugin::PluginState)s coming out.
//!
//! ## Control flow
//!
//! ```text
//! ┌──────────────┐ activation list ┌───────────────┐ resolve ┌────────────────┐
//! │     Host     │────────────────►│ PluginManager │────────►│ PluginRegistry │
//! │ Application  │                 │               │◄────────│ (id → factory) │
//! │              │◄── states ──────│  load()       │         └────────────────┘
//! │ shared state │                 │  startup()    │──► hooks, in list order
//! └──────────────┘                 │  shutdown()   │
//!                                  └───────────────┘
//! ```

pub mod context;
pub mod error;
pub mod manager;
pub mod plugin;

pub use context::AppContext;
pub use error::{BoxError, PluginError, PluginResult};
pub use manager::PluginManager;

// Re-exported for downstream crates contributing to the plugin registration
// table via `#[distributed_slice]`.
pub use linkme;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::AppContext;
    pub use crate::error::{BoxError, PluginError, PluginResult};
    pub use crate::manager::PluginManager;
    pub use crate::plugin::{
        BoxedPlugin, Plugin, PluginDescriptor, PluginId, PluginRegistry, PluginState, StateValue,
    };
}
