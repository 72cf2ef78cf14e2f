//! # Trellis
//!
//! A plugin-based application bootstrapping framework for Rust web services.
//!
//! ## Overview
//!
//! Trellis factors the repetitive part of standing up a service — loading
//! configuration, wiring logging, constructing shared clients, running
//! startup and shutdown hooks in the right order — into a small set of
//! optional plugins driven by one lifecycle manager.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  config   ┌──────────────┐  activation   ┌───────────────┐
//! │ ConfigLoader│──────────▶│ Application  │──────────────▶│ PluginManager │
//! └─────────────┘           │              │◀── states ────│  load/startup │
//!                           │ SharedState  │               │  /shutdown    │
//!                           │ axum Router  │               └───────────────┘
//!                           └──────────────┘
//! ```
//!
//! - **Plugins**: optional feature modules implementing the
//!   [`Plugin`](trellis_core::plugin::Plugin) lifecycle contract
//! - **PluginManager**: validates, loads, and drives plugins in a
//!   deterministic order
//! - **Application**: the host; drains plugin states into the shared state
//!   handed to request handlers and serves the router
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use trellis::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> RuntimeResult<()> {
//!     let mut app = Application::builder()
//!         .router(axum::Router::new())
//!         .build()?;
//!
//!     app.setup()?;
//!     app.run().await
//! }
//! ```
//!
//! ## Features
//!
//! - `toml-config` (default): TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output
//! - `http-client`: built-in outbound HTTP client plugin

pub use trellis_core as core;
pub use trellis_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    // Host application - main entry point
    pub use trellis_runtime::{Application, ApplicationBuilder, RuntimeError, RuntimeResult};

    // Configuration
    pub use trellis_runtime::{ConfigLoader, RootConfig};

    // Shared state handed to request handlers
    pub use trellis_runtime::SharedState;

    // Plugin contract - for writing custom plugins
    pub use trellis_core::plugin::{
        Plugin, PluginDescriptor, PluginId, PluginRegistry, PluginState,
    };
    pub use trellis_core::{AppContext, BoxError, PluginError, PluginManager, PluginResult};
}
