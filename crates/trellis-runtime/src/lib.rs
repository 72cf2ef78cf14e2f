//! Trellis Runtime - host application layer of the Trellis service framework.
//!
//! This crate provides:
//! - Application assembly and lifecycle orchestration ([`Application`],
//!   [`ApplicationBuilder`])
//! - Layered configuration loading (`config`)
//! - Logging setup (`logging`)
//! - Shared application state ([`SharedState`])
//! - HTTP serving with graceful shutdown (`server`)
//! - Built-in plugins behind cargo features (`plugins`)
//!
//! # Feature flags
//!
//! - `toml-config`: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output format
//! - `http-client`: built-in outbound HTTP client plugin
//!
//! ```ignore
//! use trellis_runtime::Application;
//!
//! #[tokio::main]
//! async fn main() -> trellis_runtime::RuntimeResult<()> {
//!     let mut app = Application::builder()
//!         .router(my_router())
//!         .build()?;
//!
//!     app.setup()?;
//!
//!     // Runs startup hooks, serves until Ctrl+C, then runs shutdown hooks
//!     app.run().await
//! }
//! ```

pub mod application;
pub mod builder;
pub mod config;
pub mod error;
pub mod logging;
pub mod plugins;
pub mod server;
pub mod state;

// Re-exports
pub use application::{Application, CONFIG_STATE_KEY};
pub use builder::ApplicationBuilder;
pub use config::{ConfigError, ConfigLoader, ConfigResult, Profile, RootConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::LoggingBuilder;
pub use state::SharedState;

// Re-exported for binaries that install their own subscriber
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::application::Application;
    pub use crate::builder::ApplicationBuilder;
    pub use crate::config::{ConfigLoader, RootConfig};
    pub use crate::error::{RuntimeError, RuntimeResult};
    pub use crate::state::SharedState;
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
