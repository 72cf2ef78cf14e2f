//! Configuration loading and schema for Trellis applications.
//!
//! Configuration comes from layered sources (defaults, files, environment
//! variables, programmatic overrides); see [`ConfigLoader`] for the layering
//! rules and [`RootConfig`] for the schema.

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    ApplicationConfig, DevelopmentConfig, Environment, LogFormat, LogLevel, LogOutput,
    LoggingConfig, PluginsConfig, RootConfig, ServerConfig,
};
