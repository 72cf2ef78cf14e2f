//! Configuration schema definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use trellis_core::plugin::PluginId;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RootConfig {
    /// Service identity, mainly used for reporting and monitoring.
    #[serde(default)]
    pub application: ApplicationConfig,

    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Development-only toggles.
    #[serde(default)]
    pub development: DevelopmentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Plugin activation list and per-plugin sections.
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// Service identity configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Service name.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Service namespace (grouping for monitoring).
    #[serde(default = "default_namespace")]
    pub service_namespace: String,

    /// Deployed environment.
    #[serde(default)]
    pub environment: Environment,

    /// One-line service description.
    #[serde(default)]
    pub description: String,

    /// Service version string.
    #[serde(default = "default_version")]
    pub version: String,

    /// Root path the service is mounted under (empty for `/`).
    #[serde(default)]
    pub root_path: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            service_namespace: default_namespace(),
            environment: Environment::default(),
            description: String::new(),
            version: default_version(),
            root_path: String::new(),
        }
    }
}

fn default_service_name() -> String {
    "trellis-service".to_string()
}

fn default_namespace() -> String {
    "default".to_string()
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// Deployment environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Local development (default).
    #[default]
    Development,
    /// Pre-production staging.
    Staging,
    /// Production.
    Production,
}

impl Environment {
    /// Returns the environment name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    /// Returns the `host:port` bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

/// Development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DevelopmentConfig {
    /// Debug mode: more verbose errors, no effect in production.
    #[serde(default)]
    pub debug: bool,
}

/// Log verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level (default).
    #[default]
    Info,
    /// Warn level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the level as a lowercase string usable in filter directives.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Single-line compact output (default).
    #[default]
    Compact,
    /// Default `tracing` full output.
    Full,
    /// Multi-line human-oriented output.
    Pretty,
    /// Newline-delimited JSON (requires the `json-log` feature).
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogOutput {
    /// Standard output (default).
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
    /// A log file; requires `file_path`.
    File,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoggingConfig {
    /// Base log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module level overrides, e.g. `{ "trellis_core": "debug" }`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,
}

/// Plugin activation and per-plugin configuration.
///
/// ```toml
/// [plugins]
/// activate = ["http_client"]
///
/// [plugins.http_client]
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PluginsConfig {
    /// Plugins to activate, in activation order.
    #[serde(default)]
    pub activate: Vec<PluginId>,

    /// Raw per-plugin sections, keyed by plugin name.
    #[serde(flatten)]
    pub sections: HashMap<String, Value>,
}

impl PluginsConfig {
    /// Returns the raw section for a plugin, if present.
    pub fn section(&self, id: PluginId) -> Option<&Value> {
        self.sections.get(id.as_str())
    }
}
