//! Application builder.

use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use trellis_core::plugin::{PluginDescriptor, PluginId, PluginRegistry};
use trellis_core::{AppContext, PluginManager};

use crate::application::Application;
use crate::config::{ConfigLoader, RootConfig};
use crate::error::RuntimeResult;
use crate::logging;

/// Builder for assembling an [`Application`].
///
/// # Example
///
/// ```rust,ignore
/// let app = Application::builder()
///     .config_file("config/production.toml")
///     .activate(vec![PluginId::HttpClient])
///     .router(my_router())
///     .build()?;
/// ```
pub struct ApplicationBuilder {
    config_loader: ConfigLoader,
    config: Option<RootConfig>,
    registry: Option<PluginRegistry>,
    extra_plugins: Vec<PluginDescriptor>,
    activate: Option<Vec<PluginId>>,
    router: Router,
    init_logging: bool,
}

impl ApplicationBuilder {
    /// Creates a builder with default configuration discovery.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new().with_current_dir(),
            config: None,
            registry: None,
            extra_plugins: Vec::new(),
            activate: None,
            router: Router::new(),
            init_logging: true,
        }
    }

    /// Uses a pre-loaded configuration instead of discovering one.
    pub fn with_config(mut self, config: RootConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<std::path::Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g. "production").
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Replaces the plugin registry.
    ///
    /// By default the registry is populated from the link-time registration
    /// table ([`PluginRegistry::with_registered`]).
    pub fn with_registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Registers an additional plugin descriptor on top of the registry.
    pub fn add_plugin(mut self, descriptor: PluginDescriptor) -> Self {
        self.extra_plugins.push(descriptor);
        self
    }

    /// Overrides the activation list from the configuration.
    pub fn activate(mut self, plugins: Vec<PluginId>) -> Self {
        self.activate = Some(plugins);
        self
    }

    /// Sets the HTTP router served by the application.
    pub fn router(mut self, router: Router) -> Self {
        self.router = router;
        self
    }

    /// Skips global logging initialization.
    ///
    /// Useful in tests or when the binary installs its own subscriber.
    pub fn without_logging(mut self) -> Self {
        self.init_logging = false;
        self
    }

    /// Builds the application.
    ///
    /// Loads configuration (unless one was supplied), initializes logging,
    /// derives the [`AppContext`] and activation list, and wires up the
    /// plugin manager. Plugin validation itself happens later, in
    /// [`Application::setup`].
    pub fn build(self) -> RuntimeResult<Application> {
        let config = match self.config {
            Some(config) => config,
            None => self.config_loader.load()?,
        };

        if self.init_logging {
            logging::init_from_config(&config.logging);
        }

        let mut registry = self
            .registry
            .unwrap_or_else(PluginRegistry::with_registered);
        for descriptor in self.extra_plugins {
            registry.register(descriptor);
        }

        let activate = self
            .activate
            .unwrap_or_else(|| config.plugins.activate.clone());

        let context = Arc::new(build_context(&config));
        let manager = PluginManager::new(registry, activate);

        Ok(Application::from_parts(config, context, manager, self.router))
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives the plugin-facing context from the loaded configuration.
fn build_context(config: &RootConfig) -> AppContext {
    let mut context = AppContext::new(config.application.service_name.clone())
        .with_namespace(config.application.service_namespace.clone())
        .with_environment(config.application.environment.as_str())
        .with_version(config.application.version.clone());

    for id in PluginId::ALL {
        if let Some(section) = config.plugins.section(id) {
            context = context.with_plugin_config(id, Value::clone(section));
        }
    }

    context
}
