//! Application context handed to plugin lifecycle hooks.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::plugin::PluginId;

/// Context describing the host application, passed by reference to every
/// plugin hook.
///
/// The manager treats this value opaquely: it is built once by the host,
/// attached via
/// [`PluginManager::attach_application_context`](crate::manager::PluginManager::attach_application_context),
/// and never mutated afterwards. Plugins read their own raw config section
/// from it and publish results back through the
/// [`PluginState`](crate::plugin::PluginState) channel.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(serde::Deserialize, Default)]
/// struct HttpClientConfig { timeout_secs: u64 }
///
/// fn on_load(&self, app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
///     let cfg: HttpClientConfig = app.get_config(PluginId::HttpClient)?;
///     // …
/// }
/// ```
#[derive(Clone, Debug)]
pub struct AppContext {
    service_name: String,
    service_namespace: String,
    environment: String,
    version: String,
    /// Per-plugin raw config sections, keyed by plugin id.
    plugin_configs: HashMap<PluginId, Arc<Value>>,
}

impl AppContext {
    /// Creates a context for the named service with no plugin config sections.
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            service_namespace: String::new(),
            environment: String::new(),
            version: String::new(),
            plugin_configs: HashMap::new(),
        }
    }

    /// Sets the service namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.service_namespace = namespace.into();
        self
    }

    /// Sets the deployment environment name.
    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    /// Sets the service version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Attaches the raw config section for one plugin.
    pub fn with_plugin_config(mut self, id: PluginId, config: Value) -> Self {
        self.plugin_configs.insert(id, Arc::new(config));
        self
    }

    /// Returns the service name.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns the service namespace.
    pub fn service_namespace(&self) -> &str {
        &self.service_namespace
    }

    /// Returns the deployment environment name.
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Returns the service version.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns the raw config section for `id`, or an empty JSON object when
    /// the section is absent.
    pub fn plugin_config(&self, id: PluginId) -> Arc<Value> {
        self.plugin_configs
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Arc::new(Value::Object(Map::new())))
    }

    /// Deserialises the config section for `id` into `T`.
    ///
    /// Returns `Err` when the section is missing required fields or has the
    /// wrong shape; use `#[serde(default)]` on the struct to make all fields
    /// optional.
    pub fn get_config<T>(&self, id: PluginId) -> serde_json::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        T::deserialize(self.plugin_config(id).as_ref())
    }
}
