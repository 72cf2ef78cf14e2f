//! Outbound HTTP client plugin.
//!
//! Builds a shared [`reqwest::Client`] during `on_load` and publishes it
//! under [`HTTP_CLIENT_STATE_KEY`]. Handlers retrieve it from the shared
//! state:
//!
//! ```rust,ignore
//! let client = state.get::<reqwest::Client>(HTTP_CLIENT_STATE_KEY);
//! ```
//!
//! Configured from the `[plugins.http_client]` section:
//!
//! ```toml
//! [plugins.http_client]
//! timeout_secs = 30
//! connect_timeout_secs = 10
//! user_agent = "orders-service/1.2"
//! ```

use std::time::Duration;

use linkme::distributed_slice;
use serde::Deserialize;
use tracing::debug;
use trellis_core::error::BoxError;
use trellis_core::plugin::{
    PLUGIN_DESCRIPTORS, Plugin, PluginDescriptor, PluginId, PluginState,
};
use trellis_core::AppContext;

/// State key under which the client is published.
pub const HTTP_CLIENT_STATE_KEY: &str = "http_client";

/// Settings for the outbound HTTP client.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpClientSettings {
    /// Total request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
    /// User-Agent header; defaults to the service name when empty.
    pub user_agent: String,
}

impl Default for HttpClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            connect_timeout_secs: 10,
            user_agent: String::new(),
        }
    }
}

/// Plugin providing a shared outbound HTTP client.
pub struct HttpClientPlugin;

impl Plugin for HttpClientPlugin {
    fn on_load(&self, app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
        let settings: HttpClientSettings = app.get_config(PluginId::HttpClient)?;

        let user_agent = if settings.user_agent.is_empty() {
            format!("{}/{}", app.service_name(), app.version())
        } else {
            settings.user_agent.clone()
        };

        debug!(
            timeout_secs = settings.timeout_secs,
            user_agent = %user_agent,
            "Building outbound HTTP client"
        );

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .user_agent(user_agent)
            .build()?;

        Ok(vec![PluginState::new(HTTP_CLIENT_STATE_KEY, client)])
    }
}

/// Descriptor registered in the link-time table.
fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new(PluginId::HttpClient, || Ok(Box::new(HttpClientPlugin)))
}

#[distributed_slice(PLUGIN_DESCRIPTORS)]
static HTTP_CLIENT: fn() -> PluginDescriptor = descriptor;
