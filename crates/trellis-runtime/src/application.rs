//! Host application orchestration.
//!
//! [`Application`] ties the pieces together: it loads configuration, builds
//! the [`AppContext`] handed to plugins, drives the plugin lifecycle through
//! a [`PluginManager`], imports published plugin states into the
//! [`SharedState`] exposed to request handlers, and serves the HTTP router.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use trellis_runtime::Application;
//!
//! let mut app = Application::builder()
//!     .router(my_router())
//!     .build()?;
//! app.setup()?;
//! app.run().await?;
//! ```

use std::sync::Arc;

use axum::{Extension, Router};
use tracing::{debug, info};
use trellis_core::plugin::PluginId;
use trellis_core::{AppContext, PluginManager};

use crate::builder::ApplicationBuilder;
use crate::config::RootConfig;
use crate::error::RuntimeResult;
use crate::server;
use crate::state::SharedState;

/// State key under which the application publishes its own configuration.
pub const CONFIG_STATE_KEY: &str = "config";

/// A configured host application.
///
/// Lifecycle, in order: [`setup`](Self::setup) (sync, validates and loads
/// every activated plugin), then [`run`](Self::run) (async, startup hooks,
/// serving, shutdown hooks). [`ApplicationBuilder`] produces one via
/// [`Application::builder`].
#[derive(Debug)]
pub struct Application {
    config: RootConfig,
    context: Arc<AppContext>,
    plugin_manager: PluginManager,
    state: SharedState,
    router: Router,
}

impl Application {
    /// Returns a builder for assembling an application.
    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    pub(crate) fn from_parts(
        config: RootConfig,
        context: Arc<AppContext>,
        plugin_manager: PluginManager,
        router: Router,
    ) -> Self {
        Self {
            config,
            context,
            plugin_manager,
            state: SharedState::new(),
            router,
        }
    }

    /// Returns the loaded configuration.
    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Returns the application context handed to plugins.
    pub fn context(&self) -> &Arc<AppContext> {
        &self.context
    }

    /// Returns the shared state store.
    pub fn state(&self) -> &SharedState {
        &self.state
    }

    /// Returns the plugin activation list, in processing order.
    pub fn plugin_activation(&self) -> &[PluginId] {
        self.plugin_manager.activation_list()
    }

    /// Validates and loads every activated plugin.
    ///
    /// Seeds the shared state with the application configuration under
    /// [`CONFIG_STATE_KEY`], then runs the load phase of the plugin
    /// lifecycle and imports whatever the plugins published. Fail-fast: any
    /// plugin failing validation or load aborts the whole setup.
    pub fn setup(&mut self) -> RuntimeResult<&mut Self> {
        info!(
            service = %self.config.application.service_name,
            environment = %self.config.application.environment,
            "Setting up application"
        );

        self.state
            .insert_value(CONFIG_STATE_KEY, self.config.clone())?;

        self.plugin_manager
            .attach_application_context(Arc::clone(&self.context))
            .load()?;
        self.import_plugin_states()?;

        Ok(self)
    }

    /// Runs the startup phase of the plugin lifecycle.
    pub async fn start(&mut self) -> RuntimeResult<&mut Self> {
        self.plugin_manager.trigger_startup().await?;
        self.import_plugin_states()?;
        Ok(self)
    }

    /// Runs the shutdown phase of the plugin lifecycle.
    ///
    /// Best-effort: individual plugin failures are logged, never raised.
    pub async fn stop(&mut self) {
        self.plugin_manager.trigger_shutdown().await;
        info!("Application stopped");
    }

    /// Runs the application until a shutdown signal is received.
    ///
    /// Equivalent to [`run_until`](Self::run_until) with the default signal
    /// handler (Ctrl+C, or SIGTERM on Unix).
    pub async fn run(&mut self) -> RuntimeResult<()> {
        self.run_until(server::wait_for_shutdown()).await
    }

    /// Runs the application until `shutdown` resolves.
    ///
    /// Triggers plugin startup, serves the router with the shared state
    /// attached as an [`Extension`], and triggers plugin shutdown once the
    /// server has drained.
    pub async fn run_until<F>(&mut self, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        self.start().await?;

        let router = self
            .router
            .clone()
            .layer(Extension(self.state.clone()));

        let result = server::serve(&self.config.server, router, shutdown).await;

        self.stop().await;
        result
    }

    /// Drains the plugin manager's accumulated states into the shared state.
    ///
    /// Each key is claimed exactly once across the application's lifetime;
    /// a collision with an existing shared-state entry is fatal.
    fn import_plugin_states(&mut self) -> RuntimeResult<()> {
        let states: Vec<_> = self.plugin_manager.states().values().cloned().collect();
        for plugin_state in states {
            debug!(key = plugin_state.key(), "Importing plugin state");
            self.state.insert(plugin_state)?;
        }
        self.plugin_manager.clear_states();
        Ok(())
    }
}
