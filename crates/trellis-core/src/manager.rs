//! Plugin lifecycle management.
//!
//! [`PluginManager`] is the central owner of activated plugins. It:
//!
//! - Resolves an ordered activation list of [`PluginId`]s against a
//!   [`PluginRegistry`], validating each descriptor's capability
//!   compatibility and each plugin's own pre-conditions before anything is
//!   loaded. Validation is fail-fast: the first failing plugin aborts the
//!   whole batch and no partial activation is ever exposed.
//! - Drives the lifecycle hooks (`on_load` / `on_startup` / `on_shutdown`)
//!   strictly in activation-list order, one plugin completing before the
//!   next begins. No timeouts or cancellation are applied here; a hung hook
//!   hangs the sequence, and timeout enforcement belongs to the host.
//! - Collects the [`PluginState`]s plugins publish from `on_load` and
//!   `on_startup` into a single keyed collection the host drains via
//!   [`clear_states`](PluginManager::clear_states). A duplicate key is fatal.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut manager = PluginManager::new(registry, vec![PluginId::HttpClient]);
//! manager
//!     .attach_application_context(Arc::new(context))
//!     .load()?;
//! // …drain manager.states() into the host, then:
//! manager.clear_states();
//! manager.trigger_startup().await?;
//! // …serve…
//! manager.trigger_shutdown().await;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::error::{PluginError, PluginResult};
use crate::plugin::{
    BoxedPlugin, PluginId, PluginRegistry, PluginState, TRELLIS_PLUGIN_API_VERSION,
};

/// Merges freshly published states into the held collection.
///
/// A key collision is fatal: it means two plugins, or one plugin across
/// hooks, chose the same key.
fn merge_states(
    held: &mut HashMap<String, PluginState>,
    fresh: Vec<PluginState>,
) -> PluginResult<()> {
    for state in fresh {
        if held.contains_key(state.key()) {
            return Err(PluginError::DuplicateStateKey {
                key: state.key().to_string(),
            });
        }
        held.insert(state.key().to_string(), state);
    }
    Ok(())
}

/// Orchestrates discovery, validation, loading, state aggregation, and
/// lifecycle triggering for a requested set of plugins.
///
/// # State machine
///
/// ```text
/// new()                          ──► UNCONFIGURED
/// attach_application_context()   ──► CONTEXT_ATTACHED
/// load()                         ──► LOADED   (whole batch validated, on_load ran)
/// trigger_startup().await        ──► STARTED
/// trigger_shutdown().await       ──► STOPPED
/// ```
///
/// `load()` may be called again: it re-validates and re-resolves the
/// activation list from scratch. Accumulated states are **not** cleared
/// implicitly, so a second `load()` without an intervening
/// [`clear_states`](Self::clear_states) fails with a duplicate-key error if
/// the same keys are published again — draining between calls is the
/// caller's responsibility.
///
/// # Concurrency
///
/// The manager is driven by a single execution context; hooks are never
/// invoked concurrently, which is what guarantees activation-list ordering.
pub struct PluginManager {
    registry: PluginRegistry,
    /// Activation list, in the order plugins will be validated and triggered.
    wanted: Vec<PluginId>,
    /// Resolved and validated plugins; populated by [`load`](Self::load),
    /// held for the manager's lifetime, never re-resolved between loads.
    activated: Vec<(PluginId, BoxedPlugin)>,
    /// States published by plugin hooks, keyed by state key.
    states: HashMap<String, PluginState>,
    /// Host context handed to every hook; attached once, never owned by
    /// the lifecycle logic itself.
    application: Option<Arc<AppContext>>,
}

impl PluginManager {
    /// Creates a manager for the given registry and activation list.
    ///
    /// Nothing is resolved yet; resolution happens in [`load`](Self::load).
    pub fn new(registry: PluginRegistry, activate: Vec<PluginId>) -> Self {
        Self {
            registry,
            wanted: activate,
            activated: Vec::new(),
            states: HashMap::new(),
            application: None,
        }
    }

    /// Attaches the host application context handed to every plugin hook.
    ///
    /// Must be called before [`load`](Self::load).
    pub fn attach_application_context(&mut self, application: Arc<AppContext>) -> &mut Self {
        self.application = Some(application);
        self
    }

    /// Returns the activation list, in processing order.
    pub fn activation_list(&self) -> &[PluginId] {
        &self.wanted
    }

    /// Returns the identifiers of the currently activated plugins, in
    /// activation order. Empty before a successful [`load`](Self::load).
    pub fn activated_ids(&self) -> impl Iterator<Item = PluginId> + '_ {
        self.activated.iter().map(|(id, _)| *id)
    }

    /// The currently held plugin states, keyed by state key.
    pub fn states(&self) -> &HashMap<String, PluginState> {
        &self.states
    }

    /// Drains the accumulated state collection.
    ///
    /// The host calls this after importing states into its own shared state,
    /// so a later `load()` or `trigger_startup()` can publish fresh states
    /// under the same keys without raising a duplicate-key error.
    pub fn clear_states(&mut self) {
        self.states.clear();
    }

    /// Validates the whole activation list, in order, without loading
    /// anything.
    ///
    /// For each identifier: resolve it in the registry, check capability
    /// compatibility, construct the plugin, and run its own pre-condition
    /// check. The first failure aborts the batch; already-validated plugins
    /// are discarded.
    fn check_pre_conditions(&self, app: &AppContext) -> PluginResult<Vec<(PluginId, BoxedPlugin)>> {
        let mut plugins: Vec<(PluginId, BoxedPlugin)> = Vec::with_capacity(self.wanted.len());

        for &id in &self.wanted {
            let Some(descriptor) = self.registry.resolve(id) else {
                return Err(PluginError::invalid_plugin(
                    id,
                    "not present in the plugin registry",
                ));
            };

            if !descriptor.is_compatible() {
                return Err(PluginError::invalid_plugin(
                    id,
                    format!(
                        "does not implement the expected capability set \
                         (plugin API {:#010x}, host API {:#010x})",
                        descriptor.api_version(),
                        TRELLIS_PLUGIN_API_VERSION,
                    ),
                ));
            }

            let plugin = descriptor.instantiate().map_err(|source| {
                PluginError::invalid_plugin_with_source(id, "error constructing the plugin", source)
            })?;

            if !plugin.pre_conditions_check(app) {
                return Err(PluginError::PreconditionNotMet { plugin: id });
            }

            debug!(plugin = %id, "Plugin pre-conditions satisfied");
            plugins.push((id, plugin));
        }

        Ok(plugins)
    }

    /// Validates and loads the activation list.
    ///
    /// Runs the pre-condition pass over the whole batch first, assigns the
    /// result as the activated set, then invokes `on_load` on each plugin in
    /// activation order, merging the returned states.
    ///
    /// # Errors
    ///
    /// [`PluginError::ContextNotAttached`] when no context was attached,
    /// [`PluginError::InvalidPlugin`] / [`PluginError::PreconditionNotMet`]
    /// from validation, [`PluginError::Hook`] when an `on_load` fails, and
    /// [`PluginError::DuplicateStateKey`] on a state key collision.
    pub fn load(&mut self) -> PluginResult<&mut Self> {
        let app = Arc::clone(
            self.application
                .as_ref()
                .ok_or(PluginError::ContextNotAttached)?,
        );

        self.activated = self.check_pre_conditions(&app)?;

        for (id, plugin) in &self.activated {
            let fresh = plugin.on_load(&app).map_err(|source| PluginError::Hook {
                plugin: *id,
                hook: "on_load",
                source,
            })?;
            merge_states(&mut self.states, fresh)?;
            info!(plugin = %id, "Plugin loaded");
        }

        Ok(self)
    }

    /// Invokes `on_startup` on every activated plugin, in activation order,
    /// merging returned states exactly like `on_load`.
    ///
    /// There is no guard against double invocation: each call runs every
    /// hook again. That is a caller responsibility.
    pub async fn trigger_startup(&mut self) -> PluginResult<&mut Self> {
        let app = Arc::clone(
            self.application
                .as_ref()
                .ok_or(PluginError::ContextNotAttached)?,
        );

        for (id, plugin) in &self.activated {
            let fresh = plugin
                .on_startup(&app)
                .await
                .map_err(|source| PluginError::Hook {
                    plugin: *id,
                    hook: "on_startup",
                    source,
                })?;
            merge_states(&mut self.states, fresh)?;
            info!(plugin = %id, "Plugin started");
        }

        Ok(self)
    }

    /// Invokes `on_shutdown` on every activated plugin, in activation order.
    ///
    /// Shutdown is best-effort and isolated: a failing hook is logged and
    /// does not prevent subsequent plugins from shutting down.
    pub async fn trigger_shutdown(&mut self) -> &mut Self {
        if let Some(app) = self.application.clone() {
            for (id, plugin) in &self.activated {
                match plugin.on_shutdown(&app).await {
                    Ok(()) => debug!(plugin = %id, "Plugin shut down"),
                    Err(error) => {
                        error!(plugin = %id, error = %error, "Plugin shutdown hook failed");
                    }
                }
            }
        }
        self
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager")
            .field("wanted", &self.wanted)
            .field("activated", &self.activated_ids().collect::<Vec<_>>())
            .field("state_keys", &self.states.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::BoxError;
    use crate::plugin::{Plugin, PluginDescriptor, StateValue};

    /// Shared call-sequence log for ordering assertions.
    #[derive(Clone, Default)]
    struct Recorder {
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Recorder {
        fn push(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn take(&self) -> Vec<String> {
            std::mem::take(&mut *self.calls.lock().unwrap())
        }
    }

    struct TestPlugin {
        id: PluginId,
        recorder: Recorder,
        precondition: bool,
        load_keys: Vec<&'static str>,
        startup_keys: Vec<&'static str>,
        fail_shutdown: bool,
    }

    impl TestPlugin {
        fn new(id: PluginId, recorder: Recorder) -> Self {
            Self {
                id,
                recorder,
                precondition: true,
                load_keys: Vec::new(),
                startup_keys: Vec::new(),
                fail_shutdown: false,
            }
        }
    }

    #[async_trait]
    impl Plugin for TestPlugin {
        fn pre_conditions_check(&self, _app: &AppContext) -> bool {
            self.recorder.push(format!("{}:check", self.id));
            self.precondition
        }

        fn on_load(&self, _app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
            self.recorder.push(format!("{}:on_load", self.id));
            Ok(self
                .load_keys
                .iter()
                .map(|key| PluginState::new(*key, self.id))
                .collect())
        }

        async fn on_startup(&self, _app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
            self.recorder.push(format!("{}:on_startup", self.id));
            Ok(self
                .startup_keys
                .iter()
                .map(|key| PluginState::new(*key, self.id))
                .collect())
        }

        async fn on_shutdown(&self, _app: &AppContext) -> Result<(), BoxError> {
            self.recorder.push(format!("{}:on_shutdown", self.id));
            if self.fail_shutdown {
                return Err("shutdown exploded".into());
            }
            Ok(())
        }
    }

    fn context() -> Arc<AppContext> {
        Arc::new(AppContext::new("test-service"))
    }

    /// Registers a descriptor whose factory builds `make()` and counts
    /// resolutions.
    fn register_counted<F>(
        registry: &mut PluginRegistry,
        id: PluginId,
        make: F,
    ) -> Arc<AtomicUsize>
    where
        F: Fn() -> TestPlugin + Send + Sync + 'static,
    {
        let counter = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&counter);
        registry.register(PluginDescriptor::new(id, move || {
            seen.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(make()))
        }));
        counter
    }

    #[test]
    fn test_load_collects_the_union_of_published_states() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            let mut p = TestPlugin::new(PluginId::HttpClient, rec.clone());
            p.load_keys = vec!["http"];
            p
        });
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::Odm, move || {
            let mut p = TestPlugin::new(PluginId::Odm, rec.clone());
            p.load_keys = vec!["odm_client", "odm_documents"];
            p
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::Odm]);
        manager.attach_application_context(context());
        manager.load().unwrap();

        assert_eq!(manager.states().len(), 3);
        assert!(manager.states().contains_key("http"));
        assert!(manager.states().contains_key("odm_client"));
        assert!(manager.states().contains_key("odm_documents"));
        assert_eq!(
            manager.activated_ids().collect::<Vec<_>>(),
            vec![PluginId::HttpClient, PluginId::Odm]
        );
    }

    #[test]
    fn test_validation_runs_before_any_on_load() {
        // [A, B] where B's pre-condition fails: A's on_load must never run.
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            TestPlugin::new(PluginId::HttpClient, rec.clone())
        });
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::Odm, move || {
            let mut p = TestPlugin::new(PluginId::Odm, rec.clone());
            p.precondition = false;
            p
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::Odm]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        assert!(matches!(
            err,
            PluginError::PreconditionNotMet {
                plugin: PluginId::Odm
            }
        ));
        assert_eq!(
            recorder.take(),
            vec!["http_client:check", "odm:check"],
            "no on_load may run when the batch fails validation"
        );
        assert_eq!(manager.activated_ids().count(), 0);
    }

    #[test]
    fn test_plugins_after_the_failure_are_never_resolved() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            let mut p = TestPlugin::new(PluginId::HttpClient, rec.clone());
            p.precondition = false;
            p
        });
        let rec = recorder.clone();
        let later = register_counted(&mut registry, PluginId::RabbitMq, move || {
            TestPlugin::new(PluginId::RabbitMq, rec.clone())
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::RabbitMq]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        assert!(matches!(err, PluginError::PreconditionNotMet { .. }));
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unregistered_plugin_is_invalid_and_aborts_the_batch() {
        // [A, B] where B is not registered: error names B, A never loads.
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            TestPlugin::new(PluginId::HttpClient, rec.clone())
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::OpenTelemetry]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        match err {
            PluginError::InvalidPlugin { plugin, .. } => {
                assert_eq!(plugin, PluginId::OpenTelemetry);
            }
            other => panic!("expected InvalidPlugin, got {other:?}"),
        }
        assert!(
            !recorder.take().contains(&"http_client:on_load".to_string()),
            "validated plugins must be discarded on batch failure"
        );
    }

    #[test]
    fn test_incompatible_descriptor_fails_the_capability_check() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        registry.register(
            PluginDescriptor::new(PluginId::HttpClient, move || {
                Ok(Box::new(TestPlugin::new(PluginId::HttpClient, rec.clone())))
            })
            .with_api_version(0x0002_0000),
        );

        let mut manager = PluginManager::new(registry, vec![PluginId::HttpClient]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        match err {
            PluginError::InvalidPlugin { message, .. } => {
                assert!(message.contains("capability set"));
            }
            other => panic!("expected InvalidPlugin, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_failure_keeps_the_cause() {
        let mut registry = PluginRegistry::new();
        registry.register(PluginDescriptor::new(PluginId::Odm, || {
            Err("connection string missing".into())
        }));

        let mut manager = PluginManager::new(registry, vec![PluginId::Odm]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        match err {
            PluginError::InvalidPlugin { plugin, source, .. } => {
                assert_eq!(plugin, PluginId::Odm);
                assert!(source.is_some());
            }
            other => panic!("expected InvalidPlugin, got {other:?}"),
        }
    }

    #[test]
    fn test_load_without_context_is_rejected() {
        let mut manager = PluginManager::new(PluginRegistry::new(), vec![PluginId::HttpClient]);
        assert!(matches!(
            manager.load().unwrap_err(),
            PluginError::ContextNotAttached
        ));
    }

    #[test]
    fn test_duplicate_state_keys_across_plugins_are_fatal() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            let mut p = TestPlugin::new(PluginId::HttpClient, rec.clone());
            p.load_keys = vec!["client"];
            p
        });
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::RabbitMq, move || {
            let mut p = TestPlugin::new(PluginId::RabbitMq, rec.clone());
            p.load_keys = vec!["client"];
            p
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::RabbitMq]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        assert!(matches!(err, PluginError::DuplicateStateKey { key } if key == "client"));
    }

    #[test]
    fn test_published_state_is_the_same_allocation() {
        let conn: StateValue = Arc::new(String::from("db-handle"));
        let published = conn.clone();
        let mut registry = PluginRegistry::new();
        registry.register(PluginDescriptor::new(PluginId::Odm, move || {
            let state = PluginState::from_value("db", published.clone());
            Ok(Box::new(StaticStatePlugin { state }))
        }));

        struct StaticStatePlugin {
            state: PluginState,
        }
        impl Plugin for StaticStatePlugin {
            fn on_load(&self, _app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
                Ok(vec![self.state.clone()])
            }
        }

        let mut manager = PluginManager::new(registry, vec![PluginId::Odm]);
        manager.attach_application_context(context());
        manager.load().unwrap();

        assert!(Arc::ptr_eq(manager.states()["db"].value(), &conn));
    }

    #[tokio::test]
    async fn test_startup_merges_states_and_repeats_without_guard() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::RabbitMq, move || {
            let mut p = TestPlugin::new(PluginId::RabbitMq, rec.clone());
            p.startup_keys = vec!["channel"];
            p
        });

        let mut manager = PluginManager::new(registry, vec![PluginId::RabbitMq]);
        manager.attach_application_context(context());
        manager.load().unwrap();

        manager.trigger_startup().await.unwrap();
        assert!(manager.states().contains_key("channel"));

        // No internal double-invocation guard: the second call runs the hook
        // again and collides on the still-held key.
        let err = manager.trigger_startup().await.unwrap_err();
        assert!(matches!(err, PluginError::DuplicateStateKey { .. }));
    }

    #[tokio::test]
    async fn test_cleared_states_can_be_republished() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::RabbitMq, move || {
            let mut p = TestPlugin::new(PluginId::RabbitMq, rec.clone());
            p.startup_keys = vec!["channel"];
            p
        });

        let mut manager = PluginManager::new(registry, vec![PluginId::RabbitMq]);
        manager.attach_application_context(context());
        manager.load().unwrap();
        manager.trigger_startup().await.unwrap();

        manager.clear_states();
        assert!(manager.states().is_empty());

        manager.trigger_startup().await.unwrap();
        assert!(manager.states().contains_key("channel"));
    }

    #[tokio::test]
    async fn test_shutdown_is_ordered_and_isolated() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::HttpClient, move || {
            let mut p = TestPlugin::new(PluginId::HttpClient, rec.clone());
            p.fail_shutdown = true;
            p
        });
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::RabbitMq, move || {
            TestPlugin::new(PluginId::RabbitMq, rec.clone())
        });

        let mut manager =
            PluginManager::new(registry, vec![PluginId::HttpClient, PluginId::RabbitMq]);
        manager.attach_application_context(context());
        manager.load().unwrap();
        recorder.take();

        manager.trigger_shutdown().await;

        // The first plugin's failure must not abort the second's shutdown,
        // and order follows the activation list.
        assert_eq!(
            recorder.take(),
            vec!["http_client:on_shutdown", "rabbitmq:on_shutdown"]
        );
    }

    #[tokio::test]
    async fn test_shutdown_runs_each_hook_once_per_call() {
        let recorder = Recorder::default();
        let mut registry = PluginRegistry::new();
        let rec = recorder.clone();
        register_counted(&mut registry, PluginId::Odm, move || {
            TestPlugin::new(PluginId::Odm, rec.clone())
        });

        let mut manager = PluginManager::new(registry, vec![PluginId::Odm]);
        manager.attach_application_context(context());
        manager.load().unwrap();
        manager.trigger_startup().await.unwrap();
        recorder.take();

        manager.trigger_shutdown().await;
        assert_eq!(recorder.take(), vec!["odm:on_shutdown"]);

        manager.trigger_shutdown().await;
        assert_eq!(recorder.take(), vec!["odm:on_shutdown"]);
    }

    #[test]
    fn test_failing_on_load_surfaces_as_hook_error() {
        struct ExplodingPlugin;
        impl Plugin for ExplodingPlugin {
            fn on_load(&self, _app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
                Err("no such directory".into())
            }
        }

        let mut registry = PluginRegistry::new();
        registry.register(PluginDescriptor::new(PluginId::HttpClient, || {
            Ok(Box::new(ExplodingPlugin))
        }));

        let mut manager = PluginManager::new(registry, vec![PluginId::HttpClient]);
        manager.attach_application_context(context());
        let err = manager.load().unwrap_err();

        assert!(matches!(
            err,
            PluginError::Hook {
                plugin: PluginId::HttpClient,
                hook: "on_load",
                ..
            }
        ));
    }

    #[test]
    fn test_empty_activation_list_loads_nothing() {
        let mut manager = PluginManager::new(PluginRegistry::new(), Vec::new());
        manager.attach_application_context(context());
        manager.load().unwrap();
        assert!(manager.states().is_empty());
        assert_eq!(manager.activated_ids().count(), 0);
    }
}
