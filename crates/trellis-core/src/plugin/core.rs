//! The plugin capability contract.

use async_trait::async_trait;

use crate::context::AppContext;
use crate::error::BoxError;
use crate::plugin::PluginState;

/// The capability contract every activatable plugin must satisfy.
///
/// All four hooks have pass-through default bodies, so a plugin only
/// implements the parts of the lifecycle it cares about. Hooks receive the
/// host's [`AppContext`] and publish data back exclusively through returned
/// [`PluginState`] values.
///
/// # Lifecycle
///
/// | Hook | When | Execution |
/// |------|------|-----------|
/// | [`pre_conditions_check`](Plugin::pre_conditions_check) | before anything else, for the whole activation batch | sync |
/// | [`on_load`](Plugin::on_load) | once the whole batch validated | sync |
/// | [`on_startup`](Plugin::on_startup) | process startup | async |
/// | [`on_shutdown`](Plugin::on_shutdown) | process shutdown | async |
///
/// Hooks run strictly in activation-list order, one plugin completing before
/// the next begins.
#[async_trait]
pub trait Plugin: Send + Sync {
    /// Gate for activation: return `false` to reject activation given the
    /// current application context. A `false` here fails the entire `load()`
    /// batch with [`PluginError::PreconditionNotMet`].
    ///
    /// [`PluginError::PreconditionNotMet`]: crate::error::PluginError::PreconditionNotMet
    fn pre_conditions_check(&self, app: &AppContext) -> bool {
        let _ = app;
        true
    }

    /// Called once after the whole activation batch passed validation.
    ///
    /// Synchronous by contract: no asynchronous I/O is expected at this
    /// stage. Returned states are merged into the manager's collection;
    /// a duplicate key there is fatal.
    fn on_load(&self, app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
        let _ = app;
        Ok(Vec::new())
    }

    /// Called on application startup. May establish connections and publish
    /// the resulting handles as states.
    async fn on_startup(&self, app: &AppContext) -> Result<Vec<PluginState>, BoxError> {
        let _ = app;
        Ok(Vec::new())
    }

    /// Called on application shutdown. Return values are ignored; a returned
    /// error is logged by the manager and does not prevent later plugins
    /// from shutting down.
    async fn on_shutdown(&self, app: &AppContext) -> Result<(), BoxError> {
        let _ = app;
        Ok(())
    }
}

/// Owned, type-erased plugin instance as held by the manager.
pub type BoxedPlugin = Box<dyn Plugin>;
