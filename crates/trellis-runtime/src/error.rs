//! Runtime error types.

use std::net::SocketAddr;

use thiserror::Error;
use trellis_core::PluginError;

use crate::config::ConfigError;

/// Errors that can occur while assembling or running an application.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Plugin lifecycle failure.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// Configuration loading failure.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A shared state key was claimed twice.
    #[error("shared state key already exists: '{0}'")]
    StateKeyExists(String),

    /// Failed to bind the server listener.
    #[error("failed to bind {addr}")]
    Bind {
        /// Address the listener tried to bind.
        addr: SocketAddr,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Invalid bind address in the server configuration.
    #[error("invalid server address '{0}'")]
    InvalidAddress(String),

    /// The server exited with an error.
    #[error("server error")]
    Serve(#[source] std::io::Error),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
