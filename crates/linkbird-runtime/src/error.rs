//! Runtime error types.

use thiserror::Error;

use linkbird_core::TransportError;

use crate::config::ConfigError;

/// Errors that end a runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// The event stream reported a terminal error, including a clean close.
    #[error("Event stream unavailable: {0}")]
    StreamClosed(TransportError),

    /// The event stream could not be opened.
    #[error("Failed to connect to event stream: {0}")]
    Connect(TransportError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The shared HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(TransportError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
