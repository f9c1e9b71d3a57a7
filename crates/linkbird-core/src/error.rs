//! Unified error types for the linkbird core.
//!
//! Handler outcomes are not errors and never appear here; see the
//! framework's `Outcome` type for the claimed / not-claimed chain.

use thiserror::Error;

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur in transport operations.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {url} - {reason}")]
    ConnectionFailed {
        /// The URL that failed to connect.
        url: String,
        /// Reason for failure.
        reason: String,
    },

    /// Connection closed, cleanly or otherwise.
    #[error("event stream closed: {reason}")]
    ConnectionClosed {
        /// Reason for closure.
        reason: String,
    },

    /// Message send failed.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// A frame could not be encoded or decoded.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An operation did not finish in time.
    #[error("operation timed out after {secs}s")]
    Timeout {
        /// The timeout that elapsed, in seconds.
        secs: u64,
    },

    /// Invalid configuration.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl TransportError {
    /// Creates a connection-closed error.
    pub fn closed(reason: impl Into<String>) -> Self {
        Self::ConnectionClosed {
            reason: reason.into(),
        }
    }

    /// Returns true if this error means the event stream is gone.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::ConnectionClosed { .. })
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Protocol(err.to_string())
    }
}

// =============================================================================
// Channel Errors
// =============================================================================

/// A channel identifier that is not of the form `scheme://id`.
#[derive(Debug, Clone, Error)]
#[error("malformed channel id {channel_id:?}: {reason}")]
pub struct ChannelIdError {
    /// The identifier as received.
    pub channel_id: String,
    /// Why it was rejected.
    pub reason: String,
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
