//! Boundary traits to the chat core.
//!
//! The bot talks to the outside world through exactly two seams:
//!
//! - [`EventStream`]: the single long-lived inbound stream, read by one loop
//! - [`ReplySink`]: outbound messages, called concurrently from handler tasks
//!
//! Transports implement both; tests substitute in-memory doubles.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::TransportResult;
use crate::event::{StreamEvent, Tags};

/// The inbound event stream.
///
/// Only one consumer reads a stream, so `next_event` takes `&mut self`.
#[async_trait]
pub trait EventStream: Send {
    /// Blocks until the next event arrives.
    ///
    /// Any error, including a clean close, is terminal: the stream must not
    /// be read again afterwards.
    async fn next_event(&mut self) -> TransportResult<StreamEvent>;
}

/// An outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Target channel.
    pub channel_id: String,
    /// Message text.
    pub text: String,
    /// Tags attached to the message.
    #[serde(default)]
    pub tags: Tags,
}

/// Sends messages back to chat channels.
///
/// Implementations must tolerate concurrent calls from many tasks.
#[async_trait]
pub trait ReplySink: Send + Sync {
    /// Sends a message.
    async fn send_message(&self, message: OutboundMessage) -> TransportResult<()>;
}

/// Type alias for a shared reply sink.
pub type BoxedReplySink = Arc<dyn ReplySink>;
