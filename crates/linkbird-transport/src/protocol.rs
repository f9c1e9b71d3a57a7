//! JSON frames exchanged with the chat core.
//!
//! ```text
//! client ─▶ {"type":"stream_events","commands":{...}}      once, after connect
//! client ─▶ {"type":"send_message","channel_id",..}       per reply
//! server ─▶ {"tags":{..},"event":{"type":"message",..}}   per event
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use linkbird_core::{CommandMetadata, OutboundMessage, StreamEvent, TransportResult};

/// A frame sent from this client to the core.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Opens the event stream and announces supported commands.
    StreamEvents {
        /// Command metadata keyed by name.
        commands: BTreeMap<String, CommandMetadata>,
    },
    /// Sends a message to a channel.
    SendMessage(OutboundMessage),
}

impl ClientFrame {
    /// Builds the stream-open frame from a list of commands.
    pub fn stream_events(commands: impl IntoIterator<Item = CommandMetadata>) -> Self {
        Self::StreamEvents {
            commands: commands
                .into_iter()
                .map(|meta| (meta.name.clone(), meta))
                .collect(),
        }
    }

    /// Encodes the frame as JSON text.
    pub fn encode(&self) -> TransportResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Decodes one server frame.
pub fn decode_event(data: &[u8]) -> TransportResult<StreamEvent> {
    Ok(serde_json::from_slice(data)?)
}
