//! Event model for the chat event stream.
//!
//! The chat core pushes one [`StreamEvent`] at a time. Each event is an
//! envelope of key/value [`Tags`] around a discriminated [`EventKind`]:
//!
//! ```text
//! StreamEvent { tags }
//! └── EventKind
//!     ├── Command(CommandEvent)      { command, arg, sender, source }
//!     ├── Message(MessageEvent)      { source, text }
//!     └── SendMessage { channel_id, text }   // echo of an outbound message
//! ```
//!
//! Tags sit on the envelope rather than on individual variants, so the
//! echo-suppression check is the same for every kind of event.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::channel::ChannelId;
use crate::error::ChannelIdError;

/// Free-form key/value tags carried by events and outbound messages.
pub type Tags = HashMap<String, String>;

/// Well-known tag keys.
pub mod tags {
    /// Set on every message this process sends.
    pub const INTERNAL: &str = "proxy/internal-tag";
    /// Asks proxies further down the line to ignore the message.
    pub const PROXY_SKIP: &str = "proxy/skip";
    /// Set by other components to ask this bot to ignore an event.
    pub const URL_SKIP: &str = "url/skip";

    /// Tag value meaning "set".
    pub const SET: &str = "1";
}

// ============================================================================
// Channel Source
// ============================================================================

/// Identity of the user who sent a message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend-specific user id.
    #[serde(default)]
    pub id: String,
    /// Name to address the user by.
    #[serde(default)]
    pub display_name: String,
}

/// Where an event came from, and where a reply to it should go.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSource {
    /// `scheme://id` channel identifier.
    pub channel_id: String,
    /// The sender, when the backend reports one.
    #[serde(default)]
    pub user: Option<User>,
}

impl ChannelSource {
    /// Creates a source with no sender information.
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            user: None,
        }
    }

    /// Attaches a sender.
    pub fn with_user(mut self, id: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.user = Some(User {
            id: id.into(),
            display_name: display_name.into(),
        });
        self
    }

    /// Parses the channel identifier.
    pub fn parse_channel_id(&self) -> Result<ChannelId, ChannelIdError> {
        ChannelId::parse(&self.channel_id)
    }

    /// Returns the sender's display name, if known and non-empty.
    pub fn display_name(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|u| u.display_name.as_str())
            .filter(|name| !name.is_empty())
    }
}

// ============================================================================
// Events
// ============================================================================

/// A chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Where the message was said.
    pub source: ChannelSource,
    /// The raw message text.
    pub text: String,
}

impl MessageEvent {
    /// Creates a message event.
    pub fn new(source: ChannelSource, text: impl Into<String>) -> Self {
        Self {
            source,
            text: text.into(),
        }
    }
}

/// A command addressed to this bot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEvent {
    /// The command name, without any prefix.
    pub command: String,
    /// Everything after the command name.
    #[serde(default)]
    pub arg: String,
    /// Label for the sender, used when addressing replies.
    #[serde(default)]
    pub sender: String,
    /// Where the reply goes.
    pub source: ChannelSource,
}

/// The discriminated body of a stream event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A command invocation.
    Command(CommandEvent),
    /// An inbound chat message.
    Message(MessageEvent),
    /// A message some client sent through the core.
    SendMessage {
        /// Target channel.
        channel_id: String,
        /// Message text.
        text: String,
    },
}

impl EventKind {
    /// Returns a short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::Message(_) => "message",
            Self::SendMessage { .. } => "send_message",
        }
    }

    /// Returns the channel identifier this event refers to.
    pub fn channel_id(&self) -> &str {
        match self {
            Self::Command(cmd) => &cmd.source.channel_id,
            Self::Message(msg) => &msg.source.channel_id,
            Self::SendMessage { channel_id, .. } => channel_id,
        }
    }
}

/// One event read off the event stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEvent {
    /// Envelope tags.
    #[serde(default)]
    pub tags: Tags,
    /// The event body.
    pub event: EventKind,
}

impl StreamEvent {
    /// Creates an untagged event.
    pub fn new(event: EventKind) -> Self {
        Self {
            tags: Tags::new(),
            event,
        }
    }

    /// Adds a tag.
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    /// Returns true if `key` is present with the value `"1"`.
    pub fn has_tag(&self, key: &str) -> bool {
        self.tags.get(key).is_some_and(|v| v == tags::SET)
    }

    /// Returns true if this process produced the event.
    pub fn is_own_echo(&self) -> bool {
        self.has_tag(tags::INTERNAL)
    }

    /// Returns true if another component asked for the event to be skipped.
    pub fn is_skip_requested(&self) -> bool {
        self.has_tag(tags::URL_SKIP)
    }
}

// ============================================================================
// Command Metadata
// ============================================================================

/// Help metadata announced for a command when the stream is opened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// The command name.
    pub name: String,
    /// One-line usage, e.g. `<website>`.
    pub short_help: String,
    /// Full description.
    pub full_help: String,
}

impl CommandMetadata {
    /// Creates command metadata.
    pub fn new(
        name: impl Into<String>,
        short_help: impl Into<String>,
        full_help: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            short_help: short_help.into(),
            full_help: full_help.into(),
        }
    }
}
