//! # Linkbird Core
//!
//! The core data model of the linkbird URL bot.
//!
//! This crate holds the types every other layer agrees on:
//!
//! - **Events**: what arrives on the event stream ([`StreamEvent`], [`EventKind`],
//!   [`MessageEvent`], [`CommandEvent`])
//! - **Channels**: where an event came from and where a reply goes
//!   ([`ChannelSource`], [`ChannelId`])
//! - **Boundary traits**: the two seams to the chat core ([`EventStream`] for
//!   receiving, [`ReplySink`] for sending)
//! - **Errors**: the transport error taxonomy ([`TransportError`])
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌──────────────┐
//! │ EventStream │────▶│   Consumer   │────▶│    Engine    │
//! │ (transport) │     │  (runtime)   │     │ (framework)  │
//! └─────────────┘     └──────────────┘     └──────┬───────┘
//!                                                 │ reply
//!                                          ┌──────▼───────┐
//!                                          │  ReplySink   │
//!                                          └──────────────┘
//! ```

pub mod channel;
pub mod config;
pub mod error;
pub mod event;
pub mod stream;

pub use channel::ChannelId;
pub use config::HttpClientConfig;
pub use error::{ChannelIdError, TransportError, TransportResult};
pub use event::{
    ChannelSource, CommandEvent, CommandMetadata, EventKind, MessageEvent, StreamEvent, Tags,
    User, tags,
};
pub use stream::{BoxedReplySink, EventStream, OutboundMessage, ReplySink};

/// Prelude for common imports.
pub mod prelude {
    pub use super::channel::ChannelId;
    pub use super::event::{ChannelSource, CommandEvent, MessageEvent, StreamEvent, Tags};
    pub use super::stream::{EventStream, ReplySink};
}
