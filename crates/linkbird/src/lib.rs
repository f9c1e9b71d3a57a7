//! # Linkbird
//!
//! A chat bot that watches messages for URLs and answers with something
//! useful: a page title, or a service-specific summary when a provider
//! knows the host.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────────────────────────────┐
//! │  Transport  │────▶│   Consumer   │────▶│ Engine ──▶ URL task "xkcd.com/1"       │──▶ reply
//! │ (WebSocket) │     │ (tags,filter)│     │        ──▶ URL task "example.org"      │──▶ reply
//! └─────────────┘     └──────────────┘     │        ──▶ message handlers            │──▶ reply
//!                                          └────────────────────────────────────────┘
//! ```
//!
//! - **Transport**: the event stream and reply sink (`linkbird-transport`)
//! - **Consumer**: the single receive loop, echo suppression and backend filter
//! - **Engine**: URL extraction and per-URL handler chains, with a page-title fallback
//! - **Providers**: per-host handlers and whole-message scanners (`linkbird-providers`)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkbird::prelude::*;
//!
//! async fn greet(engine: Engine, event: Arc<MessageEvent>, _url: FoundUrl) -> Outcome {
//!     let sent = engine.reply(&event.source, "Hello from example.org").await;
//!     Outcome::from(sent.is_ok())
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let mut runtime = LinkbirdRuntime::builder().build()?;
//!     runtime.register_provider(
//!         &StaticProvider::new("example").url("example.org", url_handler(greet)),
//!     );
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```

pub use linkbird_core as core;
pub use linkbird_framework as framework;
pub use linkbird_providers as providers;
pub use linkbird_runtime as runtime;
pub use linkbird_transport as transport;

/// Prelude module for convenient imports.
pub mod prelude {
    // Runtime - main entry point
    pub use linkbird_runtime::{LinkbirdRuntime, RuntimeError, RuntimeResult};

    // Handler building blocks
    pub use linkbird_framework::{
        Engine, FoundUrl, Outcome, Provider, StaticProvider, command_handler, message_handler,
        url_handler,
    };

    // Event data
    pub use linkbird_core::{ChannelSource, CommandEvent, CommandMetadata, MessageEvent};

    pub use std::sync::Arc;
}
