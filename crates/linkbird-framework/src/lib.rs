//! # Linkbird Framework
//!
//! URL routing for the linkbird bot.
//!
//! This layer provides:
//! - URL extraction from message text and host lookup keys
//! - The provider registry that binds hosts to handlers
//! - The backend filter applied before dispatch
//! - The dispatch [`Engine`], which fans each event out to detached tasks
//! - The default title resolver and the `isitdown` command
//!
//! Providers only depend on this crate and `linkbird-core`; the runtime
//! wires a transport to the engine.

pub mod command;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod filter;
pub mod handler;
pub mod host;
pub mod registry;
pub mod resolver;
pub mod task;

#[cfg(test)]
mod testing;

pub use command::{CommandTable, IsItDown};
pub use engine::{Engine, EngineBuilder, Resolution, self_tags};
pub use extract::{FoundUrl, extract_urls, find_raw_urls};
pub use fetch::{
    FetchError, FetchResult, collapse_newlines, extract_title, fetch_json, fetch_page, send_json,
};
pub use filter::{BackendFilter, Gate};
pub use handler::{
    BoxFuture, BoxedCommandHandler, BoxedMessageHandler, BoxedUrlHandler, CommandHandler,
    MessageHandler, Outcome, UrlHandler, command_handler, message_handler, url_handler,
};
pub use host::lookup_keys;
pub use registry::{Provider, Registry, StaticProvider};
pub use resolver::{BoxedFallback, Fallback, TitleResolver};
pub use task::spawn_detached;
