//! Handler traits.
//!
//! Three kinds of callables can be registered with the bot:
//!
//! | Trait | Input | Result |
//! |-------|-------|--------|
//! | [`UrlHandler`] | one URL found in a message | [`Outcome`] |
//! | [`MessageHandler`] | the whole message | nothing |
//! | [`CommandHandler`] | one command invocation | nothing |
//!
//! All of them receive the [`Engine`] handle so they can reply and reach the
//! shared HTTP client. Replies are a handler's own side effect; the engine
//! only looks at the [`Outcome`] of URL handlers to decide whether to keep
//! trying.
//!
//! Closures can be turned into handlers with [`url_handler`],
//! [`message_handler`] and [`command_handler`]:
//!
//! ```rust,ignore
//! let handler = url_handler(|engine: Engine, event: Arc<MessageEvent>, url: FoundUrl| async move {
//!     if url.path().is_empty() {
//!         return Outcome::NotClaimed;
//!     }
//!     let _ = engine.reply(&event.source, format!("path: {}", url.path())).await;
//!     Outcome::Claimed
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
pub use futures::future::BoxFuture;

use linkbird_core::{CommandEvent, CommandMetadata, MessageEvent};

use crate::engine::Engine;
use crate::extract::FoundUrl;

/// Result of offering a URL to one handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The handler took care of the URL; stop trying others.
    Claimed,
    /// The handler passed; try the next one.
    NotClaimed,
}

impl Outcome {
    /// Returns true for [`Outcome::Claimed`].
    pub fn is_claimed(self) -> bool {
        matches!(self, Self::Claimed)
    }
}

impl From<bool> for Outcome {
    fn from(claimed: bool) -> Self {
        if claimed {
            Self::Claimed
        } else {
            Self::NotClaimed
        }
    }
}

// =============================================================================
// URL handlers
// =============================================================================

/// Handles URLs for one host.
pub trait UrlHandler: Send + Sync + 'static {
    /// Offers a URL to this handler.
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome>;
}

/// Type alias for a shared URL handler.
pub type BoxedUrlHandler = Arc<dyn UrlHandler>;

/// Wraps a closure as a [`UrlHandler`].
pub struct UrlHandlerFn<F>(F);

impl<F, Fut> UrlHandler for UrlHandlerFn<F>
where
    F: Fn(Engine, Arc<MessageEvent>, FoundUrl) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        (self.0)(engine.clone(), Arc::clone(event), url.clone()).boxed()
    }
}

/// Creates a URL handler from a closure.
pub fn url_handler<F, Fut>(f: F) -> BoxedUrlHandler
where
    F: Fn(Engine, Arc<MessageEvent>, FoundUrl) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Outcome> + Send + 'static,
{
    Arc::new(UrlHandlerFn(f))
}

// =============================================================================
// Whole-message handlers
// =============================================================================

/// Sees every accepted message, independent of URL matching.
///
/// Implementations do their own matching on the raw text.
pub trait MessageHandler: Send + Sync + 'static {
    /// Handles a message.
    fn handle<'a>(&'a self, engine: &'a Engine, event: &'a Arc<MessageEvent>) -> BoxFuture<'a, ()>;
}

/// Type alias for a shared whole-message handler.
pub type BoxedMessageHandler = Arc<dyn MessageHandler>;

/// Wraps a closure as a [`MessageHandler`].
pub struct MessageHandlerFn<F>(F);

impl<F, Fut> MessageHandler for MessageHandlerFn<F>
where
    F: Fn(Engine, Arc<MessageEvent>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn handle<'a>(&'a self, engine: &'a Engine, event: &'a Arc<MessageEvent>) -> BoxFuture<'a, ()> {
        (self.0)(engine.clone(), Arc::clone(event)).boxed()
    }
}

/// Creates a whole-message handler from a closure.
pub fn message_handler<F, Fut>(f: F) -> BoxedMessageHandler
where
    F: Fn(Engine, Arc<MessageEvent>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(MessageHandlerFn(f))
}

// =============================================================================
// Command handlers
// =============================================================================

/// Handles one named command.
pub trait CommandHandler: Send + Sync + 'static {
    /// Name and help text announced when the event stream is opened.
    fn metadata(&self) -> CommandMetadata;

    /// Handles an invocation.
    fn handle<'a>(&'a self, engine: &'a Engine, command: &'a CommandEvent) -> BoxFuture<'a, ()>;
}

/// Type alias for a shared command handler.
pub type BoxedCommandHandler = Arc<dyn CommandHandler>;

/// Wraps a closure and its metadata as a [`CommandHandler`].
pub struct CommandHandlerFn<F> {
    metadata: CommandMetadata,
    f: F,
}

impl<F, Fut> CommandHandler for CommandHandlerFn<F>
where
    F: Fn(Engine, CommandEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    fn metadata(&self) -> CommandMetadata {
        self.metadata.clone()
    }

    fn handle<'a>(&'a self, engine: &'a Engine, command: &'a CommandEvent) -> BoxFuture<'a, ()> {
        (self.f)(engine.clone(), command.clone()).boxed()
    }
}

/// Creates a command handler from metadata and a closure.
pub fn command_handler<F, Fut>(metadata: CommandMetadata, f: F) -> BoxedCommandHandler
where
    F: Fn(Engine, CommandEvent) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(CommandHandlerFn { metadata, f })
}
