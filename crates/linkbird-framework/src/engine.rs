//! The dispatch engine.
//!
//! [`Engine`] is the handle every handler receives. It owns the frozen
//! registry, the command table, the shared HTTP client and the reply sink,
//! and it turns one accepted event into independent concurrent tasks:
//!
//! ```text
//! MessageEvent
//! ├── task: every whole-message handler, one after another
//! ├── task: URL #1 ─▶ exact host handlers ─▶ www-stripped handlers ─▶ fallback
//! └── task: URL #2 ─▶ ...
//! ```
//!
//! Tasks are detached. The engine does not track them, never waits for them
//! before the next event, and never cancels them. The shared client's
//! request timeout is what bounds a hanging handler. There is also no cap on
//! how many tasks are in flight at once.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{Instrument, Level, debug, span};

use linkbird_core::{
    BoxedReplySink, ChannelSource, CommandEvent, CommandMetadata, HttpClientConfig,
    MessageEvent, OutboundMessage, Tags, TransportError, TransportResult, tags,
};

use crate::command::CommandTable;
use crate::extract::{FoundUrl, extract_urls};
use crate::handler::Outcome;
use crate::host::lookup_keys;
use crate::registry::Registry;
use crate::resolver::{BoxedFallback, TitleResolver};
use crate::task::spawn_detached;

/// Default bound on a single reply call.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(5);

/// How one URL was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A registered handler claimed it.
    Handler {
        /// The host key whose list held the handler.
        host: String,
        /// The handler's position in that list.
        index: usize,
    },
    /// Every registered handler passed; this is what the fallback returned.
    Fallback(Outcome),
}

struct EngineInner {
    registry: Registry,
    commands: CommandTable,
    sink: BoxedReplySink,
    http: reqwest::Client,
    http_config: HttpClientConfig,
    fallback: BoxedFallback,
    reply_timeout: Duration,
}

/// Cheaply cloneable handle to the dispatch engine.
///
/// Everything inside is immutable after [`EngineBuilder::build`], so clones
/// are shared across tasks without locking.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Starts building an engine around a reply sink and an HTTP client.
    pub fn builder(sink: BoxedReplySink, http: reqwest::Client) -> EngineBuilder {
        EngineBuilder::new(sink, http)
    }

    /// The frozen provider registry.
    pub fn registry(&self) -> &Registry {
        &self.inner.registry
    }

    /// The registered commands.
    pub fn commands(&self) -> &CommandTable {
        &self.inner.commands
    }

    /// The shared outbound HTTP client.
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Settings the HTTP client was built with.
    pub fn http_config(&self) -> &HttpClientConfig {
        &self.inner.http_config
    }

    // =========================================================================
    // Replies
    // =========================================================================

    /// Sends `text` to the source's channel.
    ///
    /// The message is tagged as self-authored so its echo is dropped when it
    /// comes back on the event stream.
    pub async fn reply(&self, source: &ChannelSource, text: impl Into<String>) -> TransportResult<()> {
        let message = OutboundMessage {
            channel_id: source.channel_id.clone(),
            text: text.into(),
            tags: self_tags(),
        };

        let timeout = self.inner.reply_timeout;
        match tokio::time::timeout(timeout, self.inner.sink.send_message(message)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout {
                secs: timeout.as_secs(),
            }),
        }
    }

    /// Replies addressed to the sender's display name, when there is one.
    pub async fn mention_reply(
        &self,
        source: &ChannelSource,
        text: impl Into<String>,
    ) -> TransportResult<()> {
        let text = text.into();
        match source.display_name() {
            Some(name) => self.reply(source, format!("{name}: {text}")).await,
            None => self.reply(source, text).await,
        }
    }

    /// Replies addressed to an explicit sender label.
    pub async fn reply_to(
        &self,
        source: &ChannelSource,
        sender: &str,
        text: impl Into<String>,
    ) -> TransportResult<()> {
        let text = text.into();
        if sender.is_empty() {
            self.reply(source, text).await
        } else {
            self.reply(source, format!("{sender}: {text}")).await
        }
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Fans an accepted message out to detached tasks.
    ///
    /// Spawns one task running all whole-message handlers, then one task per
    /// URL in the text. Returns the task handles; dropping them is fine and is
    /// what the stream loop does.
    pub fn dispatch_message(&self, event: MessageEvent) -> Vec<JoinHandle<()>> {
        let event = Arc::new(event);
        let mut tasks = Vec::new();

        if !self.registry().message_handlers().is_empty() {
            let engine = self.clone();
            let event = Arc::clone(&event);
            let span = span!(Level::DEBUG, "message_handlers", channel_id = %event.source.channel_id);
            tasks.push(spawn_detached(
                "message_handlers",
                async move {
                    for handler in engine.registry().message_handlers() {
                        handler.handle(&engine, &event).await;
                    }
                }
                .instrument(span),
            ));
        }

        for url in extract_urls(&event.text) {
            let engine = self.clone();
            let event = Arc::clone(&event);
            let span = span!(Level::DEBUG, "resolve_url", url = %url.raw());
            tasks.push(spawn_detached(
                "resolve_url",
                async move {
                    engine.resolve_url(&event, &url).await;
                }
                .instrument(span),
            ));
        }

        tasks
    }

    /// Runs the handler chain for one URL to completion.
    ///
    /// Lookup keys are tried in order, and each key's handlers in
    /// registration order, until one claims the URL. If none does, the
    /// fallback gets the raw URL and has the last word.
    pub async fn resolve_url(&self, event: &Arc<MessageEvent>, url: &FoundUrl) -> Resolution {
        for host in lookup_keys(url.host()) {
            for (index, handler) in self.registry().url_handlers(host).iter().enumerate() {
                if handler.handle(self, event, url).await.is_claimed() {
                    debug!(host, index, "URL claimed by handler");
                    return Resolution::Handler {
                        host: host.to_string(),
                        index,
                    };
                }
            }
        }

        let outcome = self.inner.fallback.resolve(self, event, url.raw()).await;
        debug!(claimed = outcome.is_claimed(), "URL passed to fallback");
        Resolution::Fallback(outcome)
    }

    /// Spawns the handler registered for a command.
    ///
    /// Unknown commands are ignored and return `None`.
    pub fn dispatch_command(&self, command: CommandEvent) -> Option<JoinHandle<()>> {
        let Some(handler) = self.commands().get(&command.command).cloned() else {
            debug!(command = %command.command, "Ignoring unknown command");
            return None;
        };

        let engine = self.clone();
        let span = span!(Level::DEBUG, "command", command = %command.command);
        Some(spawn_detached(
            "command",
            async move {
                handler.handle(&engine, &command).await;
            }
            .instrument(span),
        ))
    }

    /// Metadata for every registered command, announced at stream open.
    pub fn command_metadata(&self) -> Vec<CommandMetadata> {
        self.commands().metadata()
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.inner.registry)
            .field("commands", &self.inner.commands)
            .field("reply_timeout", &self.inner.reply_timeout)
            .finish()
    }
}

/// Tags every self-authored message carries.
pub fn self_tags() -> Tags {
    Tags::from([
        (tags::INTERNAL.to_string(), tags::SET.to_string()),
        (tags::PROXY_SKIP.to_string(), tags::SET.to_string()),
    ])
}

// =============================================================================
// EngineBuilder
// =============================================================================

/// Builder for [`Engine`].
pub struct EngineBuilder {
    registry: Registry,
    commands: CommandTable,
    sink: BoxedReplySink,
    http: reqwest::Client,
    http_config: HttpClientConfig,
    fallback: BoxedFallback,
    reply_timeout: Duration,
}

impl EngineBuilder {
    fn new(sink: BoxedReplySink, http: reqwest::Client) -> Self {
        Self {
            registry: Registry::new(),
            commands: CommandTable::new(),
            sink,
            http,
            http_config: HttpClientConfig::default(),
            fallback: Arc::new(TitleResolver),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    /// Sets the provider registry.
    pub fn registry(mut self, registry: Registry) -> Self {
        self.registry = registry;
        self
    }

    /// Sets the command table.
    pub fn commands(mut self, commands: CommandTable) -> Self {
        self.commands = commands;
        self
    }

    /// Records the settings the HTTP client was built with.
    pub fn http_config(mut self, config: HttpClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Replaces the default title resolver.
    pub fn fallback(mut self, fallback: BoxedFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Sets the bound on each reply call.
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Freezes everything into an engine.
    pub fn build(self) -> Engine {
        Engine {
            inner: Arc::new(EngineInner {
                registry: self.registry,
                commands: self.commands,
                sink: self.sink,
                http: self.http,
                http_config: self.http_config,
                fallback: self.fallback,
                reply_timeout: self.reply_timeout,
            }),
        }
    }
}
