//! The event stream consume loop.
//!
//! ```text
//!              next_event()
//! EventStream ─────────────▶ tag check ─▶ BackendFilter ─▶ kind switch
//!                                                           │
//!                        Message / SendMessage ─────────────┼──▶ Engine::dispatch_message
//!                        Command ───────────────────────────┴──▶ Engine::dispatch_command
//! ```
//!
//! One loop reads the stream, one event at a time. Handling an event only
//! spawns tasks, so a slow handler never delays the next receive. The first
//! receive error ends the loop and is returned to the caller.

use tokio::task::JoinHandle;
use tracing::{Level, debug, error, info, span, warn};

use linkbird_core::{ChannelSource, EventKind, EventStream, MessageEvent, StreamEvent};
use linkbird_framework::{BackendFilter, Engine, Gate};

use crate::error::{RuntimeError, RuntimeResult};

/// Why an event was dropped before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// This process sent the message.
    OwnEcho,
    /// Another component tagged the event to be skipped.
    SkipRequested,
    /// The event came from an ignored backend.
    IgnoredBackend(String),
    /// The channel identifier is not `scheme://id`.
    MalformedChannel,
}

/// What handling one event did.
#[derive(Debug)]
pub enum Dispatch {
    /// Dropped before reaching any handler.
    Skipped(SkipReason),
    /// Fanned out to message and URL handler tasks.
    Message(Vec<JoinHandle<()>>),
    /// Handed to a command handler, or `None` for an unknown command.
    Command(Option<JoinHandle<()>>),
}

impl Dispatch {
    /// Returns the spawned tasks.
    pub fn into_tasks(self) -> Vec<JoinHandle<()>> {
        match self {
            Self::Skipped(_) => Vec::new(),
            Self::Message(tasks) => tasks,
            Self::Command(task) => task.into_iter().collect(),
        }
    }
}

/// Reads an event stream and hands each event to the engine.
pub struct StreamConsumer<S> {
    stream: S,
    engine: Engine,
    filter: BackendFilter,
}

impl<S: EventStream> StreamConsumer<S> {
    /// Creates a consumer.
    pub fn new(stream: S, engine: Engine, filter: BackendFilter) -> Self {
        Self {
            stream,
            engine,
            filter,
        }
    }

    /// Returns the engine events are dispatched to.
    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    /// Handles one event without waiting for any handler.
    pub fn handle(&self, event: StreamEvent) -> Dispatch {
        let span = span!(
            Level::DEBUG,
            "dispatch",
            kind = event.event.name(),
            channel_id = %event.event.channel_id()
        );
        let _enter = span.enter();

        if event.is_own_echo() {
            debug!("Skipping own echo");
            return Dispatch::Skipped(SkipReason::OwnEcho);
        }
        if event.is_skip_requested() {
            debug!("Skipping event tagged for skip");
            return Dispatch::Skipped(SkipReason::SkipRequested);
        }

        match self.filter.check(event.event.channel_id()) {
            Ok(Gate::Accept) => {}
            Ok(Gate::Ignored { backend }) => {
                debug!(backend = %backend, "Skipping event from ignored backend");
                return Dispatch::Skipped(SkipReason::IgnoredBackend(backend));
            }
            Err(e) => {
                warn!(error = %e, "Dropping event with malformed channel id");
                return Dispatch::Skipped(SkipReason::MalformedChannel);
            }
        }

        match event.event {
            EventKind::Message(message) => Dispatch::Message(self.engine.dispatch_message(message)),
            EventKind::SendMessage { channel_id, text } => {
                let message = MessageEvent::new(ChannelSource::new(channel_id), text);
                Dispatch::Message(self.engine.dispatch_message(message))
            }
            EventKind::Command(command) => {
                Dispatch::Command(self.engine.dispatch_command(command))
            }
        }
    }

    /// Consumes the stream until it fails.
    ///
    /// Only returns on a receive error, which is always
    /// [`RuntimeError::StreamClosed`]. Tasks already spawned keep running.
    pub async fn run(mut self) -> RuntimeResult<()> {
        info!("Consuming event stream");
        loop {
            match self.stream.next_event().await {
                Ok(event) => {
                    self.handle(event);
                }
                Err(e) => {
                    error!(error = %e, "Event stream terminated");
                    return Err(RuntimeError::StreamClosed(e));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, ScriptedStream, engine_with};
    use futures::future::join_all;
    use linkbird_core::{CommandEvent, CommandMetadata, tags};
    use linkbird_framework::{CommandTable, Registry, StaticProvider, command_handler, message_handler};
    use parking_lot::Mutex;
    use std::sync::Arc;

    type Seen = Arc<Mutex<Vec<String>>>;

    /// Engine whose only handlers record message text and `echo` arguments.
    fn recording_engine(sink: &Arc<RecordingSink>) -> (Engine, Seen) {
        let seen: Seen = Arc::default();

        let messages = Arc::clone(&seen);
        let provider = StaticProvider::new("recorder").message(message_handler(move |_, event| {
            let messages = Arc::clone(&messages);
            async move { messages.lock().push(event.text.clone()) }
        }));

        let commands = Arc::clone(&seen);
        let echo = command_handler(
            CommandMetadata::new("echo", "<text>", "Echoes text"),
            move |_, command| {
                let commands = Arc::clone(&commands);
                async move { commands.lock().push(format!("echo {}", command.arg)) }
            },
        );

        let engine = engine_with(sink)
            .registry(Registry::new().with(&provider))
            .commands(CommandTable::new().with(echo))
            .build();
        (engine, seen)
    }

    fn message(channel_id: &str, text: &str) -> StreamEvent {
        StreamEvent::new(EventKind::Message(MessageEvent::new(
            ChannelSource::new(channel_id),
            text,
        )))
    }

    async fn settle(dispatch: Dispatch) {
        join_all(dispatch.into_tasks()).await;
    }

    #[tokio::test]
    async fn test_message_reaches_handlers() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        let dispatch = consumer.handle(message("irc://libera/#rust", "hello"));
        assert!(matches!(dispatch, Dispatch::Message(_)));
        settle(dispatch).await;

        assert_eq!(*seen.lock(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_send_message_is_folded_into_message_path() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        let event = StreamEvent::new(EventKind::SendMessage {
            channel_id: "irc://libera/#rust".into(),
            text: "relayed".into(),
        });
        settle(consumer.handle(event)).await;

        assert_eq!(*seen.lock(), vec!["relayed"]);
    }

    #[tokio::test]
    async fn test_tagged_events_are_skipped() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        let echo = message("irc://libera/#rust", "mine").with_tag(tags::INTERNAL, tags::SET);
        let skip = StreamEvent::new(EventKind::SendMessage {
            channel_id: "irc://libera/#rust".into(),
            text: "skip me".into(),
        })
        .with_tag(tags::URL_SKIP, tags::SET);

        assert!(matches!(
            consumer.handle(echo),
            Dispatch::Skipped(SkipReason::OwnEcho)
        ));
        assert!(matches!(
            consumer.handle(skip),
            Dispatch::Skipped(SkipReason::SkipRequested)
        ));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_tag_with_other_value_is_not_a_skip() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        let event = message("irc://libera/#rust", "kept").with_tag(tags::URL_SKIP, "0");
        settle(consumer.handle(event)).await;

        assert_eq!(*seen.lock(), vec!["kept"]);
    }

    #[tokio::test]
    async fn test_filter_applies_to_every_kind() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(
            ScriptedStream::default(),
            engine,
            BackendFilter::new(["discord"]),
        );

        let command = StreamEvent::new(EventKind::Command(CommandEvent {
            command: "echo".into(),
            arg: "hi".into(),
            sender: "ferris".into(),
            source: ChannelSource::new("discord://guild/chan"),
        }));

        assert_eq!(
            consumer
                .handle(message("discord://guild/chan", "hello"))
                .into_tasks()
                .len(),
            0
        );
        assert!(matches!(
            consumer.handle(command),
            Dispatch::Skipped(SkipReason::IgnoredBackend(ref b)) if b == "discord"
        ));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_channel_is_dropped() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        assert!(matches!(
            consumer.handle(message("no-scheme", "hello")),
            Dispatch::Skipped(SkipReason::MalformedChannel)
        ));
        assert!(seen.lock().is_empty());
    }

    #[tokio::test]
    async fn test_commands_route_by_name() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let consumer = StreamConsumer::new(ScriptedStream::default(), engine, BackendFilter::default());

        let command = |name: &str| {
            StreamEvent::new(EventKind::Command(CommandEvent {
                command: name.into(),
                arg: "hi".into(),
                sender: "ferris".into(),
                source: ChannelSource::new("irc://libera/#rust"),
            }))
        };

        assert!(matches!(consumer.handle(command("nope")), Dispatch::Command(None)));
        settle(consumer.handle(command("echo"))).await;

        assert_eq!(*seen.lock(), vec!["echo hi"]);
    }

    #[tokio::test]
    async fn test_run_ends_with_stream_closed() {
        let sink = RecordingSink::new();
        let (engine, seen) = recording_engine(&sink);
        let stream = ScriptedStream::new([
            message("irc://libera/#rust", "one"),
            message("irc://libera/#rust", "two"),
        ]);

        let err = StreamConsumer::new(stream, engine, BackendFilter::default())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, RuntimeError::StreamClosed(ref e) if e.is_closed()));

        // Handler tasks are detached; give them a moment to finish.
        for _ in 0..50 {
            if seen.lock().len() == 2 {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        let mut texts = seen.lock().clone();
        texts.sort();
        assert_eq!(texts, vec!["one", "two"]);
    }
}
