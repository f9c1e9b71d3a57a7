//! In-memory stream and sink doubles for runtime tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use linkbird_core::{
    EventStream, HttpClientConfig, OutboundMessage, ReplySink, StreamEvent, TransportError,
    TransportResult,
};
use linkbird_framework::{Engine, EngineBuilder};
use linkbird_transport::build_http_client;

/// Yields a fixed list of events, then reports the stream closed.
#[derive(Default)]
pub struct ScriptedStream {
    events: VecDeque<StreamEvent>,
}

impl ScriptedStream {
    pub fn new(events: impl IntoIterator<Item = StreamEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

#[async_trait]
impl EventStream for ScriptedStream {
    async fn next_event(&mut self) -> TransportResult<StreamEvent> {
        self.events
            .pop_front()
            .ok_or_else(|| TransportError::closed("script finished"))
    }
}

/// Never yields an event.
pub struct PendingStream;

#[async_trait]
impl EventStream for PendingStream {
    async fn next_event(&mut self) -> TransportResult<StreamEvent> {
        std::future::pending().await
    }
}

/// Reply sink that keeps everything it is sent.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent.lock().iter().map(|m| m.text.clone()).collect()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn send_message(&self, message: OutboundMessage) -> TransportResult<()> {
        self.sent.lock().push(message);
        Ok(())
    }
}

/// Client config with a short timeout for tests.
pub fn http_config() -> HttpClientConfig {
    HttpClientConfig {
        timeout: Duration::from_secs(2),
        ..HttpClientConfig::default()
    }
}

/// Engine builder wired to `sink`.
pub fn engine_with(sink: &Arc<RecordingSink>) -> EngineBuilder {
    let http = build_http_client(&http_config()).expect("test client builds");
    Engine::builder(sink.clone(), http)
}
