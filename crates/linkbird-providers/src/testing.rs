//! Test doubles for provider tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use linkbird_core::{ChannelSource, MessageEvent, OutboundMessage, ReplySink, TransportResult};
use linkbird_framework::Engine;
use parking_lot::Mutex;

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
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

/// An engine with no providers, replying into a fresh recording sink.
pub fn engine() -> (Engine, Arc<RecordingSink>) {
    let sink = Arc::new(RecordingSink::default());
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("test client builds");
    (Engine::builder(sink.clone(), http).build(), sink)
}

pub fn message(text: &str) -> Arc<MessageEvent> {
    Arc::new(MessageEvent::new(ChannelSource::new("irc://libera/#rust"), text))
}
