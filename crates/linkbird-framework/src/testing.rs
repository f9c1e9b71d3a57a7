//! Test doubles shared by the framework's unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use linkbird_core::{OutboundMessage, ReplySink, TransportResult};

use crate::engine::{Engine, EngineBuilder};

/// Reply sink that keeps everything it is sent.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().clone()
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

/// Engine builder wired to `sink` and a plain client with a short timeout.
pub fn test_engine(sink: &Arc<RecordingSink>) -> EngineBuilder {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .expect("test client builds");
    Engine::builder(sink.clone(), http)
}
