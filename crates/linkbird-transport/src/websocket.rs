//! WebSocket event stream.
//!
//! One connection carries both directions:
//!
//! ```text
//!            ┌──────────────────┐  mpsc<Message>  ┌──────────────┐
//! handlers ─▶│   WsReplySink    │────────────────▶│ writer task  │──▶ socket
//!            └──────────────────┘                 └──────────────┘
//!            ┌──────────────────┐
//! consumer ◀─│  WsEventStream   │◀──────────────────────────────────── socket
//!            └──────────────────┘
//! ```
//!
//! The socket's read half belongs to the event stream and is only polled
//! when the consumer asks for the next event. The write half lives in a
//! writer task so replies from many handler tasks are serialised without a
//! lock. Pings are answered by tungstenite itself while the read half is
//! polled. There is no reconnect: once the stream reports
//! [`TransportError::ConnectionClosed`] it is finished.

use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::{Error, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, trace, warn};

use linkbird_core::{
    CommandMetadata, EventStream, OutboundMessage, ReplySink, StreamEvent, TransportError,
    TransportResult,
};

use crate::protocol::{ClientFrame, decode_event};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, Message>;
type WsSource = SplitStream<WsStream>;

/// Capacity of the outbound frame queue.
const OUTBOUND_QUEUE: usize = 256;

/// Where and how to connect.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// `ws://` or `wss://` endpoint of the chat core.
    pub url: String,
    /// Bearer token sent on the handshake.
    pub token: String,
}

impl WsConfig {
    /// Creates a connection config.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
        }
    }
}

/// Connects, opens the event stream and announces `commands`.
///
/// Returns the inbound stream and a sink for replies. The sink may be cloned
/// freely; the writer task exits when the socket fails or every sink has
/// been dropped.
pub async fn connect(
    config: &WsConfig,
    commands: Vec<CommandMetadata>,
) -> TransportResult<(WsEventStream, WsReplySink)> {
    let connection_failed = |reason: String| TransportError::ConnectionFailed {
        url: config.url.clone(),
        reason,
    };

    let mut request = config
        .url
        .as_str()
        .into_client_request()
        .map_err(|e| connection_failed(format!("invalid request: {e}")))?;
    let auth = HeaderValue::from_str(&format!("Bearer {}", config.token))
        .map_err(|e| TransportError::InvalidConfig(format!("token: {e}")))?;
    request.headers_mut().insert(AUTHORIZATION, auth);

    info!(url = %config.url, "Connecting to event stream");

    let (ws_stream, _response) = connect_async(request)
        .await
        .map_err(|e| connection_failed(format!("WebSocket connection failed: {e}")))?;
    let (mut ws_tx, ws_rx) = ws_stream.split();

    let open = ClientFrame::stream_events(commands).encode()?;
    ws_tx
        .send(Message::Text(open.into()))
        .await
        .map_err(|e| connection_failed(format!("failed to open event stream: {e}")))?;

    info!(url = %config.url, "Event stream open");

    let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE);
    tokio::spawn(run_writer(ws_tx, rx));

    Ok((WsEventStream { ws_rx }, WsReplySink { outbound: tx }))
}

/// Drains the outbound queue into the socket.
async fn run_writer(mut ws_tx: WsSink, mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        if let Err(e) = ws_tx.send(msg).await {
            warn!(error = %e, "Failed to write frame, stopping writer");
            break;
        }
    }
    let _ = ws_tx.close().await;
    debug!("Writer task finished");
}

// =============================================================================
// Inbound
// =============================================================================

/// Read half of the connection.
pub struct WsEventStream {
    ws_rx: WsSource,
}

impl WsEventStream {
    /// Maps one socket item to an event, `None` to keep reading, or a
    /// terminal error.
    async fn handle_message(
        &mut self,
        msg: Option<Result<Message, Error>>,
    ) -> TransportResult<Option<StreamEvent>> {
        match msg {
            Some(Ok(Message::Text(text))) => {
                trace!(len = text.len(), "Received text");
                Ok(decode_frame(text.as_bytes()))
            }
            Some(Ok(Message::Binary(data))) => {
                trace!(len = data.len(), "Received binary");
                Ok(decode_frame(&data))
            }
            Some(Ok(Message::Ping(_))) => {
                trace!("Received ping");
                Ok(None)
            }
            Some(Ok(Message::Pong(_))) => {
                trace!("Received pong");
                Ok(None)
            }
            Some(Ok(Message::Close(frame))) => {
                info!(?frame, "Server closed connection");
                Err(TransportError::closed("server closed connection"))
            }
            Some(Ok(Message::Frame(_))) => Ok(None),
            Some(Err(e)) => {
                warn!(error = %e, "WebSocket error");
                Err(TransportError::closed(e.to_string()))
            }
            None => {
                info!("WebSocket stream ended");
                Err(TransportError::closed("stream ended"))
            }
        }
    }
}

fn decode_frame(data: &[u8]) -> Option<StreamEvent> {
    match decode_event(data) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, "Skipping undecodable frame");
            None
        }
    }
}

#[async_trait]
impl EventStream for WsEventStream {
    async fn next_event(&mut self) -> TransportResult<StreamEvent> {
        loop {
            let msg = self.ws_rx.next().await;
            if let Some(event) = self.handle_message(msg).await? {
                return Ok(event);
            }
        }
    }
}

// =============================================================================
// Outbound
// =============================================================================

/// Write half of the connection, shared by every handler task.
#[derive(Clone)]
pub struct WsReplySink {
    outbound: mpsc::Sender<Message>,
}

#[async_trait]
impl ReplySink for WsReplySink {
    async fn send_message(&self, message: OutboundMessage) -> TransportResult<()> {
        let frame = ClientFrame::SendMessage(message).encode()?;
        self.outbound
            .send(Message::Text(frame.into()))
            .await
            .map_err(|_| TransportError::SendFailed("connection writer stopped".into()))
    }
}
