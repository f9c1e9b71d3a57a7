//! # Linkbird Transport
//!
//! Concrete implementations of the boundary traits defined in `linkbird-core`.
//!
//! ## Features
//!
//! - `ws-client` (default): the WebSocket event stream and reply sink
//! - `http-client` (default): the shared outbound HTTP client
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  linkbird-runtime   │  (consumer loop, engine wiring)
//! ├─────────────────────┤
//! │  linkbird-core      │  (EventStream / ReplySink traits)
//! ├─────────────────────┤
//! │  linkbird-transport │  <- This crate (implementations)
//! ├─────────────────────┤
//! │  Network (TCP/TLS)  │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use linkbird_transport::websocket::{WsConfig, connect};
//!
//! let config = WsConfig::new("wss://core.example.org/events", token);
//! let (mut stream, sink) = connect(&config, commands).await?;
//! while let Ok(event) = stream.next_event().await {
//!     // ...
//! }
//! ```

pub mod protocol;

#[cfg(feature = "http-client")]
pub mod http_client;

#[cfg(feature = "ws-client")]
pub mod websocket;

pub use protocol::{ClientFrame, decode_event};

#[cfg(feature = "http-client")]
pub use http_client::build_http_client;

#[cfg(feature = "ws-client")]
pub use websocket::{WsConfig, WsEventStream, WsReplySink, connect};
