//! Linkbird Runtime - process-level orchestration for the linkbird URL bot.
//!
//! This crate provides:
//! - Configuration loading and validation (`config`)
//! - Logging setup (`logging`)
//! - The event stream consume loop (`StreamConsumer`)
//! - Runtime orchestration with signal handling (`LinkbirdRuntime`)
//!
//! ```ignore
//! use linkbird_runtime::LinkbirdRuntime;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runtime = LinkbirdRuntime::builder().build()?;
//!
//!     // Returns Ok on Ctrl+C, or the error that ended the event stream.
//!     runtime.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! There is no reconnect: when the event stream fails the runtime returns
//! and restarting is left to the process supervisor.

pub mod config;
pub mod consumer;
pub mod error;
pub mod logging;
pub mod runtime;

#[cfg(test)]
mod testing;

// Re-exports
pub use config::{ConfigError, ConfigLoader, ConfigResult, LinkbirdConfig, validate_config};
pub use consumer::{Dispatch, SkipReason, StreamConsumer};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{filter_directives, init_from_config, try_init_from_config};
pub use runtime::{LinkbirdRuntime, RuntimeBuilder, wait_for_shutdown};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros and span helpers.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
