//! The `isitdown` liveness command.
//!
//! ```text
//! isitdown example.com
//! -> ferris: It's just you! http://example.com looks up from here!
//! ```
//!
//! The check is a single HEAD request through the shared client, so it gets
//! the same short timeout and relaxed certificate handling as every other
//! outbound request.

use std::sync::Arc;

use futures::FutureExt;
use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use linkbird_core::{CommandEvent, CommandMetadata};

use crate::engine::Engine;
use crate::handler::{BoxFuture, BoxedCommandHandler, CommandHandler};

/// Command name.
pub const NAME: &str = "isitdown";

/// Checks whether a website answers.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsItDown;

impl IsItDown {
    /// Returns the command as a shareable handler.
    pub fn handler() -> BoxedCommandHandler {
        Arc::new(Self)
    }

    async fn run(engine: &Engine, command: &CommandEvent) {
        let text = match parse_target(&command.arg) {
            None => "URL doesn't appear to be valid".to_string(),
            Some(target) => {
                if is_up(engine.http(), &target).await {
                    format!("It's just you! {target} looks up from here!")
                } else {
                    format!("It's not just you! {target} looks down from here.")
                }
            }
        };

        if let Err(e) = engine
            .reply_to(&command.source, &command.sender, text)
            .await
        {
            warn!(error = %e, "Failed to send isitdown reply");
        }
    }
}

impl CommandHandler for IsItDown {
    fn metadata(&self) -> CommandMetadata {
        CommandMetadata::new(NAME, "<website>", "Checks if given website is down")
    }

    fn handle<'a>(&'a self, engine: &'a Engine, command: &'a CommandEvent) -> BoxFuture<'a, ()> {
        Self::run(engine, command).boxed()
    }
}

/// Normalises the command argument into a URL to probe.
///
/// A missing scheme defaults to `http`. Returns `None` for anything that is
/// not an http(s) URL with a host.
pub fn parse_target(arg: &str) -> Option<String> {
    let arg = arg.trim();
    if arg.is_empty() {
        return None;
    }

    let target = if arg.contains("://") {
        arg.to_string()
    } else {
        format!("http://{arg}")
    };

    let url = Url::parse(&target).ok()?;
    let has_host = url.host_str().is_some_and(|h| !h.is_empty());
    (matches!(url.scheme(), "http" | "https") && has_host).then_some(target)
}

async fn is_up(client: &reqwest::Client, target: &str) -> bool {
    match client.head(target).send().await {
        Ok(response) => {
            debug!(url = target, status = %response.status(), "Liveness check answered");
            response.status() == StatusCode::OK
        }
        Err(e) => {
            debug!(url = target, error = %e, "Liveness check failed");
            false
        }
    }
}
