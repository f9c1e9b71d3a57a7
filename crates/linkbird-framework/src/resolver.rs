//! The last-resort resolver for URLs nobody claimed.

use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, warn};

use linkbird_core::MessageEvent;

use crate::engine::Engine;
use crate::fetch::{extract_title, fetch_page};
use crate::handler::{BoxFuture, Outcome};

/// Called with the raw URL once every registered handler has passed.
///
/// Its outcome is final; nothing runs after it.
pub trait Fallback: Send + Sync + 'static {
    /// Attempts to resolve the URL.
    fn resolve<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        raw_url: &'a str,
    ) -> BoxFuture<'a, Outcome>;
}

/// Type alias for a shared fallback.
pub type BoxedFallback = Arc<dyn Fallback>;

/// Replies with the page title.
///
/// Fetches the URL with the shared client, reads at most the configured body
/// bound, and replies `Title: <text>` for the first `<title>` element. Any
/// failure, a non-200 status, or a missing title leaves the URL unclaimed and
/// the bot silent.
#[derive(Debug, Clone, Copy, Default)]
pub struct TitleResolver;

impl TitleResolver {
    async fn resolve_title(engine: &Engine, event: &MessageEvent, raw_url: &str) -> Outcome {
        let max_bytes = engine.http_config().max_body_bytes;
        let body = match fetch_page(engine.http(), raw_url, max_bytes).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = raw_url, error = %e, "No preview for URL");
                return Outcome::NotClaimed;
            }
        };

        let Some(title) = extract_title(&body) else {
            debug!(url = raw_url, "Page has no title");
            return Outcome::NotClaimed;
        };

        if let Err(e) = engine.reply(&event.source, format!("Title: {title}")).await {
            warn!(url = raw_url, error = %e, "Failed to send title reply");
        }
        Outcome::Claimed
    }
}

impl Fallback for TitleResolver {
    fn resolve<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        raw_url: &'a str,
    ) -> BoxFuture<'a, Outcome> {
        Self::resolve_title(engine, event, raw_url).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingSink, test_engine};
    use linkbird_core::ChannelSource;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn event() -> Arc<MessageEvent> {
        Arc::new(MessageEvent::new(ChannelSource::new("irc://libera/#rust"), ""))
    }

    #[tokio::test]
    async fn test_replies_with_collapsed_title() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                "<html><head><title>\n   Hello\n   World\n</title></head></html>",
            ))
            .mount(&server)
            .await;

        let sink = RecordingSink::new();
        let engine = test_engine(&sink).build();
        let url = format!("{}/page", server.uri());

        let outcome = TitleResolver.resolve(&engine, &event(), &url).await;

        assert_eq!(outcome, Outcome::Claimed);
        assert_eq!(sink.texts(), vec!["Title: Hello World"]);
    }

    #[tokio::test]
    async fn test_non_200_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<title>Oops</title>"))
            .mount(&server)
            .await;

        let sink = RecordingSink::new();
        let engine = test_engine(&sink).build();

        let outcome = TitleResolver.resolve(&engine, &event(), &server.uri()).await;

        assert_eq!(outcome, Outcome::NotClaimed);
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_missing_title_is_silent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>plain</p>"))
            .mount(&server)
            .await;

        let sink = RecordingSink::new();
        let engine = test_engine(&sink).build();

        let outcome = TitleResolver.resolve(&engine, &event(), &server.uri()).await;

        assert_eq!(outcome, Outcome::NotClaimed);
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_connection_error_is_silent() {
        let sink = RecordingSink::new();
        let engine = test_engine(&sink).build();

        let outcome = TitleResolver
            .resolve(&engine, &event(), "http://127.0.0.1:1/")
            .await;

        assert_eq!(outcome, Outcome::NotClaimed);
        assert!(sink.texts().is_empty());
    }
}
