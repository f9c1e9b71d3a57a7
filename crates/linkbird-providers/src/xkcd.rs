//! XKCD comics.
//!
//! `https://xkcd.com/614/` replies with the comic's alt text and hover title:
//!
//! ```text
//! [XKCD] Woodpecker: If you don't have an extension cord I can get that too.
//! ```

use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};

use linkbird_core::MessageEvent;
use linkbird_framework::{
    BoxFuture, BoxedUrlHandler, Engine, FoundUrl, Outcome, Provider, UrlHandler, fetch_page,
};

const PREFIX: &str = "[XKCD]";

/// Host the provider binds to.
pub const HOST: &str = "xkcd.com";

static COMIC_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/([^/]+)$").expect("comic path pattern is a valid regex"));

/// Provider for `xkcd.com`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XkcdProvider;

impl XkcdProvider {
    /// Creates the provider.
    pub fn new() -> Self {
        Self
    }
}

impl Provider for XkcdProvider {
    fn name(&self) -> &str {
        "xkcd"
    }

    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        vec![(HOST.to_string(), Arc::new(XkcdHandler))]
    }
}

/// Claims the front page and single-segment comic pages.
#[derive(Debug, Clone, Copy)]
struct XkcdHandler;

impl XkcdHandler {
    async fn handle_comic(engine: &Engine, event: &MessageEvent, url: &FoundUrl) -> Outcome {
        if !url.path().is_empty() && !COMIC_PATH.is_match(url.path()) {
            return Outcome::NotClaimed;
        }

        let body = match fetch_page(engine.http(), url.url().as_str(), engine.http_config().max_body_bytes).await {
            Ok(body) => body,
            Err(e) => {
                debug!(url = %url.raw(), error = %e, "XKCD fetch failed");
                return Outcome::NotClaimed;
            }
        };

        let Some((alt, title)) = comic_caption(&body) else {
            debug!(url = %url.raw(), "No comic on page");
            return Outcome::NotClaimed;
        };

        if let Err(e) = engine.reply(&event.source, format!("{PREFIX} {alt}: {title}")).await {
            warn!(error = %e, "Failed to send XKCD reply");
        }
        Outcome::Claimed
    }
}

impl UrlHandler for XkcdHandler {
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        Self::handle_comic(engine, event, url).boxed()
    }
}

/// Returns the `alt` and `title` attributes of the image in `#comic`.
fn comic_caption(html: &str) -> Option<(String, String)> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("#comic img").ok()?;
    let img = document.select(&selector).next()?;
    let attr = |name| img.value().attr(name).unwrap_or_default().to_string();
    Some((attr("alt"), attr("title")))
}
