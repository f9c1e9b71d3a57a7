//! Reddit users, subreddits and posts.
//!
//! Links are classified by path and looked up through Reddit's public JSON
//! API:
//!
//! | Path | Endpoint | Reply |
//! |------|----------|-------|
//! | `/u/<name>`, `/user/<name>` | `/user/<name>/about.json` | karma line |
//! | `/r/<sub>/comments/<id>/...` | `/comments/<id>.json` | post line |
//! | `/r/<sub>...` | `/r/<sub>/about.json` | subreddit line |
//!
//! Bare `/r/<sub>` and `/u/<name>` mentions in message text get the same
//! subreddit and user lines.

use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use linkbird_core::MessageEvent;
use linkbird_framework::{
    BoxFuture, BoxedMessageHandler, BoxedUrlHandler, Engine, FoundUrl, MessageHandler, Outcome,
    Provider, UrlHandler, fetch_json,
};

use crate::format::{pluralize, prettify_suffix};

const PREFIX: &str = "[Reddit]";

/// Host the provider binds to.
pub const HOST: &str = "reddit.com";

/// Public API base used in production.
pub const DEFAULT_REDDIT_API: &str = "https://www.reddit.com";

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("reddit pattern is a valid regex")
}

static USER_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/(?:u|user)/([^\s/]+)$"));
static COMMENT_PATH: LazyLock<Regex> =
    LazyLock::new(|| regex(r"^/r/[^/]+/comments/([^/]+)(?:/.*)?$"));
static SUB_PATH: LazyLock<Regex> = LazyLock::new(|| regex(r"^/r/([^\s/]+)/?.*$"));

static SUB_MENTION: LazyLock<Regex> = LazyLock::new(|| regex(r"(?:\s|^)/r/([^\s/]+)"));
static USER_MENTION: LazyLock<Regex> = LazyLock::new(|| regex(r"(?:\s|^)/(?:u|user)/([^\s/]+)"));

// =============================================================================
// API payloads
// =============================================================================

#[derive(Debug, Deserialize)]
struct Thing<T> {
    data: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    name: String,
    link_karma: i64,
    comment_karma: i64,
    is_gold: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Subreddit {
    url: String,
    subscribers: u64,
    public_description: String,
    accounts_active: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Listing {
    children: Vec<Thing<Post>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Post {
    title: String,
    author: String,
    score: i64,
    subreddit: String,
}

// =============================================================================
// Path classification
// =============================================================================

/// What a reddit.com path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Link<'a> {
    User(&'a str),
    Post(&'a str),
    Subreddit(&'a str),
}

fn classify(path: &str) -> Option<Link<'_>> {
    let capture = |re: &Regex| re.captures(path).and_then(|c| c.get(1)).map(|m| m.as_str());

    if let Some(name) = capture(&USER_PATH) {
        Some(Link::User(name))
    } else if let Some(id) = capture(&COMMENT_PATH) {
        Some(Link::Post(id))
    } else {
        capture(&SUB_PATH).map(Link::Subreddit)
    }
}

fn mentioned<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
    re.captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

// =============================================================================
// API client
// =============================================================================

struct RedditApi {
    base: String,
}

impl RedditApi {
    async fn reply(&self, engine: &Engine, event: &MessageEvent, line: String) -> Outcome {
        if let Err(e) = engine.reply(&event.source, format!("{PREFIX} {line}")).await {
            warn!(error = %e, "Failed to send Reddit reply");
        }
        Outcome::Claimed
    }

    async fn user(&self, engine: &Engine, event: &MessageEvent, name: &str) -> Outcome {
        let url = format!("{}/user/{name}/about.json", self.base);
        let user: Thing<User> = match fetch_json(engine.http(), &url).await {
            Ok(user) => user,
            Err(e) => {
                debug!(user = name, error = %e, "Reddit user lookup failed");
                return Outcome::NotClaimed;
            }
        };

        let user = user.data;
        let gold = if user.is_gold { " [gold]" } else { "" };
        let line = format!(
            "{}{gold} has {} link karma and {} comment karma",
            user.name, user.link_karma, user.comment_karma
        );
        self.reply(engine, event, line).await
    }

    async fn post(&self, engine: &Engine, event: &MessageEvent, id: &str) -> Outcome {
        let url = format!("{}/comments/{id}.json", self.base);
        let listings: Vec<Thing<Listing>> = match fetch_json(engine.http(), &url).await {
            Ok(listings) => listings,
            Err(e) => {
                debug!(post = id, error = %e, "Reddit post lookup failed");
                return Outcome::NotClaimed;
            }
        };

        let Some(post) = listings
            .into_iter()
            .next()
            .and_then(|listing| listing.data.children.into_iter().next())
        else {
            debug!(post = id, "Reddit post listing is empty");
            return Outcome::NotClaimed;
        };

        let post = post.data;
        let line = format!(
            "{} - {} (/r/{}, score: {})",
            post.title, post.author, post.subreddit, post.score
        );
        self.reply(engine, event, line).await
    }

    async fn subreddit(&self, engine: &Engine, event: &MessageEvent, sub: &str) -> Outcome {
        let url = format!("{}/r/{sub}/about.json", self.base);
        let sub_info: Thing<Subreddit> = match fetch_json(engine.http(), &url).await {
            Ok(sub_info) => sub_info,
            Err(e) => {
                debug!(subreddit = sub, error = %e, "Reddit subreddit lookup failed");
                return Outcome::NotClaimed;
            }
        };

        let s = sub_info.data;
        let line = format!(
            "{} - {} ({} {}, {} {})",
            s.url,
            s.public_description,
            prettify_suffix(s.subscribers),
            pluralize(s.subscribers, "subscriber"),
            prettify_suffix(s.accounts_active),
            pluralize(s.accounts_active, "active"),
        );
        self.reply(engine, event, line).await
    }

    async fn link(&self, engine: &Engine, event: &MessageEvent, url: &FoundUrl) -> Outcome {
        match classify(url.path()) {
            Some(Link::User(name)) => self.user(engine, event, name).await,
            Some(Link::Post(id)) => self.post(engine, event, id).await,
            Some(Link::Subreddit(sub)) => self.subreddit(engine, event, sub).await,
            None => Outcome::NotClaimed,
        }
    }

    async fn mentions(&self, engine: &Engine, event: &MessageEvent) {
        let subs = mentioned(&SUB_MENTION, &event.text);
        let users = mentioned(&USER_MENTION, &event.text);

        for sub in subs {
            self.subreddit(engine, event, sub).await;
        }
        for user in users {
            self.user(engine, event, user).await;
        }
    }
}

// =============================================================================
// Provider
// =============================================================================

/// Provider for `reddit.com` links and mentions.
#[derive(Clone)]
pub struct RedditProvider {
    api: Arc<RedditApi>,
}

impl RedditProvider {
    /// Creates the provider against an API base such as
    /// [`DEFAULT_REDDIT_API`].
    pub fn new(api_base: impl Into<String>) -> Self {
        let base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api: Arc::new(RedditApi { base }),
        }
    }
}

impl Default for RedditProvider {
    fn default() -> Self {
        Self::new(DEFAULT_REDDIT_API)
    }
}

impl Provider for RedditProvider {
    fn name(&self) -> &str {
        "reddit"
    }

    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        vec![(HOST.to_string(), Arc::new(RedditLinks(Arc::clone(&self.api))))]
    }

    fn message_handler(&self) -> Option<BoxedMessageHandler> {
        Some(Arc::new(RedditMentions(Arc::clone(&self.api))))
    }
}

struct RedditLinks(Arc<RedditApi>);

impl UrlHandler for RedditLinks {
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        self.0.link(engine, event, url).boxed()
    }
}

struct RedditMentions(Arc<RedditApi>);

impl MessageHandler for RedditMentions {
    fn handle<'a>(&'a self, engine: &'a Engine, event: &'a Arc<MessageEvent>) -> BoxFuture<'a, ()> {
        self.0.mentions(engine, event).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{engine, message};
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_json(server: &MockServer, at: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(at))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[test]
    fn test_classify_paths() {
        assert_eq!(classify("/u/spez"), Some(Link::User("spez")));
        assert_eq!(classify("/user/spez"), Some(Link::User("spez")));
        assert_eq!(
            classify("/r/rust/comments/abc123/some_title"),
            Some(Link::Post("abc123"))
        );
        assert_eq!(classify("/r/rust/comments/abc123"), Some(Link::Post("abc123")));
        assert_eq!(classify("/r/rust"), Some(Link::Subreddit("rust")));
        assert_eq!(classify("/r/rust/top"), Some(Link::Subreddit("rust")));
        assert_eq!(classify(""), None);
        assert_eq!(classify("/settings"), None);
    }

    #[tokio::test]
    async fn test_user_link() {
        let server = MockServer::start().await;
        mock_json(
            &server,
            "/user/spez/about.json",
            json!({"data": {"name": "spez", "link_karma": 1, "comment_karma": 1337, "is_gold": true}}),
        )
        .await;

        let (engine, sink) = engine();
        let provider = RedditProvider::new(server.uri());
        let url = FoundUrl::parse("https://www.reddit.com/u/spez/").unwrap();
        let handlers = provider.url_handlers();
        let (_, handler) = &handlers[0];

        let outcome = handler.handle(&engine, &message(url.raw()), &url).await;

        assert_eq!(outcome, Outcome::Claimed);
        assert_eq!(
            sink.texts(),
            vec!["[Reddit] spez [gold] has 1 link karma and 1337 comment karma"]
        );
    }

    #[tokio::test]
    async fn test_post_link() {
        let server = MockServer::start().await;
        mock_json(
            &server,
            "/comments/abc123.json",
            json!([{"data": {"children": [{"data": {
                "title": "Rust 2024 is out",
                "author": "ferris",
                "score": 5,
                "subreddit": "rust"
            }}]}}]),
        )
        .await;

        let (engine, sink) = engine();
        let api = RedditApi { base: server.uri() };
        let url = FoundUrl::parse("https://reddit.com/r/rust/comments/abc123/rust_2024/").unwrap();

        let outcome = api.link(&engine, &message(url.raw()), &url).await;

        assert_eq!(outcome, Outcome::Claimed);
        assert_eq!(
            sink.texts(),
            vec!["[Reddit] Rust 2024 is out - ferris (/r/rust, score: 5)"]
        );
    }

    #[tokio::test]
    async fn test_empty_post_listing_is_not_claimed() {
        let server = MockServer::start().await;
        mock_json(&server, "/comments/gone.json", json!([{"data": {"children": []}}])).await;

        let (engine, sink) = engine();
        let api = RedditApi { base: server.uri() };
        let url = FoundUrl::parse("https://reddit.com/r/rust/comments/gone/x").unwrap();

        assert_eq!(api.link(&engine, &message(url.raw()), &url).await, Outcome::NotClaimed);
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_claimed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let (engine, sink) = engine();
        let api = RedditApi { base: server.uri() };
        let url = FoundUrl::parse("https://reddit.com/r/doesnotexist").unwrap();

        assert_eq!(api.link(&engine, &message(url.raw()), &url).await, Outcome::NotClaimed);
        assert!(sink.texts().is_empty());
    }

    #[tokio::test]
    async fn test_mentions_in_text() {
        let server = MockServer::start().await;
        mock_json(
            &server,
            "/r/rust/about.json",
            json!({"data": {
                "url": "/r/rust/",
                "public_description": "A place for all things Rust",
                "subscribers": 1240,
                "accounts_active": 1
            }}),
        )
        .await;
        mock_json(
            &server,
            "/user/ferris/about.json",
            json!({"data": {"name": "ferris", "link_karma": 2, "comment_karma": 3}}),
        )
        .await;

        let (engine, sink) = engine();
        let provider = RedditProvider::new(format!("{}/", server.uri()));
        let handler = provider.message_handler().unwrap();

        handler
            .handle(&engine, &message("check /r/rust and ask /u/ferris about a/r/b"))
            .await;

        assert_eq!(
            sink.texts(),
            vec![
                "[Reddit] /r/rust/ - A place for all things Rust (1.2k subscribers, 1 active)",
                "[Reddit] ferris has 2 link karma and 3 comment karma",
            ]
        );
    }
}
