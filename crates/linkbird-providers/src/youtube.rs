//! YouTube videos.
//!
//! `https://www.youtube.com/watch?v=<id>` and `https://youtu.be/<id>` reply
//! with the video length and title from the Data API:
//!
//! ```text
//! [YouTube] 03:32 ~ Never Gonna Give You Up
//! [YouTube] Live ~ Lofi beats to relax to
//! ```

use std::sync::{Arc, LazyLock};

use futures::FutureExt;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use linkbird_core::MessageEvent;
use linkbird_framework::{
    BoxFuture, BoxedUrlHandler, Engine, FoundUrl, Outcome, Provider, UrlHandler, send_json,
};

const PREFIX: &str = "[YouTube]";

/// Hosts the provider binds to.
pub const HOSTS: [&str; 2] = ["youtube.com", "youtu.be"];

/// Public API base used in production.
pub const DEFAULT_YOUTUBE_API: &str = "https://www.googleapis.com";

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$")
        .expect("duration pattern is a valid regex")
});

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Videos {
    items: Vec<Video>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Video {
    snippet: Snippet,
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Snippet {
    title: String,
    live_broadcast_content: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ContentDetails {
    duration: String,
}

/// Picks the video id from `?v=`, or from the path for short links.
fn video_id(url: &FoundUrl) -> Option<String> {
    if let Some((_, v)) = url.url().query_pairs().find(|(k, _)| k == "v") {
        return (!v.is_empty()).then(|| v.into_owned());
    }

    let mut segments = url.path().trim_start_matches('/').split('/');
    let id = match segments.next()? {
        "shorts" | "embed" | "live" => segments.next()?,
        first => first,
    };
    (!id.is_empty()).then(|| id.to_string())
}

/// Renders an ISO 8601 duration as `MM:SS`, `HH:MM:SS` or `DD:HH:MM:SS`.
fn format_duration(iso: &str) -> Option<String> {
    let c = ISO_DURATION.captures(iso)?;
    let part = |i: usize| match c.get(i) {
        Some(m) => m.as_str().parse::<u64>().ok(),
        None => Some(0),
    };
    let (days, hours, minutes, seconds) = (part(1)?, part(2)?, part(3)?, part(4)?);

    Some(if days > 0 {
        format!("{days:02}:{hours:02}:{minutes:02}:{seconds:02}")
    } else if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    })
}

fn video_line(video: &Video) -> Option<String> {
    let title = &video.snippet.title;
    let length = match video.snippet.live_broadcast_content.as_str() {
        "live" => "Live".to_string(),
        "upcoming" => "Upcoming".to_string(),
        _ => format_duration(&video.content_details.duration)?,
    };
    Some(format!("{length} ~ {title}"))
}

struct YoutubeApi {
    base: String,
    key: String,
}

impl YoutubeApi {
    fn videos_url(&self, id: &str) -> Result<Url, url::ParseError> {
        Url::parse_with_params(
            &format!("{}/youtube/v3/videos", self.base),
            [
                ("part", "contentDetails,snippet"),
                ("id", id),
                ("fields", "items(contentDetails,snippet)"),
                ("key", self.key.as_str()),
            ],
        )
    }

    async fn video(&self, engine: &Engine, event: &MessageEvent, url: &FoundUrl) -> Outcome {
        let Some(id) = video_id(url) else {
            return Outcome::NotClaimed;
        };
        let api = match self.videos_url(&id) {
            Ok(api) => api,
            Err(e) => {
                warn!(error = %e, "Invalid YouTube API base");
                return Outcome::NotClaimed;
            }
        };

        let videos: Videos = match send_json(engine.http().get(api)).await {
            Ok(videos) => videos,
            Err(e) => {
                debug!(video = %id, error = %e, "YouTube lookup failed");
                return Outcome::NotClaimed;
            }
        };

        let Some(line) = videos.items.first().and_then(video_line) else {
            debug!(video = %id, "No usable video in response");
            return Outcome::NotClaimed;
        };

        if let Err(e) = engine.reply(&event.source, format!("{PREFIX} {line}")).await {
            warn!(error = %e, "Failed to send YouTube reply");
        }
        Outcome::Claimed
    }
}

/// Provider for `youtube.com` and `youtu.be` links.
#[derive(Clone)]
pub struct YoutubeProvider {
    api: Arc<YoutubeApi>,
}

impl YoutubeProvider {
    /// Creates the provider against [`DEFAULT_YOUTUBE_API`].
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_api_base(api_key, DEFAULT_YOUTUBE_API)
    }

    /// Creates the provider against another API base.
    pub fn with_api_base(api_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        let base = api_base.into().trim_end_matches('/').to_string();
        Self {
            api: Arc::new(YoutubeApi {
                base,
                key: api_key.into(),
            }),
        }
    }
}

impl Provider for YoutubeProvider {
    fn name(&self) -> &str {
        "youtube"
    }

    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        let handler: BoxedUrlHandler = Arc::new(YoutubeLinks(Arc::clone(&self.api)));
        HOSTS
            .iter()
            .map(|host| (host.to_string(), Arc::clone(&handler)))
            .collect()
    }
}

struct YoutubeLinks(Arc<YoutubeApi>);

impl UrlHandler for YoutubeLinks {
    fn handle<'a>(
        &'a self,
        engine: &'a Engine,
        event: &'a Arc<MessageEvent>,
        url: &'a FoundUrl,
    ) -> BoxFuture<'a, Outcome> {
        self.0.video(engine, event, url).boxed()
    }
}
