//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize};

use linkbird_core::HttpClientConfig;
use linkbird_core::config::{DEFAULT_HTTP_TIMEOUT, DEFAULT_MAX_BODY_BYTES};
use linkbird_providers::{DEFAULT_GITHUB_API, DEFAULT_REDDIT_API, DEFAULT_YOUTUBE_API};

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkbirdConfig {
    /// Connection to the chat core.
    #[serde(default)]
    pub core: CoreConfig,

    /// The shared outbound HTTP client.
    #[serde(default)]
    pub http: HttpConfig,

    /// Backend filter.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Outbound replies.
    #[serde(default)]
    pub reply: ReplyConfig,

    /// Built-in providers.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

// =============================================================================
// Core / HTTP / Filter / Reply
// =============================================================================

/// Event stream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CoreConfig {
    /// `ws://` or `wss://` URL of the chat core.
    #[serde(default)]
    pub url: String,

    /// Bearer token for the handshake.
    #[serde(default)]
    pub token: String,
}

/// Shared HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout in seconds.
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip certificate validation.
    #[serde(default = "default_true")]
    pub accept_invalid_certs: bool,

    /// Maximum body bytes read when scraping a page.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout_secs(),
            accept_invalid_certs: true,
            max_body_bytes: default_max_body_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl HttpConfig {
    /// Converts to the client settings understood by transports.
    pub fn to_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            timeout: Duration::from_secs(self.timeout_secs),
            accept_invalid_certs: self.accept_invalid_certs,
            max_body_bytes: self.max_body_bytes,
            user_agent: self.user_agent.clone(),
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    DEFAULT_HTTP_TIMEOUT.as_secs()
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_user_agent() -> String {
    HttpClientConfig::default().user_agent
}

fn default_true() -> bool {
    true
}

/// Backend filter settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterConfig {
    /// Backend schemes whose events are dropped.
    ///
    /// Accepts a list, or a comma-separated string as environment variables
    /// deliver it.
    #[serde(default, deserialize_with = "string_or_list")]
    pub ignored_backends: Vec<String>,
}

fn string_or_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrList {
        One(String),
        Many(Vec<String>),
    }

    Ok(match StringOrList::deserialize(deserializer)? {
        StringOrList::One(s) => s
            .split(',')
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .map(String::from)
            .collect(),
        StringOrList::Many(list) => list,
    })
}

/// Reply settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Bound on each reply call, in seconds.
    #[serde(default = "default_reply_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_reply_timeout_secs(),
        }
    }
}

impl ReplyConfig {
    /// Returns the timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_reply_timeout_secs() -> u64 {
    5
}

// =============================================================================
// Providers
// =============================================================================

/// Built-in provider switches.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProvidersConfig {
    /// XKCD comics.
    #[serde(default)]
    pub xkcd: XkcdConfig,

    /// Reddit links and mentions.
    #[serde(default)]
    pub reddit: RedditConfig,

    /// GitHub users, repositories, issues, pull requests and gists.
    #[serde(default)]
    pub github: GithubConfig,

    /// YouTube videos.
    #[serde(default)]
    pub youtube: YoutubeConfig,
}

/// XKCD provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XkcdConfig {
    /// Whether the provider is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for XkcdConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Reddit provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditConfig {
    /// Whether the provider is registered.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Base URL of the JSON API.
    #[serde(default = "default_reddit_api")]
    pub api_base: String,
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_base: default_reddit_api(),
        }
    }
}

fn default_reddit_api() -> String {
    DEFAULT_REDDIT_API.to_string()
}

/// GitHub provider settings.
///
/// The provider is registered only when `token` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// API token sent as a bearer credential.
    #[serde(default)]
    pub token: String,

    /// Base URL of the REST API.
    #[serde(default = "default_github_api")]
    pub api_base: String,
}

impl GithubConfig {
    /// Whether a token is configured.
    pub fn enabled(&self) -> bool {
        !self.token.trim().is_empty()
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: default_github_api(),
        }
    }
}

fn default_github_api() -> String {
    DEFAULT_GITHUB_API.to_string()
}

/// YouTube provider settings.
///
/// The provider is registered only when `api_key` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YoutubeConfig {
    /// Data API key.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the Data API.
    #[serde(default = "default_youtube_api")]
    pub api_base: String,
}

impl YoutubeConfig {
    /// Whether an API key is configured.
    pub fn enabled(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_youtube_api(),
        }
    }
}

fn default_youtube_api() -> String {
    DEFAULT_YOUTUBE_API.to_string()
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Output destination.
    #[serde(default)]
    pub output: LogOutput,

    /// Log file path, used when `output = "file"`.
    #[serde(default)]
    pub file_path: Option<PathBuf>,

    /// Per-module level overrides, e.g. `linkbird_transport = "trace"`.
    #[serde(default)]
    pub filters: HashMap<String, LogLevel>,

    /// Include thread IDs.
    #[serde(default)]
    pub thread_ids: bool,

    /// Include file names and line numbers.
    #[serde(default)]
    pub file_location: bool,

    /// Span lifecycle events to log.
    #[serde(default)]
    pub span_events: SpanEventConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: LogOutput::default(),
            file_path: None,
            filters: HashMap::new(),
            thread_ids: false,
            file_location: false,
            span_events: SpanEventConfig::default(),
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Returns the level name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Converts to a `tracing` level.
    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Single-line, abbreviated.
    #[default]
    Compact,
    /// Single-line with span context.
    Full,
    /// Multi-line, human oriented.
    Pretty,
    /// Newline-delimited JSON.
    #[cfg(feature = "json-log")]
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpanEventConfig {
    #[serde(default)]
    pub new: bool,
    #[serde(default)]
    pub enter: bool,
    #[serde(default)]
    pub exit: bool,
    #[serde(default)]
    pub close: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkbirdConfig::default();
        assert_eq!(config.http.timeout_secs, 5);
        assert!(config.http.accept_invalid_certs);
        assert_eq!(config.http.max_body_bytes, 1024 * 1024);
        assert_eq!(config.reply.timeout(), Duration::from_secs(5));
        assert!(config.providers.xkcd.enabled);
        assert_eq!(config.providers.reddit.api_base, "https://www.reddit.com");
        assert!(!config.providers.github.enabled());
        assert!(!config.providers.youtube.enabled());
        assert_eq!(config.providers.github.api_base, "https://api.github.com");
        assert_eq!(config.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_http_config_conversion() {
        let http = HttpConfig {
            timeout_secs: 3,
            accept_invalid_certs: false,
            ..HttpConfig::default()
        };
        let client = http.to_client_config();
        assert_eq!(client.timeout, Duration::from_secs(3));
        assert!(!client.accept_invalid_certs);
    }
}
