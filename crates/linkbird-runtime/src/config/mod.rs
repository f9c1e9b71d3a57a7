//! Configuration module for the linkbird runtime.
//!
//! This module provides figment-based configuration loading and validation
//! for the event stream connection, the shared HTTP client, the backend
//! filter, built-in providers and logging.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile, load_config, load_config_from_file};
pub use schema::{
    CoreConfig, FilterConfig, GithubConfig, HttpConfig, LinkbirdConfig, LogFormat, LogLevel,
    LogOutput, LoggingConfig, ProvidersConfig, RedditConfig, ReplyConfig, SpanEventConfig,
    XkcdConfig, YoutubeConfig,
};
pub use validation::validate_config;
