//! Runtime orchestration.
//!
//! The runtime owns the loaded configuration and the provider registry while
//! the bot starts up. [`LinkbirdRuntime::run`] then connects the transport,
//! freezes the registry into an [`Engine`] and consumes the event stream
//! until it fails or a shutdown signal arrives.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use linkbird_runtime::LinkbirdRuntime;
//!
//! let mut runtime = LinkbirdRuntime::builder()
//!     .config_file("linkbird.toml")
//!     .build()?;
//! runtime.register_provider(&my_provider);
//! runtime.run().await?;
//! ```

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tokio::signal;
use tracing::{info, warn};

use linkbird_core::{BoxedReplySink, EventStream};
use linkbird_framework::{
    BackendFilter, BoxedCommandHandler, CommandTable, Engine, Provider, Registry,
};
use linkbird_providers::{GithubProvider, RedditProvider, XkcdProvider, YoutubeProvider};
use linkbird_transport::{WsConfig, build_http_client, connect};

use crate::config::{ConfigLoader, ConfigResult, LinkbirdConfig, validate_config};
use crate::consumer::StreamConsumer;
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The linkbird runtime.
pub struct LinkbirdRuntime {
    config: LinkbirdConfig,
    registry: Registry,
    commands: CommandTable,
}

impl LinkbirdRuntime {
    /// Creates a runtime builder that loads and validates configuration.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Creates a runtime from an already loaded configuration.
    ///
    /// Initializes logging and registers the enabled built-in providers and
    /// commands. The configuration is not validated here.
    pub fn from_config(config: &LinkbirdConfig) -> Self {
        logging::init_from_config(&config.logging);

        let mut runtime = Self {
            config: config.clone(),
            registry: Registry::new(),
            commands: CommandTable::with_builtins(),
        };
        runtime.register_builtin_providers();

        info!(
            log_level = %config.logging.level,
            log_format = ?config.logging.format,
            providers = ?runtime.registry.provider_names(),
            "Runtime initialized from configuration"
        );

        runtime
    }

    fn register_builtin_providers(&mut self) {
        let providers = self.config.providers.clone();
        if providers.xkcd.enabled {
            self.register_provider(&XkcdProvider::new());
        }
        if providers.reddit.enabled {
            self.register_provider(&RedditProvider::new(providers.reddit.api_base));
        }
        if providers.github.enabled() {
            let github = providers.github;
            self.register_provider(&GithubProvider::with_api_base(github.token, github.api_base));
        }
        if providers.youtube.enabled() {
            let youtube = providers.youtube;
            self.register_provider(&YoutubeProvider::with_api_base(
                youtube.api_key,
                youtube.api_base,
            ));
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &LinkbirdConfig {
        &self.config
    }

    /// Returns the provider registry built so far.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Returns the command table built so far.
    pub fn commands(&self) -> &CommandTable {
        &self.commands
    }

    /// Registers a provider after the built-in ones.
    pub fn register_provider<P: Provider + ?Sized>(&mut self, provider: &P) {
        self.registry.register(provider);
    }

    /// Registers a command, replacing any command with the same name.
    pub fn register_command(&mut self, handler: BoxedCommandHandler) {
        self.commands.register(handler);
    }

    /// Connects to the chat core and runs until the stream ends or the
    /// process is asked to stop.
    ///
    /// A stream failure, including a clean close by the server, is returned
    /// as [`RuntimeError::StreamClosed`]. SIGINT or SIGTERM returns `Ok`.
    pub async fn run(self) -> RuntimeResult<()> {
        let ws = WsConfig::new(&self.config.core.url, &self.config.core.token);
        let (stream, sink) = connect(&ws, self.commands.metadata())
            .await
            .map_err(RuntimeError::Connect)?;

        info!("linkbird is now running. Press Ctrl+C to stop.");
        self.serve(stream, Arc::new(sink), wait_for_shutdown()).await
    }

    /// Runs the consume loop over `stream` until it fails or `shutdown`
    /// completes.
    pub async fn serve<S, F>(self, stream: S, sink: BoxedReplySink, shutdown: F) -> RuntimeResult<()>
    where
        S: EventStream,
        F: Future<Output = ()>,
    {
        let filter = BackendFilter::new(&self.config.filter.ignored_backends);
        let engine = self.engine(sink)?;
        let consumer = StreamConsumer::new(stream, engine, filter);

        tokio::select! {
            result = consumer.run() => result,
            () = shutdown => {
                info!("Runtime stopped");
                Ok(())
            }
        }
    }

    /// Freezes the registry and commands into an engine.
    fn engine(self, sink: BoxedReplySink) -> RuntimeResult<Engine> {
        let http_config = self.config.http.to_client_config();
        let http = build_http_client(&http_config).map_err(RuntimeError::HttpClient)?;

        Ok(Engine::builder(sink, http)
            .registry(self.registry)
            .commands(self.commands)
            .http_config(http_config)
            .reply_timeout(self.config.reply.timeout())
            .build())
    }
}

/// Waits for Ctrl+C or, on Unix, SIGTERM.
pub async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c() => {}
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM, shutting down");
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl+C, shutting down"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    }
}

// =============================================================================
// RuntimeBuilder
// =============================================================================

/// Builder for creating a `LinkbirdRuntime` from configuration sources.
pub struct RuntimeBuilder {
    config_loader: ConfigLoader,
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self {
            config_loader: ConfigLoader::new(),
        }
    }

    /// Sets a specific configuration file to load.
    pub fn config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.file(path);
        self
    }

    /// Sets the configuration profile (e.g., "development", "production").
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.config_loader = self.config_loader.profile(profile);
        self
    }

    /// Adds a search path for configuration files.
    pub fn search_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_loader = self.config_loader.search_path(path);
        self
    }

    /// Enables loading environment variables (enabled by default).
    pub fn with_env(mut self) -> Self {
        self.config_loader = self.config_loader.with_env();
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.config_loader = self.config_loader.without_env();
        self
    }

    /// Merges overrides on top of every other source; see
    /// [`ConfigLoader::merge`].
    pub fn merge<T: Serialize>(mut self, overrides: T) -> Self {
        self.config_loader = self.config_loader.merge(overrides);
        self
    }

    /// Loads and validates configuration without building a runtime.
    pub fn load(self) -> ConfigResult<LinkbirdConfig> {
        let config = self.config_loader.load()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Builds the runtime.
    pub fn build(self) -> ConfigResult<LinkbirdRuntime> {
        let config = self.load()?;
        Ok(LinkbirdRuntime::from_config(&config))
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::testing::{PendingStream, RecordingSink, ScriptedStream};
    use linkbird_core::{ChannelSource, CommandEvent, CommandMetadata, EventKind, StreamEvent};
    use linkbird_framework::{StaticProvider, command_handler};
    use std::time::Duration;

    fn config() -> LinkbirdConfig {
        let mut config = LinkbirdConfig::default();
        config.core.url = "ws://127.0.0.1:1/events".into();
        config.core.token = "secret".into();
        config.http.timeout_secs = 2;
        config
    }

    #[test]
    fn test_builtin_providers_follow_config() {
        let runtime = LinkbirdRuntime::from_config(&config());
        assert_eq!(runtime.registry().provider_names(), ["xkcd", "reddit"]);

        let mut disabled = config();
        disabled.providers.xkcd.enabled = false;
        let runtime = LinkbirdRuntime::from_config(&disabled);
        assert_eq!(runtime.registry().provider_names(), ["reddit"]);

        let mut credentialed = config();
        credentialed.providers.github.token = "gh-token".into();
        credentialed.providers.youtube.api_key = "yt-key".into();
        let runtime = LinkbirdRuntime::from_config(&credentialed);
        assert_eq!(
            runtime.registry().provider_names(),
            ["xkcd", "reddit", "github", "youtube"]
        );
    }

    #[test]
    fn test_custom_providers_and_commands_are_added() {
        let mut runtime = LinkbirdRuntime::from_config(&config());
        runtime.register_provider(&StaticProvider::new("custom"));
        runtime.register_command(command_handler(
            CommandMetadata::new("ping", "", "Replies pong"),
            |_, _| async {},
        ));

        assert_eq!(runtime.registry().provider_names().last().unwrap(), "custom");
        let names: Vec<_> = runtime
            .commands()
            .metadata()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, vec!["isitdown", "ping"]);
    }

    #[test]
    fn test_builder_rejects_invalid_config() {
        let err = LinkbirdRuntime::builder()
            .without_env()
            .search_path("/nonexistent/linkbird")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::MissingField { .. }));
    }

    #[test]
    fn test_builder_accepts_merged_config() {
        let runtime = LinkbirdRuntime::builder()
            .without_env()
            .search_path("/nonexistent/linkbird")
            .merge(config())
            .build()
            .unwrap();
        assert_eq!(runtime.config().core.token, "secret");
    }

    #[tokio::test]
    async fn test_serve_returns_stream_closed() {
        let mut runtime = LinkbirdRuntime::from_config(&config());
        runtime.register_command(command_handler(
            CommandMetadata::new("ping", "", "Replies pong"),
            |engine, command| async move {
                let _ = engine.reply(&command.source, "pong").await;
            },
        ));

        let sink = RecordingSink::new();
        let stream = ScriptedStream::new([StreamEvent::new(EventKind::Command(CommandEvent {
            command: "ping".into(),
            arg: String::new(),
            sender: "ferris".into(),
            source: ChannelSource::new("irc://libera/#rust"),
        }))]);

        let result = runtime
            .serve(stream, sink.clone(), std::future::pending())
            .await;
        assert!(matches!(result, Err(RuntimeError::StreamClosed(_))));

        for _ in 0..50 {
            if !sink.texts().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(sink.texts(), vec!["pong"]);
    }

    #[tokio::test]
    async fn test_serve_stops_cleanly_on_shutdown() {
        let runtime = LinkbirdRuntime::from_config(&config());
        let result = runtime
            .serve(PendingStream, RecordingSink::new(), async {})
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_run_reports_connect_failure() {
        let runtime = LinkbirdRuntime::from_config(&config());
        let err = runtime.run().await.unwrap_err();
        assert!(matches!(err, RuntimeError::Connect(_)));
    }
}
