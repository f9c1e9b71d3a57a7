//! Logging setup for the linkbird runtime.
//!
//! `[logging]` becomes a single `tracing-subscriber` fmt layer behind an
//! `EnvFilter`:
//!
//! ```text
//! RUST_LOG, else `level`
//!   └── quiet defaults: HTTP, HTML and WebSocket crates capped at `warn`
//!         └── [logging.filters]: per-target overrides, applied last
//! ```
//!
//! At `debug` the bot's own targets show every skipped event and every
//! handler that passed on a URL; the capped dependency targets would
//! otherwise drown that out. Dispatch runs inside the `dispatch`,
//! `message_handlers`, `resolve_url` and `command` spans, so
//! `[logging.span_events] close = true` logs how long each one took.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;

use tracing::{Level, warn};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{LogFormat, LogOutput, LoggingConfig, SpanEventConfig};

/// File name used when `file_path` has no file component.
const DEFAULT_LOG_FILE: &str = "linkbird.log";

/// Dependency targets capped at `warn` unless `[logging.filters]` names them.
const QUIET_TARGETS: &[&str] = &[
    "html5ever",
    "hyper",
    "hyper_util",
    "reqwest",
    "selectors",
    "tokio_tungstenite",
    "tungstenite",
];

/// Installs the global subscriber described by `config`.
///
/// Does nothing if a global subscriber is already installed.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = try_init_from_config(config);
}

/// Installs the global subscriber, failing if one is already installed.
pub fn try_init_from_config(config: &LoggingConfig) -> Result<(), TryInitError> {
    let filter = build_filter(config);
    let span_events = fmt_span(&config.span_events);
    let (writer, fell_back) = make_writer(config);

    macro_rules! install {
        ($layer:expr) => {
            tracing_subscriber::registry()
                .with(
                    $layer
                        .with_writer(writer)
                        .with_span_events(span_events)
                        .with_thread_ids(config.thread_ids)
                        .with_file(config.file_location)
                        .with_line_number(config.file_location),
                )
                .with(filter)
                .try_init()
        };
    }

    let result = match config.format {
        LogFormat::Compact => install!(fmt::layer().compact()),
        LogFormat::Full => install!(fmt::layer()),
        LogFormat::Pretty => install!(fmt::layer().pretty()),
        #[cfg(feature = "json-log")]
        LogFormat::Json => install!(fmt::layer().json()),
    };

    if result.is_ok() && fell_back {
        warn!("File output requested but no file path configured, logging to stdout");
    }
    result
}

/// Directives applied on top of the base level, as `target=level`.
///
/// Quiet defaults only apply when the base level is more verbose than
/// `warn`, and a `[logging.filters]` entry for the same target replaces
/// its default.
pub fn filter_directives(config: &LoggingConfig) -> Vec<String> {
    let mut directives: BTreeMap<&str, &str> = BTreeMap::new();

    if config.level.to_tracing_level() > Level::WARN {
        for target in QUIET_TARGETS {
            directives.insert(*target, "warn");
        }
    }
    for (target, level) in &config.filters {
        directives.insert(target.as_str(), level.as_str());
    }

    directives
        .into_iter()
        .map(|(target, level)| format!("{target}={level}"))
        .collect()
}

/// `RUST_LOG` replaces the configured base level; directives still apply.
fn build_filter(config: &LoggingConfig) -> EnvFilter {
    let mut filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    for directive in filter_directives(config) {
        if let Ok(d) = directive.parse() {
            filter = filter.add_directive(d);
        }
    }
    filter
}

fn fmt_span(events: &SpanEventConfig) -> FmtSpan {
    [
        (events.new, FmtSpan::NEW),
        (events.enter, FmtSpan::ENTER),
        (events.exit, FmtSpan::EXIT),
        (events.close, FmtSpan::CLOSE),
    ]
    .into_iter()
    .filter(|(enabled, _)| *enabled)
    .fold(FmtSpan::NONE, |acc, (_, span)| acc | span)
}

/// Returns the writer and whether file output fell back to stdout.
fn make_writer(config: &LoggingConfig) -> (BoxMakeWriter, bool) {
    match (config.output, &config.file_path) {
        (LogOutput::Stdout, _) => (BoxMakeWriter::new(std::io::stdout), false),
        (LogOutput::Stderr, _) => (BoxMakeWriter::new(std::io::stderr), false),
        (LogOutput::File, Some(path)) => {
            let appender = tracing_appender::rolling::never(
                path.parent().unwrap_or_else(|| Path::new(".")),
                path.file_name()
                    .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE)),
            );
            (BoxMakeWriter::new(appender), false)
        }
        (LogOutput::File, None) => (BoxMakeWriter::new(std::io::stdout), true),
    }
}
