//! Provider registry.
//!
//! A [`Provider`] bundles the handlers for one external service. The
//! [`Registry`] flattens providers into two tables:
//!
//! ```text
//! url_handlers:      "github.com"  -> [github_repo, catch_all]
//!                    "reddit.com"  -> [reddit]
//! message_handlers:  [reddit_mentions, ...]
//! ```
//!
//! Registration is append-only and keeps order, which decides who wins a URL.
//! The registry is filled once at startup, then frozen inside the engine and
//! read without locks.
//!
//! Registering the same provider twice registers its handlers twice; callers
//! are responsible for not doing that.

use std::collections::HashMap;

use tracing::debug;

use crate::handler::{BoxedMessageHandler, BoxedUrlHandler};

/// A registrable bundle of handlers for one external service.
pub trait Provider: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// `(host, handler)` bindings, in the order they should be tried.
    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        Vec::new()
    }

    /// Handler that sees every message, if the provider has one.
    fn message_handler(&self) -> Option<BoxedMessageHandler> {
        None
    }
}

// =============================================================================
// StaticProvider
// =============================================================================

/// A provider assembled from handlers at runtime.
///
/// ```rust,ignore
/// let provider = StaticProvider::new("example")
///     .url("example.com", url_handler(handle_example))
///     .message(message_handler(scan_mentions));
/// registry.register(&provider);
/// ```
#[derive(Clone)]
pub struct StaticProvider {
    name: String,
    url_handlers: Vec<(String, BoxedUrlHandler)>,
    message_handler: Option<BoxedMessageHandler>,
}

impl StaticProvider {
    /// Creates an empty provider.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url_handlers: Vec::new(),
            message_handler: None,
        }
    }

    /// Binds a URL handler to a host.
    pub fn url(mut self, host: impl Into<String>, handler: BoxedUrlHandler) -> Self {
        self.url_handlers.push((host.into(), handler));
        self
    }

    /// Sets the whole-message handler.
    pub fn message(mut self, handler: BoxedMessageHandler) -> Self {
        self.message_handler = Some(handler);
        self
    }
}

impl Provider for StaticProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn url_handlers(&self) -> Vec<(String, BoxedUrlHandler)> {
        self.url_handlers.clone()
    }

    fn message_handler(&self) -> Option<BoxedMessageHandler> {
        self.message_handler.clone()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Host-keyed URL handler lists plus the whole-message handler list.
#[derive(Default, Clone)]
pub struct Registry {
    url_handlers: HashMap<String, Vec<BoxedUrlHandler>>,
    message_handlers: Vec<BoxedMessageHandler>,
    providers: Vec<String>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider's handlers.
    ///
    /// Host keys are lowercased so they compare equal to parsed URL hosts.
    pub fn register<P: Provider + ?Sized>(&mut self, provider: &P) {
        let mut hosts = 0usize;
        for (host, handler) in provider.url_handlers() {
            self.url_handlers
                .entry(host.to_ascii_lowercase())
                .or_default()
                .push(handler);
            hosts += 1;
        }

        let has_message_handler = if let Some(handler) = provider.message_handler() {
            self.message_handlers.push(handler);
            true
        } else {
            false
        };

        self.providers.push(provider.name().to_string());
        debug!(
            provider = provider.name(),
            url_handlers = hosts,
            message_handler = has_message_handler,
            "Registered provider"
        );
    }

    /// Registers a provider (builder pattern).
    pub fn with<P: Provider + ?Sized>(mut self, provider: &P) -> Self {
        self.register(provider);
        self
    }

    /// Returns the handlers for a host key, in registration order.
    pub fn url_handlers(&self, host: &str) -> &[BoxedUrlHandler] {
        self.url_handlers.get(host).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns all whole-message handlers, in registration order.
    pub fn message_handlers(&self) -> &[BoxedMessageHandler] {
        &self.message_handlers
    }

    /// Returns the names of registered providers, in registration order.
    pub fn provider_names(&self) -> &[String] {
        &self.providers
    }

    /// Returns the number of distinct host keys.
    pub fn host_count(&self) -> usize {
        self.url_handlers.len()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("providers", &self.providers)
            .field("hosts", &self.url_handlers.len())
            .field("message_handlers", &self.message_handlers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{Outcome, message_handler, url_handler};
    use std::sync::Arc;

    fn noop_url() -> BoxedUrlHandler {
        url_handler(|_, _, _| async { Outcome::NotClaimed })
    }

    #[test]
    fn test_register_appends_in_order() {
        let first = noop_url();
        let second = noop_url();

        let registry = Registry::new()
            .with(&StaticProvider::new("a").url("example.com", Arc::clone(&first)))
            .with(&StaticProvider::new("b").url("example.com", Arc::clone(&second)));

        let handlers = registry.url_handlers("example.com");
        assert_eq!(handlers.len(), 2);
        assert!(Arc::ptr_eq(&handlers[0], &first));
        assert!(Arc::ptr_eq(&handlers[1], &second));
        assert_eq!(registry.provider_names(), ["a", "b"]);
    }

    #[test]
    fn test_unknown_host_is_empty() {
        let registry = Registry::new();
        assert!(registry.url_handlers("nowhere.example").is_empty());
    }

    #[test]
    fn test_host_keys_are_lowercased() {
        let registry =
            Registry::new().with(&StaticProvider::new("a").url("GitHub.com", noop_url()));
        assert_eq!(registry.url_handlers("github.com").len(), 1);
    }

    #[test]
    fn test_double_registration_is_not_deduplicated() {
        let provider = StaticProvider::new("twice")
            .url("example.com", noop_url())
            .message(message_handler(|_, _| async {}));

        let registry = Registry::new().with(&provider).with(&provider);

        assert_eq!(registry.url_handlers("example.com").len(), 2);
        assert_eq!(registry.message_handlers().len(), 2);
        assert_eq!(registry.host_count(), 1);
    }
}
