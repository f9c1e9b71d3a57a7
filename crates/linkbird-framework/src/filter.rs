//! Backend filter.
//!
//! Events from configured backends are dropped before any handler sees them.
//! The check is a pure function of the channel identifier and runs once per
//! event.

use std::collections::HashSet;

use linkbird_core::{ChannelId, ChannelIdError};

/// Verdict for one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Dispatch the event.
    Accept,
    /// Drop it; the backend is ignored.
    Ignored {
        /// The ignored backend scheme.
        backend: String,
    },
}

/// The set of ignored backend schemes.
#[derive(Debug, Clone, Default)]
pub struct BackendFilter {
    ignored: HashSet<String>,
}

impl BackendFilter {
    /// Creates a filter.
    ///
    /// Names are trimmed and lowercased; empty names are skipped.
    pub fn new<I, S>(backends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let ignored = backends
            .into_iter()
            .map(|b| b.as_ref().trim().to_ascii_lowercase())
            .filter(|b| !b.is_empty())
            .collect();
        Self { ignored }
    }

    /// Checks a channel identifier.
    ///
    /// A malformed identifier is an error; callers log it and drop the event.
    pub fn check(&self, channel_id: &str) -> Result<Gate, ChannelIdError> {
        let id = ChannelId::parse(channel_id)?;
        if self.ignored.contains(id.backend()) {
            Ok(Gate::Ignored {
                backend: id.backend().to_string(),
            })
        } else {
            Ok(Gate::Accept)
        }
    }

    /// Returns true if `backend` is ignored.
    pub fn is_ignored(&self, backend: &str) -> bool {
        self.ignored.contains(&backend.to_ascii_lowercase())
    }

    /// Returns the number of ignored backends.
    pub fn len(&self) -> usize {
        self.ignored.len()
    }

    /// Returns true if nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.ignored.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_unlisted_backend() {
        let filter = BackendFilter::new(["discord"]);
        assert_eq!(filter.check("irc://libera/#rust").unwrap(), Gate::Accept);
    }

    #[test]
    fn test_ignores_listed_backend() {
        let filter = BackendFilter::new(["discord", "slack"]);
        assert_eq!(
            filter.check("slack://T1/C2").unwrap(),
            Gate::Ignored {
                backend: "slack".into()
            }
        );
    }

    #[test]
    fn test_names_are_normalized() {
        let filter = BackendFilter::new([" Discord ", ""]);
        assert_eq!(filter.len(), 1);
        assert!(filter.is_ignored("DISCORD"));
        assert!(matches!(
            filter.check("discord://123").unwrap(),
            Gate::Ignored { .. }
        ));
    }

    #[test]
    fn test_malformed_channel_id_is_error() {
        let filter = BackendFilter::new(["irc"]);
        assert!(filter.check("not a channel").is_err());
    }

    #[test]
    fn test_empty_filter_accepts_everything() {
        let filter = BackendFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.check("irc://x").unwrap(), Gate::Accept);
    }
}
