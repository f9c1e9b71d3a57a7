//! Channel identifiers.
//!
//! Every channel the chat core knows about is named by a URI-shaped string,
//! `scheme://opaque-id`, where the scheme names the backend the channel lives
//! on (`irc`, `discord`, `slack`, ...). The rest of the identifier is opaque
//! to this bot.

use std::fmt;

use url::Url;

use crate::error::ChannelIdError;

/// A parsed `scheme://id` channel identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelId {
    raw: String,
    backend: String,
}

impl ChannelId {
    /// Parses a channel identifier.
    ///
    /// The backend scheme is normalized to lowercase.
    pub fn parse(raw: &str) -> Result<Self, ChannelIdError> {
        let url = Url::parse(raw).map_err(|e| ChannelIdError {
            channel_id: raw.to_string(),
            reason: e.to_string(),
        })?;

        let scheme_len = url.scheme().len();
        if url.cannot_be_a_base() || !raw[scheme_len..].starts_with("://") {
            return Err(ChannelIdError {
                channel_id: raw.to_string(),
                reason: "missing `://` separator".to_string(),
            });
        }

        Ok(Self {
            raw: raw.to_string(),
            backend: url.scheme().to_string(),
        })
    }

    /// Returns the backend scheme, e.g. `irc`.
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Returns the opaque part after `://`.
    pub fn id(&self) -> &str {
        &self.raw[self.backend.len() + 3..]
    }

    /// Returns the identifier as received.
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_and_id() {
        let id = ChannelId::parse("irc://libera/#rust").unwrap();
        assert_eq!(id.backend(), "irc");
        assert_eq!(id.id(), "libera/#rust");
        assert_eq!(id.as_str(), "irc://libera/#rust");
    }

    #[test]
    fn test_backend_is_lowercased() {
        let id = ChannelId::parse("Discord://1234").unwrap();
        assert_eq!(id.backend(), "discord");
    }

    #[test]
    fn test_rejects_missing_scheme() {
        assert!(ChannelId::parse("#rust").is_err());
        assert!(ChannelId::parse("").is_err());
    }

    #[test]
    fn test_rejects_opaque_form() {
        let err = ChannelId::parse("mailto:someone").unwrap_err();
        assert!(err.reason.contains("://"));
    }
}
