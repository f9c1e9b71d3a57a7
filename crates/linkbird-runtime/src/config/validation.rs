//! Configuration validation utilities.

use url::Url;

use super::error::{ConfigError, ConfigResult};
use super::schema::{CoreConfig, FilterConfig, HttpConfig, LinkbirdConfig, ProvidersConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &LinkbirdConfig) -> ConfigResult<()> {
    validate_core_config(&config.core)?;
    validate_http_config(&config.http)?;
    validate_filter_config(&config.filter)?;

    if config.reply.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "Reply timeout must be greater than 0",
        ));
    }

    validate_providers_config(&config.providers)?;
    Ok(())
}

/// Validates the event stream endpoint.
fn validate_core_config(core: &CoreConfig) -> ConfigResult<()> {
    validate_url(&core.url, "core.url", &["ws", "wss"])?;

    if core.token.trim().is_empty() {
        return Err(ConfigError::missing_field("core.token"));
    }

    Ok(())
}

/// Validates shared HTTP client settings.
fn validate_http_config(http: &HttpConfig) -> ConfigResult<()> {
    if http.timeout_secs == 0 {
        return Err(ConfigError::validation(
            "HTTP timeout must be greater than 0",
        ));
    }

    if http.max_body_bytes == 0 {
        return Err(ConfigError::validation(
            "Maximum body size must be greater than 0",
        ));
    }

    Ok(())
}

fn validate_filter_config(filter: &FilterConfig) -> ConfigResult<()> {
    for backend in &filter.ignored_backends {
        let backend = backend.trim();
        if backend.is_empty() {
            return Err(ConfigError::validation("Ignored backend names cannot be empty"));
        }
        if backend.contains("://") {
            return Err(ConfigError::validation(format!(
                "Ignored backend '{backend}' must be a bare scheme, without '://'"
            )));
        }
    }
    Ok(())
}

fn validate_providers_config(providers: &ProvidersConfig) -> ConfigResult<()> {
    if providers.reddit.enabled {
        validate_url(
            &providers.reddit.api_base,
            "providers.reddit.api_base",
            &["http", "https"],
        )?;
    }
    if providers.github.enabled() {
        validate_url(
            &providers.github.api_base,
            "providers.github.api_base",
            &["http", "https"],
        )?;
    }
    if providers.youtube.enabled() {
        validate_url(
            &providers.youtube.api_base,
            "providers.youtube.api_base",
            &["http", "https"],
        )?;
    }
    Ok(())
}

/// Validates a URL against a set of allowed schemes.
fn validate_url(url: &str, field: &str, schemes: &[&str]) -> ConfigResult<()> {
    if url.trim().is_empty() {
        return Err(ConfigError::missing_field(field));
    }

    let parsed = Url::parse(url).map_err(|e| ConfigError::invalid_url(url, e.to_string()))?;

    if !schemes.contains(&parsed.scheme()) {
        return Err(ConfigError::invalid_url(
            url,
            format!("URL scheme must be one of: {schemes:?}"),
        ));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::invalid_url(url, "URL has no host"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> LinkbirdConfig {
        let mut config = LinkbirdConfig::default();
        config.core.url = "wss://core.example.org/events".into();
        config.core.token = "secret".into();
        config
    }

    #[test]
    fn test_validate_minimal_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_validate_missing_core_url() {
        let mut config = valid();
        config.core.url.clear();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "core.url"
        ));
    }

    #[test]
    fn test_validate_non_websocket_url() {
        let mut config = valid();
        config.core.url = "https://core.example.org".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_validate_empty_token() {
        let mut config = valid();
        config.core.token = "  ".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "core.token"
        ));
    }

    #[test]
    fn test_validate_zero_limits() {
        let mut config = valid();
        config.http.timeout_secs = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.http.max_body_bytes = 0;
        assert!(validate_config(&config).is_err());

        let mut config = valid();
        config.reply.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_backend_names() {
        let mut config = valid();
        config.filter.ignored_backends = vec!["discord".into(), " ".into()];
        assert!(validate_config(&config).is_err());

        config.filter.ignored_backends = vec!["slack://".into()];
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_reddit_api_checked_only_when_enabled() {
        let mut config = valid();
        config.providers.reddit.api_base = "not a url".into();
        assert!(validate_config(&config).is_err());

        config.providers.reddit.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_credentialed_api_bases_checked_only_when_enabled() {
        let mut config = valid();
        config.providers.github.api_base = "api.github.com".into();
        config.providers.youtube.api_base = String::new();
        assert!(validate_config(&config).is_ok());

        config.providers.github.token = "gh".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::InvalidUrl { .. })
        ));

        config.providers.github.api_base = "https://api.github.com".into();
        config.providers.youtube.api_key = "yt".into();
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::MissingField { field }) if field == "providers.youtube.api_base"
        ));
    }
}
