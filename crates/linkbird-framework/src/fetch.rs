//! HTTP fetch helpers shared by the default resolver and providers.
//!
//! Every failure here is a soft one: callers turn it into
//! [`Outcome::NotClaimed`](crate::Outcome::NotClaimed) and move on.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use scraper::{ElementRef, Html, Selector};
use serde::de::DeserializeOwned;
use thiserror::Error;

static NEWLINE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\n\s*").expect("newline pattern is a valid regex"));

/// Why a fetch produced nothing usable.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure, including timeouts.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("unexpected status {0}")]
    Status(StatusCode),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// GETs `url` and returns at most `max_bytes` of its body as text.
///
/// Only a 200 response counts as success.
pub async fn fetch_page(client: &Client, url: &str, max_bytes: usize) -> FetchResult<String> {
    let mut response = client.get(url).send().await?;
    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(response.status()));
    }

    let body = read_limited(&mut response, max_bytes).await?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// GETs `url` and decodes a JSON body.
pub async fn fetch_json<T: DeserializeOwned>(client: &Client, url: &str) -> FetchResult<T> {
    send_json(client.get(url)).await
}

/// Sends a prepared request and decodes a JSON body.
///
/// For APIs that need credentials: build the request from the shared client,
/// add the auth header or query key, then hand it over.
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> FetchResult<T> {
    let response = request.send().await?;
    if response.status() != StatusCode::OK {
        return Err(FetchError::Status(response.status()));
    }
    Ok(response.json().await?)
}

/// Reads a response body, stopping after `max_bytes`.
async fn read_limited(response: &mut Response, max_bytes: usize) -> reqwest::Result<Vec<u8>> {
    let mut body = Vec::new();
    while body.len() < max_bytes {
        let Some(chunk) = response.chunk().await? else {
            break;
        };
        let take = chunk.len().min(max_bytes - body.len());
        body.extend_from_slice(&chunk[..take]);
    }
    Ok(body)
}

// =============================================================================
// HTML helpers
// =============================================================================

/// Collapses each newline, with the whitespace around it, to one space.
pub fn collapse_newlines(text: &str) -> String {
    NEWLINE_RUN.replace_all(text, " ").trim().to_string()
}

/// Returns the collapsed text of the first `<title>` element.
///
/// `None` if there is no title element or it is blank.
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?;
    let text = collapse_newlines(&element_text(title));
    (!text.is_empty()).then_some(text)
}

/// Concatenates all text below an element.
pub fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_collapse_newlines() {
        assert_eq!(
            collapse_newlines("\n    Rust Programming\n      Language  \n"),
            "Rust Programming Language"
        );
        assert_eq!(collapse_newlines("a  b"), "a  b");
        assert_eq!(collapse_newlines("a\r\n\r\n\tb"), "a b");
    }

    #[test]
    fn test_extract_first_title() {
        let html = "<html><head><title>\n  First\n  Title\n</title></head>\
                    <body><svg><title>Second</title></svg></body></html>";
        assert_eq!(extract_title(html).as_deref(), Some("First Title"));
    }

    #[test]
    fn test_missing_or_blank_title() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), None);
        assert_eq!(extract_title("<title>  \n </title>"), None);
    }

    #[tokio::test]
    async fn test_fetch_page_rejects_non_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("<title>Not Found</title>"))
            .mount(&server)
            .await;

        let client = Client::new();
        let err = fetch_page(&client, &format!("{}/gone", server.uri()), 1024)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_fetch_page_bounds_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(4096)))
            .mount(&server)
            .await;

        let client = Client::new();
        let body = fetch_page(&client, &server.uri(), 100).await.unwrap();
        assert_eq!(body.len(), 100);
    }

    #[tokio::test]
    async fn test_send_json_keeps_request_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/private"))
            .and(header("authorization", "Bearer t0ken"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/private", server.uri());

        let body: serde_json::Value = send_json(client.get(&url).bearer_auth("t0ken"))
            .await
            .unwrap();
        assert_eq!(body["ok"], true);

        // Without the header the mock does not match and wiremock answers 404.
        let err = fetch_json::<serde_json::Value>(&client, &url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(StatusCode::NOT_FOUND)));
    }
}
