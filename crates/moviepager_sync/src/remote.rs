//! Remote catalog client.

use crate::error::FetchError;
use async_trait::async_trait;
use moviepager_core::constants::MOVIES_ENDPOINT;
use moviepager_core::MoviePage;
use serde_json::Value;
use std::time::Duration;

/// Longest error body kept in a [`FetchError::Status`] message.
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Source of catalog pages.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one page of the movie listing.
    async fn fetch_page(&self, api_key: &str, page: u32) -> Result<MoviePage, FetchError>;
}

/// [`CatalogClient`] speaking `GET {base}/movies?api_key=..&page=..` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    client: reqwest::Client,
    endpoint: reqwest::Url,
}

fn api_url(base: &str, segments: &[&str]) -> Result<reqwest::Url, FetchError> {
    let mut url = reqwest::Url::parse(base)
        .map_err(|err| FetchError::InvalidUrl(format!("'{}': {}", base, err)))?;
    let mut path = url
        .path_segments_mut()
        .map_err(|_| FetchError::InvalidUrl(format!("'{}' cannot be used as an API base", base)))?;
    path.pop_if_empty();
    for segment in segments {
        path.push(segment);
    }
    drop(path);
    Ok(url)
}

fn error_message_for_response(status: reqwest::StatusCode, body: &str) -> String {
    if body.trim().is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = ["status_message", "error", "message"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
        {
            return message.to_string();
        }
    }

    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_MESSAGE_LEN) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_string(),
    }
}

impl HttpCatalogClient {
    /// Build a client for the catalog rooted at `base_url`.
    ///
    /// # Errors
    /// Returns [`FetchError::InvalidUrl`] when `base_url` is not a usable
    /// HTTP base, or a transport error when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let endpoint = api_url(base_url, &[MOVIES_ENDPOINT])?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// Full URL of the listing endpoint.
    pub fn endpoint(&self) -> &reqwest::Url {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn fetch_page(&self, api_key: &str, page: u32) -> Result<MoviePage, FetchError> {
        let res = self
            .client
            .get(self.endpoint.clone())
            .query(&[("api_key", api_key)])
            .query(&[("page", page)])
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: error_message_for_response(status, &body),
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}
