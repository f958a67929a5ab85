//! Network access for the asset worker.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Url};
use tracing::debug;

use super::manifest::resolve;
use super::response::CachedResponse;
use crate::error::FetchError;

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Retrieves a resource from the network.
///
/// Any HTTP status is a successful fetch; only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<CachedResponse, FetchError>;
}

/// Fetcher backed by reqwest, resolving identifiers against a base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    base: Url,
}

impl HttpFetcher {
    pub fn new(base: Url) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client, base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, id: &str) -> Result<CachedResponse, FetchError> {
        let url = resolve(&self.base, id)?;
        debug!(url = %url, "Fetching from network");

        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let headers = collect_headers(response.headers());
        let body = response.bytes().await?.to_vec();

        Ok(CachedResponse::new(status, headers, body))
    }
}

/// Copy response headers in order. Values that are not UTF-8 are kept with
/// replacement characters rather than dropped.
fn collect_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderValue, CONTENT_TYPE};

    #[test]
    fn test_collect_headers_keeps_non_utf8_values() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        headers.insert("x-filename", HeaderValue::from_bytes(b"caf\xe9.png").unwrap());

        let collected = collect_headers(&headers);

        assert_eq!(collected.len(), 2);
        assert!(collected.contains(&("content-type".to_string(), "text/html".to_string())));
        assert!(collected.contains(&("x-filename".to_string(), "caf\u{FFFD}.png".to_string())));
    }

    #[test]
    fn test_http_fetcher_keeps_base() {
        let base = Url::parse("https://treino.example.com/app/").unwrap();
        let fetcher = HttpFetcher::new(base.clone()).unwrap();
        assert_eq!(fetcher.base(), &base);
    }
}
