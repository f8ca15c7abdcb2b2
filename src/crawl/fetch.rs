// src/crawl/fetch.rs
// =============================================================================
// The fetch capability: given a URL, return the page body and the links on it.
//
// The crawler only talks to the Fetcher trait, so tests can swap the real
// HTTP implementation for a deterministic stub.
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{CrawlError, Result};
use crate::extract::extract_links;

/// A fetched page
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub body: String,
    /// Absolute hyperlink targets found in the body
    pub links: Vec<String>,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Page>;
}

/// Fetches pages over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Per-request timeout for page fetches
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Self::REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(CrawlError::Client)?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Page> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| CrawlError::Fetch {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| CrawlError::Fetch {
            url: url.to_string(),
            source,
        })?;

        let links = extract_links(&body, url);
        Ok(Page { body, links })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_returns_body_and_links() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<a href="about">About</a><a href="https://other.com/">Other</a>"#,
            ))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let seed = format!("{}/", server.uri());
        let page = fetcher.fetch(&seed).await.unwrap();

        assert!(page.body.contains("About"));
        assert_eq!(
            page.links,
            vec![format!("{}about", seed), "https://other.com/".to_string()]
        );
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new().unwrap();
        let url = format!("{}/missing", server.uri());
        let err = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(err, CrawlError::Status { status: 404, .. }));
        assert_eq!(err.url(), Some(url.as_str()));
    }

    #[tokio::test]
    async fn test_connection_failure_is_an_error() {
        let fetcher = HttpFetcher::new().unwrap();
        // Port 9 (discard) on localhost is almost never listening
        let err = fetcher.fetch("http://127.0.0.1:9/").await.unwrap_err();
        assert!(matches!(err, CrawlError::Fetch { .. }));
    }
}
