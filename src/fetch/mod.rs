pub mod http;
pub mod webdriver;

pub use http::HttpFetcher;
pub use webdriver::WebDriverFetcher;

use crate::config::{FetchBackend, FetchConfig};
use crate::error::{PageDeltaError, Result};
use std::future::Future;
use url::Url;

/// Raw response for a tracked page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub url: String,
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

/// Retrieves the raw markup of a page
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage>> + Send;
}

/// Fetcher selected at runtime from configuration
pub enum AnyFetcher {
    Http(HttpFetcher),
    WebDriver(WebDriverFetcher),
}

impl AnyFetcher {
    pub fn from_config(config: &FetchConfig) -> Result<Self> {
        match config.backend {
            FetchBackend::Http => Ok(AnyFetcher::Http(HttpFetcher::new(config)?)),
            FetchBackend::WebDriver => Ok(AnyFetcher::WebDriver(WebDriverFetcher::new(config))),
        }
    }
}

impl Fetcher for AnyFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        match self {
            AnyFetcher::Http(fetcher) => fetcher.fetch(url).await,
            AnyFetcher::WebDriver(fetcher) => fetcher.fetch(url).await,
        }
    }
}

/// Only absolute http(s) URLs can be tracked
pub fn parse_page_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|source| PageDeltaError::InvalidUrl {
        url: url.to_string(),
        source,
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(PageDeltaError::Config(format!(
            "unsupported URL scheme {} in {}",
            other, url
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_url() {
        assert!(parse_page_url("https://acme.example/pricing").is_ok());
        assert!(matches!(
            parse_page_url("acme.example"),
            Err(PageDeltaError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_page_url("file:///etc/passwd"),
            Err(PageDeltaError::Config(_))
        ));
    }
}
