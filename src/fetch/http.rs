use crate::config::FetchConfig;
use crate::error::{PageDeltaError, Result};
use crate::fetch::{FetchedPage, Fetcher, parse_page_url};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;

/// Plain HTTP GET with a spoofed user agent and a hard timeout
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_client(
            client_builder(config).build()?,
            config.timeout_secs,
        ))
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client, timeout_secs: u64) -> Self {
        Self {
            client,
            timeout_secs,
        }
    }
}

/// Client settings shared by every request
pub fn client_builder(config: &FetchConfig) -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = parse_page_url(url)?;
        ::log::debug!("GET {}", parsed);

        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                PageDeltaError::Timeout(self.timeout_secs, url.to_string())
            } else {
                PageDeltaError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            ::log::warn!("{} answered {}", url, status);
            return Err(PageDeltaError::BadStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.text().await?;

        ::log::debug!("Fetched {} bytes from {}", body.len(), final_url);

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serves one canned response and hands back the raw request
    async fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let _ = tx.send(String::from_utf8_lossy(&buf[..n]).to_string());

            let response = format!(
                "{}\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        (format!("http://{}/pricing", addr), rx)
    }

    fn local_fetcher(config: &FetchConfig) -> HttpFetcher {
        let client = client_builder(config).no_proxy().build().unwrap();
        HttpFetcher::with_client(client, config.timeout_secs)
    }

    #[tokio::test]
    async fn test_fetch_sends_user_agent() {
        let (url, request) = serve_once("HTTP/1.1 200 OK", "<html><body>Plans</body></html>").await;
        let config = FetchConfig {
            user_agent: "page-delta-test/1.0".to_string(),
            ..FetchConfig::default()
        };

        let page = local_fetcher(&config).fetch(&url).await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(page.body, "<html><body>Plans</body></html>");
        assert_eq!(page.content_type.as_deref(), Some("text/html; charset=utf-8"));

        let request = request.await.unwrap().to_lowercase();
        assert!(request.starts_with("get /pricing"));
        assert!(request.contains("user-agent: page-delta-test/1.0"));
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let (url, _request) = serve_once("HTTP/1.1 503 Service Unavailable", "down").await;

        let result = local_fetcher(&FetchConfig::default()).fetch(&url).await;
        assert!(matches!(
            result,
            Err(PageDeltaError::BadStatus { status: 503, ref reason }) if reason == "Service Unavailable"
        ));
    }
}
