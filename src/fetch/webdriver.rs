use crate::config::FetchConfig;
use crate::error::{PageDeltaError, Result};
use crate::fetch::{FetchedPage, Fetcher, parse_page_url};
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::timeout;

/// Common WebDriver endpoints tried when the configured one is unreachable
const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Idle browser sessions. A fetch takes one out and owns it until it is
/// returned, so two fetches never drive the same browser.
struct SessionPool<C> {
    idle: Mutex<Vec<C>>,
}

impl<C> SessionPool<C> {
    fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    async fn take(&self) -> Option<C> {
        self.idle.lock().await.pop()
    }

    async fn put(&self, session: C) {
        self.idle.lock().await.push(session);
    }

    async fn drain(&self) -> Vec<C> {
        std::mem::take(&mut *self.idle.lock().await)
    }
}

/// Fetches pages through a browser so script-rendered content is captured
pub struct WebDriverFetcher {
    webdriver_url: String,
    user_agent: String,
    timeout_secs: u64,
    sessions: SessionPool<Client>,
}

impl WebDriverFetcher {
    /// The `WEBDRIVER_URL` environment variable overrides the configured endpoint
    pub fn new(config: &FetchConfig) -> Self {
        let webdriver_url = std::env::var("WEBDRIVER_URL")
            .ok()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| config.webdriver_url.clone());

        Self {
            webdriver_url,
            user_agent: config.user_agent.clone(),
            timeout_secs: config.timeout_secs,
            sessions: SessionPool::new(),
        }
    }

    fn capabilities(&self) -> Map<String, Value> {
        let mut caps = Map::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": ["--headless", format!("--user-agent={}", self.user_agent)] }),
        );
        caps.insert(
            "moz:firefoxOptions".to_string(),
            json!({
                "args": ["-headless"],
                "prefs": { "general.useragent.override": self.user_agent }
            }),
        );
        caps
    }

    async fn connect_to(&self, url: &str) -> Option<Client> {
        let mut builder = ClientBuilder::native();
        builder.capabilities(self.capabilities());
        match builder.connect(url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", url);
                Some(client)
            }
            Err(e) => {
                ::log::debug!("Failed to connect to WebDriver at {}: {}", url, e);
                None
            }
        }
    }

    /// Connects to the configured WebDriver, then to the usual local ports
    async fn connect(&self) -> Result<Client> {
        if let Some(client) = self.connect_to(&self.webdriver_url).await {
            return Ok(client);
        }

        for url in FALLBACK_WEBDRIVER_URLS {
            if url == self.webdriver_url {
                continue;
            }
            ::log::info!("Trying fallback WebDriver URL: {}", url);
            if let Some(client) = self.connect_to(url).await {
                return Ok(client);
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(PageDeltaError::WebDriver(format!(
            "failed to connect to any WebDriver server (tried {})",
            self.webdriver_url
        )))
    }

    /// An idle session, or a new one when all are busy
    async fn checkout(&self) -> Result<Client> {
        match self.sessions.take().await {
            Some(client) => Ok(client),
            None => self.connect().await,
        }
    }

    async fn discard(client: Client) {
        if let Err(e) = client.close().await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }

    async fn load(client: &Client, url: &str) -> std::result::Result<FetchedPage, String> {
        client.goto(url).await.map_err(|e| e.to_string())?;
        let body = client.source().await.map_err(|e| e.to_string())?;
        let final_url = client
            .current_url()
            .await
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string());
        Ok(FetchedPage {
            url: final_url,
            status: 200,
            content_type: Some("text/html".to_string()),
            body,
        })
    }

    /// Load `url` on a session owned by this call, reconnecting once if the
    /// session was lost
    async fn load_exclusive(&self, url: &str) -> Result<FetchedPage> {
        let client = self.checkout().await?;
        let first = Self::load(&client, url).await;

        let client = match first {
            Ok(page) => {
                self.sessions.put(client).await;
                return Ok(page);
            }
            Err(e) if e.to_lowercase().contains("session") => {
                ::log::warn!("Lost WebDriver session while loading {}, reconnecting", url);
                Self::discard(client).await;
                self.connect().await?
            }
            Err(e) => {
                self.sessions.put(client).await;
                return Err(PageDeltaError::WebDriver(e));
            }
        };

        let second = Self::load(&client, url).await;
        self.sessions.put(client).await;
        second.map_err(PageDeltaError::WebDriver)
    }

    /// Closes every idle browser session
    pub async fn close(&self) {
        for client in self.sessions.drain().await {
            Self::discard(client).await;
        }
    }
}

impl Fetcher for WebDriverFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        let parsed = parse_page_url(url)?;
        let limit = Duration::from_secs(self.timeout_secs);

        match timeout(limit, self.load_exclusive(parsed.as_str())).await {
            Ok(result) => result,
            Err(_) => {
                ::log::error!("Timeout loading {} through WebDriver", url);
                Err(PageDeltaError::Timeout(self.timeout_secs, url.to_string()))
            }
        }
    }
}
