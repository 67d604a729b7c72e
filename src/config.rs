use crate::detector::DetectorOptions;
use crate::error::{PageDeltaError, Result};
use crate::parsers::ExtractOptions;
use crate::store::DEFAULT_MAX_SNAPSHOTS;
use crate::utils::record_file_stem;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Browser-like user agent so competitor sites serve their regular page
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A page being watched for changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedPage {
    /// Stable identifier used as the snapshot key
    pub id: String,

    /// Display name (competitor name)
    #[serde(default)]
    pub name: String,

    /// URL to fetch
    pub url: String,
}

impl TrackedPage {
    pub fn new(id: &str, name: &str, url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            url: url.to_string(),
        }
    }

    /// Name for display, falling back to the id
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }
}

/// How pages are retrieved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchBackend {
    /// Plain HTTP GET
    Http,
    /// Rendered through a WebDriver session
    WebDriver,
}

/// Configuration for the fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_backend")]
    pub backend: FetchBackend,

    /// User-Agent header sent with each request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Timeout for one page fetch
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
}

/// Top level configuration of a monitoring run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Pages to scan
    #[serde(default)]
    pub pages: Vec<TrackedPage>,

    #[serde(default)]
    pub detector: DetectorOptions,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub extract: ExtractOptions,

    /// Directory holding snapshot files
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Snapshots kept per page; older ones are dropped
    #[serde(default = "default_max_snapshots")]
    pub max_snapshots: usize,

    /// Maximum number of pages scanned at once
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl MonitorConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| {
            PageDeltaError::Config(format!("cannot open {}: {}", path.display(), e))
        })?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Look up a tracked page by id
    pub fn page(&self, id: &str) -> Result<&TrackedPage> {
        self.pages
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| PageDeltaError::UnknownPage(id.to_string()))
    }

    fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(PageDeltaError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }
        if self.max_snapshots == 0 {
            return Err(PageDeltaError::Config(
                "max_snapshots must be at least 1".to_string(),
            ));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(PageDeltaError::Config(
                "fetch.timeout_secs must be at least 1".to_string(),
            ));
        }
        let mut stems: HashMap<String, &str> = HashMap::new();
        for page in &self.pages {
            if let Some(other) = stems.insert(record_file_stem(&page.id), &page.id) {
                return Err(PageDeltaError::Config(format!(
                    "page id {} is used twice (also by {})",
                    page.id, other
                )));
            }
            if page.id.trim().is_empty() {
                return Err(PageDeltaError::Config(format!(
                    "page with url {} has an empty id",
                    page.url
                )));
            }
            url::Url::parse(&page.url).map_err(|source| PageDeltaError::InvalidUrl {
                url: page.url.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            webdriver_url: default_webdriver_url(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            detector: DetectorOptions::default(),
            fetch: FetchConfig::default(),
            extract: ExtractOptions::default(),
            store_dir: default_store_dir(),
            max_snapshots: default_max_snapshots(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_backend() -> FetchBackend {
    FetchBackend::Http
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

/// Default value for timeout_secs
fn default_timeout_secs() -> u64 {
    10
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".page-delta")
}

fn default_max_snapshots() -> usize {
    DEFAULT_MAX_SNAPSHOTS
}

/// Default value for max_concurrency
fn default_max_concurrency() -> usize {
    4
}
