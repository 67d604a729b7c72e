use thiserror::Error;

/// Errors raised around the change detector: fetching, extraction, storage
/// and configuration. The detector itself never fails.
#[derive(Error, Debug)]
pub enum PageDeltaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to fetch website: {status} {reason}")]
    BadStatus { status: u16, reason: String },

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("Timed out after {0} seconds fetching {1}")]
    Timeout(u64, String),

    #[error("Website content too short or inaccessible ({length} characters)")]
    ContentTooShort { length: usize },

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("Unknown page: {0}")]
    UnknownPage(String),
}

pub type Result<T> = std::result::Result<T, PageDeltaError>;
