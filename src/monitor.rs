use crate::config::{FetchBackend, MonitorConfig, TrackedPage};
use crate::detector::ChangeDetector;
use crate::error::Result;
use crate::fetch::AnyFetcher;
use crate::scan::Scanner;
use crate::store::JsonFileStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Builder for configuring a monitoring run and creating its scanner
#[derive(Debug, Clone, Default)]
pub struct Monitor {
    config: MonitorConfig,
}

impl Monitor {
    /// Create a new Monitor builder with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a configuration
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        self.config = MonitorConfig::from_file(path)?;
        Ok(self)
    }

    /// Apply configuration from a JSON string
    pub fn with_config_str(mut self, json: &str) -> Result<Self> {
        self.config = MonitorConfig::from_json(json)?;
        Ok(self)
    }

    /// Override the max concurrency setting
    pub fn with_max_concurrency(mut self, value: usize) -> Self {
        self.config.max_concurrency = value.max(1);
        self
    }

    /// Override the snapshot directory
    pub fn with_store_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.config.store_dir = dir.into();
        self
    }

    /// Override the fetch backend
    pub fn with_backend(mut self, backend: FetchBackend) -> Self {
        self.config.fetch.backend = backend;
        self
    }

    /// Track one more page, replacing a configured page with the same id
    pub fn with_page(mut self, page: TrackedPage) -> Self {
        self.config.pages.retain(|p| p.id != page.id);
        self.config.pages.push(page);
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn pages(&self) -> &[TrackedPage] {
        &self.config.pages
    }

    /// Create the scanner backed by the configured fetcher and snapshot directory
    pub fn build(&self) -> Result<Arc<Scanner<AnyFetcher, JsonFileStore>>> {
        let fetcher = AnyFetcher::from_config(&self.config.fetch)?;
        let store = JsonFileStore::open(&self.config.store_dir)?
            .with_max_snapshots(self.config.max_snapshots);

        ::log::debug!(
            "Monitoring {} page(s) with {:?} backend, snapshots in {}",
            self.config.pages.len(),
            self.config.fetch.backend,
            self.config.store_dir.display()
        );

        Ok(Arc::new(Scanner::new(
            fetcher,
            Arc::new(store),
            ChangeDetector::with_options(self.config.detector.clone()),
            self.config.extract.clone(),
            self.config.max_concurrency,
        )))
    }
}
