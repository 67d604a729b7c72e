pub mod config;
pub mod detector;
pub mod error;
pub mod fetch;
pub mod monitor;
pub mod parsers;
pub mod report;
pub mod results;
pub mod scan;
pub mod store;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{MonitorConfig, TrackedPage};
pub use detector::{ChangeDetector, DetectorOptions, DiffResult, detect_text_changes};
pub use error::{PageDeltaError, Result};
pub use monitor::Monitor;
pub use report::{PageReport, fallback_report};
pub use results::{Alert, Snapshot};
pub use scan::{PageScan, ScanOutcome, Scanner};
pub use store::{JsonFileStore, MemoryStore, SnapshotStore};
