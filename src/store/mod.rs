pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::Result;
use crate::results::{Alert, Snapshot};
use serde::{Deserialize, Serialize};

/// Keyed history of snapshots and alerts, one entry per tracked page.
///
/// Implementations only need to be consistent per page; the scanner
/// serializes read-latest, detect and write for a given page id.
pub trait SnapshotStore: Send + Sync {
    /// Most recent snapshot of a page
    fn latest(&self, page_id: &str) -> Result<Option<Snapshot>>;

    /// Up to `limit` snapshots of a page, newest first
    fn history(&self, page_id: &str, limit: usize) -> Result<Vec<Snapshot>>;

    /// Append a snapshot, assigning its id. Returns the stored snapshot.
    fn insert_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot>;

    /// Append an alert, assigning its id. Returns the stored alert.
    fn insert_alert(&self, alert: Alert) -> Result<Alert>;

    /// All alerts of a page, oldest first
    fn alerts(&self, page_id: &str) -> Result<Vec<Alert>>;
}

/// Everything stored for one page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageRecord {
    #[serde(default)]
    pub snapshots: Vec<Snapshot>,
    #[serde(default)]
    pub alerts: Vec<Alert>,
    /// Highest alert id handed out, kept when old alerts are pruned
    #[serde(default)]
    pub last_alert_id: u64,
}

/// Snapshots kept per page unless configured otherwise
pub const DEFAULT_MAX_SNAPSHOTS: usize = 100;

impl PageRecord {
    pub(crate) fn latest(&self, page_id: &str) -> Option<Snapshot> {
        self.snapshots
            .iter()
            .rev()
            .find(|s| s.page_id == page_id)
            .cloned()
    }

    pub(crate) fn history(&self, page_id: &str, limit: usize) -> Vec<Snapshot> {
        self.snapshots
            .iter()
            .rev()
            .filter(|s| s.page_id == page_id)
            .take(limit)
            .cloned()
            .collect()
    }

    pub(crate) fn alerts(&self, page_id: &str) -> Vec<Alert> {
        self.alerts
            .iter()
            .filter(|a| a.page_id == page_id)
            .cloned()
            .collect()
    }

    /// Append a snapshot and keep at most `max_snapshots` of them.
    ///
    /// Only the newest snapshot keeps its raw HTML. Alerts pointing at
    /// dropped snapshots are dropped with them.
    pub(crate) fn push_snapshot(&mut self, mut snapshot: Snapshot, max_snapshots: usize) -> Snapshot {
        snapshot.id = self.snapshots.last().map_or(1, |s| s.id + 1);
        for older in &mut self.snapshots {
            older.html_content = None;
        }
        self.snapshots.push(snapshot.clone());

        let excess = self.snapshots.len().saturating_sub(max_snapshots.max(1));
        if excess > 0 {
            self.snapshots.drain(..excess);
            if let Some(oldest_kept) = self.snapshots.first().map(|s| s.id) {
                self.alerts.retain(|a| a.snapshot_id >= oldest_kept);
            }
        }
        snapshot
    }

    pub(crate) fn push_alert(&mut self, mut alert: Alert) -> Alert {
        let last = self.alerts.last().map_or(0, |a| a.id).max(self.last_alert_id);
        alert.id = last + 1;
        self.last_alert_id = alert.id;
        self.alerts.push(alert.clone());
        alert
    }
}
