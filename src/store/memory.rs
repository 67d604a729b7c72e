use crate::error::Result;
use crate::results::{Alert, Snapshot};
use crate::store::{DEFAULT_MAX_SNAPSHOTS, PageRecord, SnapshotStore};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

/// Snapshot store kept in process memory
#[derive(Debug)]
pub struct MemoryStore {
    pages: Mutex<HashMap<String, PageRecord>>,
    max_snapshots: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            pages: Mutex::new(HashMap::new()),
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max_snapshots` snapshots per page
    pub fn with_max_snapshots(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = max_snapshots.max(1);
        self
    }

    fn pages(&self) -> MutexGuard<'_, HashMap<String, PageRecord>> {
        // A panic while holding the lock cannot leave a record half-written
        self.pages.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SnapshotStore for MemoryStore {
    fn latest(&self, page_id: &str) -> Result<Option<Snapshot>> {
        Ok(self.pages().get(page_id).and_then(|record| record.latest(page_id)))
    }

    fn history(&self, page_id: &str, limit: usize) -> Result<Vec<Snapshot>> {
        Ok(self
            .pages()
            .get(page_id)
            .map(|record| record.history(page_id, limit))
            .unwrap_or_default())
    }

    fn insert_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot> {
        let mut pages = self.pages();
        let record = pages.entry(snapshot.page_id.clone()).or_default();
        Ok(record.push_snapshot(snapshot, self.max_snapshots))
    }

    fn insert_alert(&self, alert: Alert) -> Result<Alert> {
        let mut pages = self.pages();
        let record = pages.entry(alert.page_id.clone()).or_default();
        Ok(record.push_alert(alert))
    }

    fn alerts(&self, page_id: &str) -> Result<Vec<Alert>> {
        Ok(self
            .pages()
            .get(page_id)
            .map(|record| record.alerts(page_id))
            .unwrap_or_default())
    }
}
