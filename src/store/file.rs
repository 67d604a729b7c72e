use crate::error::Result;
use crate::results::{Alert, Snapshot};
use crate::store::{DEFAULT_MAX_SNAPSHOTS, PageRecord, SnapshotStore};
use crate::utils::record_file_stem;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Snapshot store writing one JSON file per tracked page
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    max_snapshots: usize,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) a store rooted at `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        ::log::debug!("Opened snapshot store at {}", dir.display());
        Ok(Self {
            dir,
            max_snapshots: DEFAULT_MAX_SNAPSHOTS,
            write_lock: Mutex::new(()),
        })
    }

    /// Keep at most `max_snapshots` snapshots per page
    pub fn with_max_snapshots(mut self, max_snapshots: usize) -> Self {
        self.max_snapshots = max_snapshots.max(1);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, page_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", record_file_stem(page_id)))
    }

    fn load(&self, page_id: &str) -> Result<PageRecord> {
        let path = self.path_for(page_id);
        if !path.exists() {
            return Ok(PageRecord::default());
        }
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Write via a temporary file so a crash never leaves a truncated record
    fn save(&self, page_id: &str, record: &PageRecord) -> Result<()> {
        let path = self.path_for(page_id);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec(record)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn update<T>(&self, page_id: &str, apply: impl FnOnce(&mut PageRecord) -> T) -> Result<T> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut record = self.load(page_id)?;
        let value = apply(&mut record);
        self.save(page_id, &record)?;
        Ok(value)
    }
}

impl SnapshotStore for JsonFileStore {
    fn latest(&self, page_id: &str) -> Result<Option<Snapshot>> {
        Ok(self.load(page_id)?.latest(page_id))
    }

    fn history(&self, page_id: &str, limit: usize) -> Result<Vec<Snapshot>> {
        Ok(self.load(page_id)?.history(page_id, limit))
    }

    fn insert_snapshot(&self, snapshot: Snapshot) -> Result<Snapshot> {
        let page_id = snapshot.page_id.clone();
        let stored = self.update(&page_id, |record| {
            record.push_snapshot(snapshot, self.max_snapshots)
        })?;
        ::log::debug!("Stored snapshot {} for {}", stored.id, page_id);
        Ok(stored)
    }

    fn insert_alert(&self, alert: Alert) -> Result<Alert> {
        let page_id = alert.page_id.clone();
        self.update(&page_id, |record| record.push_alert(alert))
    }

    fn alerts(&self, page_id: &str) -> Result<Vec<Alert>> {
        Ok(self.load(page_id)?.alerts(page_id))
    }
}
