use crate::config::TrackedPage;
use crate::detector::{ChangeDetector, DiffResult};
use crate::error::{PageDeltaError, Result};
use crate::fetch::Fetcher;
use crate::parsers::{ExtractOptions, PageContent, Parser, ParserType};
use crate::results::{
    Alert, AlertKind, ChangesSummary, FeatureChange, FeatureChangeKind, PricingChange, Snapshot,
};
use crate::store::SnapshotStore;
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

pub const INITIAL_SNAPSHOT_CHANGE: &str = "Initial snapshot created";
pub const INITIAL_SNAPSHOT_ALERT: &str = "Initial snapshot created for this competitor";

/// Number of features named in a feature change description
const LISTED_FEATURES: usize = 3;

/// Result of scanning one page
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    pub page_id: String,
    /// Snapshot written by this scan
    pub snapshot: Snapshot,
    /// Detector output, absent on the first scan of a page
    pub diff: Option<DiffResult>,
    /// Alerts raised by this scan
    pub alerts: Vec<Alert>,
    pub has_changes: bool,
}

/// Outcome of one page within a batch scan
#[derive(Debug)]
pub struct PageScan {
    pub page_id: String,
    pub outcome: Result<ScanOutcome>,
}

/// Fetches tracked pages, compares them with their last snapshot and
/// records the new snapshot together with any alerts.
pub struct Scanner<F, S> {
    fetcher: F,
    store: Arc<S>,
    detector: ChangeDetector,
    extract: ExtractOptions,
    semaphore: Arc<Semaphore>,
    page_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<F: Fetcher, S: SnapshotStore + 'static> Scanner<F, S> {
    pub fn new(
        fetcher: F,
        store: Arc<S>,
        detector: ChangeDetector,
        extract: ExtractOptions,
        max_concurrency: usize,
    ) -> Self {
        Self {
            fetcher,
            store,
            detector,
            extract,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            page_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Lock guarding the snapshot baseline of one page
    async fn page_lock(&self, page_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.page_locks.lock().await;
        Arc::clone(locks.entry(page_id.to_string()).or_default())
    }

    /// Run a store operation on the blocking thread pool
    async fn with_store<T, Op>(&self, op: Op) -> Result<T>
    where
        T: Send + 'static,
        Op: FnOnce(&S) -> Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store)).await?
    }

    /// Fetch a page, compare it with its latest snapshot and store the result
    pub async fn scan(&self, page: &TrackedPage) -> Result<ScanOutcome> {
        ::log::info!("Scanning {} ({})", page.display_name(), page.url);

        let fetched = self.fetcher.fetch(&page.url).await?;
        let parser_type = ParserType::from_content_type(fetched.content_type.as_deref(), &page.url);
        let content = Parser::extract(&fetched.body, parser_type, &self.extract);

        let length = content.text.chars().count();
        if length < self.extract.min_content_length {
            ::log::warn!("{} yielded only {} characters of text", page.url, length);
            return Err(PageDeltaError::ContentTooShort { length });
        }

        self.record(page, Some(fetched.body), content).await
    }

    /// Compare extracted content with the latest snapshot and persist it.
    ///
    /// Reading the baseline and writing the new snapshot happen under the
    /// page's lock so concurrent scans of one page never share a baseline.
    pub async fn record(
        &self,
        page: &TrackedPage,
        html: Option<String>,
        content: PageContent,
    ) -> Result<ScanOutcome> {
        let lock = self.page_lock(&page.id).await;
        let _guard = lock.lock().await;

        let page_id = page.id.clone();
        let previous = self.with_store(move |store| store.latest(&page_id)).await?;
        let comparison = match &previous {
            None => Comparison::initial(),
            Some(prev) => self.compare(prev, &content),
        };

        let snapshot = Snapshot {
            id: 0,
            page_id: page.id.clone(),
            url: page.url.clone(),
            created_at: Utc::now(),
            html_content: html,
            text_content: content.text,
            price_info: content.price,
            features: content.features,
            changes_summary: comparison.summary,
            change_percentage: comparison.diff.as_ref().map(|d| d.change_percentage),
        };
        let snapshot = self
            .with_store(move |store| store.insert_snapshot(snapshot))
            .await?;

        // Alert write failures are logged, the scan still succeeds
        let pending = comparison
            .alerts
            .into_iter()
            .map(|(kind, message)| Alert::new(&page.id, snapshot.id, kind, message))
            .collect::<Vec<_>>();
        let alerts = self
            .with_store(move |store| Ok(insert_alerts(store, pending)))
            .await
            .unwrap_or_else(|e| {
                ::log::error!("Failed to store alerts for {}: {}", page.id, e);
                Vec::new()
            });

        let has_changes = comparison.has_changes;
        if has_changes {
            ::log::info!(
                "Changes detected on {}: {} alert(s)",
                page.display_name(),
                alerts.len()
            );
        } else {
            ::log::info!("No changes detected on {}", page.display_name());
        }

        Ok(ScanOutcome {
            page_id: page.id.clone(),
            snapshot,
            diff: comparison.diff,
            alerts,
            has_changes,
        })
    }

    fn compare(&self, previous: &Snapshot, content: &PageContent) -> Comparison {
        let diff = self.detector.detect(&previous.text_content, &content.text);
        let mut comparison = Comparison::default();

        if diff.has_changes {
            comparison.summary.text_changes = diff.changes.clone();
            let message = match diff.changes.first() {
                Some(first) => format!(
                    "Content changes detected ({}% difference): {}",
                    diff.change_percentage, first
                ),
                None => format!(
                    "Content changes detected ({}% difference)",
                    diff.change_percentage
                ),
            };
            comparison.alerts.push((AlertKind::Content, message));
            comparison.has_changes = true;
        }

        if let Some(change) = compare_prices(previous.price_info.as_deref(), content.price.as_deref()) {
            comparison
                .alerts
                .push((AlertKind::Pricing, change.description.clone()));
            comparison.summary.pricing_changes.push(change);
            comparison.has_changes = true;
        }

        let added = missing_features(&content.features, &previous.features);
        let removed = missing_features(&previous.features, &content.features);

        if !added.is_empty() {
            let description = format!(
                "{} new feature(s) detected: {}",
                added.len(),
                listed(&added)
            );
            comparison
                .summary
                .feature_changes
                .extend(added.iter().map(|f| feature_change(FeatureChangeKind::Added, f)));
            comparison.summary.new_sections.push(description.clone());
            comparison.alerts.push((AlertKind::Feature, description));
            comparison.has_changes = true;
        }

        if !removed.is_empty() {
            let description = format!(
                "{} feature(s) removed: {}",
                removed.len(),
                listed(&removed)
            );
            comparison
                .summary
                .feature_changes
                .extend(removed.iter().map(|f| feature_change(FeatureChangeKind::Removed, f)));
            comparison.summary.removed_sections.push(description.clone());
            comparison.alerts.push((AlertKind::Feature, description));
            comparison.has_changes = true;
        }

        comparison.diff = Some(diff);
        comparison
    }
}

impl<F, S> Scanner<F, S>
where
    F: Fetcher + 'static,
    S: SnapshotStore + 'static,
{
    /// Scan many pages concurrently, at most `max_concurrency` at a time.
    ///
    /// A failing page never aborts the batch; results come back in input order.
    pub async fn scan_all(self: &Arc<Self>, pages: Vec<TrackedPage>) -> Vec<PageScan> {
        let mut tasks = JoinSet::new();

        for (index, page) in pages.iter().cloned().enumerate() {
            let scanner = Arc::clone(self);
            tasks.spawn(async move {
                let outcome = match scanner.semaphore.acquire().await {
                    Ok(_permit) => scanner.scan(&page).await,
                    Err(_) => Err(PageDeltaError::Config("scanner was shut down".to_string())),
                };
                (index, outcome)
            });
        }

        let mut results: Vec<Option<Result<ScanOutcome>>> = pages.iter().map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => results[index] = Some(outcome),
                Err(e) => ::log::error!("Scan task failed: {}", e),
            }
        }

        pages
            .into_iter()
            .zip(results)
            .map(|(page, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    Err(PageDeltaError::Config(format!("scan of {} did not finish", page.id)))
                });
                if let Err(e) = &outcome {
                    ::log::error!("Failed to scan {}: {}", page.display_name(), e);
                }
                PageScan {
                    page_id: page.id,
                    outcome,
                }
            })
            .collect()
    }
}

/// What a scan found before anything is persisted
#[derive(Debug, Default)]
struct Comparison {
    summary: ChangesSummary,
    diff: Option<DiffResult>,
    alerts: Vec<(AlertKind, String)>,
    has_changes: bool,
}

impl Comparison {
    fn initial() -> Self {
        Self {
            summary: ChangesSummary {
                text_changes: vec![INITIAL_SNAPSHOT_CHANGE.to_string()],
                ..ChangesSummary::default()
            },
            diff: None,
            alerts: vec![(AlertKind::Content, INITIAL_SNAPSHOT_ALERT.to_string())],
            has_changes: true,
        }
    }
}

/// Store each alert, logging the ones that could not be written
fn insert_alerts<S: SnapshotStore + ?Sized>(store: &S, alerts: Vec<Alert>) -> Vec<Alert> {
    let mut stored = Vec::with_capacity(alerts.len());
    for alert in alerts {
        let page_id = alert.page_id.clone();
        match store.insert_alert(alert) {
            Ok(alert) => stored.push(alert),
            Err(e) => ::log::error!("Failed to store alert for {}: {}", page_id, e),
        }
    }
    stored
}

/// A pricing change when the first price on the page differs
pub fn compare_prices(old: Option<&str>, new: Option<&str>) -> Option<PricingChange> {
    if old == new {
        return None;
    }
    Some(PricingChange {
        old_price: old.map(str::to_string),
        new_price: new.map(str::to_string),
        description: format!(
            "Pricing changed from \"{}\" to \"{}\"",
            old.unwrap_or("N/A"),
            new.unwrap_or("N/A")
        ),
    })
}

/// Features of `features` absent from `other`, in order
fn missing_features<'a>(features: &'a [String], other: &[String]) -> Vec<&'a str> {
    features
        .iter()
        .filter(|f| !other.contains(f))
        .map(String::as_str)
        .collect()
}

fn listed(features: &[&str]) -> String {
    features[..features.len().min(LISTED_FEATURES)].join(", ")
}

fn feature_change(kind: FeatureChangeKind, feature: &str) -> FeatureChange {
    FeatureChange {
        kind,
        feature: feature.to_string(),
        description: None,
    }
}
