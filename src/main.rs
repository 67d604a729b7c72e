use clap::Parser;
use page_delta::config::FetchBackend;
use page_delta::fetch::AnyFetcher;
use page_delta::parsers::{ExtractOptions, html};
use page_delta::store::{JsonFileStore, SnapshotStore};
use page_delta::{ChangeDetector, Monitor, MonitorConfig, PageScan, Result, TrackedPage, fallback_report};
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod args;
use args::{Args, BackendArg, Command};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    let result = match args.command {
        Command::Diff { old, new, html } => diff(&old, &new, html),
        Command::Scan {
            config,
            url,
            id,
            concurrency,
            backend,
            store_dir,
        } => scan(config, url.zip(id), concurrency, backend, store_dir).await,
        Command::Report { config, id, limit } => report(&config, &id, limit),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn diff(old: &Path, new: &Path, is_html: bool) -> Result<ExitCode> {
    let mut old_text = fs::read_to_string(old)?;
    let mut new_text = fs::read_to_string(new)?;

    if is_html {
        let options = ExtractOptions::default();
        old_text = html::extract_text(&old_text, &options);
        new_text = html::extract_text(&new_text, &options);
    }

    let result = ChangeDetector::new().detect(&old_text, &new_text);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}

async fn scan(
    config: Option<PathBuf>,
    ad_hoc: Option<(String, String)>,
    concurrency: Option<usize>,
    backend: Option<BackendArg>,
    store_dir: Option<PathBuf>,
) -> Result<ExitCode> {
    let mut monitor = Monitor::new();
    if let Some(path) = config {
        monitor = monitor.with_config_file(path)?;
    }
    if let Some((url, id)) = ad_hoc {
        monitor = monitor.with_page(TrackedPage::new(&id, "", &url));
    }
    if let Some(value) = concurrency {
        monitor = monitor.with_max_concurrency(value);
    }
    if let Some(value) = backend {
        monitor = monitor.with_backend(value.into());
    }
    if let Some(dir) = store_dir {
        monitor = monitor.with_store_dir(dir);
    }

    if monitor.pages().is_empty() {
        ::log::warn!("No pages to scan; pass --config or --url with --id");
        return Ok(ExitCode::SUCCESS);
    }

    if monitor.config().fetch.backend == FetchBackend::WebDriver {
        println!("Note: the webdriver backend requires a WebDriver server (e.g., ChromeDriver).");
        println!(
            "Set WEBDRIVER_URL environment variable if not using {}",
            monitor.config().fetch.webdriver_url
        );
    }

    let scanner = monitor.build()?;
    let start_time = std::time::Instant::now();
    let results = scanner.scan_all(monitor.pages().to_vec()).await;

    if let AnyFetcher::WebDriver(fetcher) = scanner.fetcher() {
        fetcher.close().await;
    }

    let failures = results.iter().filter(|r| r.outcome.is_err()).count();
    ::log::info!(
        "Scanned {} page(s) in {:.2} seconds, {} failed",
        results.len(),
        start_time.elapsed().as_secs_f64(),
        failures
    );

    let summary = results.iter().map(scan_summary).collect::<Vec<_>>();
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn scan_summary(scan: &PageScan) -> serde_json::Value {
    match &scan.outcome {
        Ok(outcome) => json!({
            "pageId": scan.page_id,
            "snapshotId": outcome.snapshot.id,
            "hasChanges": outcome.has_changes,
            "changePercentage": outcome.snapshot.change_percentage,
            "alerts": outcome.alerts.iter().map(|a| a.message.as_str()).collect::<Vec<_>>(),
        }),
        Err(e) => json!({
            "pageId": scan.page_id,
            "error": e.to_string(),
        }),
    }
}

fn report(config: &Path, id: &str, limit: usize) -> Result<ExitCode> {
    let config = MonitorConfig::from_file(config)?;
    let page = config.page(id)?;
    let store = JsonFileStore::open(&config.store_dir)?;

    let snapshots = store.history(&page.id, limit)?;
    ::log::debug!("Building report for {} from {} snapshot(s)", id, snapshots.len());

    print!("{}", fallback_report(page, &snapshots).to_markdown());
    Ok(ExitCode::SUCCESS)
}
