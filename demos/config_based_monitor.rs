use clap::Parser;
use page_delta::Monitor;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to monitor configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Override max concurrency
    #[arg(short = 'n', long)]
    concurrency: Option<usize>,

    /// Override snapshot directory
    #[arg(short, long)]
    store_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    println!("Loading configuration from file: {}", args.config.display());
    let mut monitor = Monitor::new().with_config_file(&args.config)?;

    if let Some(concurrency) = args.concurrency {
        println!("Overriding max concurrency: {}", concurrency);
        monitor = monitor.with_max_concurrency(concurrency);
    }

    if let Some(store_dir) = args.store_dir {
        println!("Overriding snapshot directory: {}", store_dir.display());
        monitor = monitor.with_store_dir(store_dir);
    }

    for page in monitor.pages() {
        println!("  {} -> {}", page.display_name(), page.url);
    }

    let scanner = monitor.build()?;
    let start_time = std::time::Instant::now();
    let results = scanner.scan_all(monitor.pages().to_vec()).await;

    for scan in &results {
        match &scan.outcome {
            Ok(outcome) if outcome.has_changes => {
                println!("{}: changed", scan.page_id);
                for alert in &outcome.alerts {
                    println!("  [{:?}] {}", alert.kind, alert.message);
                }
            }
            Ok(_) => println!("{}: unchanged", scan.page_id),
            Err(e) => println!("{}: failed ({})", scan.page_id, e),
        }
    }

    println!(
        "Scan complete. Checked {} pages in {:.2} seconds.",
        results.len(),
        start_time.elapsed().as_secs_f64()
    );

    Ok(())
}
