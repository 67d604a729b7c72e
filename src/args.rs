use clap::{Parser, Subcommand, ValueEnum};
use page_delta::config::FetchBackend;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-delta")]
#[command(about = "Detects meaningful changes on competitor web pages")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compare two text (or HTML) files and print the diff result
    Diff {
        /// Previous version
        old: PathBuf,

        /// Current version
        new: PathBuf,

        /// Extract visible text from HTML before comparing
        #[arg(long)]
        html: bool,
    },

    /// Scan tracked pages and record snapshots
    Scan {
        /// Path to monitor configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Scan a single page instead of (or in addition to) the configured ones
        #[arg(long, requires = "id")]
        url: Option<String>,

        /// Id of the ad-hoc page
        #[arg(long, requires = "url")]
        id: Option<String>,

        /// Number of pages scanned concurrently
        #[arg(short = 'n', long)]
        concurrency: Option<usize>,

        /// Fetch backend override
        #[arg(short, long, value_enum)]
        backend: Option<BackendArg>,

        /// Snapshot directory override
        #[arg(long)]
        store_dir: Option<PathBuf>,
    },

    /// Print a markdown activity report for one page
    Report {
        /// Path to monitor configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Id of the tracked page
        #[arg(long)]
        id: String,

        /// Number of recent snapshots covered
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Http,
    Webdriver,
}

impl From<BackendArg> for FetchBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Http => FetchBackend::Http,
            BackendArg::Webdriver => FetchBackend::WebDriver,
        }
    }
}
