use clap::Parser;
use page_delta::{ChangeDetector, DetectorOptions};
use std::error::Error;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Previous page text
    #[arg(long, default_value = "Our basic plan costs $10 per month with email support")]
    old: String,

    /// Current page text
    #[arg(
        long,
        default_value = "Our premium plan costs $25 per month with priority support and analytics"
    )]
    new: String,

    /// Maximum number of change descriptions
    #[arg(short, long)]
    max_changes: Option<usize>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize logger
    env_logger::init();

    let args = Args::parse();

    let mut options = DetectorOptions::default();
    if let Some(max_changes) = args.max_changes {
        println!("Overriding max changes: {}", max_changes);
        options.max_changes = max_changes;
    }
    let detector = ChangeDetector::with_options(options);

    println!("Similarity: {}%", detector.similarity(&args.old, &args.new));

    let result = detector.detect(&args.old, &args.new);
    if result.has_changes {
        println!("Significant change ({}%):", result.change_percentage);
        for change in &result.changes {
            println!("  - {}", change);
        }
    } else {
        println!("No significant change ({}%)", result.change_percentage);
    }

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
