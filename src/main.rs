use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

mod context;
mod correlate;
mod error;
mod loader;
mod models;
mod report;
mod series;
mod surge;

use correlate::CorrelationClient;
use loader::RecordStore;
use series::YearRange;
use surge::ThresholdBand;

#[derive(Parser)]
#[command(name = "prenom-watch")]
#[command(about = "Surge detection and cultural correlation for French given-name statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect names with a sudden popularity surge in a year range
    Detect {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 1990)]
        from: i32,
        #[arg(long, default_value_t = 2020)]
        to: i32,
        #[arg(long, default_value_t = 6000)]
        min_threshold: u64,
        #[arg(long, default_value_t = 10000)]
        max_threshold: u64,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print one name's aggregated yearly series
    Series {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 1990)]
        from: i32,
        #[arg(long, default_value_t = 2020)]
        to: i32,
        #[arg(long)]
        name: String,
    },
    /// Look up structured facts correlated with a name
    Correlate {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = correlate::DEFAULT_RESULT_LIMIT)]
        limit: usize,
        /// Optional curated context table (JSON)
        #[arg(long)]
        context: Option<PathBuf>,
    },
    /// Look up events correlated with a date or year
    Events {
        #[arg(long)]
        date: String,
    },
    /// Generate a markdown report of detected surges
    Report {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value_t = 1990)]
        from: i32,
        #[arg(long, default_value_t = 2020)]
        to: i32,
        #[arg(long, default_value_t = 6000)]
        min_threshold: u64,
        #[arg(long, default_value_t = 10000)]
        max_threshold: u64,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Detect {
            csv,
            from,
            to,
            min_threshold,
            max_threshold,
            limit,
        } => {
            let range = YearRange::new(from, to)?;
            let band = ThresholdBand::new(min_threshold, max_threshold)?;
            log::info!("selected years {from}-{to}, thresholds {min_threshold}-{max_threshold}");

            let mut store = RecordStore::new();
            let records = store.load(&csv)?;
            let trends = series::aggregate(&records, range);
            let profiles = surge::detect(&trends, band);

            if profiles.is_empty() {
                println!("No surging names found for this window.");
                return Ok(());
            }

            println!(
                "{} names surged between {} and {}:",
                profiles.len(),
                from,
                to
            );
            for profile in profiles.iter().take(limit) {
                let peaks = profile
                    .events
                    .iter()
                    .map(|event| format!("{} ({})", event.year, event.count))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("- {} peaks in {}", profile.name, peaks);
            }
        }
        Commands::Series {
            csv,
            from,
            to,
            name,
        } => {
            let range = YearRange::new(from, to)?;
            let mut store = RecordStore::new();
            let records = store.load(&csv)?;
            let series = series::series_for(&records, range, &name);

            println!("Yearly uses of {name} ({from}-{to}):");
            for point in &series.points {
                println!("{}: {}", point.year, point.count);
            }
            println!("Total: {}", series.total());
        }
        Commands::Correlate {
            name,
            limit,
            context,
        } => {
            if let Some(path) = context {
                let table = context::load_context_table(&path)?;
                match table.get(&name) {
                    Some(entry) => {
                        println!("{}", entry.summary);
                        for event in &entry.events {
                            println!("{}: {}", event.year, event.label);
                        }
                    }
                    None => println!("No curated context available for {name}."),
                }
                println!();
            }

            let mut client = CorrelationClient::new();
            let results = client.entity_lookup(&name, limit).await;

            if results.is_empty() {
                println!("No Wikidata results found for {name}.");
                return Ok(());
            }

            println!("Wikidata results for {name}:");
            for result in results {
                println!("- {} - {}", result.headline, result.description);
            }
        }
        Commands::Events { date } => {
            let mut client = CorrelationClient::new();
            let results = client.event_lookup(&date).await;

            if results.is_empty() {
                println!("No events found for {date}.");
                return Ok(());
            }

            println!("Events associated with {date}:");
            for result in results {
                println!("- {} - {}", result.headline, result.description);
            }
        }
        Commands::Report {
            csv,
            from,
            to,
            min_threshold,
            max_threshold,
            out,
        } => {
            let range = YearRange::new(from, to)?;
            let band = ThresholdBand::new(min_threshold, max_threshold)?;

            let mut store = RecordStore::new();
            let records = store.load(&csv)?;
            let trends = series::aggregate(&records, range);
            let profiles = surge::detect(&trends, band);

            let report = report::build_report(range, band, &profiles);
            std::fs::write(&out, report)
                .with_context(|| format!("writing report to {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}
