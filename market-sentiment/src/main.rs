//! Market sentiment CLI
//!
//! Usage:
//! ```bash
//! # Write the full JSON report
//! market-sentiment report --data data/prices --output report.json
//!
//! # Print the latest readings
//! market-sentiment summary --data data/prices --config config/sentiment.json
//!
//! # Score history as of a past date
//! market-sentiment summary --data data/prices --as-of 2022-10-12
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use market_sentiment::data::{FileDataSource, MarketDataCache};
use market_sentiment::{SentimentConfig, SentimentPipeline, SentimentReport};

#[derive(Parser)]
#[command(name = "market-sentiment")]
#[command(about = "Composite market sentiment score from price and options data")]
#[command(version)]
struct Cli {
    /// Directory with price files and options/ snapshots
    #[arg(short, long, global = true, default_value = "data/prices")]
    data: PathBuf,

    /// JSON config file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Score as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    as_of: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the full report as JSON
    Report {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print latest indicator, composite and options readings
    Summary,
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("market_sentiment=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => SentimentConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SentimentConfig::default(),
    };
    let as_of = match &cli.as_of {
        Some(s) => Some(
            NaiveDate::parse_from_str(s, "%Y-%m-%d").context("Invalid as-of date format")?,
        ),
        None => None,
    };

    let mut cache = MarketDataCache::from_config(&config.cache);
    let pipeline = SentimentPipeline::new(config).context("Invalid configuration")?;
    let source = FileDataSource::new(&cli.data);

    let report = pipeline
        .run(&source, &mut cache, Utc::now(), as_of)
        .with_context(|| format!("Sentiment run failed for data in {}", cli.data.display()))?;

    match cli.command {
        Commands::Report { output } => {
            let json = serde_json::to_string_pretty(&report)?;
            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Report written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Commands::Summary => print_summary(&report),
    }

    Ok(())
}

fn print_summary(report: &SentimentReport) {
    match &report.composite.latest {
        Some(latest) => println!(
            "Composite: {:.1} ({}) as of {}",
            latest.score, latest.label, latest.date
        ),
        None => println!("Composite: not enough history"),
    }
    println!();

    for score in &report.indicators {
        match &score.latest {
            Some(latest) => println!(
                "  {:<20} {:>6.1}  {}",
                score.indicator.name(),
                latest.score,
                latest.label
            ),
            None => println!("  {:<20} {:>6}  -", score.indicator.name(), "n/a"),
        }
        println!("  {:<20} {}", "", score.indicator.description());
    }
    println!();

    if let Some(pc) = &report.put_call {
        println!("Put/Call ({} expirations):", pc.expirations.len());
        println!("  Volume ratio: {:.2}", pc.avg_volume_ratio);
        println!("  OI ratio: {:.2}", pc.avg_oi_ratio);
        println!("  Quadrant: {} - {}", pc.quadrant.as_str(), pc.quadrant.description());
        println!("  Most common per expiration: {}", pc.dominant_quadrant.as_str());
        println!();
    }

    if let Some(skew) = &report.skew {
        println!("Volatility skew ({} expirations):", skew.expirations.len());
        println!("  Tail skew: {:.2}", skew.avg_tail_skew);
        println!("  Put convexity: {:.2}", skew.avg_put_convexity);
        println!("  Call FOMO: {:.2}", skew.avg_call_fomo);
        println!("  Term slope: {:+.2}", skew.term_structure_slope);
        for diagnostic in &skew.diagnostics {
            println!("  [{:?}] {}", diagnostic.level(), diagnostic.message());
        }
        println!();
    }

    let appendix = &report.appendix;
    if let Some((date, corr)) = appendix.correlation.latest() {
        println!(
            "{}-day correlation with SPY: {:.2} ({})",
            appendix.correlation.window, corr, date
        );
    }
    match &appendix.recovery.summary {
        Some(summary) => println!(
            "Extreme Fear recoveries: {} (median {:.0} days, {} unrecovered)",
            summary.count, summary.median, appendix.recovery.unrecovered
        ),
        None => println!(
            "Extreme Fear recoveries: none ({} unrecovered)",
            appendix.recovery.unrecovered
        ),
    }
}
