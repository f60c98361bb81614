use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tenderbot::{config::Config, feed, Extractor, Pipeline};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tenderbot")]
#[command(about = "Daily tender digest: fetch tenders, extract their documents and forward them to a webhook")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the tenders of a day, enrich them and deliver them
    #[command(name = "run")]
    Run {
        /// Feed date, YYYY-MM-DD (defaults to yesterday)
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Tender feed URL (overrides config and env)
        #[arg(long)]
        feed_url: Option<String>,
        /// Webhook URL (overrides config and env)
        #[arg(long)]
        webhook_url: Option<String>,
        /// Keep a copy of every downloaded document in this directory
        #[arg(long)]
        download_dir: Option<String>,
        /// Print the enriched records as JSON instead of posting them
        #[arg(long)]
        dry_run: bool,
    },
    /// Extract the text of one local file
    #[command(name = "extract")]
    Extract {
        /// File to extract
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|e| format!("invalid date '{}': {}", value, e))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Run {
            date,
            feed_url,
            webhook_url,
            download_dir,
            dry_run,
        } => {
            if let Some(url) = feed_url {
                config.feed.url = url;
            }
            if let Some(url) = webhook_url {
                config.delivery.webhook_url = url;
            }
            if download_dir.is_some() {
                config.download.dir = download_dir;
            }
            let date = date.unwrap_or_else(feed::default_target_date);

            run(&config, date, dry_run).await
        }
        Commands::Extract { file } => extract(&config, &file).await,
    }
}

async fn run(config: &Config, date: NaiveDate, dry_run: bool) -> Result<()> {
    println!("📥 Fetching tenders for {} from {}", date, config.feed.url);
    let pipeline = Pipeline::from_config(config)?.with_progress(true);

    if dry_run {
        let mut records = pipeline.fetch(date).await?;
        pipeline.enrich_all(&mut records).await;
        let json = serde_json::to_string_pretty(&records).context("Failed to serialize tenders")?;
        println!("{}", json);
        return Ok(());
    }

    let summary = pipeline.run(date).await?;
    println!(
        "✓ {} tenders: {} delivered, {} rejected, {} failed",
        summary.tenders, summary.delivered, summary.rejected, summary.failed
    );
    Ok(())
}

async fn extract(config: &Config, file: &Path) -> Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read file: {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let extractor = Extractor::new(&config.text, config.extraction.clone());
    let extraction = extractor.extract_async(name, bytes).await;
    if let Some(kind) = extraction.failure_kind() {
        eprintln!("⚠️  Extraction failed ({})", kind);
    }
    println!("{}", extraction);
    Ok(())
}
