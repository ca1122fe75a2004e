use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use steo_scraper::config::Config;
use steo_scraper::consolidate::consolidate_all;
use steo_scraper::fetcher::SteoFetcher;
use steo_scraper::pipeline::fetch_all;
use steo_scraper::series::read_series_list;
use steo_scraper::tables::TablesDir;

#[derive(Parser)]
#[command(name = "steo-scraper")]
#[command(about = "Download EIA STEO series and consolidate them into one workbook", long_about = None)]
struct Cli {
    /// File with one series ID (TABLE_REGION) per line
    #[arg(long, env = "STEO_SERIES_FILE", default_value = "series_ids.txt")]
    series_file: PathBuf,

    /// Directory holding one sub-directory of region CSVs per table
    #[arg(long, env = "STEO_TABLES_DIR", default_value = "tables")]
    tables_dir: PathBuf,

    /// Workbook to write
    #[arg(long, env = "STEO_OUTPUT", default_value = "excels/STEO.xlsx")]
    output: PathBuf,

    /// Consolidate the tables already on disk without fetching
    #[arg(long)]
    skip_fetch: bool,

    /// Fetch only; do not write the workbook
    #[arg(long)]
    skip_consolidate: bool,
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
        .unwrap()
        .progress_chars("##-")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,steo_scraper=debug")),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let cli = Cli::parse();
    let tables = TablesDir::new(&cli.tables_dir);

    if !cli.skip_fetch {
        // Fail before touching the network if the key is missing.
        let config = Config::from_env()?;
        info!("Starting STEO fetch with config: {:?}", config);

        let series = read_series_list(&cli.series_file)?;
        if series.is_empty() {
            warn!("No series IDs in {}; nothing to fetch", cli.series_file.display());
        } else {
            info!("Fetching {} series", series.len());
        }

        let fetcher = SteoFetcher::new(&config)?;
        let pb = ProgressBar::new(series.len() as u64);
        pb.set_style(bar_style());
        let summary = fetch_all(&fetcher, &series, &tables, &pb).await?;
        info!(
            "Fetch summary: {} written, {} failed",
            summary.written.len(),
            summary.failures.len()
        );
    }

    if !cli.skip_consolidate {
        let pb = ProgressBar::new(0);
        pb.set_style(bar_style());
        info!("Writing workbook {}", cli.output.display());
        let summary = consolidate_all(&tables, &cli.output, &pb)?;
        println!(
            "Workbook written to {} ({} sheets)",
            summary.path.display(),
            summary.sheets.len()
        );
    }

    Ok(())
}
