//! PriceCollate CLI — fetch, collate, and config commands.
//!
//! Commands:
//! - `fetch` — download daily prices for every ticker and write JSON + CSV output
//! - `collate` — rebuild `collated.json` and `data.csv` from an existing `historical.json`
//! - `init-config` — write the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

use pricecollate_core::config::API_KEY_ENV;
use pricecollate_core::{recollate, run_pipeline, LogProgress, PipelineConfig, RunSummary, TiingoProvider};

#[derive(Parser)]
#[command(
    name = "pricecollate",
    about = "Fetch historical daily prices per ticker and export them as JSON and CSV"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch daily prices for every ticker and write historical.json, collated.json, data.csv.
    Fetch {
        /// Path to a TOML config file. Defaults are used for anything it omits.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Tickers to fetch, replacing the configured list (e.g., AAPL MSFT).
        #[arg(long, num_args = 1..)]
        tickers: Option<Vec<String>>,

        /// Start date (YYYY-M-D), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-M-D), inclusive.
        #[arg(long)]
        end: Option<String>,

        /// Output directory, replacing the configured one.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Re-collate a previously written historical.json without network access.
    Collate {
        /// Path to the raw historical.json dump.
        #[arg(long)]
        input: PathBuf,

        /// Tickers to include, in row order. Defaults to the dump's order.
        #[arg(long, num_args = 1..)]
        tickers: Option<Vec<String>>,

        /// Output directory. Defaults to ./output.
        #[arg(long, default_value = "output")]
        output_dir: PathBuf,
    },
    /// Write the default configuration as TOML (no API key).
    InitConfig {
        /// Destination file.
        #[arg(long, default_value = "pricecollate.toml")]
        path: PathBuf,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fetch {
            config,
            tickers,
            start,
            end,
            output_dir,
        } => run_fetch(config, tickers, start, end, output_dir),
        Commands::Collate {
            input,
            tickers,
            output_dir,
        } => run_collate(&input, tickers, &output_dir),
        Commands::InitConfig { path, force } => run_init_config(&path, force),
    }
}

fn run_fetch(
    config_path: Option<PathBuf>,
    tickers: Option<Vec<String>>,
    start: Option<String>,
    end: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = build_config(config_path.as_deref(), tickers, start, end, output_dir)?;
    let api_key = config
        .require_api_key()
        .with_context(|| format!("set {API_KEY_ENV} or add api_key to the config file"))?;

    let provider = TiingoProvider::new(&config.base_url, api_key)?;
    let summary = run_pipeline(&config, &provider, &LogProgress)?;
    print_summary(&summary);
    Ok(())
}

/// Load the config file (or defaults) and apply command-line overrides.
fn build_config(
    config_path: Option<&Path>,
    tickers: Option<Vec<String>>,
    start: Option<String>,
    end: Option<String>,
    output_dir: Option<PathBuf>,
) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::load(config_path).with_context(|| match config_path {
        Some(p) => format!("failed to load config from {}", p.display()),
        None => "failed to build default config".to_string(),
    })?;

    if let Some(tickers) = tickers {
        config.set_tickers(&tickers)?;
    }
    config.set_range(start.as_deref(), end.as_deref())?;
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    Ok(config)
}

fn run_collate(input: &Path, tickers: Option<Vec<String>>, output_dir: &Path) -> Result<()> {
    if !input.exists() {
        bail!("input file does not exist: {}", input.display());
    }
    let summary = recollate(input, tickers.as_deref(), output_dir)
        .with_context(|| format!("failed to re-collate {}", input.display()))?;
    print_summary(&summary);
    Ok(())
}

fn run_init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let text = PipelineConfig::default().to_toml()?;
    std::fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote default config to {}", path.display());
    println!("Config written to: {}", path.display());
    println!("Set {API_KEY_ENV} before running `pricecollate fetch`.");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{} tickers, {} days, {} rows (incl. header)",
        summary.tickers, summary.days, summary.rows
    );
    println!("  {}", summary.paths.historical.display());
    println!("  {}", summary.paths.collated.display());
    println!("  {}", summary.paths.csv.display());
}
