//! End-to-end run: fetch → raw dump → collate → collated JSON → CSV.
//!
//! The output directory is created first. Every ticker is fetched before any
//! file is written, so a fetch failure leaves no output files from this run.
//! A collation failure leaves only `historical.json`.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::collate::{collate_all, CollateError};
use crate::config::{normalize_tickers, ConfigError, PipelineConfig};
use crate::data::{fetch_all, DownloadProgress, FetchError, PriceProvider};
use crate::domain::{CollatedTable, HistoricalMapping};
use crate::output::{ensure_output_dir, read_json, to_csv, write_json, write_text, OutputError, OutputPaths};

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),
    #[error("collate error: {0}")]
    Collate(#[from] CollateError),
    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// What a run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub tickers: usize,
    pub days: usize,
    /// Rows in the collated table, header included.
    pub rows: usize,
    pub paths: OutputPaths,
}

/// Run the full pipeline for `config` against `provider`.
pub fn run_pipeline(
    config: &PipelineConfig,
    provider: &dyn PriceProvider,
    progress: &dyn DownloadProgress,
) -> Result<RunSummary, PipelineError> {
    config.validate()?;
    let paths = OutputPaths::new(&config.output_dir);
    ensure_output_dir(&paths.dir)?;

    info!(
        provider = provider.name(),
        tickers = config.tickers.len(),
        start = %config.start_date,
        end = %config.end_date,
        "fetching daily prices"
    );
    let mapping = fetch_all(
        provider,
        config.tickers.as_slice(),
        config.start_date,
        config.end_date,
        progress,
    )?;

    write_json(&paths.historical, &mapping)?;
    let table = write_collated(config.tickers.as_slice(), &mapping, &paths)?;

    Ok(summarize(&mapping, &table, paths))
}

/// Re-collate a previously written `historical.json` without network access.
///
/// `tickers` defaults to the dump's own key order. An explicit list is
/// trimmed and deduplicated like the configured one.
pub fn recollate(
    input: &Path,
    tickers: Option<&[String]>,
    output_dir: &Path,
) -> Result<RunSummary, PipelineError> {
    let mapping: HistoricalMapping = read_json(input)?;
    let tickers = match tickers {
        Some(t) => {
            let t = normalize_tickers(t);
            if t.is_empty() {
                return Err(ConfigError::EmptyTickers.into());
            }
            t
        }
        None => mapping.tickers(),
    };
    info!(input = %input.display(), tickers = tickers.len(), "re-collating raw dump");

    let paths = OutputPaths::new(output_dir);
    ensure_output_dir(&paths.dir)?;
    let table = write_collated(tickers.as_slice(), &mapping, &paths)?;

    Ok(summarize(&mapping, &table, paths))
}

/// Collate `mapping` and write `collated.json` and `data.csv`.
pub fn write_collated<S: AsRef<str>>(
    tickers: &[S],
    mapping: &HistoricalMapping,
    paths: &OutputPaths,
) -> Result<CollatedTable, PipelineError> {
    let table = collate_all(tickers, mapping)?;
    write_json(&paths.collated, &table)?;
    write_text(&paths.csv, &to_csv(&table)?)?;
    info!(rows = table.len(), dir = %paths.dir.display(), "wrote collated output");
    Ok(table)
}

fn summarize(mapping: &HistoricalMapping, table: &CollatedTable, paths: OutputPaths) -> RunSummary {
    RunSummary {
        tickers: mapping.len(),
        days: mapping.total_days(),
        rows: table.len(),
        paths,
    }
}
