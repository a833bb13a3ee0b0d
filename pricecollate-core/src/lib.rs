//! PriceCollate Core — fetch daily OHLC prices per ticker and export them as a table.
//!
//! Three stages, each feeding the next:
//! - Fetch: one authenticated request per ticker, strictly sequential
//! - Collate: flatten ticker → days into rows with per-field two-decimal rounding
//! - Output: raw JSON dump, collated JSON, and CRLF-delimited CSV

pub mod collate;
pub mod config;
pub mod data;
pub mod domain;
pub mod output;
pub mod pipeline;

pub use collate::{collate_all, collate_one, CollateError};
pub use config::{ConfigError, PipelineConfig};
pub use data::{fetch_all, DownloadProgress, FetchError, LogProgress, PriceProvider, TiingoProvider};
pub use domain::{CollatedRow, CollatedTable, DayRecord, HistoricalMapping, RawDay};
pub use output::{OutputError, OutputPaths};
pub use pipeline::{recollate, run_pipeline, write_collated, PipelineError, RunSummary};
