//! Price provider trait and structured fetch errors.
//!
//! The PriceProvider trait abstracts over where daily prices come from, so the
//! batch loop and the pipeline can run against an in-memory fixture in tests.

use crate::domain::RawDay;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

/// Structured error types for fetching a ticker.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {ticker}: {message}")]
    Network { ticker: String, message: String },

    #[error("upstream returned HTTP {status} for {ticker}: {body}")]
    Upstream {
        ticker: String,
        status: u16,
        body: String,
    },

    #[error("malformed response for {ticker}: {message}")]
    MalformedBody { ticker: String, message: String },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    /// The ticker the failed request was for, if any.
    pub fn ticker(&self) -> Option<&str> {
        match self {
            Self::Network { ticker, .. }
            | Self::Upstream { ticker, .. }
            | Self::MalformedBody { ticker, .. } => Some(ticker),
            Self::Client(_) => None,
        }
    }
}

/// Source of daily price records.
pub trait PriceProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily records for a ticker over an inclusive date range.
    ///
    /// Each day keeps the upstream object as received next to its typed view.
    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawDay>, FetchError>;
}

/// Progress callback for the sequential ticker loop.
pub trait DownloadProgress {
    /// Called before a ticker is requested.
    fn on_start(&self, ticker: &str, index: usize, total: usize);

    /// Called when a ticker request finishes; `Ok` carries the day count.
    fn on_complete(&self, ticker: &str, index: usize, total: usize, result: Result<usize, &FetchError>);

    /// Called once after every ticker has been fetched.
    fn on_batch_complete(&self, tickers: usize, days: usize);
}

/// Progress reporter that writes to the `tracing` log.
pub struct LogProgress;

impl DownloadProgress for LogProgress {
    fn on_start(&self, ticker: &str, index: usize, total: usize) {
        tracing::debug!("[{}/{}] Fetching {ticker}...", index + 1, total);
    }

    fn on_complete(
        &self,
        ticker: &str,
        _index: usize,
        _total: usize,
        result: Result<usize, &FetchError>,
    ) {
        match result {
            Ok(days) => info!("Download: {ticker} -> {days} days"),
            Err(e) => warn!("Download failed: {ticker}: {e}"),
        }
    }

    fn on_batch_complete(&self, tickers: usize, days: usize) {
        info!("Download complete: {tickers} tickers, {days} days");
    }
}

/// Progress reporter that does nothing.
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_start(&self, _ticker: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _ticker: &str,
        _index: usize,
        _total: usize,
        _result: Result<usize, &FetchError>,
    ) {
    }

    fn on_batch_complete(&self, _tickers: usize, _days: usize) {}
}
