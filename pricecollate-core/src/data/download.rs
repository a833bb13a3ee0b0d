//! Batch fetch — requests every ticker one after another.

use super::provider::{DownloadProgress, FetchError, PriceProvider};
use crate::domain::HistoricalMapping;
use chrono::NaiveDate;
use tracing::warn;

/// Fetch every ticker in list order and collect the results by ticker.
///
/// Requests are strictly sequential: each fetch completes before the next one
/// starts. The first failure aborts the batch and is returned; nothing fetched
/// so far is handed back. A ticker listed twice is fetched once.
pub fn fetch_all<S: AsRef<str>>(
    provider: &dyn PriceProvider,
    tickers: &[S],
    start: NaiveDate,
    end: NaiveDate,
    progress: &dyn DownloadProgress,
) -> Result<HistoricalMapping, FetchError> {
    let total = tickers.len();
    let mut mapping = HistoricalMapping::new();

    for (i, ticker) in tickers.iter().enumerate() {
        let ticker = ticker.as_ref();
        if mapping.contains(ticker) {
            warn!("{ticker} listed more than once; skipping repeat");
            continue;
        }

        progress.on_start(ticker, i, total);
        match provider.fetch(ticker, start, end) {
            Ok(days) => {
                progress.on_complete(ticker, i, total, Ok(days.len()));
                mapping.insert(ticker, days);
            }
            Err(e) => {
                progress.on_complete(ticker, i, total, Err(&e));
                return Err(e);
            }
        }
    }

    progress.on_batch_complete(mapping.len(), mapping.total_days());
    Ok(mapping)
}
