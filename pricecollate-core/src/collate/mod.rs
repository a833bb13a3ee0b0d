//! Collator — flattens the per-ticker mapping into one table of rounded rows.
//!
//! Row order is the outer loop over the requested tickers, inner loop over
//! each ticker's days as the provider returned them. A requested ticker that
//! is absent from the mapping fails the whole collation.

pub mod rounding;

use crate::domain::{CollatedRow, CollatedTable, DayRecord, HistoricalMapping};
use thiserror::Error;
use tracing::debug;

pub use rounding::{ceil_to_scale, floor_to_scale, round_to_scale, to_decimal, FieldRounding, PRICE_SCALE};

/// Errors from collation.
#[derive(Debug, Error)]
pub enum CollateError {
    #[error("ticker '{0}' has no entry in the fetched data")]
    MissingTicker(String),

    #[error("{ticker}: unrecognised date '{date}'")]
    InvalidDate { ticker: String, date: String },

    #[error("{ticker} {date}: {field} value {value} is not representable as a decimal price")]
    InvalidPrice {
        ticker: String,
        date: String,
        field: &'static str,
        value: f64,
    },
}

/// Collate one ticker's days into rows, applying the per-field rounding policy.
///
/// Produces exactly one row per day, in the given order. Accepts typed
/// records or fetched [`RawDay`](crate::domain::RawDay)s.
pub fn collate_one<D: AsRef<DayRecord>>(
    ticker: &str,
    days: &[D],
) -> Result<Vec<CollatedRow>, CollateError> {
    days.iter().map(|day| collate_day(ticker, day.as_ref())).collect()
}

/// Collate every requested ticker, in list order.
///
/// The returned table carries the fixed header; its `len()` is
/// `1 + Σ days(ticker)`.
pub fn collate_all<S: AsRef<str>>(
    tickers: &[S],
    mapping: &HistoricalMapping,
) -> Result<CollatedTable, CollateError> {
    let mut rows = Vec::with_capacity(mapping.total_days());
    for ticker in tickers {
        let ticker = ticker.as_ref();
        let days = mapping
            .get(ticker)
            .ok_or_else(|| CollateError::MissingTicker(ticker.to_string()))?;
        let collated = collate_one(ticker, days)?;
        debug!(ticker, rows = collated.len(), "collated");
        rows.extend(collated);
    }
    Ok(CollatedTable::new(rows))
}

fn collate_day(ticker: &str, day: &DayRecord) -> Result<CollatedRow, CollateError> {
    let date = day.calendar_date().ok_or_else(|| CollateError::InvalidDate {
        ticker: ticker.to_string(),
        date: day.date.clone(),
    })?;

    let price = |field: &'static str, value: f64, rounding: FieldRounding| {
        rounding
            .apply(value)
            .ok_or_else(|| CollateError::InvalidPrice {
                ticker: ticker.to_string(),
                date: day.date.clone(),
                field,
                value,
            })
    };

    Ok(CollatedRow {
        date,
        ticker: ticker.to_string(),
        open: price("open", day.open, FieldRounding::OPEN)?,
        high: price("high", day.high, FieldRounding::HIGH)?,
        low: price("low", day.low, FieldRounding::LOW)?,
        close: price("close", day.close, FieldRounding::CLOSE)?,
    })
}
