//! Collated table — one flat row per (ticker, day), ready for tabular export.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::ser::{Error as _, SerializeSeq, SerializeTuple};
use serde::{Serialize, Serializer};
use std::str::FromStr;

/// One collated row: `(date, ticker, open, high, low, close)`.
///
/// Prices are already rounded to two decimals by the collator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollatedRow {
    pub date: NaiveDate,
    pub ticker: String,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
}

impl CollatedRow {
    /// Date as `YYYY-MM-DD`.
    pub fn date_string(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// The six fields rendered as text, in column order.
    ///
    /// Prices drop trailing zeros (`10.00` → `10`, `10.50` → `10.5`) so they
    /// read the same as the numbers in the JSON output.
    pub fn fields(&self) -> [String; 6] {
        [
            self.date_string(),
            self.ticker.clone(),
            self.open.normalize().to_string(),
            self.high.normalize().to_string(),
            self.low.normalize().to_string(),
            self.close.normalize().to_string(),
        ]
    }
}

/// Serializes as a JSON array: `["2019-01-02","AAPL",154.89,158.85,154.23,157.92]`.
impl Serialize for CollatedRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(6)?;
        tuple.serialize_element(&self.date_string())?;
        tuple.serialize_element(&self.ticker)?;
        for price in [self.open, self.high, self.low, self.close] {
            let number = serde_json::Number::from_str(&price.normalize().to_string())
                .map_err(S::Error::custom)?;
            tuple.serialize_element(&number)?;
        }
        tuple.end()
    }
}

/// Header row followed by every collated row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollatedTable {
    rows: Vec<CollatedRow>,
}

impl CollatedTable {
    /// Literal header row, always first.
    pub const HEADER: [&'static str; 6] = ["Date", "Ticker", "Open", "High", "Low", "Close"];

    pub fn new(rows: Vec<CollatedRow>) -> Self {
        Self { rows }
    }

    /// Data rows, without the header.
    pub fn rows(&self) -> &[CollatedRow] {
        &self.rows
    }

    /// Number of rows including the header.
    pub fn len(&self) -> usize {
        1 + self.rows.len()
    }

    /// A table always has its header, so it is never empty; this reports
    /// whether there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Every row as text fields, header first.
    pub fn records(&self) -> impl Iterator<Item = [String; 6]> + '_ {
        std::iter::once(Self::HEADER.map(String::from)).chain(self.rows.iter().map(|r| r.fields()))
    }
}

/// Serializes as an array of arrays; the first inner array is the header.
impl Serialize for CollatedTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        seq.serialize_element(&Self::HEADER)?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}
