//! Day records — one ticker's prices for one calendar day, as returned upstream.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Typed OHLC view of an upstream day object.
///
/// `date` keeps the upstream representation (it may carry a time and offset).
/// Any other fields are ignored here; they survive in the owning [`RawDay`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DayRecord {
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
        }
    }

    /// The calendar day this record belongs to, ignoring any time component.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        parse_calendar_date(&self.date)
    }

    /// OHLC in column order, paired with field names.
    pub fn prices(&self) -> [(&'static str, f64); 4] {
        [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ]
    }
}

impl AsRef<DayRecord> for DayRecord {
    fn as_ref(&self) -> &DayRecord {
        self
    }
}

/// One upstream day object kept exactly as decoded, plus its typed view.
///
/// Serializes as the original object: key order, integer-vs-float numbers and
/// fields the collator never reads all come back out unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDay {
    raw: serde_json::Value,
    record: DayRecord,
}

impl RawDay {
    /// Decode the typed view from an upstream object, keeping the object.
    pub fn from_value(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        let record = DayRecord::deserialize(&raw)?;
        Ok(Self { raw, record })
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.raw
    }

    pub fn record(&self) -> &DayRecord {
        &self.record
    }
}

impl AsRef<DayRecord> for RawDay {
    fn as_ref(&self) -> &DayRecord {
        &self.record
    }
}

/// Wrap a typed record with a minimal object carrying just its OHLC fields.
impl From<DayRecord> for RawDay {
    fn from(record: DayRecord) -> Self {
        let raw = serde_json::json!({
            "date": record.date,
            "open": record.open,
            "high": record.high,
            "low": record.low,
            "close": record.close,
        });
        Self { raw, record }
    }
}

impl Serialize for RawDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::from_value(raw).map_err(D::Error::custom)
    }
}

/// Extract the calendar date from an upstream date string.
///
/// Accepts RFC 3339 timestamps (`2019-01-02T00:00:00.000Z`), naive timestamps
/// (`2019-01-02T00:00:00`) and plain dates. The date is taken as written: no
/// timezone conversion is applied, so a UTC-midnight timestamp never slides
/// to the previous day.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    // "2019-01-02 00:00:00+00:00" and similar: the leading ten characters are the date.
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

/// Ticker → day objects, in the order tickers were fetched.
///
/// Serializes as a JSON object whose keys keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistoricalMapping(IndexMap<String, Vec<RawDay>>);

impl HistoricalMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a ticker's days. Returns the previous days if the ticker was present.
    pub fn insert(&mut self, ticker: impl Into<String>, days: Vec<RawDay>) -> Option<Vec<RawDay>> {
        self.0.insert(ticker.into(), days)
    }

    pub fn get(&self, ticker: &str) -> Option<&[RawDay]> {
        self.0.get(ticker).map(|v| v.as_slice())
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.0.contains_key(ticker)
    }

    /// Tickers in insertion order.
    pub fn tickers(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RawDay])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of day counts across all tickers.
    pub fn total_days(&self) -> usize {
        self.0.values().map(|v| v.len()).sum()
    }
}
