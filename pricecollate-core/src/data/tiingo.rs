//! Tiingo end-of-day price provider.
//!
//! One authenticated GET per ticker:
//! `{base_url}/daily/{TICKER}/prices?startDate=YYYY-MM-DD&endDate=YYYY-MM-DD`
//! with `Authorization: Token {api_key}`. The body is a JSON array of day
//! objects, kept as received. No retries: a failed request fails the ticker.

use super::provider::{FetchError, PriceProvider};
use crate::collate::to_decimal;
use crate::domain::{DayRecord, RawDay};
use chrono::NaiveDate;
use reqwest::Url;
use std::time::Duration;
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.tiingo.com/tiingo";

/// Longest slice of an error body kept in `FetchError::Upstream`.
const MAX_ERROR_BODY: usize = 200;

/// Tiingo daily-prices provider.
pub struct TiingoProvider {
    client: reqwest::blocking::Client,
    base_url: Url,
    api_key: String,
}

impl TiingoProvider {
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FetchError::Client(format!("invalid base URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::Client(format!(
                "base URL '{base_url}' cannot carry a path"
            )));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("pricecollate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Build the prices URL for a ticker (without the query string).
    ///
    /// The ticker is one path segment, percent-encoded as needed.
    pub fn prices_url(&self, ticker: &str) -> Url {
        let mut url = self.base_url.clone();
        // checked in new(): the base can carry a path
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["daily", ticker, "prices"]);
        }
        url
    }

    fn authorization(&self) -> String {
        format!("Token {}", self.api_key)
    }

    /// Decode each upstream object and check it can be collated.
    fn decode(ticker: &str, items: Vec<serde_json::Value>) -> Result<Vec<RawDay>, FetchError> {
        let malformed = |i: usize, message: String| FetchError::MalformedBody {
            ticker: ticker.to_string(),
            message: format!("record {i}: {message}"),
        };

        let mut days = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            let day = RawDay::from_value(item).map_err(|e| malformed(i, e.to_string()))?;
            Self::validate(day.record()).map_err(|message| malformed(i, message))?;
            days.push(day);
        }
        Ok(days)
    }

    fn validate(day: &DayRecord) -> Result<(), String> {
        if day.calendar_date().is_none() {
            return Err(format!("unrecognised date '{}'", day.date));
        }
        for (field, value) in day.prices() {
            if to_decimal(value).is_none() {
                return Err(format!("{field} value {value} is not a representable price"));
            }
        }
        Ok(())
    }
}

impl PriceProvider for TiingoProvider {
    fn name(&self) -> &str {
        "tiingo"
    }

    fn fetch(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RawDay>, FetchError> {
        let url = self.prices_url(ticker);
        let start = start.format("%Y-%m-%d").to_string();
        let end = end.format("%Y-%m-%d").to_string();
        debug!(%url, %start, %end, "requesting daily prices");

        let resp = self
            .client
            .get(url)
            .query(&[("startDate", start.as_str()), ("endDate", end.as_str())])
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .map_err(|e| FetchError::Network {
                ticker: ticker.to_string(),
                message: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            let mut body = resp.text().unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|&i| body.is_char_boundary(i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(FetchError::Upstream {
                ticker: ticker.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<serde_json::Value> = resp.json().map_err(|e| FetchError::MalformedBody {
            ticker: ticker.to_string(),
            message: e.to_string(),
        })?;

        Self::decode(ticker, items)
    }
}
