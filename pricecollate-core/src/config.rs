//! Pipeline configuration — TOML file with defaults and an API key override.
//!
//! ```toml
//! base_url = "https://api.tiingo.com/tiingo"
//! tickers = ["AAPL", "MSFT"]
//! start_date = "2019-1-1"
//! end_date = "2019-3-31"
//! output_dir = "output"
//! ```
//!
//! Every key is optional. The API key is normally left out of the file and
//! supplied through `PRICECOLLATE_API_KEY`.

use crate::data::tiingo::DEFAULT_BASE_URL;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `api_key`.
pub const API_KEY_ENV: &str = "PRICECOLLATE_API_KEY";

/// NASDAQ-100 constituents (early 2019).
pub const DEFAULT_TICKERS: &[&str] = &[
    "ATVI", "ADBE", "AMD", "ALXN", "ALGN", "GOOGL", "GOOG", "AMZN", "AAL", "AMGN", "ADI", "ANSS",
    "AAPL", "AMAT", "ASML", "ADSK", "ADP", "BIDU", "BIIB", "BMRN", "BKNG", "AVGO", "CDNS", "CDW",
    "CERN", "CHTR", "CHKP", "CTAS", "CSCO", "CTXS", "CTSH", "CMCSA", "CPRT", "CSGP", "COST", "CSX",
    "DLTR", "EBAY", "EA", "EXC", "EXPE", "FB", "FAST", "FISV", "GILD", "IDXX", "ILMN", "INCY",
    "INTC", "INTU", "ISRG", "JD", "KLAC", "KHC", "LRCX", "LBTYA", "LBTYK", "LULU", "MAR", "MXIM",
    "MELI", "MCHP", "MU", "MSFT", "MDLZ", "MNST", "NTAP", "NTES", "NFLX", "NVDA", "NXPI", "ORLY",
    "PCAR", "PAYX", "PYPL", "PEP", "QCOM", "REGN", "ROST", "SGEN", "SIRI", "SWKS", "SPLK", "SBUX",
    "SNPS", "TMUS", "TTWO", "TSLA", "TXN", "TCOM", "UAL", "VRSN", "VRSK", "VRTX", "WBA", "WDAY",
    "WDC", "WLTW", "XEL", "XLNX",
];

/// Relative, so it resolves against the working directory the tool runs in.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("no API key: set `api_key` in the config file or PRICECOLLATE_API_KEY")]
    MissingApiKey,

    #[error("invalid {field} '{value}': expected YYYY-M-D")]
    InvalidDate { field: &'static str, value: String },

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("ticker list is empty")]
    EmptyTickers,
}

/// On-disk shape: every field optional, dates as written.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tickers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_dir: Option<PathBuf>,
}

/// Validated configuration for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Unique, non-empty, in request order.
    pub tickers: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub output_dir: PathBuf,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            tickers: DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect(),
            start_date: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            end_date: NaiveDate::from_ymd_opt(2019, 3, 31).unwrap_or_default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

impl PipelineConfig {
    /// Load from an optional TOML file, then apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.override_api_key(std::env::var(API_KEY_ENV).ok());
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a configuration from a TOML string, filling gaps with defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        let start_date = match file.start_date {
            Some(s) => parse_config_date("start_date", &s)?,
            None => defaults.start_date,
        };
        let end_date = match file.end_date {
            Some(s) => parse_config_date("end_date", &s)?,
            None => defaults.end_date,
        };

        let config = Self {
            base_url: file.base_url.unwrap_or(defaults.base_url),
            api_key: file.api_key.filter(|k| !k.trim().is_empty()),
            tickers: file
                .tickers
                .map(|t| normalize_tickers(&t))
                .unwrap_or(defaults.tickers),
            start_date,
            end_date,
            output_dir: file.output_dir.unwrap_or(defaults.output_dir),
        };
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML. The API key is never written.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        let file = ConfigFile {
            base_url: Some(self.base_url.clone()),
            api_key: None,
            tickers: Some(self.tickers.clone()),
            start_date: Some(format_config_date(self.start_date)),
            end_date: Some(format_config_date(self.end_date)),
            output_dir: Some(self.output_dir.clone()),
        };
        Ok(toml::to_string_pretty(&file)?)
    }

    /// Replace the API key when `value` is a non-blank string.
    pub fn override_api_key(&mut self, value: Option<String>) {
        if let Some(key) = value.filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }

    /// Replace the ticker list (deduplicated, blanks dropped).
    pub fn set_tickers(&mut self, tickers: &[String]) -> Result<(), ConfigError> {
        let tickers = normalize_tickers(tickers);
        if tickers.is_empty() {
            return Err(ConfigError::EmptyTickers);
        }
        self.tickers = tickers;
        Ok(())
    }

    /// Replace the date range from `YYYY-M-D` strings.
    pub fn set_range(&mut self, start: Option<&str>, end: Option<&str>) -> Result<(), ConfigError> {
        let start = match start {
            Some(s) => parse_config_date("start_date", s)?,
            None => self.start_date,
        };
        let end = match end {
            Some(s) => parse_config_date("end_date", s)?,
            None => self.end_date,
        };
        if start > end {
            return Err(ConfigError::InvalidRange { start, end });
        }
        self.start_date = start;
        self.end_date = end;
        Ok(())
    }

    /// The API key, or `MissingApiKey`.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key.as_deref().ok_or(ConfigError::MissingApiKey)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tickers.is_empty() {
            return Err(ConfigError::EmptyTickers);
        }
        if self.start_date > self.end_date {
            return Err(ConfigError::InvalidRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        Ok(())
    }
}

/// Parse `YYYY-M-D` (zero padding optional).
pub fn parse_config_date(field: &'static str, value: &str) -> Result<NaiveDate, ConfigError> {
    let invalid = || ConfigError::InvalidDate {
        field,
        value: value.to_string(),
    };
    let mut parts = value.trim().splitn(3, '-');
    let (Some(y), Some(m), Some(d)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(invalid());
    };
    let y: i32 = y.parse().map_err(|_| invalid())?;
    let m: u32 = m.parse().map_err(|_| invalid())?;
    let d: u32 = d.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(y, m, d).ok_or_else(invalid)
}

/// Format as `YYYY-M-D`.
pub fn format_config_date(date: NaiveDate) -> String {
    date.format("%Y-%-m-%-d").to_string()
}

/// Trim, drop blanks, and drop repeats keeping the first occurrence.
pub fn normalize_tickers(tickers: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tickers.len());
    for t in tickers {
        let t = t.trim();
        if !t.is_empty() && !out.iter().any(|o| o == t) {
            out.push(t.to_string());
        }
    }
    out
}
