//! Integration tests for the end-to-end pipeline using an in-memory provider.

use chrono::NaiveDate;
use pricecollate_core::data::provider::SilentProgress;
use pricecollate_core::output::{read_json, OutputPaths};
use pricecollate_core::{
    recollate, run_pipeline, ConfigError, DayRecord, FetchError, HistoricalMapping,
    PipelineConfig, PipelineError, PriceProvider, RawDay,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn fixture_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn aapl_fixture_text() -> String {
    std::fs::read_to_string(fixture_dir().join("aapl_2019q1_head.json")).unwrap()
}

fn aapl_fixture() -> Vec<RawDay> {
    serde_json::from_str(&aapl_fixture_text()).unwrap()
}

/// Serves canned records per ticker; unknown tickers get a 404.
struct FixtureProvider {
    data: HashMap<String, Vec<RawDay>>,
    requests: RefCell<Vec<(String, NaiveDate, NaiveDate)>>,
}

impl FixtureProvider {
    fn new() -> Self {
        let mut data = HashMap::new();
        data.insert("AAPL".to_string(), aapl_fixture());
        data.insert(
            "MSFT".to_string(),
            vec![
                DayRecord::new("2019-01-02T00:00:00.000Z", 99.55, 101.75, 98.94, 101.12).into(),
                DayRecord::new("2019-01-03T00:00:00.000Z", 100.1, 100.185, 97.2, 97.4).into(),
            ],
        );
        Self {
            data,
            requests: RefCell::new(Vec::new()),
        }
    }
}

impl PriceProvider for FixtureProvider {
    fn name(&self) -> &str {
        "fixture"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<RawDay>, FetchError> {
        self.requests.borrow_mut().push((ticker.to_string(), start, end));
        self.data.get(ticker).cloned().ok_or_else(|| FetchError::Upstream {
            ticker: ticker.to_string(),
            status: 404,
            body: r#"{"detail":"Error: Ticker 'XXXX' not found"}"#.into(),
        })
    }
}

fn config(output_dir: &Path, tickers: &[&str]) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.output_dir = output_dir.to_path_buf();
    config
        .set_tickers(&tickers.iter().map(|t| t.to_string()).collect::<Vec<_>>())
        .unwrap();
    config
}

#[test]
fn writes_all_three_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");
    let provider = FixtureProvider::new();

    let summary = run_pipeline(&config(&out, &["MSFT", "AAPL"]), &provider, &SilentProgress).unwrap();

    assert_eq!(summary.tickers, 2);
    assert_eq!(summary.days, 5);
    assert_eq!(summary.rows, 6);
    assert_eq!(summary.paths, OutputPaths::new(&out));

    // requests went out in list order with the configured range
    let requests = provider.requests.borrow();
    let order: Vec<&str> = requests.iter().map(|r| r.0.as_str()).collect();
    assert_eq!(order, ["MSFT", "AAPL"]);
    assert_eq!(requests[0].1, NaiveDate::from_ymd_opt(2019, 1, 1).unwrap());
    assert_eq!(requests[0].2, NaiveDate::from_ymd_opt(2019, 3, 31).unwrap());

    let csv = std::fs::read_to_string(out.join("data.csv")).unwrap();
    assert_eq!(
        csv,
        "Date,Ticker,Open,High,Low,Close\r\n\
         2019-01-02,MSFT,99.55,101.75,98.94,101.12\r\n\
         2019-01-03,MSFT,100.1,100.19,97.2,97.4\r\n\
         2019-01-02,AAPL,154.89,158.85,154.23,157.92\r\n\
         2019-01-03,AAPL,143.98,145.72,142,142.19\r\n\
         2019-01-04,AAPL,144.53,148.55,143.8,148.26"
    );

    let collated: serde_json::Value = read_json(&out.join("collated.json")).unwrap();
    assert_eq!(collated.as_array().unwrap().len(), 6);
    assert_eq!(collated[0], serde_json::json!(["Date", "Ticker", "Open", "High", "Low", "Close"]));
    assert_eq!(
        collated[3],
        serde_json::json!(["2019-01-02", "AAPL", 154.89, 158.85, 154.23, 157.92])
    );
}

#[test]
fn raw_dump_keeps_order_and_passthrough_fields() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");
    let provider = FixtureProvider::new();

    run_pipeline(&config(&out, &["MSFT", "AAPL"]), &provider, &SilentProgress).unwrap();

    let raw = std::fs::read_to_string(out.join("historical.json")).unwrap();
    assert!(raw.starts_with("{\n  \"MSFT\": ["));
    assert!(raw.find("\"MSFT\"").unwrap() < raw.find("\"AAPL\"").unwrap());

    let mapping: HistoricalMapping = read_json(&out.join("historical.json")).unwrap();
    let aapl = mapping.get("AAPL").unwrap();
    assert_eq!(aapl, aapl_fixture().as_slice());
    assert_eq!(aapl[0].raw()["splitFactor"], serde_json::json!(1.0));
    assert_eq!(aapl[0].record().date, "2019-01-02T00:00:00.000Z");
}

#[test]
fn raw_dump_is_the_upstream_body_verbatim() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");

    run_pipeline(&config(&out, &["AAPL"]), &FixtureProvider::new(), &SilentProgress).unwrap();

    let body: serde_json::Value = serde_json::from_str(&aapl_fixture_text()).unwrap();
    let expected = serde_json::to_string_pretty(&serde_json::json!({ "AAPL": body })).unwrap();
    let raw = std::fs::read_to_string(out.join("historical.json")).unwrap();
    assert_eq!(raw, expected);

    // integer stays an integer; keys stay in upstream order
    assert!(raw.contains("\"low\": 142,\n"), "{raw}");
    let day = raw.find("\"date\"").unwrap();
    assert!(raw[day..].find("\"close\"").unwrap() < raw[day..].find("\"open\"").unwrap());
}

#[test]
fn upstream_failure_writes_no_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");
    let provider = FixtureProvider::new();

    let err = run_pipeline(&config(&out, &["AAPL", "XXXX", "MSFT"]), &provider, &SilentProgress)
        .unwrap_err();

    assert!(matches!(err, PipelineError::Fetch(FetchError::Upstream { status: 404, .. })));
    // MSFT is never requested once XXXX fails
    assert_eq!(provider.requests.borrow().len(), 2);

    assert!(out.is_dir());
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}

#[test]
fn existing_output_dir_keeps_unrelated_files() {
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("output");
    std::fs::create_dir_all(&out).unwrap();
    std::fs::write(out.join("README.txt"), "hands off").unwrap();
    std::fs::write(out.join("data.csv"), "stale").unwrap();

    run_pipeline(&config(&out, &["AAPL"]), &FixtureProvider::new(), &SilentProgress).unwrap();

    assert_eq!(std::fs::read_to_string(out.join("README.txt")).unwrap(), "hands off");
    let csv = std::fs::read_to_string(out.join("data.csv")).unwrap();
    assert!(csv.starts_with("Date,Ticker,Open,High,Low,Close\r\n2019-01-02,AAPL"));
}

#[test]
fn recollate_from_raw_dump() {
    let tmp = tempfile::tempdir().unwrap();
    let first = tmp.path().join("first");
    let second = tmp.path().join("second");

    run_pipeline(&config(&first, &["MSFT", "AAPL"]), &FixtureProvider::new(), &SilentProgress).unwrap();

    // default order: the dump's key order
    let summary = recollate(&first.join("historical.json"), None, &second).unwrap();
    assert_eq!(summary.rows, 6);
    assert_eq!(
        std::fs::read_to_string(first.join("data.csv")).unwrap(),
        std::fs::read_to_string(second.join("data.csv")).unwrap()
    );
    assert!(!second.join("historical.json").exists());

    // explicit subset
    let only_aapl = vec!["AAPL".to_string()];
    let summary = recollate(&first.join("historical.json"), Some(&only_aapl), &second).unwrap();
    assert_eq!(summary.rows, 4);

    // repeats collate once
    let twice = vec!["AAPL".to_string(), " AAPL ".to_string()];
    let summary = recollate(&first.join("historical.json"), Some(&twice), &second).unwrap();
    assert_eq!(summary.rows, 4);
    let csv = std::fs::read_to_string(second.join("data.csv")).unwrap();
    assert_eq!(csv.matches("AAPL").count(), 3);

    // nothing usable
    let blank = vec!["  ".to_string()];
    let err = recollate(&first.join("historical.json"), Some(&blank), &second).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ConfigError::EmptyTickers)));

    // a ticker missing from the dump
    let missing = vec!["GOOG".to_string()];
    let err = recollate(&first.join("historical.json"), Some(&missing), &second).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Collate(pricecollate_core::CollateError::MissingTicker(_))
    ));
}
