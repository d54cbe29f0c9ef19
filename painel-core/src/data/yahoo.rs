//! Yahoo Finance quote source.
//!
//! Fetches daily OHLCV bars from the v8 chart API, either over an
//! explicit (start, end) range or a lookback period ("1mo", "1y", ...).
//! Yahoo has no official API and is subject to unannounced format
//! changes; drift is reported as `ResponseFormatChanged`, never papered
//! over. One request per call — failures surface to the caller.

use super::provider::{DataError, QuoteProvider};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Yahoo Finance quote provider.
pub struct YahooQuotes {
    client: reqwest::blocking::Client,
}

impl YahooQuotes {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// Chart URL for an explicit inclusive date range.
    fn range_url(symbol: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();
        let end_ts = end.and_hms_opt(23, 59, 59).unwrap().and_utc().timestamp();
        format!("{CHART_BASE}/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d")
    }

    /// Chart URL for a trailing lookback period ("1mo", "6mo", "1y", ...).
    fn lookback_url(symbol: &str, lookback: &str) -> String {
        format!("{CHART_BASE}/{symbol}?range={lookback}&interval=1d")
    }

    /// Fetch daily bars over a trailing lookback period.
    pub fn fetch_lookback(&self, symbol: &str, lookback: &str) -> Result<Vec<Bar>, DataError> {
        self.request(symbol, &Self::lookback_url(symbol, lookback))
    }

    fn request(&self, symbol: &str, url: &str) -> Result<Vec<Bar>, DataError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            // Yahoo reports unknown symbols as 404 with a JSON body.
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            return Err(DataError::HttpStatus {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        parse_chart(symbol, chart)
    }
}

impl Default for YahooQuotes {
    fn default() -> Self {
        Self::new()
    }
}

impl QuoteProvider for YahooQuotes {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        self.request(symbol, &Self::range_url(symbol, start, end))
    }
}

/// Parse the chart API response into bars.
///
/// All-null rows (holidays, suspended sessions) are skipped. In rows
/// that survive, a missing open/high/low takes the row's close and a
/// missing volume becomes 0; a missing close drops the row since close
/// is mandatory. An empty final series is an error, not a silent no-op.
fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
    let result = resp.chart.result.ok_or_else(|| {
        if let Some(err) = resp.chart.error {
            if err.code == "Not Found" {
                DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                }
            } else {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
        } else {
            DataError::ResponseFormatChanged("empty result with no error".into())
        }
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

    let timestamps = data
        .timestamp
        .ok_or_else(|| DataError::ResponseFormatChanged("no timestamps".into()))?;

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let mut bars = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        let Some(close) = close else {
            continue;
        };

        bars.push(Bar {
            date,
            open: open.unwrap_or(close),
            high: high.unwrap_or(close),
            low: low.unwrap_or(close),
            close,
            volume: volume.unwrap_or(0),
        });
    }

    if bars.is_empty() {
        return Err(DataError::EmptyResponse {
            symbol: symbol.to_string(),
        });
    }

    bars.sort_by_key(|b| b.date);
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_fixture(json: &str) -> Result<Vec<Bar>, DataError> {
        let chart: ChartResponse = serde_json::from_str(json).unwrap();
        parse_chart("XYZ", chart)
    }

    #[test]
    fn parses_bars_and_substitutes_gaps() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0, null],
                            "high":   [12.0, 13.0],
                            "low":    [9.0,  10.5],
                            "close":  [11.0, 12.5],
                            "volume": [1000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let bars = parse_fixture(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].open, 12.5); // missing open takes close
        assert_eq!(bars[1].volume, 0); // missing volume becomes 0
    }

    #[test]
    fn all_null_rows_are_skipped() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [1704153600, 1704240000],
                    "indicators": {
                        "quote": [{
                            "open":   [10.0, null],
                            "high":   [12.0, null],
                            "low":    [9.0,  null],
                            "close":  [11.0, null],
                            "volume": [1000, null]
                        }]
                    }
                }],
                "error": null
            }
        }"#;

        let bars = parse_fixture(json).unwrap();
        assert_eq!(bars.len(), 1);
    }

    #[test]
    fn unknown_symbol_maps_to_symbol_not_found() {
        let json = r#"{
            "chart": {
                "result": null,
                "error": {"code": "Not Found", "description": "No data found"}
            }
        }"#;
        assert!(matches!(
            parse_fixture(json),
            Err(DataError::SymbolNotFound { .. })
        ));
    }

    #[test]
    fn empty_series_is_an_error() {
        let json = r#"{
            "chart": {
                "result": [{
                    "timestamp": [],
                    "indicators": {"quote": [{
                        "open": [], "high": [], "low": [], "close": [], "volume": []
                    }]}
                }],
                "error": null
            }
        }"#;
        assert!(matches!(
            parse_fixture(json),
            Err(DataError::EmptyResponse { .. })
        ));
    }

    #[test]
    fn url_shapes() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let url = YahooQuotes::range_url("PETR4.SA", start, end);
        assert!(url.contains("/PETR4.SA?period1="));
        assert!(url.ends_with("&interval=1d"));

        let url = YahooQuotes::lookback_url("AAPL", "1y");
        assert!(url.contains("/AAPL?range=1y&interval=1d"));
    }
}
