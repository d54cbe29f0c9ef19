//! Symbol search against the Yahoo Finance search endpoint.

use super::provider::DataError;
use serde::Deserialize;
use std::time::Duration;

const SEARCH_BASE: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// One symbol returned by a free-text search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub symbol: String,
    pub name: String,
    pub exchange: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    quotes: Vec<SearchQuote>,
}

#[derive(Debug, Deserialize)]
struct SearchQuote {
    symbol: Option<String>,
    shortname: Option<String>,
    longname: Option<String>,
    #[serde(default)]
    exchange: Option<String>,
}

/// Search for symbols matching a free-text query (company name or
/// partial ticker). An empty result is a valid answer, not an error.
pub fn search_symbols(query: &str, max_results: usize) -> Result<Vec<SearchHit>, DataError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .expect("failed to build HTTP client");

    let resp = client
        .get(SEARCH_BASE)
        .query(&[
            ("q", query),
            ("quotesCount", &max_results.to_string()),
            ("newsCount", "0"),
        ])
        .send()
        .map_err(|e| DataError::NetworkUnreachable(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DataError::HttpStatus {
            status: status.as_u16(),
            symbol: query.to_string(),
        });
    }

    let parsed: SearchResponse = resp.json().map_err(|e| {
        DataError::ResponseFormatChanged(format!("failed to parse search response: {e}"))
    })?;

    Ok(hits_from(parsed, max_results))
}

fn hits_from(resp: SearchResponse, max_results: usize) -> Vec<SearchHit> {
    resp.quotes
        .into_iter()
        .filter_map(|q| {
            let symbol = q.symbol?;
            let name = q
                .shortname
                .or(q.longname)
                .unwrap_or_else(|| symbol.clone());
            Some(SearchHit {
                symbol,
                name,
                exchange: q.exchange.unwrap_or_default(),
            })
        })
        .take(max_results)
        .collect()
}
