//! B3 investor-flow table extraction.
//!
//! The flow page publishes one HTML table of daily capital flows per
//! investor category (foreign, institutional, individual, ...). The first
//! column is a day-first date; "Total" and "Variação" columns are page
//! metadata, not categories. Cell values are rendered in millions of BRL;
//! the extractor keeps the source scale (see [`MILLIONS_SCALE`]) and
//! leaves the x1e6 interpretation to the consuming layer.

use crate::parse::parse_value;
use chrono::NaiveDate;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Multiplier that converts extracted flow values into absolute BRL.
pub const MILLIONS_SCALE: f64 = 1e6;

/// Default source page for the daily flow table.
pub const DEFAULT_FLOW_URL: &str = "https://www.dadosdemercado.com.br/fluxo";

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("network unreachable: {0}")]
    Network(String),

    #[error("flow page returned HTTP {0}")]
    HttpStatus(u16),

    #[error("source format changed: no table in document")]
    NoTable,

    #[error("source format changed: {0}")]
    FormatChanged(String),
}

/// Daily flow values for one date, parallel to `FlowTable::categories`.
/// A `None` cell is a value the page rendered as missing or unparseable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

/// Structured flow table: investor categories plus rows sorted ascending
/// by date. `skipped_rows` counts body rows dropped during extraction
/// (width mismatch, unparseable date) so callers can report them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowTable {
    pub date_header: String,
    pub categories: Vec<String>,
    pub rows: Vec<FlowRecord>,
    pub skipped_rows: usize,
}

impl FlowTable {
    /// Running sum per category in date order. Missing cells contribute
    /// nothing and stay missing in the output.
    pub fn cumulative(&self) -> FlowTable {
        let mut totals = vec![0.0f64; self.categories.len()];
        let rows = self
            .rows
            .iter()
            .map(|row| FlowRecord {
                date: row.date,
                values: row
                    .values
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| {
                        cell.map(|v| {
                            totals[i] += v;
                            totals[i]
                        })
                    })
                    .collect(),
            })
            .collect();

        FlowTable {
            date_header: self.date_header.clone(),
            categories: self.categories.clone(),
            rows,
            skipped_rows: self.skipped_rows,
        }
    }

    /// Categories ranked by the value of the final row, descending.
    /// Intended for cumulative tables ("who added / withdrew the most").
    pub fn latest_ranking(&self) -> Vec<(String, f64)> {
        let Some(last) = self.rows.last() else {
            return Vec::new();
        };
        let mut ranked: Vec<(String, f64)> = self
            .categories
            .iter()
            .zip(&last.values)
            .filter_map(|(cat, cell)| cell.map(|v| (cat.clone(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Fetch the flow page HTML. Single attempt; network failure and
/// non-success status are surfaced, never retried.
pub fn fetch_flow_page(url: &str) -> Result<String, FlowError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(15))
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
        .build()
        .expect("failed to build HTTP client");

    let resp = client
        .get(url)
        .send()
        .map_err(|e| FlowError::Network(e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(FlowError::HttpStatus(status.as_u16()));
    }

    resp.text().map_err(|e| FlowError::Network(e.to_string()))
}

/// Extract the investor-flow table from an HTML document.
///
/// The first `<table>` is the data table; its header row names the date
/// column first and the investor categories after it. Rows whose date
/// cell does not parse day-first, or whose width does not match the
/// header, are dropped and counted in `skipped_rows`; every other cell
/// goes through the value parser and degrades to `None` on failure.
pub fn extract_flow_table(html: &str) -> Result<FlowTable, FlowError> {
    let document = Html::parse_document(html);
    let table_sel = Selector::parse("table").expect("static selector");
    let tr_sel = Selector::parse("tr").expect("static selector");
    let th_sel = Selector::parse("th").expect("static selector");
    let td_sel = Selector::parse("td").expect("static selector");

    let table = document.select(&table_sel).next().ok_or(FlowError::NoTable)?;
    let rows: Vec<_> = table.select(&tr_sel).collect();

    // Header: <th> cells of the first row, falling back to its <td>s.
    let header_row = rows
        .first()
        .ok_or_else(|| FlowError::FormatChanged("table has no rows".into()))?;
    let mut header: Vec<String> = header_row.select(&th_sel).map(cell_text).collect();
    let mut body_rows = &rows[1..];
    if header.is_empty() {
        header = header_row.select(&td_sel).map(cell_text).collect();
    }
    if header.len() < 2 {
        return Err(FlowError::FormatChanged(
            "header row has no date column and categories".into(),
        ));
    }
    // Some pages repeat the header as the first body row.
    if let Some(first) = body_rows.first() {
        let texts: Vec<String> = first.select(&td_sel).map(cell_text).collect();
        if texts == header {
            body_rows = &body_rows[1..];
        }
    }

    let date_header = header[0].clone();
    let category_indices: Vec<usize> = (1..header.len())
        .filter(|&i| !is_metadata_column(&header[i]))
        .collect();
    let categories: Vec<String> = category_indices.iter().map(|&i| header[i].clone()).collect();

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;
    for row in body_rows {
        let cells: Vec<String> = row.select(&td_sel).map(cell_text).collect();
        if cells.len() != header.len() {
            skipped_rows += 1; // row width mismatch: partial results stay usable
            continue;
        }
        let Some(date) = parse_dayfirst(&cells[0]) else {
            skipped_rows += 1; // unparseable date: drop the row
            continue;
        };
        let values = category_indices
            .iter()
            .map(|&i| parse_value(&cells[i]))
            .collect();
        records.push(FlowRecord { date, values });
    }

    if records.is_empty() {
        return Err(FlowError::FormatChanged(
            "no rows with parseable dates".into(),
        ));
    }

    records.sort_by_key(|r| r.date);
    Ok(FlowTable {
        date_header,
        categories,
        rows: records,
        skipped_rows,
    })
}

fn cell_text(el: scraper::ElementRef<'_>) -> String {
    el.text()
        .collect::<Vec<_>>()
        .join("")
        .replace('\u{a0}', " ")
        .trim()
        .to_string()
}

/// "Total" and "Variação" style columns are metadata, not categories.
fn is_metadata_column(header: &str) -> bool {
    let lower = header.to_lowercase();
    lower.contains("total") || lower.contains("variaç") || lower.contains("variac")
}

fn parse_dayfirst(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%y"))
        .ok()
}
