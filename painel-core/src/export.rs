//! CSV export for every table the pipeline produces.
//!
//! All writers render into a `String` so callers decide whether the
//! destination is a file, stdout or an HTTP response. Undefined numeric
//! cells (NaN, missing flow values) export as empty fields, never as a
//! literal "NaN".

use crate::domain::Bar;
use crate::flow::FlowTable;
use crate::indicators::IndicatorRow;
use crate::monthly::{DayFrequency, MonthlySummary};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv serialization failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, ExportError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))?;
    Ok(String::from_utf8(bytes)?)
}

/// Render a float cell, empty when undefined.
fn num(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn opt_num(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Raw daily bars.
pub fn bars_csv(bars: &[Bar]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["date", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        writer.write_record([
            bar.date.to_string(),
            num(bar.open),
            num(bar.high),
            num(bar.low),
            num(bar.close),
            bar.volume.to_string(),
        ])?;
    }
    finish(writer)
}

/// Per-month extremes and mean close.
pub fn monthly_csv(summaries: &[MonthlySummary]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "month",
        "max_price",
        "max_price_date",
        "min_price",
        "min_price_date",
        "mean_close",
    ])?;
    for s in summaries {
        writer.write_record([
            s.month_key(),
            num(s.max_price),
            s.max_price_date.to_string(),
            num(s.min_price),
            s.min_price_date.to_string(),
            num(s.mean_close),
        ])?;
    }
    finish(writer)
}

/// How often each day-of-month carried the monthly minimum.
pub fn day_frequency_csv(frequencies: &[DayFrequency]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["day", "count"])?;
    for f in frequencies {
        writer.write_record([f.day.to_string(), f.count.to_string()])?;
    }
    finish(writer)
}

/// Full indicator table; warm-up cells export as empty.
pub fn indicator_csv(rows: &[IndicatorRow]) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date",
        "open",
        "high",
        "low",
        "close",
        "volume",
        "ma_short",
        "ma_long",
        "rsi",
        "macd",
        "signal",
        "volatility",
        "momentum",
    ])?;
    for row in rows {
        writer.write_record([
            row.date.to_string(),
            num(row.open),
            num(row.high),
            num(row.low),
            num(row.close),
            row.volume.to_string(),
            num(row.ma_short),
            num(row.ma_long),
            num(row.rsi),
            num(row.macd),
            num(row.signal),
            num(row.volatility),
            num(row.momentum),
        ])?;
    }
    finish(writer)
}

/// Flow table, one column per investor category. Works for both the
/// daily table and its cumulative form.
pub fn flow_csv(table: &FlowTable) -> Result<String, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = vec!["date".to_string()];
    header.extend(table.categories.iter().cloned());
    writer.write_record(&header)?;

    for row in &table.rows {
        let mut record = vec![row.date.to_string()];
        record.extend(row.values.iter().map(|v| opt_num(*v)));
        writer.write_record(&record)?;
    }
    finish(writer)
}
