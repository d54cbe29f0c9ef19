//! Column normalization of heterogeneous quote responses.

use super::schema::{CanonicalSchema, CANONICAL_COLUMNS};
use crate::domain::{is_ordered_series, Bar};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::HashSet;

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("mandatory column missing after normalization: {0}")]
    MissingColumn(String),

    #[error("unparseable date at row {row}: {value:?}")]
    InvalidDate { row: usize, value: String },

    #[error("duplicate date in series: {0}")]
    DuplicateDate(NaiveDate),

    #[error("table operation failed: {0}")]
    Polars(#[from] PolarsError),
}

/// Map a raw tabular response onto the canonical column set.
///
/// Accepts already-canonical frames (any capitalization) and flattened
/// composite headers like "Close_PETR4" where one underscore-separated
/// component is a canonical field name. The instrument-symbol component
/// is dropped. Missing `volume` is synthesized as zeros, missing
/// open/high/low as a copy of `close`. `date` and `close` are mandatory.
///
/// The output has exactly the six canonical columns in fixed order with
/// row order preserved, and the operation is idempotent.
pub fn normalize(mut df: DataFrame) -> Result<DataFrame, NormalizeError> {
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();
    let mut claimed: HashSet<&'static str> = HashSet::new();

    // Exact matches first (case-insensitive), so "Close" beats "Close_XYZ"
    // when both are present.
    for name in &names {
        if let Some(canon) = exact_canonical(name) {
            if claimed.insert(canon) && name != canon {
                df.rename(name, canon.into())?;
            }
        }
    }

    // Then composite headers, claiming only still-unmapped fields.
    for name in &names {
        if exact_canonical(name).is_some() {
            continue;
        }
        if let Some(canon) = composite_canonical(name) {
            if claimed.insert(canon) {
                df.rename(name, canon.into())?;
            }
        }
    }

    for mandatory in CanonicalSchema::mandatory() {
        if df.column(mandatory).is_err() {
            return Err(NormalizeError::MissingColumn(mandatory.to_string()));
        }
    }

    if df.column("volume").is_err() {
        let zeros = Series::new("volume".into(), vec![0.0f64; df.height()]);
        df.with_column(zeros)?;
    }

    for price in CanonicalSchema::synthesizable_prices() {
        if df.column(price).is_err() {
            let mut copy = df.column("close")?.as_materialized_series().clone();
            copy.rename(price.into());
            df.with_column(copy)?;
        }
    }

    Ok(df.select(CANONICAL_COLUMNS)?)
}

/// Canonical field for an exact (case-insensitive) column name.
fn exact_canonical(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    CANONICAL_COLUMNS.iter().find(|c| **c == lower).copied()
}

/// Canonical field for a flattened composite header ("Close_PETR4").
fn composite_canonical(name: &str) -> Option<&'static str> {
    if !name.contains('_') {
        return None;
    }
    name.split('_').find_map(exact_canonical)
}

/// Convert a canonical table into the domain bar series.
///
/// Cell-level gaps follow the same policy as column-level gaps: a null
/// open/high/low takes the row's close, a null volume becomes 0. A null
/// close yields a NaN close. Dates accept ISO and day-first forms; an
/// unparseable date is a fatal input error since `date` is mandatory.
///
/// The output is sorted ascending by date. A price series holds exactly
/// one bar per date, so a duplicate date is rejected.
pub fn to_bars(df: &DataFrame) -> Result<Vec<Bar>, NormalizeError> {
    let date_col = df.column("date")?.cast(&DataType::String)?;
    let dates = date_col.str()?;
    let open_col = df.column("open")?.cast(&DataType::Float64)?;
    let opens = open_col.f64()?;
    let high_col = df.column("high")?.cast(&DataType::Float64)?;
    let highs = high_col.f64()?;
    let low_col = df.column("low")?.cast(&DataType::Float64)?;
    let lows = low_col.f64()?;
    let close_col = df.column("close")?.cast(&DataType::Float64)?;
    let closes = close_col.f64()?;
    let volume_col = df.column("volume")?.cast(&DataType::Float64)?;
    let volumes = volume_col.f64()?;

    let mut bars = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let raw_date = dates.get(row).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| NormalizeError::InvalidDate {
            row,
            value: raw_date.to_string(),
        })?;

        let close = closes.get(row).unwrap_or(f64::NAN);
        bars.push(Bar {
            date,
            open: opens.get(row).unwrap_or(close),
            high: highs.get(row).unwrap_or(close),
            low: lows.get(row).unwrap_or(close),
            close,
            volume: volumes.get(row).unwrap_or(0.0) as u64,
        });
    }

    bars.sort_by_key(|b| b.date);
    if !is_ordered_series(&bars) {
        let date = bars
            .windows(2)
            .find(|w| w[0].date == w[1].date)
            .map(|w| w[0].date)
            .expect("unsorted after sort implies an adjacent duplicate");
        return Err(NormalizeError::DuplicateDate(date));
    }
    Ok(bars)
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%Y"))
        .or_else(|_| NaiveDate::parse_from_str(value, "%d/%m/%y"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite_frame() -> DataFrame {
        df!(
            "Date_XYZ" => &["2024-01-02", "2024-01-03"],
            "High_XYZ" => &[12.0, 13.0],
            "Low_XYZ" => &[9.0, 10.0],
            "Close_XYZ" => &[10.0, 11.0],
        )
        .unwrap()
    }

    #[test]
    fn composite_headers_collapse() {
        let out = normalize(composite_frame()).unwrap();
        assert!(CanonicalSchema::is_canonical(&out));

        let highs = out.column("high").unwrap().f64().unwrap();
        assert_eq!(highs.get(0), Some(12.0));
        assert_eq!(highs.get(1), Some(13.0));
    }

    #[test]
    fn missing_volume_is_zeros_and_open_copies_close() {
        let out = normalize(composite_frame()).unwrap();

        let volumes = out.column("volume").unwrap().f64().unwrap();
        assert_eq!(volumes.get(0), Some(0.0));

        let opens = out.column("open").unwrap().f64().unwrap();
        let closes = out.column("close").unwrap().f64().unwrap();
        assert_eq!(opens.get(0), closes.get(0));
    }

    #[test]
    fn capitalized_canonical_names_are_lowered() {
        let df = df!(
            "Date" => &["2024-01-02"],
            "Open" => &[9.5],
            "High" => &[12.0],
            "Low" => &[9.0],
            "Close" => &[10.0],
            "Volume" => &[1000.0],
        )
        .unwrap();
        let out = normalize(df).unwrap();
        assert!(CanonicalSchema::is_canonical(&out));
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize(composite_frame()).unwrap();
        let twice = normalize(once.clone()).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn missing_close_is_fatal() {
        let df = df!("Date" => &["2024-01-02"], "Open" => &[1.0]).unwrap();
        let err = normalize(df).unwrap_err();
        assert!(matches!(err, NormalizeError::MissingColumn(c) if c == "close"));
    }

    #[test]
    fn exact_match_beats_composite() {
        let df = df!(
            "date" => &["2024-01-02"],
            "close" => &[10.0],
            "Close_XYZ" => &[99.0],
        )
        .unwrap();
        let out = normalize(df).unwrap();
        let closes = out.column("close").unwrap().f64().unwrap();
        assert_eq!(closes.get(0), Some(10.0));
    }

    #[test]
    fn to_bars_substitutes_cell_gaps() {
        let df = df!(
            "date" => &["2024-01-02"],
            "open" => &[None::<f64>],
            "high" => &[Some(12.0)],
            "low" => &[Some(9.0)],
            "close" => &[Some(10.0)],
            "volume" => &[None::<f64>],
        )
        .unwrap();
        let bars = to_bars(&df).unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].open, 10.0);
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn to_bars_accepts_dayfirst_dates() {
        let df = normalize(
            df!(
                "date" => &["02/01/2024"],
                "close" => &[10.0],
            )
            .unwrap(),
        )
        .unwrap();
        let bars = to_bars(&df).unwrap();
        assert_eq!(
            bars[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()
        );
    }

    #[test]
    fn to_bars_sorts_by_date() {
        let df = normalize(
            df!(
                "date" => &["2024-01-03", "2024-01-02"],
                "close" => &[11.0, 10.0],
            )
            .unwrap(),
        )
        .unwrap();
        let bars = to_bars(&df).unwrap();
        assert!(is_ordered_series(&bars));
        assert_eq!(bars[0].close, 10.0);
        assert_eq!(bars[1].close, 11.0);
    }

    #[test]
    fn to_bars_rejects_duplicate_dates() {
        let df = normalize(
            df!(
                "date" => &["2024-01-02", "2024-01-02"],
                "close" => &[10.0, 11.0],
            )
            .unwrap(),
        )
        .unwrap();
        let err = to_bars(&df).unwrap_err();
        assert!(matches!(err, NormalizeError::DuplicateDate(d)
            if d == NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()));
    }

    #[test]
    fn to_bars_rejects_garbage_dates() {
        let df = normalize(
            df!(
                "date" => &["not-a-date"],
                "close" => &[10.0],
            )
            .unwrap(),
        )
        .unwrap();
        assert!(matches!(
            to_bars(&df),
            Err(NormalizeError::InvalidDate { row: 0, .. })
        ));
    }
}
