//! Tabular quote-response handling.
//!
//! Quote providers and CSV dumps disagree on column naming: flattened
//! two-level headers ("Close_PETR4"), capitalized canonical names, missing
//! volume columns. This module maps all of them onto one canonical table
//! shape and converts it into the domain `Bar` series.

pub mod normalize;
pub mod schema;

pub use normalize::{normalize, to_bars, NormalizeError};
pub use schema::{CanonicalSchema, CANONICAL_COLUMNS};

use polars::prelude::*;
use std::path::Path;

/// Read a delimited file into a raw DataFrame without touching its shape.
///
/// All columns are read as strings (schema inference disabled) so that
/// normalization and per-cell parsing stay in one place.
pub fn read_csv(path: &Path) -> Result<DataFrame, NormalizeError> {
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .finish()?
        .collect()?;
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_csv_keeps_raw_headers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.csv");
        std::fs::write(&path, "Date_XYZ,Close_XYZ\n2024-01-02,10.5\n").unwrap();

        let df = read_csv(&path).unwrap();
        assert_eq!(df.height(), 1);
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(names, vec!["Date_XYZ", "Close_XYZ"]);
    }
}
