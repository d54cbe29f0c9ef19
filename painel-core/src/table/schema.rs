//! Canonical column set for normalized quote tables.

use polars::prelude::*;

/// The canonical columns, in fixed output order.
pub const CANONICAL_COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Canonical schema helper.
pub struct CanonicalSchema;

impl CanonicalSchema {
    /// Columns that must be present in the raw input (cannot be synthesized).
    pub fn mandatory() -> [&'static str; 2] {
        ["date", "close"]
    }

    /// Price columns that may be synthesized from `close` when absent.
    pub fn synthesizable_prices() -> [&'static str; 3] {
        ["open", "high", "low"]
    }

    /// Check a DataFrame has exactly the canonical columns in order.
    pub fn is_canonical(df: &DataFrame) -> bool {
        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();
        names == CANONICAL_COLUMNS
    }
}
