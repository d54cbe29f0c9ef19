//! Bar — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar for a single instrument.
///
/// A price series is a `Vec<Bar>` ordered by date ascending with no
/// duplicate dates. After normalization every price field is present:
/// a missing open/high/low is substituted with `close`, a missing
/// volume with 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Check that a slice of bars forms a valid price series:
/// dates strictly ascending (which also rules out duplicates).
pub fn is_ordered_series(bars: &[Bar]) -> bool {
    bars.windows(2).all(|w| w[0].date < w[1].date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000,
        }
    }

    #[test]
    fn series_ordering() {
        let mut bars = vec![sample_bar(), sample_bar()];
        assert!(!is_ordered_series(&bars)); // duplicate date
        bars[1].date = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        assert!(is_ordered_series(&bars));
    }

    #[test]
    fn bar_serialization_roundtrip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let deser: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(bar, deser);
    }
}
