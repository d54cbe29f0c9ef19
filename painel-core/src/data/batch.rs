//! Sequential multi-symbol fetch with progress reporting.
//!
//! Symbols are fetched one at a time; a failure for one symbol is
//! recorded and the batch continues, so callers always get every
//! series that could be retrieved.

use super::memo::QuoteCache;
use super::provider::{DataError, FetchProgress, QuoteProvider};
use crate::domain::Bar;
use chrono::NaiveDate;

/// Outcome of a multi-symbol fetch.
#[derive(Debug, Default)]
pub struct FetchSummary {
    /// Successfully fetched series, in request order.
    pub series: Vec<(String, Vec<Bar>)>,
    /// Symbols that failed, with the error that stopped them.
    pub failures: Vec<(String, DataError)>,
}

impl FetchSummary {
    pub fn succeeded(&self) -> usize {
        self.series.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Fetch daily bars for every symbol over the same date range.
///
/// Requests go through the cache, so symbols already fetched this
/// session cost nothing.
pub fn fetch_many(
    provider: &dyn QuoteProvider,
    cache: &mut QuoteCache,
    symbols: &[String],
    start: NaiveDate,
    end: NaiveDate,
    progress: &dyn FetchProgress,
) -> FetchSummary {
    let total = symbols.len();
    let mut summary = FetchSummary::default();

    for (index, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, index, total);
        match cache.get_or_fetch(provider, symbol, start, end) {
            Ok(bars) => {
                summary.series.push((symbol.clone(), bars.to_vec()));
                progress.on_complete(symbol, index, total, &Ok(()));
            }
            Err(e) => {
                progress.on_complete(symbol, index, total, &Err(e.clone()));
                summary.failures.push((symbol.clone(), e));
            }
        }
    }

    progress.on_batch_complete(summary.succeeded(), summary.failed(), total);
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::SilentProgress;

    struct FlakyProvider;

    impl QuoteProvider for FlakyProvider {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch(
            &self,
            symbol: &str,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Vec<Bar>, DataError> {
            if symbol == "BAD" {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            Ok(vec![Bar {
                date: start,
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: 10,
            }])
        }
    }

    #[test]
    fn batch_continues_past_failures() {
        let symbols: Vec<String> = ["AAA", "BAD", "CCC"].iter().map(|s| s.to_string()).collect();
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let mut cache = QuoteCache::new();
        let summary = fetch_many(
            &FlakyProvider,
            &mut cache,
            &symbols,
            start,
            end,
            &SilentProgress,
        );

        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.series[0].0, "AAA");
        assert_eq!(summary.series[1].0, "CCC");
        assert_eq!(summary.failures[0].0, "BAD");
        assert!(matches!(
            summary.failures[0].1,
            DataError::SymbolNotFound { .. }
        ));
    }

    #[test]
    fn successes_populate_the_cache() {
        let symbols = vec!["AAA".to_string(), "BAD".to_string()];
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();

        let mut cache = QuoteCache::new();
        fetch_many(
            &FlakyProvider,
            &mut cache,
            &symbols,
            start,
            end,
            &SilentProgress,
        );

        assert_eq!(cache.len(), 1);
    }
}
