//! Rolling technical indicators.
//!
//! Indicators are pure functions: bar history in, numeric series out,
//! same length as the input, `f64::NAN` during warm-up. All windows are
//! counted in available bars, not calendar days, so gapped series are
//! handled without special cases.

pub mod macd;
pub mod momentum;
pub mod rsi;
pub mod sma;
pub mod table;
pub mod volatility;

pub use macd::{ewm_span, Macd, MacdSignal};
pub use momentum::Momentum;
pub use rsi::Rsi;
pub use sma::Sma;
pub use table::{indicator_table, rank_latest_momentum, IndicatorParams, IndicatorRow};
pub use volatility::Volatility;

use crate::domain::Bar;

/// Trait for indicators.
///
/// The first `lookback()` values of `compute` are `f64::NAN`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of bars consumed before the first defined value.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Fractional day-over-day close returns; NaN at index 0 and wherever
/// either endpoint is NaN.
pub(crate) fn close_returns(bars: &[Bar]) -> Vec<f64> {
    let mut out = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        let prev = bars[i - 1].close;
        let curr = bars[i].close;
        if prev.is_nan() || curr.is_nan() || prev == 0.0 {
            out[i] = f64::NAN;
        } else {
            out[i] = curr / prev - 1.0;
        }
    }
    out
}

/// Trailing rolling mean; NaN until the window is full, and NaN whenever
/// the window contains a NaN.
pub(crate) fn rolling_mean(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window == 0 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        out[i] = slice.iter().sum::<f64>() / window as f64;
    }
    out
}

/// Trailing rolling sample standard deviation (ddof = 1), same window
/// semantics as `rolling_mean`.
pub(crate) fn rolling_std(values: &[f64], window: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if window < 2 {
        return out;
    }
    for i in (window - 1)..values.len() {
        let slice = &values[i + 1 - window..=i];
        if slice.iter().any(|v| v.is_nan()) {
            continue;
        }
        let mean = slice.iter().sum::<f64>() / window as f64;
        let var = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (window as f64 - 1.0);
        out[i] = var.sqrt();
    }
    out
}

/// Create synthetic bars from close prices for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
