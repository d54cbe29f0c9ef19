//! Relative Strength Index, dashboard variant.
//!
//! RSI = 100 - 100 / (1 + mean_gain / mean_abs_move) where mean_gain is
//! the rolling mean of positive fractional returns and mean_abs_move the
//! rolling mean of absolute fractional returns over the same window.
//!
//! NOTE: the denominator is the mean of ABSOLUTE moves, not the
//! conventional Wilder average loss. This matches the formula the
//! dashboard has always charted; it compresses the scale relative to
//! standard RSI (all-gain windows read 50, not 100). IEEE-754 semantics
//! apply: a flat window yields 0/0 = NaN rather than a value.
//!
//! Lookback: period (the first return is undefined).

use super::{close_returns, rolling_mean, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = close_returns(bars);

        let gains: Vec<f64> = returns
            .iter()
            .map(|r| if r.is_nan() { f64::NAN } else { r.max(0.0) })
            .collect();
        let abs_moves: Vec<f64> = returns.iter().map(|r| r.abs()).collect();

        let mean_gain = rolling_mean(&gains, self.period);
        let mean_abs = rolling_mean(&abs_moves, self.period);

        mean_gain
            .iter()
            .zip(&mean_abs)
            .map(|(g, a)| 100.0 - 100.0 / (1.0 + g / a))
            .collect()
    }
}
