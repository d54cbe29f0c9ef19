//! Rolling volatility of daily returns.
//!
//! Sample standard deviation (ddof = 1) of the fractional day-over-day
//! close return over a trailing window, expressed as a percentage.
//! Lookback: window (the first return is itself undefined).

use super::{close_returns, rolling_std, Indicator};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Volatility {
    window: usize,
    name: String,
}

impl Volatility {
    pub fn new(window: usize) -> Self {
        assert!(window >= 2, "volatility window must be >= 2");
        Self {
            window,
            name: format!("volatility_{window}"),
        }
    }
}

impl Indicator for Volatility {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let returns = close_returns(bars);
        rolling_std(&returns, self.window)
            .into_iter()
            .map(|v| v * 100.0)
            .collect()
    }
}
