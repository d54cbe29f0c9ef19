//! Indicator table assembly — one row per input bar with every derived
//! series attached, plus the cross-symbol momentum ranking.

use super::{Indicator, Macd, MacdSignal, Momentum, Rsi, Sma, Volatility};
use crate::domain::Bar;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Fixed RSI window, matching the dashboard's hard-coded 14 bars.
pub const RSI_PERIOD: usize = 14;

/// Fixed volatility window.
pub const VOLATILITY_WINDOW: usize = 20;

/// Tunable windows for the indicator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub short_window: usize,
    pub long_window: usize,
    pub momentum_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            short_window: 20,
            long_window: 50,
            momentum_window: 14,
        }
    }
}

/// A daily bar extended with its derived indicator values.
/// Undefined (warm-up) cells are NaN and export as empty.
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ma_short: f64,
    pub ma_long: f64,
    pub rsi: f64,
    pub macd: f64,
    pub signal: f64,
    pub volatility: f64,
    pub momentum: f64,
}

/// Compute the full indicator table for one price series.
pub fn indicator_table(bars: &[Bar], params: &IndicatorParams) -> Vec<IndicatorRow> {
    let ma_short = Sma::new(params.short_window).compute(bars);
    let ma_long = Sma::new(params.long_window).compute(bars);
    let rsi = Rsi::new(RSI_PERIOD).compute(bars);
    let macd = Macd::standard().compute(bars);
    let signal = MacdSignal::standard().compute(bars);
    let volatility = Volatility::new(VOLATILITY_WINDOW).compute(bars);
    let momentum = Momentum::new(params.momentum_window).compute(bars);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| IndicatorRow {
            date: bar.date,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            volume: bar.volume,
            ma_short: ma_short[i],
            ma_long: ma_long[i],
            rsi: rsi[i],
            macd: macd[i],
            signal: signal[i],
            volatility: volatility[i],
            momentum: momentum[i],
        })
        .collect()
}

/// Rank symbols by their most recent defined momentum value, descending.
///
/// Symbols whose series never produces a defined momentum (too short,
/// all-NaN closes) are left out of the ranking rather than reported as
/// zero.
pub fn rank_latest_momentum(series: &[(String, Vec<Bar>)], window: usize) -> Vec<(String, f64)> {
    let indicator = Momentum::new(window);
    let mut ranked: Vec<(String, f64)> = series
        .iter()
        .filter_map(|(symbol, bars)| {
            let momentum = indicator.compute(bars);
            momentum
                .iter()
                .rev()
                .find(|v| !v.is_nan())
                .map(|v| (symbol.clone(), *v))
        })
        .collect();

    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn table_has_one_row_per_bar() {
        let bars = make_bars(&(1..=60).map(|i| i as f64).collect::<Vec<_>>());
        let rows = indicator_table(&bars, &IndicatorParams::default());
        assert_eq!(rows.len(), 60);

        // Warm-up boundaries per series.
        assert!(rows[18].ma_short.is_nan());
        assert!(!rows[19].ma_short.is_nan());
        assert!(rows[48].ma_long.is_nan());
        assert!(!rows[49].ma_long.is_nan());
        assert!(rows[13].momentum.is_nan());
        assert!(!rows[14].momentum.is_nan());
        assert!(!rows[0].macd.is_nan());
    }

    #[test]
    fn ranking_orders_descending_and_skips_undefined() {
        let up: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let down: Vec<f64> = (0..10).map(|i| 100.0 - i as f64).collect();
        let series = vec![
            ("DOWN".to_string(), make_bars(&down)),
            ("UP".to_string(), make_bars(&up)),
            ("SHORT".to_string(), make_bars(&[1.0, 2.0])),
        ];

        let ranked = rank_latest_momentum(&series, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, "UP");
        assert_eq!(ranked[0].1, 5.0);
        assert_eq!(ranked[1].0, "DOWN");
        assert_eq!(ranked[1].1, -5.0);
    }
}
