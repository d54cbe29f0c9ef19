//! MACD and its signal line.
//!
//! MACD = EMA(close, span 12) - EMA(close, span 26)
//! Signal = EMA(MACD, span 9)
//!
//! The EMA here is the recursive smoothing with alpha = 2/(span+1),
//! seeded by the first observed value (no bias adjustment), so both
//! series are defined from row 0. Missing inputs carry the previous
//! smoothed value forward and stay undefined at that row.

use super::Indicator;
use crate::domain::Bar;

/// Exponential smoothing of a raw series, seeded by the first value.
pub fn ewm_span(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = vec![f64::NAN; values.len()];
    let mut prev: Option<f64> = None;

    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        let ema = match prev {
            Some(p) => alpha * v + (1.0 - alpha) * p,
            None => v,
        };
        out[i] = ema;
        prev = Some(ema);
    }
    out
}

#[derive(Debug, Clone)]
pub struct Macd {
    short_span: usize,
    long_span: usize,
    name: String,
}

impl Macd {
    pub fn new(short_span: usize, long_span: usize) -> Self {
        assert!(
            short_span >= 1 && long_span > short_span,
            "MACD spans must satisfy 1 <= short < long"
        );
        Self {
            short_span,
            long_span,
            name: format!("macd_{short_span}_{long_span}"),
        }
    }

    /// Conventional 12/26 spans.
    pub fn standard() -> Self {
        Self::new(12, 26)
    }
}

impl Default for Macd {
    fn default() -> Self {
        Self::standard()
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let short = ewm_span(&closes, self.short_span);
        let long = ewm_span(&closes, self.long_span);
        short.iter().zip(&long).map(|(s, l)| s - l).collect()
    }
}

/// EMA of the MACD line (the "Signal" series).
#[derive(Debug, Clone)]
pub struct MacdSignal {
    macd: Macd,
    signal_span: usize,
    name: String,
}

impl MacdSignal {
    pub fn new(short_span: usize, long_span: usize, signal_span: usize) -> Self {
        assert!(signal_span >= 1, "signal span must be >= 1");
        Self {
            macd: Macd::new(short_span, long_span),
            signal_span,
            name: format!("macd_signal_{signal_span}"),
        }
    }

    /// Conventional 12/26/9 spans.
    pub fn standard() -> Self {
        Self::new(12, 26, 9)
    }
}

impl Default for MacdSignal {
    fn default() -> Self {
        Self::standard()
    }
}

impl Indicator for MacdSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        ewm_span(&self.macd.compute(bars), self.signal_span)
    }
}
