//! Monthly aggregation of a daily price series.
//!
//! One summary record per calendar month present in the series, plus a
//! frequency table of which day-of-month tends to print the monthly low.

use crate::domain::Bar;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary statistics for one calendar month of one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub max_price: f64,
    pub max_price_date: NaiveDate,
    pub min_price: f64,
    pub min_price_date: NaiveDate,
    pub mean_close: f64,
}

impl MonthlySummary {
    /// "2024-03" style key for display and export.
    pub fn month_key(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// How often a given day-of-month (1-31) was the date of a monthly low.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayFrequency {
    pub day: u32,
    pub count: u32,
}

/// Compute one summary per distinct (year, month) in the series,
/// ordered chronologically.
///
/// `max_price` is the maximum of `high` within the month, `min_price`
/// the minimum of `low`; ties keep the first occurrence by date.
/// NaN cells are skipped rather than poisoning the month.
pub fn monthly_summaries(bars: &[Bar]) -> Vec<MonthlySummary> {
    let mut groups: BTreeMap<(i32, u32), Vec<&Bar>> = BTreeMap::new();
    for bar in bars {
        groups
            .entry((bar.date.year(), bar.date.month()))
            .or_default()
            .push(bar);
    }

    groups
        .into_iter()
        .filter_map(|((year, month), group)| summarize_group(year, month, &group))
        .collect()
}

fn summarize_group(year: i32, month: u32, group: &[&Bar]) -> Option<MonthlySummary> {
    let mut max: Option<(&Bar, f64)> = None;
    let mut min: Option<(&Bar, f64)> = None;
    let mut close_sum = 0.0;
    let mut close_count = 0usize;

    for bar in group {
        if !bar.high.is_nan() && max.map_or(true, |(_, best)| bar.high > best) {
            max = Some((bar, bar.high));
        }
        if !bar.low.is_nan() && min.map_or(true, |(_, best)| bar.low < best) {
            min = Some((bar, bar.low));
        }
        if !bar.close.is_nan() {
            close_sum += bar.close;
            close_count += 1;
        }
    }

    let (max_bar, max_price) = max?;
    let (min_bar, min_price) = min?;

    Some(MonthlySummary {
        year,
        month,
        max_price,
        max_price_date: max_bar.date,
        min_price,
        min_price_date: min_bar.date,
        mean_close: if close_count > 0 {
            close_sum / close_count as f64
        } else {
            f64::NAN
        },
    })
}

/// Count, across all months, which day-of-month carried the monthly low.
/// Days that never occur are omitted.
pub fn min_day_frequency(summaries: &[MonthlySummary]) -> Vec<DayFrequency> {
    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for summary in summaries {
        *counts.entry(summary.min_price_date.day()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(day, count)| DayFrequency { day, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: NaiveDate, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            date,
            open: close,
            high,
            low,
            close,
            volume: 1000,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn single_month_extremes() {
        // highs [10,12,9], lows [5,4,6] on days 1..3
        let bars = vec![
            bar(day(2024, 3, 1), 10.0, 5.0, 7.0),
            bar(day(2024, 3, 2), 12.0, 4.0, 8.0),
            bar(day(2024, 3, 3), 9.0, 6.0, 9.0),
        ];
        let summaries = monthly_summaries(&bars);
        assert_eq!(summaries.len(), 1);

        let s = &summaries[0];
        assert_eq!(s.max_price, 12.0);
        assert_eq!(s.max_price_date, day(2024, 3, 2));
        assert_eq!(s.min_price, 4.0);
        assert_eq!(s.min_price_date, day(2024, 3, 2));
        assert!((s.mean_close - 8.0).abs() < 1e-12);

        let freq = min_day_frequency(&summaries);
        assert_eq!(freq, vec![DayFrequency { day: 2, count: 1 }]);
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let bars = vec![
            bar(day(2024, 3, 1), 12.0, 4.0, 7.0),
            bar(day(2024, 3, 2), 12.0, 4.0, 8.0),
        ];
        let s = &monthly_summaries(&bars)[0];
        assert_eq!(s.max_price_date, day(2024, 3, 1));
        assert_eq!(s.min_price_date, day(2024, 3, 1));
    }

    #[test]
    fn months_are_chronological_across_years() {
        let bars = vec![
            bar(day(2024, 1, 10), 10.0, 5.0, 7.0),
            bar(day(2023, 12, 20), 11.0, 6.0, 8.0),
        ];
        let summaries = monthly_summaries(&bars);
        assert_eq!(summaries.len(), 2);
        assert_eq!((summaries[0].year, summaries[0].month), (2023, 12));
        assert_eq!((summaries[1].year, summaries[1].month), (2024, 1));
        assert_eq!(summaries[0].month_key(), "2023-12");
    }

    #[test]
    fn nan_cells_are_skipped() {
        let bars = vec![
            bar(day(2024, 3, 1), f64::NAN, 5.0, 7.0),
            bar(day(2024, 3, 2), 12.0, f64::NAN, f64::NAN),
        ];
        let s = &monthly_summaries(&bars)[0];
        assert_eq!(s.max_price, 12.0);
        assert_eq!(s.min_price, 5.0);
        assert!((s.mean_close - 7.0).abs() < 1e-12);
    }

    #[test]
    fn day_frequency_accumulates_over_months() {
        let bars = vec![
            bar(day(2024, 1, 5), 10.0, 4.0, 7.0),
            bar(day(2024, 2, 5), 10.0, 4.0, 7.0),
            bar(day(2024, 3, 9), 10.0, 4.0, 7.0),
        ];
        let freq = min_day_frequency(&monthly_summaries(&bars));
        assert_eq!(
            freq,
            vec![
                DayFrequency { day: 5, count: 2 },
                DayFrequency { day: 9, count: 1 },
            ]
        );
    }
}
