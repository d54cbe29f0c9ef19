//! Painel Core — market-data pipeline behind the dashboard.
//!
//! This crate contains everything between the raw data sources and the
//! presentation layer:
//! - Domain types (daily OHLCV bars)
//! - Free-text monetary value parsing (BR/EN grouping, magnitude suffixes)
//! - Column normalization of heterogeneous tabular quote responses
//! - Monthly aggregation (min/max summaries, day-of-month frequency)
//! - Rolling technical indicators (SMA, RSI, MACD, volatility, momentum)
//! - B3 investor-flow HTML table extraction with cumulative views
//! - Quote/search providers, a session memo cache, and the ticker store
//! - Delimited export of every derived table
//!
//! Rendering, navigation, and chart styling live elsewhere; callers feed
//! symbols, date ranges, and payloads in and get canonical tables out.

pub mod data;
pub mod domain;
pub mod export;
pub mod flow;
pub mod indicators;
pub mod monthly;
pub mod parse;
pub mod store;
pub mod table;
