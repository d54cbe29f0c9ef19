//! Quote and symbol-search sources, session memoization, and the
//! sequential multi-symbol fetch.

pub mod batch;
pub mod memo;
pub mod provider;
pub mod search;
pub mod yahoo;

pub use batch::{fetch_many, FetchSummary};
pub use memo::QuoteCache;
pub use provider::{DataError, FetchProgress, QuoteProvider, StdoutProgress};
pub use search::{search_symbols, SearchHit};
pub use yahoo::YahooQuotes;
