//! Session-scoped quote memoization.
//!
//! Keyed on (symbol, start, end); only successful fetches are stored,
//! so a failed request is re-attempted the next time the same key is
//! asked for. The cache lives for the process, there is no eviction.

use super::provider::{DataError, QuoteProvider};
use crate::domain::Bar;
use chrono::NaiveDate;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct QuoteCache {
    entries: HashMap<(String, NaiveDate, NaiveDate), Vec<Bar>>,
}

impl QuoteCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return cached bars for the key, fetching from the provider on a
    /// miss. Errors are propagated and leave the cache untouched.
    pub fn get_or_fetch(
        &mut self,
        provider: &dyn QuoteProvider,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<&[Bar], DataError> {
        let key = (symbol.to_string(), start, end);
        match self.entries.entry(key) {
            Entry::Occupied(e) => Ok(e.into_mut().as_slice()),
            Entry::Vacant(e) => {
                let bars = provider.fetch(symbol, start, end)?;
                Ok(e.insert(bars).as_slice())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
