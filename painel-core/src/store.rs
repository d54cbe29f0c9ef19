//! Persistent watchlist of saved tickers.
//!
//! The store is a small CSV file with `Empresa`, `Ticker` and
//! `Exchange` columns, kept column-compatible with files written by
//! earlier versions of the dashboard. Every mutation rewrites the file
//! in full; at this size there is nothing to gain from appends.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read ticker store {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write ticker store {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed ticker store {path}: {source}")]
    Malformed { path: PathBuf, source: csv::Error },
}

/// One saved ticker. Field names map to the legacy CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerEntry {
    #[serde(rename = "Empresa")]
    pub company: String,
    #[serde(rename = "Ticker")]
    pub ticker: String,
    #[serde(rename = "Exchange")]
    pub exchange: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Duplicate,
}

#[derive(Debug)]
pub struct TickerStore {
    path: PathBuf,
    entries: Vec<TickerEntry>,
}

impl TickerStore {
    /// Load the store from disk. A missing file is an empty store, not
    /// an error; a present but unreadable or malformed file is.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                entries: Vec::new(),
            });
        }

        let raw = fs::read(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;

        let mut reader = csv::Reader::from_reader(raw.as_slice());
        let mut entries = Vec::new();
        for record in reader.deserialize() {
            let entry: TickerEntry = record.map_err(|source| StoreError::Malformed {
                path: path.clone(),
                source,
            })?;
            entries.push(entry);
        }

        Ok(Self { path, entries })
    }

    pub fn entries(&self) -> &[TickerEntry] {
        &self.entries
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add an entry and persist. Duplicate detection is by exact
    /// ticker symbol. On a persist failure the entry stays in memory
    /// and the error is returned; the next successful mutation writes
    /// it out.
    pub fn add(&mut self, entry: TickerEntry) -> Result<AddOutcome, StoreError> {
        if self.contains(&entry.ticker) {
            return Ok(AddOutcome::Duplicate);
        }
        self.entries.push(entry);
        self.persist()?;
        Ok(AddOutcome::Added)
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.entries.iter().any(|e| e.ticker == ticker)
    }

    /// Rewrite the backing file from the in-memory entries.
    fn persist(&self) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for entry in &self.entries {
            writer
                .serialize(entry)
                .map_err(|source| StoreError::Malformed {
                    path: self.path.clone(),
                    source,
                })?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| StoreError::Write {
                path: self.path.clone(),
                source: std::io::Error::other(e.to_string()),
            })?;

        fs::write(&self.path, bytes).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
