//! CLI configuration file handling.
//!
//! An optional TOML file overrides the built-in defaults; every field
//! is optional so a partial file is fine.

use anyhow::{Context, Result};
use painel_core::flow::DEFAULT_FLOW_URL;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path of the saved-tickers CSV file.
    pub store_path: PathBuf,
    /// Source page for the investor-flow table.
    pub flow_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("empresas_salvas.csv"),
            flow_url: DEFAULT_FLOW_URL.to_string(),
        }
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
    }
}
