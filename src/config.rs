//! Viewer preferences, read from `log-viewer.json` in the purple directory.
//!
//! ```json
//! {
//!   "date_format": "%Y-%m-%d %H:%M",
//!   "search_result_limit": 500,
//!   "tick_interval_ms": 100
//! }
//! ```
//!
//! Every field is optional. A missing file means defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

use crate::search::DEFAULT_DATE_FORMAT;

pub const CONFIG_FILENAME: &str = "log-viewer.json";

const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const MAX_TICK_INTERVAL_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// strftime pattern for search result dates
    pub date_format: String,
    /// Stop a search once this many matches are retained; 0 means no limit
    pub search_result_limit: usize,
    /// How long the TUI waits for input when no search is running
    pub tick_interval_ms: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            search_result_limit: 0,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

impl ViewerConfig {
    /// Load `log-viewer.json` from `purple_dir`, or defaults when it does not exist
    pub fn load(purple_dir: &Path) -> Result<Self> {
        let path = purple_dir.join(CONFIG_FILENAME);
        if path.exists() { Self::load_from(&path) } else { Ok(Self::default()) }
    }

    /// Load and validate a config file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, has
    /// unknown fields, or fails [`validate`](Self::validate).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate().with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.date_format.is_empty() {
            bail!("date_format must not be empty");
        }
        if StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error)) {
            bail!("date_format is not a valid strftime pattern: {:?}", self.date_format);
        }
        if self.tick_interval_ms == 0 || self.tick_interval_ms > MAX_TICK_INTERVAL_MS {
            bail!("tick_interval_ms must be between 1 and {}", MAX_TICK_INTERVAL_MS);
        }
        Ok(())
    }

    /// The result limit as an option, `None` meaning unlimited
    pub fn result_limit(&self) -> Option<usize> {
        (self.search_result_limit > 0).then_some(self.search_result_limit)
    }
}
