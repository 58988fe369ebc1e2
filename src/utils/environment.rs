use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Get the messaging client's data directory (~/.purple)
pub fn get_purple_dir() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".purple"))
}
