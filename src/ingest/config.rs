// src/ingest/config.rs
//! Feed list: `feeds = ["https://...", ...]` in TOML.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_FEEDS_PATH: &str = "config/feeds.toml";
pub const ENV_FEEDS_PATH: &str = "FEEDS_PATH";

#[derive(Debug, Deserialize)]
struct FeedsFile {
    #[serde(default)]
    feeds: Vec<String>,
}

/// Parse a feed list. URLs are trimmed; blanks and repeats are dropped, first wins.
pub fn parse_feeds(s: &str) -> Result<Vec<String>> {
    let file: FeedsFile = toml::from_str(s).context("parsing feed list toml")?;
    let mut out: Vec<String> = Vec::with_capacity(file.feeds.len());
    for url in file.feeds {
        let url = url.trim();
        if !url.is_empty() && !out.iter().any(|u| u == url) {
            out.push(url.to_string());
        }
    }
    Ok(out)
}

pub fn load_feeds_from(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading feed list from {}", path.display()))?;
    parse_feeds(&content).with_context(|| format!("feed list {}", path.display()))
}

/// `$FEEDS_PATH` if set (must exist), else `config/feeds.toml` if present, else no feeds.
pub fn load_feeds_default() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_FEEDS_PATH) {
        let path = PathBuf::from(p);
        if !path.exists() {
            bail!("{ENV_FEEDS_PATH} points to non-existent path {}", path.display());
        }
        return load_feeds_from(&path);
    }
    let path = PathBuf::from(DEFAULT_FEEDS_PATH);
    if path.exists() {
        return load_feeds_from(&path);
    }
    Ok(Vec::new())
}
