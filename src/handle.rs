// src/handle.rs
//! Shared active-trigger list with optional dev hot reload.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, SystemTime};

use tracing::{info, warn};

use crate::config::TriggerConfig;
use crate::error::TriggerConfigError;
use crate::filter::filter_stories;
use crate::story::Story;
use crate::trigger::TriggerRef;

/// A threadsafe handle to the active triggers. Readers see either the old or the
/// new list, never a partially loaded one.
#[derive(Clone, Default)]
pub struct TriggerHandle {
    inner: Arc<RwLock<Vec<TriggerRef>>>,
}

impl TriggerHandle {
    pub fn new(triggers: Vec<TriggerRef>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(triggers)),
        }
    }

    /// Current active list (cheap: clones `Arc`s only).
    pub fn snapshot(&self) -> Vec<TriggerRef> {
        match self.inner.read() {
            Ok(g) => g.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn replace(&self, triggers: Vec<TriggerRef>) {
        match self.inner.write() {
            Ok(mut g) => *g = triggers,
            Err(poisoned) => *poisoned.into_inner() = triggers,
        }
    }

    /// Filter `stories` against the current list.
    pub fn filter(&self, stories: &[Story]) -> Vec<Story> {
        filter_stories(stories, &self.snapshot())
    }

    /// Re-read `path`; swap in the new list only if the whole file loads.
    pub fn reload_from(&self, path: &Path) -> Result<usize, TriggerConfigError> {
        let cfg = TriggerConfig::from_path(path)?;
        let n = cfg.triggers.len();
        self.replace(cfg.triggers);
        Ok(n)
    }
}

/// Returns true if we should enable hot reload (dev/local only).
fn hot_reload_enabled() -> bool {
    let want = std::env::var("TRIGGER_HOT_RELOAD")
        .ok()
        .map(|v| v == "1")
        .unwrap_or(false);
    if !want {
        return false;
    }
    // Dev gating
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

/// Start a simple polling watcher on `path` that reloads into `handle`.
/// Polls mtime every 2s. A file that fails to load leaves the old list in place.
pub fn start_hot_reload_thread(handle: TriggerHandle, path: PathBuf) {
    if !hot_reload_enabled() {
        return;
    }
    info!(target: "triggers", path = %path.display(), "trigger hot reload enabled");

    thread::spawn(move || {
        let poll = Duration::from_secs(2);
        let mut last_mtime: Option<SystemTime> = None;

        loop {
            if let Ok(mtime) = fs::metadata(&path).and_then(|m| m.modified()) {
                let changed = match last_mtime {
                    None => false,
                    Some(prev) => mtime > prev,
                };
                if changed {
                    match handle.reload_from(&path) {
                        Ok(n) => info!(target: "triggers", active = n, "trigger config reloaded"),
                        Err(e) => {
                            warn!(target: "triggers", error = %e, "reload failed; keeping previous triggers")
                        }
                    }
                }
                last_mtime = Some(mtime);
            }
            thread::sleep(poll);
        }
    });
}
