// src/filter.rs
//! Filter evaluator: keep the stories that at least one active trigger fires on.

use tracing::info;

use crate::story::Story;
use crate::trigger::TriggerRef;

// Dev logging gate: TRIGGER_DEV_LOG=1 AND dev env (debug or APP_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("TRIGGER_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
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

/// Short, stable fingerprint of a story id for logs.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Index of the first trigger that fires on `story`, if any.
pub fn first_match(story: &Story, triggers: &[TriggerRef]) -> Option<usize> {
    triggers.iter().position(|t| t.evaluate(story))
}

/// Stories (in input order) on which any trigger fires. Each story appears at most
/// once no matter how many triggers fire; an empty trigger list keeps nothing.
pub fn filter_stories(stories: &[Story], triggers: &[TriggerRef]) -> Vec<Story> {
    let log = dev_logging_enabled();
    stories
        .iter()
        .filter(|s| match first_match(s, triggers) {
            Some(idx) => {
                if log {
                    // Never log story text, only the hashed id.
                    info!(
                        target: "triggers",
                        id = %anon_hash(&s.id),
                        trigger = idx,
                        kind = triggers[idx].kind(),
                        "story matched"
                    );
                }
                true
            }
            None => false,
        })
        .cloned()
        .collect()
}
