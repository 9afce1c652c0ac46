// src/story.rs
//! Story record handed to the trigger engine by the feed layer.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One news item. Immutable once built; `id` is stable across polls for the same item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub description: String,
    pub link: String,
    /// Publication instant together with the offset the source reported it in.
    pub published_at: DateTime<FixedOffset>,
}

impl Story {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        link: impl Into<String>,
        published_at: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            link: link.into(),
            published_at,
        }
    }
}
