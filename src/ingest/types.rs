// src/ingest/types.rs
use anyhow::Result;

use crate::story::Story;

/// Anything that can hand the engine a fresh batch of stories.
#[async_trait::async_trait]
pub trait FeedProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<Story>>;
    fn name(&self) -> &str;
}
