// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod error;
pub mod filter;
pub mod handle;
pub mod phrase;
pub mod story;
pub mod trigger;

// Feed fetching + polling around the trigger engine
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::config::{parse_trigger_config, read_trigger_config, TriggerConfig};
pub use crate::error::{ConfigWarning, TimeParseError, TriggerConfigError};
pub use crate::filter::filter_stories;
pub use crate::handle::TriggerHandle;
pub use crate::phrase::is_phrase_in;
pub use crate::story::Story;
pub use crate::trigger::{Trigger, TriggerRef};
