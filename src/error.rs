// src/error.rs
//! Errors raised while building triggers from a config file.

use std::path::PathBuf;
use thiserror::Error;

/// A BEFORE/AFTER literal that is not `DD Mon YYYY HH:MM:SS`.
#[derive(Debug, Error)]
#[error("invalid time `{input}` (expected `DD Mon YYYY HH:MM:SS`): {reason}")]
pub struct TimeParseError {
    pub input: String,
    pub reason: String,
}

/// Any of these aborts the whole load; no partial trigger list is returned.
#[derive(Debug, Error)]
pub enum TriggerConfigError {
    #[error("failed to read trigger config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: trigger `{name}` is not defined")]
    UnresolvedReference { line: usize, name: String },

    #[error("line {line}: {source}")]
    TimeParse {
        line: usize,
        #[source]
        source: TimeParseError,
    },
}

impl TriggerConfigError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

/// Non-fatal findings; the config still loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// A TITLE/DESCRIPTION phrase with no words. The trigger is kept but never fires.
    EmptyPhrase { line: usize, name: String },
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPhrase { line, name } => write!(
                f,
                "line {line}: trigger `{name}` has an empty phrase and will never match"
            ),
        }
    }
}
