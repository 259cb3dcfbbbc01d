//! Error types.
//!
//! Only [`CorpusError`] is allowed to stop the app. Host and asset failures
//! are turned into outcome values at their adapter boundary, so [`HostError`]
//! never leaves the `host` module's public adapter.

use thiserror::Error;

/// The fortune corpus could not be loaded.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("fortune corpus is empty")]
    Empty,
    #[error("fortune #{index} is blank")]
    BlankEntry { index: usize },
    #[error("fortune corpus is not a JSON array of strings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// The inline configuration block could not be parsed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid app config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A raw host call failed. Consumed by `HostAdapter`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The host does not expose this capability.
    #[error("{0} is not available")]
    Unavailable(&'static str),
    /// The host threw while handling the call.
    #[error("host call failed: {0}")]
    Js(String),
}
