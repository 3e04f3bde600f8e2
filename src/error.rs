//! Error types for the fallible edges of the crate.
//!
//! The simulation itself never fails: malformed inputs are logged and skipped
//! per entity. Only loading/saving tuning files and encoding snapshots can
//! return an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to load config file {path:?}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("failed to save config file {path:?}: {source}")]
    ConfigSave {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for [{section}] {key}: {value}")]
    ConfigValue {
        section: &'static str,
        key: &'static str,
        value: String,
    },

    #[error("snapshot encoding failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
