//! Errors that stop a check before a verdict exists.
//!
//! Engine trouble is not here: a search that cannot finish yields an
//! `Unknown` verdict, and a page that cannot be rendered only loses the
//! page.

use kvlin_history::{LoadError, MergeError};
use std::path::PathBuf;

/// Failure to produce a history to check
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// No history path was given
    #[error("no history files given")]
    NoInput,

    /// The single history could not be loaded
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Several histories could not be merged
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Configuration file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    ConfigIo {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON for the config schema
    #[error("invalid config {}: {source}", .path.display())]
    Config {
        /// Config file
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}
