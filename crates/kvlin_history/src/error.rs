//! History errors.

use std::path::PathBuf;

/// Failure to load one trace file
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File could not be read
    #[error("error reading {}: {source}", .path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// Content is not a JSON array of trace records
    #[error("error parsing {}: {source}", .path.display())]
    Parse {
        /// File being parsed
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
    /// A record parsed but breaks a structural invariant
    #[error("invalid record {index} in {}: {reason}", .path.display())]
    Invalid {
        /// File holding the record
        path: PathBuf,
        /// Position of the record in the file
        index: usize,
        /// What is wrong with it
        reason: String,
    },
}

/// Failure to persist a history
#[derive(Debug, thiserror::Error)]
pub enum WriteError {
    /// File could not be written
    #[error("error writing {}: {source}", .path.display())]
    Io {
        /// Destination
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
    /// History could not be serialized
    #[error("error serializing history for {}: {source}", .path.display())]
    Serialize {
        /// Destination
        path: PathBuf,
        /// Underlying error
        source: serde_json::Error,
    },
}

/// Failure to merge trace files
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// Merging needs at least two inputs
    #[error("merge needs at least 2 histories, got {count}")]
    TooFewInputs {
        /// Inputs supplied
        count: usize,
    },
    /// One of the inputs failed to load
    #[error(transparent)]
    Load(#[from] LoadError),
    /// The merged history could not be written
    #[error(transparent)]
    Write(#[from] WriteError),
}
