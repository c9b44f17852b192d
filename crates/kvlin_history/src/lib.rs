//! kvlin History
//!
//! Trace records observed against a key-value store, and the pipeline that
//! turns one or more trace files into a single history ordered by call time.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod history;
pub mod loader;
pub mod merge;
pub mod record;
pub mod recorder;

pub use error::{LoadError, MergeError, WriteError};
pub use history::History;
pub use loader::{load_history, write_history};
pub use merge::{merge, merge_files, merged_path, MergedHistory, MERGED_HISTORY_FILE};
pub use record::{Input, Output, TraceRecord, STATUS_OK};
pub use recorder::HistoryRecorder;
