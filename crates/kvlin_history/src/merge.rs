//! Merging independently captured trace files.
//!
//! Each client writes its own trace, so nothing orders records across files.
//! Merging concatenates them and stable-sorts by call timestamp, producing
//! the single global history the checker works on.

use crate::error::MergeError;
use crate::history::History;
use crate::loader::{load_history, write_history};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name of the persisted merged history
pub const MERGED_HISTORY_FILE: &str = "merged-history.json";

/// A merged history and where it was persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedHistory {
    /// Location of the merged artifact
    pub path: PathBuf,
    /// Merged records, sorted by call
    pub history: History,
    /// Number of input files
    pub sources: usize,
}

/// Concatenate histories and stable-sort the result by call timestamp.
///
/// Records with equal call timestamps keep the order in which they were
/// supplied.
#[must_use]
pub fn merge<I>(histories: I) -> History
where
    I: IntoIterator<Item = History>,
{
    let mut merged = History::new();
    for history in histories {
        merged.extend(history);
    }
    merged.sort_by_call();
    merged
}

/// Location of the merged artifact for a set of inputs: next to the first.
#[must_use]
pub fn merged_path(first: &Path) -> PathBuf {
    first
        .parent()
        .map_or_else(|| PathBuf::from(MERGED_HISTORY_FILE), |dir| dir.join(MERGED_HISTORY_FILE))
}

/// Load, merge, and persist trace files.
///
/// # Errors
///
/// Returns [`MergeError::TooFewInputs`] for fewer than two paths, a wrapped
/// [`crate::LoadError`] if any file fails to load (the whole merge aborts),
/// or a wrapped [`crate::WriteError`] if the artifact cannot be written.
pub fn merge_files<P: AsRef<Path>>(paths: &[P]) -> Result<MergedHistory, MergeError> {
    let first: &Path = match paths {
        [first, _, ..] => first.as_ref(),
        _ => return Err(MergeError::TooFewInputs { count: paths.len() }),
    };

    let histories = paths
        .iter()
        .map(load_history)
        .collect::<Result<Vec<_>, _>>()?;

    let history = merge(histories);
    let path = merged_path(first);
    write_history(&path, &history)?;

    info!(
        sources = paths.len(),
        records = history.len(),
        path = %path.display(),
        "merged histories"
    );

    Ok(MergedHistory {
        path,
        history,
        sources: paths.len(),
    })
}
