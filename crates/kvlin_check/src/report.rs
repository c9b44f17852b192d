//! Human-readable report text.
//!
//! An undecided check is never worded as a violation.

use crate::orchestrator::HistoryResult;
use kvlin_engine::Verdict;

/// One-line statement of the verdict
#[must_use]
pub fn verdict_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Linearizable => "History is linearizable",
        Verdict::NotLinearizable => "History is NOT linearizable",
        Verdict::Unknown => "Check was inconclusive (timed out)",
    }
}

/// Short marker for the summary line
#[must_use]
pub fn status_marker(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Linearizable => "✓",
        Verdict::NotLinearizable => "✗",
        Verdict::Unknown => "?",
    }
}

/// Detail lines for one checked history
#[must_use]
pub fn report_lines(result: &HistoryResult) -> Vec<String> {
    let mut lines = vec![
        verdict_line(result.verdict).to_string(),
        format!("Total operations: {}", result.total_ops),
    ];
    if result.max_partial_len > 0 {
        if result.is_linearizable() {
            lines.push(format!(
                "Max partial linearization length: {}",
                result.max_partial_len
            ));
        } else {
            lines.push(format!(
                "Max partial linearization length: {} (out of {})",
                result.max_partial_len, result.total_ops
            ));
        }
    }
    if result.verdict == Verdict::Unknown {
        lines.push("No violation was found before the deadline; raise --timeout to finish the search".to_string());
    }
    lines
}

/// `<marker> <file name>: <n> ops`, plus the longest partial linearization
/// when the history was not proven linearizable
#[must_use]
pub fn summary_line(result: &HistoryResult) -> String {
    let name = result
        .path
        .file_name()
        .map_or_else(|| result.path.display().to_string(), |n| n.to_string_lossy().into_owned());
    let mut line = format!(
        "{} {}: {} ops",
        status_marker(result.verdict),
        name,
        result.total_ops
    );
    if !result.is_linearizable() && result.max_partial_len > 0 {
        line.push_str(&format!(" (max partial: {})", result.max_partial_len));
    }
    line
}
