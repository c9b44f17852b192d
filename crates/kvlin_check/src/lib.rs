//! kvlin Checking Orchestrator
//!
//! Ties the pipeline together: load one history or merge several, convert
//! the records into engine operations, check them against the key-value
//! model under a deadline, render the diagnostic page, and summarize the
//! result for the command line.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod report;

pub use config::CheckConfig;
pub use error::CheckError;
pub use orchestrator::{to_operations, CheckRun, HistoryResult, Orchestrator};
pub use report::{report_lines, status_marker, summary_line, verdict_line};
