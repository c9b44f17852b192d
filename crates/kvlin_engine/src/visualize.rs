//! HTML rendering of a check result.
//!
//! The page is self-contained (inline CSS, no scripts) so it can be opened
//! from disk or served as a single file.

use crate::info::{LinearizationInfo, PartitionInfo, PartitionOutcome};
use crate::model::{Model, Operation};
use std::io::Write;

/// Failure to write the rendered page
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The sink rejected a write
    #[error("failed to write visualization: {0}")]
    Io(#[from] std::io::Error),
}

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin:0.5em 0 1.5em}\
th,td{border:1px solid #ccc;padding:2px 8px;text-align:left;font-family:monospace}\
th{background:#f3f3f3}\
tr.linearized td{background:#eef8ee}\
.ok{color:#2a7a2a}.fail{color:#b22}.aborted{color:#a67400}";

/// Render `info` for `history` as an HTML page into `sink`.
///
/// Each partition lists its operations and replays its longest partial
/// linearization against `model`, showing the state after every step.
pub fn visualize<M, W>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    info: &LinearizationInfo,
    mut sink: W,
) -> Result<(), RenderError>
where
    M: Model,
    W: Write,
{
    writeln!(sink, "<!DOCTYPE html>")?;
    writeln!(sink, "<html><head><meta charset=\"utf-8\">")?;
    writeln!(sink, "<title>kvlin linearizability report</title>")?;
    writeln!(sink, "<style>{STYLE}</style></head><body>")?;
    writeln!(sink, "<h1>Linearizability report</h1>")?;
    writeln!(
        sink,
        "<p>{} operations in {} partitions; longest partial linearization: {}</p>",
        history.len(),
        info.partition_count(),
        info.max_partial_len()
    )?;

    for (index, partition) in info.partitions.iter().enumerate() {
        render_partition(model, history, index, partition, &mut sink)?;
    }

    writeln!(sink, "</body></html>")?;
    sink.flush()?;
    Ok(())
}

fn render_partition<M: Model, W: Write>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    index: usize,
    partition: &PartitionInfo,
    sink: &mut W,
) -> Result<(), RenderError> {
    let (class, label) = match partition.outcome {
        PartitionOutcome::Linearizable => ("ok", "linearizable"),
        PartitionOutcome::NotLinearizable => ("fail", "not linearizable"),
        PartitionOutcome::Aborted => ("aborted", "aborted"),
    };
    writeln!(
        sink,
        "<h2>Partition {index} <span class=\"{class}\">{label}</span></h2>"
    )?;

    let longest = partition.longest().unwrap_or(&[]);

    writeln!(
        sink,
        "<table><tr><th>#</th><th>client</th><th>call</th><th>return</th><th>operation</th></tr>"
    )?;
    for &i in &partition.operations {
        let Some(op) = history.get(i) else { continue };
        let row = if longest.contains(&i) { " class=\"linearized\"" } else { "" };
        writeln!(
            sink,
            "<tr{row}><td>{i}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            op.client_id,
            op.call,
            op.return_time,
            escape(&model.describe_operation(&op.input, &op.output))
        )?;
    }
    writeln!(sink, "</table>")?;

    writeln!(
        sink,
        "<h3>Longest partial linearization ({} of {})</h3>",
        longest.len(),
        partition.operations.len()
    )?;
    writeln!(
        sink,
        "<table><tr><th>step</th><th>#</th><th>operation</th><th>state after</th></tr>"
    )?;
    let mut state = model.init();
    writeln!(
        sink,
        "<tr><td></td><td></td><td>(initial)</td><td>{}</td></tr>",
        escape(&model.describe_state(&state))
    )?;
    for (step, &i) in longest.iter().enumerate() {
        let Some(op) = history.get(i) else { break };
        let (legal, next) = model.step(&state, &op.input, &op.output);
        if !legal {
            // the search only records legal prefixes
            break;
        }
        state = next;
        writeln!(
            sink,
            "<tr><td>{}</td><td>{i}</td><td>{}</td><td>{}</td></tr>",
            step + 1,
            escape(&model.describe_operation(&op.input, &op.output)),
            escape(&model.describe_state(&state))
        )?;
    }
    writeln!(sink, "</table>")?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
