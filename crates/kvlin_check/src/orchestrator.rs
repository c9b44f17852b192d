//! Checking orchestrator.

use crate::config::CheckConfig;
use crate::error::CheckError;
use kvlin_engine::{visualize, Checker, LinearizationInfo, Operation, RenderError, Verdict, WglChecker};
use kvlin_history::{load_history, merge_files, History};
use kvlin_model::{KvModel, KvOperation};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Summary of one checked history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryResult {
    /// History that was checked (the merged file when several were given)
    pub path: PathBuf,
    /// Rendered diagnostics page, if one was written
    pub html_path: Option<PathBuf>,
    /// Engine verdict
    pub verdict: Verdict,
    /// Number of operations checked
    pub total_ops: usize,
    /// Longest partial linearization over all partitions
    pub max_partial_len: usize,
}

impl HistoryResult {
    /// Whether the history was proven linearizable
    #[must_use]
    pub fn is_linearizable(&self) -> bool {
        self.verdict.is_linearizable()
    }

    /// Process exit code: 0 only for a proven linearizable history
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.is_linearizable() {
            0
        } else {
            1
        }
    }
}

/// Outcome of [`Orchestrator::run`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRun {
    /// Merged history file, when more than one history was given
    pub merged: Option<PathBuf>,
    /// Check result
    pub result: HistoryResult,
}

/// Map trace records field by field onto engine operations
#[must_use]
pub fn to_operations(history: &History) -> Vec<KvOperation> {
    history
        .records()
        .iter()
        .map(|record| Operation {
            client_id: record.client_id,
            input: record.input.clone(),
            call: record.call,
            output: record.output.clone(),
            return_time: record.return_time,
        })
        .collect()
}

/// Runs histories through the checking engine with the key-value model
#[derive(Debug, Clone)]
pub struct Orchestrator<C = WglChecker> {
    config: CheckConfig,
    checker: C,
    model: KvModel,
}

impl Orchestrator<WglChecker> {
    /// Create an orchestrator with the default engine and configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CheckConfig::default(),
            checker: WglChecker::new(),
            model: KvModel::new(),
        }
    }
}

impl Default for Orchestrator<WglChecker> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Checker> Orchestrator<C> {
    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the checking engine
    #[must_use]
    pub fn with_checker<D: Checker>(self, checker: D) -> Orchestrator<D> {
        Orchestrator {
            config: self.config,
            checker,
            model: self.model,
        }
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Load one history, or merge several, and check the result
    ///
    /// # Errors
    ///
    /// Returns error if no path is given or any history fails to load; a
    /// failed load aborts the whole merge.
    pub fn run<P: AsRef<Path>>(&self, paths: &[P]) -> Result<CheckRun, CheckError> {
        match paths {
            [] => Err(CheckError::NoInput),
            [single] => {
                let path: &Path = single.as_ref();
                let history = load_history(path)?;
                Ok(CheckRun {
                    merged: None,
                    result: self.check_history(&history, path),
                })
            }
            _ => {
                let merged = merge_files(paths)?;
                let result = self.check_history(&merged.history, &merged.path);
                Ok(CheckRun {
                    merged: Some(merged.path),
                    result,
                })
            }
        }
    }

    /// Check an already loaded history; `source` names it in the result
    /// and decides where the page is rendered.
    pub fn check_history(&self, history: &History, source: &Path) -> HistoryResult {
        if history.is_empty() {
            info!(path = %source.display(), "no operations in history");
            return HistoryResult {
                path: source.to_path_buf(),
                html_path: None,
                verdict: Verdict::Linearizable,
                total_ops: 0,
                max_partial_len: 0,
            };
        }

        let operations = to_operations(history);
        debug!(
            path = %source.display(),
            operations = operations.len(),
            clients = history.client_ids().len(),
            "checking history"
        );
        let outcome = self
            .checker
            .check(&self.model, &operations, self.config.timeout());
        let max_partial_len = outcome.info.max_partial_len();

        let html_path = if self.config.visualize {
            self.render(&operations, &outcome.info, source)
        } else {
            None
        };

        info!(
            path = %source.display(),
            verdict = %outcome.verdict,
            operations = operations.len(),
            max_partial_len,
            "history checked"
        );

        HistoryResult {
            path: source.to_path_buf(),
            html_path,
            verdict: outcome.verdict,
            total_ops: operations.len(),
            max_partial_len,
        }
    }

    /// Where the page for `source` is written: `<stem>.html`
    #[must_use]
    pub fn artifact_path(&self, source: &Path) -> PathBuf {
        let stem = source
            .file_stem()
            .map_or_else(|| "history".into(), |s| s.to_string_lossy());
        let dir = match &self.config.artifact_dir {
            Some(dir) => dir.as_path(),
            None => source.parent().unwrap_or_else(|| Path::new("")),
        };
        dir.join(format!("{stem}.html"))
    }

    fn render(&self, operations: &[KvOperation], info: &LinearizationInfo, source: &Path) -> Option<PathBuf> {
        let path = self.artifact_path(source);
        match self.write_page(operations, info, &path) {
            Ok(()) => {
                debug!(path = %path.display(), "visualization written");
                Some(path)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "visualization unavailable");
                None
            }
        }
    }

    fn write_page(&self, operations: &[KvOperation], info: &LinearizationInfo, path: &Path) -> Result<(), RenderError> {
        if let Some(dir) = &self.config.artifact_dir {
            std::fs::create_dir_all(dir)?;
        }
        let file = File::create(path)?;
        visualize(&self.model, operations, info, BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kvlin_core::{ClientId, Timestamp};
    use kvlin_engine::{CheckOutcome, Model, PartitionInfo, PartitionOutcome};
    use kvlin_history::{Input, Output, TraceRecord};
    use std::cell::Cell;
    use std::time::Duration;

    /// Engine stand-in returning a fixed verdict and recording its calls
    struct StubChecker {
        verdict: Verdict,
        calls: Cell<usize>,
        seen_timeout: Cell<Option<Duration>>,
    }

    impl StubChecker {
        fn new(verdict: Verdict) -> Self {
            Self {
                verdict,
                calls: Cell::new(0),
                seen_timeout: Cell::new(None),
            }
        }
    }

    impl Checker for StubChecker {
        fn check<M: Model>(
            &self,
            _model: &M,
            history: &[Operation<M::Input, M::Output>],
            timeout: Option<Duration>,
        ) -> CheckOutcome {
            self.calls.set(self.calls.get() + 1);
            self.seen_timeout.set(timeout);
            let all: Vec<usize> = (0..history.len()).collect();
            let partition = PartitionInfo {
                operations: all.clone(),
                partial_linearizations: vec![all[..all.len() / 2].to_vec()],
                outcome: PartitionOutcome::Aborted,
            };
            CheckOutcome::new(self.verdict, LinearizationInfo::new(vec![partition]))
        }
    }

    fn record(client: i64, input: Input, call: i64, output: Output, ret: i64) -> TraceRecord {
        TraceRecord::new(
            ClientId::new(client),
            input,
            Timestamp::from_raw(call),
            output,
            Timestamp::from_raw(ret),
        )
    }

    fn sample() -> History {
        History::from_records(vec![
            record(0, Input::put("x", "1"), 0, Output::ok(), 1),
            record(1, Input::get("x"), 2, Output::found("1"), 3),
            record(1, Input::put("y", "2"), 4, Output::ok(), 5),
            record(0, Input::get("y"), 6, Output::found("2"), 7),
        ])
    }

    fn quiet() -> CheckConfig {
        CheckConfig::default().with_visualize(false)
    }

    #[test]
    fn test_to_operations_maps_fields() {
        let history = sample();
        let ops = to_operations(&history);
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[1].client_id, ClientId::new(1));
        assert_eq!(ops[1].input, Input::get("x"));
        assert_eq!(ops[1].output, Output::found("1"));
        assert_eq!(ops[1].call, Timestamp::from_raw(2));
        assert_eq!(ops[1].return_time, Timestamp::from_raw(3));
    }

    #[test]
    fn test_empty_history_skips_engine() {
        let orchestrator = Orchestrator::new()
            .with_config(quiet())
            .with_checker(StubChecker::new(Verdict::NotLinearizable));
        let result = orchestrator.check_history(&History::new(), Path::new("empty.json"));
        assert_eq!(result.verdict, Verdict::Linearizable);
        assert_eq!(result.total_ops, 0);
        assert_eq!(result.exit_code(), 0);
        assert_eq!(orchestrator.checker.calls.get(), 0);
    }

    #[test]
    fn test_stub_engine_verdict_and_timeout_pass_through() {
        let orchestrator = Orchestrator::new()
            .with_config(quiet().with_timeout_secs(7))
            .with_checker(StubChecker::new(Verdict::Unknown));
        let result = orchestrator.check_history(&sample(), Path::new("h.json"));

        assert_eq!(result.verdict, Verdict::Unknown);
        assert_eq!(result.total_ops, 4);
        assert_eq!(result.max_partial_len, 2);
        assert_eq!(result.exit_code(), 1);
        assert!(result.html_path.is_none());
        assert_eq!(orchestrator.checker.seen_timeout.get(), Some(Duration::from_secs(7)));
    }

    #[test]
    fn test_check_is_idempotent() {
        let orchestrator = Orchestrator::new().with_config(quiet());
        let history = sample();
        let first = orchestrator.check_history(&history, Path::new("h.json"));
        let second = orchestrator.check_history(&history, Path::new("h.json"));
        assert_eq!(first, second);
        assert!(first.is_linearizable());
        assert_eq!(first.max_partial_len, 2);
    }

    #[test]
    fn test_artifact_path() {
        let orchestrator = Orchestrator::new();
        assert_eq!(
            orchestrator.artifact_path(Path::new("runs/client-1.json")),
            PathBuf::from("runs/client-1.html")
        );
        let orchestrator = orchestrator.with_config(CheckConfig::default().with_artifact_dir("out"));
        assert_eq!(
            orchestrator.artifact_path(Path::new("runs/client-1.json")),
            PathBuf::from("out/client-1.html")
        );
    }

    #[test]
    fn test_renders_page_next_to_history() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("history.json");
        let result = Orchestrator::new().check_history(&sample(), &source);

        let html = dir.path().join("history.html");
        assert_eq!(result.html_path.as_deref(), Some(html.as_path()));
        let page = std::fs::read_to_string(html).unwrap();
        assert!(page.contains("Put(&#39;x&#39;, &#39;1&#39;)"));
    }

    #[test]
    fn test_render_failure_keeps_verdict() {
        let dir = tempfile::tempdir().unwrap();
        // a file where the artifact directory should be
        let blocker = dir.path().join("blocked");
        std::fs::write(&blocker, "").unwrap();

        let orchestrator = Orchestrator::new().with_config(CheckConfig::default().with_artifact_dir(&blocker));
        let result = orchestrator.check_history(&sample(), Path::new("h.json"));
        assert!(result.is_linearizable());
        assert!(result.html_path.is_none());
    }

    #[test]
    fn test_run_without_paths() {
        let paths: [&Path; 0] = [];
        assert!(matches!(Orchestrator::new().run(&paths), Err(CheckError::NoInput)));
    }
}
