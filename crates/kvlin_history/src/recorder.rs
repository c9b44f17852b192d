//! Recording traces from a client of the store under test.
//!
//! A client wraps every request with [`HistoryRecorder::record_call`] and
//! [`HistoryRecorder::complete`], then exports a trace file in the same
//! format [`crate::load_history`] reads. Timestamps are nanoseconds since
//! the Unix epoch: a wall-clock anchor plus monotonic elapsed time, so that
//! clients sharing a sync instant share a time base.

use crate::error::WriteError;
use crate::history::History;
use crate::loader::write_history;
use crate::record::{Input, Output, TraceRecord};
use kvlin_core::{ClientId, Timestamp};
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Operation that has been called and may have returned
#[derive(Debug, Clone)]
struct Slot {
    input: Input,
    call: Timestamp,
    completion: Option<(Output, Timestamp)>,
}

/// Per-client operation recorder
#[derive(Debug)]
pub struct HistoryRecorder {
    client_id: ClientId,
    slots: Vec<Slot>,
    /// Wall-clock time at `started`
    anchor: Timestamp,
    started: Instant,
}

impl HistoryRecorder {
    /// Create a recorder anchored at the current wall-clock time
    #[must_use]
    pub fn new(client_id: ClientId) -> Self {
        let anchor = chrono::Utc::now().timestamp_nanos_opt().unwrap_or(i64::MAX);
        Self {
            client_id,
            slots: Vec::new(),
            anchor: Timestamp::from_raw(anchor),
            started: Instant::now(),
        }
    }

    /// Re-anchor later timestamps at a shared start instant, given in
    /// milliseconds since the Unix epoch.
    pub fn set_sync_time(&mut self, sync_time_ms: i64) {
        self.anchor = Timestamp::from_millis(sync_time_ms);
        self.started = Instant::now();
    }

    /// Client this recorder belongs to
    #[must_use]
    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    fn now(&self) -> Timestamp {
        let elapsed = i64::try_from(self.started.elapsed().as_nanos()).unwrap_or(i64::MAX);
        self.anchor.saturating_add(elapsed)
    }

    /// Timestamp an invocation; the returned handle completes it later
    pub fn record_call(&mut self, input: Input) -> usize {
        let handle = self.slots.len();
        self.slots.push(Slot {
            input,
            call: self.now(),
            completion: None,
        });
        handle
    }

    /// Timestamp the result of a recorded call.
    ///
    /// Returns `false` for an unknown handle or one already completed.
    pub fn complete(&mut self, handle: usize, output: Output) -> bool {
        let return_time = self.now();
        match self.slots.get_mut(handle) {
            Some(slot) if slot.completion.is_none() => {
                slot.completion = Some((output, return_time));
                true
            }
            _ => false,
        }
    }

    /// Operations recorded so far, completed or not
    #[must_use]
    pub fn operation_count(&self) -> usize {
        self.slots.len()
    }

    /// Operations whose result has been observed
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.completion.is_some()).count()
    }

    /// Completed operations in call order; pending ones are left out
    #[must_use]
    pub fn history(&self) -> History {
        self.slots
            .iter()
            .filter_map(|slot| {
                let (output, return_time) = slot.completion.clone()?;
                Some(TraceRecord::new(
                    self.client_id,
                    slot.input.clone(),
                    slot.call,
                    output,
                    return_time,
                ))
            })
            .collect()
    }

    /// Write completed operations as a trace file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<(), WriteError> {
        let history = self.history();
        debug!(
            client = %self.client_id,
            completed = history.len(),
            pending = self.operation_count() - history.len(),
            "exporting recorded history"
        );
        write_history(path, &history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_history;

    #[test]
    fn test_record_and_complete() {
        let mut recorder = HistoryRecorder::new(ClientId::new(3));
        let put = recorder.record_call(Input::put("k", "v"));
        let get = recorder.record_call(Input::get("k"));
        assert_eq!(recorder.operation_count(), 2);
        assert_eq!(recorder.completed_count(), 0);

        assert!(recorder.complete(put, Output::ok()));
        assert!(recorder.complete(get, Output::found("v")));
        assert_eq!(recorder.completed_count(), 2);

        let history = recorder.history();
        assert_eq!(history.len(), 2);
        for record in history.records() {
            assert_eq!(record.client_id, ClientId::new(3));
            assert!(record.return_time >= record.call);
        }
    }

    #[test]
    fn test_complete_rejects_unknown_and_repeated_handles() {
        let mut recorder = HistoryRecorder::new(ClientId::new(0));
        let handle = recorder.record_call(Input::delete("k"));
        assert!(!recorder.complete(handle + 1, Output::ok()));
        assert!(recorder.complete(handle, Output::ok()));
        assert!(!recorder.complete(handle, Output::ok()));
    }

    #[test]
    fn test_sync_time_anchors_timestamps() {
        let mut recorder = HistoryRecorder::new(ClientId::new(0));
        recorder.set_sync_time(1_000);
        let handle = recorder.record_call(Input::get("k"));
        recorder.complete(handle, Output::not_found());

        let history = recorder.history();
        let record = &history.records()[0];
        assert!(record.call >= Timestamp::from_millis(1_000));
        // well under a minute has passed since the sync point
        assert!(record.return_time < Timestamp::from_millis(61_000));
    }

    #[test]
    fn test_export_skips_pending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.json");

        let mut recorder = HistoryRecorder::new(ClientId::new(1));
        let done = recorder.record_call(Input::put("a", "1"));
        let _pending = recorder.record_call(Input::get("a"));
        recorder.complete(done, Output::ok());

        recorder.export(&path).unwrap();
        let loaded = load_history(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.records()[0].input, Input::put("a", "1"));
    }
}
