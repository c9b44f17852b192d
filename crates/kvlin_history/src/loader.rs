//! Reading and writing trace files.

use crate::error::{LoadError, WriteError};
use crate::history::History;
use crate::record::TraceRecord;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Load one trace file.
///
/// Records come back in file order; nothing is reordered here.
///
/// # Errors
///
/// Returns [`LoadError`] if the file cannot be read, is not a JSON array of
/// trace records, or holds a record that returns before it is called.
pub fn load_history<P: AsRef<Path>>(path: P) -> Result<History, LoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let records: Vec<TraceRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| LoadError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    for (index, record) in records.iter().enumerate() {
        record.validate().map_err(|err| LoadError::Invalid {
            path: path.to_path_buf(),
            index,
            reason: err.to_string(),
        })?;
    }

    debug!(path = %path.display(), records = records.len(), "loaded history");
    Ok(History::from_records(records))
}

/// Write a history as a pretty-printed JSON array of trace records.
///
/// # Errors
///
/// Returns [`WriteError`] if the file cannot be created or written.
pub fn write_history<P: AsRef<Path>>(path: P, history: &History) -> Result<(), WriteError> {
    let path = path.as_ref();
    let io_err = |source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, history).map_err(|source| {
        WriteError::Serialize {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_err)?;

    debug!(path = %path.display(), records = history.len(), "wrote history");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Input, Output};
    use kvlin_core::{ClientId, Timestamp};

    fn write_raw(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_preserves_file_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            "h.json",
            r#"[
              {"client_id": 1, "input": {"type": "Get", "key": "x"}, "call": 20,
               "output": {"status": "ok", "value": null}, "return_time": 25},
              {"client_id": 0, "input": {"type": "Put", "key": "x", "value": "1"}, "call": 10,
               "output": {"status": "ok"}, "return_time": 30}
            ]"#,
        );

        let history = load_history(&path).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.records()[0].call, Timestamp::from_raw(20));
        assert_eq!(history.records()[1].input, Input::put("x", "1"));
    }

    #[test]
    fn test_load_negative_client_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            "negative.json",
            r#"[{"client_id": -1, "input": {"type": "Put", "key": "x", "value": "1"}, "call": 0,
                 "output": {"status": "ok"}, "return_time": 1}]"#,
        );
        let history = load_history(&path).unwrap();
        assert_eq!(history.records()[0].client_id, ClientId::new(-1));
    }

    #[test]
    fn test_load_null_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            "null-output.json",
            r#"[{"client_id": 0, "input": {"type": "Delete", "key": "x"}, "call": 0,
                 "output": null, "return_time": 1}]"#,
        );
        let history = load_history(&path).unwrap();
        assert_eq!(history.records()[0].output, Output::default());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_history(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_load_rejects_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            "bad.json",
            r#"[{"client_id": 0, "input": {"type": "Get"}, "call": 0,
                 "output": {"status": "ok"}, "return_time": 1}]"#,
        );
        let err = load_history(&path).unwrap_err();
        assert!(matches!(err, LoadError::Parse { .. }));
    }

    #[test]
    fn test_load_rejects_non_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(dir.path(), "obj.json", r#"{"client_id": 0}"#);
        assert!(matches!(load_history(&path), Err(LoadError::Parse { .. })));
    }

    #[test]
    fn test_load_rejects_inverted_interval() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_raw(
            dir.path(),
            "inverted.json",
            r#"[
              {"client_id": 0, "input": {"type": "Delete", "key": "x"}, "call": 0,
               "output": {}, "return_time": 1},
              {"client_id": 0, "input": {"type": "Delete", "key": "x"}, "call": 9,
               "output": {}, "return_time": 2}
            ]"#,
        );
        match load_history(&path) {
            Err(LoadError::Invalid { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected invalid record, got {other:?}"),
        }
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let history = History::from_records(vec![TraceRecord::new(
            ClientId::new(4),
            Input::get("k"),
            Timestamp::from_raw(1),
            Output::found("v"),
            Timestamp::from_raw(2),
        )]);

        write_history(&path, &history).unwrap();
        assert_eq!(load_history(&path).unwrap(), history);
    }
}
