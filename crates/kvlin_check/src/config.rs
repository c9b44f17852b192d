//! Check configuration.

use crate::error::CheckError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default search deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    /// Search deadline in seconds (0 = no deadline)
    pub timeout_secs: u64,
    /// Render the HTML diagnostics page
    pub visualize: bool,
    /// Directory for rendered pages (default: next to the history)
    pub artifact_dir: Option<PathBuf>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            visualize: true,
            artifact_dir: None,
        }
    }
}

impl CheckConfig {
    /// Load from a JSON file; missing fields keep their defaults
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CheckError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| CheckError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CheckError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Set the deadline in seconds
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Enable or disable the HTML page
    #[must_use]
    pub fn with_visualize(mut self, visualize: bool) -> Self {
        self.visualize = visualize;
        self
    }

    /// Write rendered pages into `dir`
    #[must_use]
    pub fn with_artifact_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifact_dir = Some(dir.into());
        self
    }

    /// Deadline handed to the engine
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CheckConfig::default();
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.visualize);
        assert!(config.artifact_dir.is_none());
    }

    #[test]
    fn test_zero_timeout_disables_deadline() {
        assert_eq!(CheckConfig::default().with_timeout_secs(0).timeout(), None);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: CheckConfig = serde_json::from_str(r#"{"visualize": false}"#).unwrap();
        assert!(!config.visualize);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kvlin.json");
        std::fs::write(&path, r#"{"timeout_secs": 5, "artifact_dir": "out"}"#).unwrap();

        let config = CheckConfig::from_file(&path).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.artifact_dir, Some(PathBuf::from("out")));

        std::fs::write(&path, "{").unwrap();
        assert!(matches!(CheckConfig::from_file(&path), Err(CheckError::Config { .. })));
        assert!(matches!(
            CheckConfig::from_file(dir.path().join("missing.json")),
            Err(CheckError::ConfigIo { .. })
        ));
    }
}
