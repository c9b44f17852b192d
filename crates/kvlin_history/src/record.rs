//! Trace record schema.
//!
//! One [`TraceRecord`] is one operation observed by one client: what was
//! asked, what came back, and the real-time interval in between. The JSON
//! shape is the trace file format shared with the recorders:
//!
//! ```json
//! { "client_id": 0,
//!   "input": {"type": "Put", "key": "x", "value": "1"},
//!   "call": 100,
//!   "output": {"status": "ok"},
//!   "return_time": 150 }
//! ```

use kvlin_core::{ClientId, CoreResult, Interval, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};

/// Status string a store reports for a successful request
pub const STATUS_OK: &str = "ok";

/// Operation issued by a client
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Input {
    /// Bind `key` to `value`
    Put {
        /// Target key
        key: String,
        /// Value written
        value: String,
    },
    /// Read the value bound to `key`
    Get {
        /// Target key
        key: String,
    },
    /// Remove any binding for `key`
    Delete {
        /// Target key
        key: String,
    },
}

impl Input {
    /// Create a put
    pub fn put(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a get
    pub fn get(key: impl Into<String>) -> Self {
        Self::Get { key: key.into() }
    }

    /// Create a delete
    pub fn delete(key: impl Into<String>) -> Self {
        Self::Delete { key: key.into() }
    }

    /// Key the operation targets
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Put { key, .. } | Self::Get { key } | Self::Delete { key } => key,
        }
    }
}

/// Result a client observed.
///
/// Both fields are optional on the wire. For a get, `value: null` and a
/// missing `value` both mean "no value"; an empty string is a value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Output {
    /// Status reported by the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Value returned by a get
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl Output {
    /// Successful result without a value
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: Some(STATUS_OK.to_string()),
            value: None,
        }
    }

    /// Successful get that found `value`
    pub fn found(value: impl Into<String>) -> Self {
        Self {
            status: Some(STATUS_OK.to_string()),
            value: Some(value.into()),
        }
    }

    /// Successful get that found nothing
    #[must_use]
    pub fn not_found() -> Self {
        Self::ok()
    }

    /// Result carrying an arbitrary status
    pub fn with_status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            value: None,
        }
    }

    /// Whether the store reported success
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(STATUS_OK)
    }
}

/// One observed operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// Issuing client
    pub client_id: ClientId,
    /// Operation issued
    pub input: Input,
    /// When the operation was invoked
    pub call: Timestamp,
    /// Result observed; `null` and a missing field mean no status
    #[serde(default, deserialize_with = "null_as_default")]
    pub output: Output,
    /// When the result was observed
    pub return_time: Timestamp,
}

impl TraceRecord {
    /// Create a record
    #[must_use]
    pub fn new(
        client_id: ClientId,
        input: Input,
        call: Timestamp,
        output: Output,
        return_time: Timestamp,
    ) -> Self {
        Self {
            client_id,
            input,
            call,
            output,
            return_time,
        }
    }

    /// Call/return interval of this record
    ///
    /// # Errors
    ///
    /// Returns error if the record returns before it is called
    pub fn interval(&self) -> CoreResult<Interval> {
        Interval::new(self.call, self.return_time)
    }

    /// Check the structural invariants that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns error if `return_time < call`
    pub fn validate(&self) -> CoreResult<()> {
        self.interval().map(|_| ())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
