//! Time types for kvlin.
//!
//! History timestamps are opaque signed counters. Recorders usually write
//! nanoseconds since the Unix epoch, but a monotonic counter is equally
//! valid: only the relative order of calls and returns matters.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Point in time at which an operation was invoked or observed to return
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Create from a raw counter value
    #[must_use]
    pub const fn from_raw(value: i64) -> Self {
        Self(value)
    }

    /// Create from milliseconds, stored as nanoseconds
    #[must_use]
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Get the raw counter value
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Shift forward by `delta` ticks, saturating at the bounds
    #[must_use]
    pub const fn saturating_add(&self, delta: i64) -> Self {
        Self(self.0.saturating_add(delta))
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Real-time interval between an operation's call and its return
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Interval {
    /// When the operation was invoked
    pub call: Timestamp,
    /// When the result was observed
    pub return_time: Timestamp,
}

impl Interval {
    /// Create an interval, rejecting one that returns before it is called
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvertedInterval`] if `return_time < call`
    pub fn new(call: Timestamp, return_time: Timestamp) -> CoreResult<Self> {
        if return_time < call {
            return Err(CoreError::InvertedInterval {
                call: call.as_i64(),
                return_time: return_time.as_i64(),
            });
        }
        Ok(Self { call, return_time })
    }
}
