//! The checking-engine seam.

use crate::info::{LinearizationInfo, Verdict};
use crate::model::{Model, Operation};
use std::time::Duration;

/// Verdict plus the diagnostics that support it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    /// Overall answer
    pub verdict: Verdict,
    /// Per-partition partial linearizations
    pub info: LinearizationInfo,
}

impl CheckOutcome {
    /// Create an outcome
    #[must_use]
    pub fn new(verdict: Verdict, info: LinearizationInfo) -> Self {
        Self { verdict, info }
    }
}

/// A linearizability checking engine.
///
/// Implementations must not retain `model` or `history` after returning, and
/// must return [`Verdict::Unknown`] rather than block past `timeout`.
pub trait Checker {
    /// Check `history` against `model`, giving up after `timeout` if set
    fn check<M: Model>(
        &self,
        model: &M,
        history: &[Operation<M::Input, M::Output>],
        timeout: Option<Duration>,
    ) -> CheckOutcome;
}
