//! In-memory history of trace records.

use crate::record::TraceRecord;
use kvlin_core::ClientId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Ordered arena of trace records.
///
/// Order is whatever the producer gave us until [`History::sort_by_call`]
/// is applied; downstream stages refer to records by their index here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History {
    records: Vec<TraceRecord>,
}

impl History {
    /// Create an empty history
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Create a history from records, keeping their order
    #[must_use]
    pub fn from_records(records: Vec<TraceRecord>) -> Self {
        Self { records }
    }

    /// Append every record of `other`, keeping their order
    pub fn extend(&mut self, other: History) {
        self.records.extend(other.records);
    }

    /// Records in their current order
    #[must_use]
    pub fn records(&self) -> &[TraceRecord] {
        &self.records
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history has no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Stable sort by call timestamp; ties keep their relative order
    pub fn sort_by_call(&mut self) {
        self.records.sort_by_key(|record| record.call);
    }

    /// Whether records are in non-decreasing call order
    #[must_use]
    pub fn is_sorted_by_call(&self) -> bool {
        self.records.windows(2).all(|w| w[0].call <= w[1].call)
    }

    /// Distinct clients that appear in the history
    #[must_use]
    pub fn client_ids(&self) -> BTreeSet<ClientId> {
        self.records.iter().map(|r| r.client_id).collect()
    }
}

impl FromIterator<TraceRecord> for History {
    fn from_iter<I: IntoIterator<Item = TraceRecord>>(iter: I) -> Self {
        Self::from_records(iter.into_iter().collect())
    }
}
