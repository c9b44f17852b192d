//! Verdicts and diagnostic output of a check.

/// Overall answer of a linearizability check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Some sequential order explains every observed result
    Linearizable,
    /// No sequential order explains the observed results
    NotLinearizable,
    /// The search was stopped before reaching an answer
    Unknown,
}

impl Verdict {
    /// Whether the history was proven linearizable
    #[must_use]
    pub fn is_linearizable(&self) -> bool {
        matches!(self, Self::Linearizable)
    }

    /// Combine per-partition outcomes.
    ///
    /// A single failing partition disproves the whole history; otherwise an
    /// unfinished partition leaves the answer open.
    #[must_use]
    pub fn combine<I: IntoIterator<Item = PartitionOutcome>>(outcomes: I) -> Self {
        let mut verdict = Self::Linearizable;
        for outcome in outcomes {
            match outcome {
                PartitionOutcome::NotLinearizable => return Self::NotLinearizable,
                PartitionOutcome::Aborted => verdict = Self::Unknown,
                PartitionOutcome::Linearizable => {}
            }
        }
        verdict
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linearizable => write!(f, "linearizable"),
            Self::NotLinearizable => write!(f, "not linearizable"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// How the search over one partition ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitionOutcome {
    /// A full linearization was found
    Linearizable,
    /// Every candidate order was refuted
    NotLinearizable,
    /// The deadline fired or a sibling partition stopped the search
    Aborted,
}

/// Diagnostics for one partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionInfo {
    /// Indices into the checked history of the operations in this partition
    pub operations: Vec<usize>,
    /// Longest linearized prefixes found, as indices into the checked
    /// history, longest first
    pub partial_linearizations: Vec<Vec<usize>>,
    /// How the search ended
    pub outcome: PartitionOutcome,
}

impl PartitionInfo {
    /// Length of the longest partial linearization, 0 if none was found
    #[must_use]
    pub fn longest_len(&self) -> usize {
        self.partial_linearizations
            .iter()
            .map(Vec::len)
            .max()
            .unwrap_or(0)
    }

    /// Longest partial linearization, if any
    #[must_use]
    pub fn longest(&self) -> Option<&[usize]> {
        self.partial_linearizations
            .iter()
            .max_by_key(|seq| seq.len())
            .map(Vec::as_slice)
    }
}

/// Diagnostics for a whole check, one entry per partition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearizationInfo {
    /// Per-partition diagnostics, in partition order
    pub partitions: Vec<PartitionInfo>,
}

impl LinearizationInfo {
    /// Create from per-partition diagnostics
    #[must_use]
    pub fn new(partitions: Vec<PartitionInfo>) -> Self {
        Self { partitions }
    }

    /// Partial linearizations of every partition
    pub fn partial_linearizations(&self) -> impl Iterator<Item = &[Vec<usize>]> + '_ {
        self.partitions
            .iter()
            .map(|p| p.partial_linearizations.as_slice())
    }

    /// Longest partial linearization across all partitions, 0 if none
    #[must_use]
    pub fn max_partial_len(&self) -> usize {
        self.partitions
            .iter()
            .map(PartitionInfo::longest_len)
            .max()
            .unwrap_or(0)
    }

    /// Number of partitions checked
    #[must_use]
    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }
}
