//! Wing & Gong linearizability search with Lowe's state memoization.
//!
//! Each partition's calls and returns are laid out on one time line. The
//! search walks it depth-first: a call whose step is legal is linearized and
//! removed together with its return; reaching a return whose call is still
//! pending means the current prefix cannot be extended, so the most recent
//! choice is undone. `(linearized set, state)` pairs already explored are
//! never explored twice.

use crate::checker::{CheckOutcome, Checker};
use crate::info::{LinearizationInfo, PartitionInfo, PartitionOutcome, Verdict};
use crate::model::{Model, Operation};
use bitvec::prelude::{BitVec, Lsb0};
use kvlin_core::Timestamp;
use std::collections::HashSet;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Head sentinel of the event list
const HEAD: usize = 0;

/// Search iterations between deadline checks
const STOP_CHECK_INTERVAL: u64 = 256;

/// Operations linearized so far, by position in the partition
type LinearizedSet = BitVec<u64, Lsb0>;

/// Search configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WglConfig {
    /// Stop every partition as soon as one is refuted. Faster, but the
    /// stopped partitions report no useful diagnostics.
    pub stop_on_failure: bool,
    /// Partitions searched concurrently (0 = available parallelism)
    pub workers: usize,
}

impl Default for WglConfig {
    fn default() -> Self {
        Self {
            stop_on_failure: false,
            workers: 0,
        }
    }
}

/// Linearizability checker searching each partition independently
#[derive(Debug, Clone, Default)]
pub struct WglChecker {
    config: WglConfig,
}

impl WglChecker {
    /// Create a checker with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: WglConfig::default(),
        }
    }

    /// Create with custom config
    #[must_use]
    pub fn with_config(mut self, config: WglConfig) -> Self {
        self.config = config;
        self
    }

    /// Current configuration
    #[must_use]
    pub fn config(&self) -> &WglConfig {
        &self.config
    }

    fn worker_count(&self, partitions: usize) -> usize {
        let workers = if self.config.workers > 0 {
            self.config.workers
        } else {
            std::thread::available_parallelism().map_or(1, NonZeroUsize::get)
        };
        workers.min(partitions)
    }
}

impl Checker for WglChecker {
    fn check<M: Model>(
        &self,
        model: &M,
        history: &[Operation<M::Input, M::Output>],
        timeout: Option<Duration>,
    ) -> CheckOutcome {
        let partitions = model.partition(history);
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let stop = AtomicBool::new(false);
        let next = AtomicUsize::new(0);
        let workers = self.worker_count(partitions.len());

        debug!(
            operations = history.len(),
            partitions = partitions.len(),
            workers,
            "checking history"
        );

        let (partitions, stop, next) = (&partitions, &stop, &next);
        let mut checked: Vec<(usize, PartitionInfo)> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..workers)
                .map(move |_| {
                    scope.spawn(move || {
                        let mut done = Vec::new();
                        loop {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(indices) = partitions.get(index) else {
                                break;
                            };
                            let info = check_partition(model, history, indices, deadline, stop);
                            debug!(
                                partition = index,
                                operations = info.operations.len(),
                                outcome = ?info.outcome,
                                "partition checked"
                            );
                            if self.config.stop_on_failure
                                && info.outcome == PartitionOutcome::NotLinearizable
                            {
                                stop.store(true, Ordering::Relaxed);
                            }
                            done.push((index, info));
                        }
                        done
                    })
                })
                .collect();

            handles
                .into_iter()
                .flat_map(|handle| match handle.join() {
                    Ok(done) => done,
                    Err(payload) => std::panic::resume_unwind(payload),
                })
                .collect()
        });
        checked.sort_by_key(|(index, _)| *index);

        let info = LinearizationInfo::new(checked.into_iter().map(|(_, info)| info).collect());
        let verdict = Verdict::combine(info.partitions.iter().map(|p| p.outcome));
        if verdict == Verdict::Unknown {
            warn!(?timeout, "deadline reached before the search finished");
        }

        CheckOutcome::new(verdict, info)
    }
}

/// Search one partition and translate its diagnostics to history indices
fn check_partition<M: Model>(
    model: &M,
    history: &[Operation<M::Input, M::Output>],
    indices: &[usize],
    deadline: Option<Instant>,
    stop: &AtomicBool,
) -> PartitionInfo {
    let operations: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|&i| i < history.len())
        .collect();
    let ops: Vec<&Operation<M::Input, M::Output>> =
        operations.iter().map(|&i| &history[i]).collect();

    let (outcome, partial) = search(model, &ops, deadline, stop);
    let partial_linearizations = partial
        .into_iter()
        .map(|seq| seq.into_iter().map(|id| operations[id]).collect())
        .collect();

    PartitionInfo {
        operations,
        partial_linearizations,
        outcome,
    }
}

fn should_stop(deadline: Option<Instant>, stop: &AtomicBool) -> bool {
    if stop.load(Ordering::Relaxed) {
        return true;
    }
    if deadline.is_some_and(|d| Instant::now() >= d) {
        stop.store(true, Ordering::Relaxed);
        return true;
    }
    false
}

/// Depth-first search over one partition; ids are positions in `ops`
fn search<M: Model>(
    model: &M,
    ops: &[&Operation<M::Input, M::Output>],
    deadline: Option<Instant>,
    stop: &AtomicBool,
) -> (PartitionOutcome, Vec<Vec<usize>>) {
    let mut list = EventList::new(ops);
    let mut state = model.init();
    let mut linearized: LinearizedSet = BitVec::repeat(false, ops.len());
    let mut cache: HashSet<(LinearizedSet, M::State)> = HashSet::new();
    // call node and state before it, for each linearized operation
    let mut calls: Vec<(usize, M::State)> = Vec::new();
    let mut prefix: Vec<usize> = Vec::new();
    let mut longest = Longest::new(ops.len());
    let mut cursor = list.first();
    let mut iterations: u64 = 0;

    while let Some(node) = cursor {
        iterations += 1;
        if iterations % STOP_CHECK_INTERVAL == 0 && should_stop(deadline, stop) {
            return (PartitionOutcome::Aborted, longest.finish());
        }

        let id = list.op[node];
        match list.kind[node] {
            EventKind::Call => {
                let op = ops[id];
                let (legal, next_state) = model.step(&state, &op.input, &op.output);
                if legal {
                    let mut candidate = linearized.clone();
                    candidate.set(id, true);
                    if cache.insert((candidate.clone(), next_state.clone())) {
                        calls.push((node, std::mem::replace(&mut state, next_state)));
                        prefix.push(id);
                        linearized = candidate;
                        list.lift(node);
                        cursor = list.first();
                        continue;
                    }
                }
                cursor = list.next[node];
            }
            EventKind::Return => {
                longest.record(&prefix);
                let Some((call, previous)) = calls.pop() else {
                    return (PartitionOutcome::NotLinearizable, longest.finish());
                };
                prefix.pop();
                state = previous;
                linearized.set(list.op[call], false);
                list.unlift(call);
                cursor = list.next[call];
            }
        }
    }

    longest.record(&prefix);
    (PartitionOutcome::Linearizable, longest.finish())
}

/// Calls sort before returns at the same timestamp, so touching intervals
/// are treated as concurrent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    Call,
    Return,
}

/// Doubly linked list of call/return events, stored as parallel arrays.
///
/// Node 0 is the head sentinel; node `i > 0` is the `i - 1`th event in time
/// order. Lifted nodes keep their own links so they can be restored in LIFO
/// order.
#[derive(Debug)]
struct EventList {
    op: Vec<usize>,
    kind: Vec<EventKind>,
    /// Return node of each call node
    matched: Vec<usize>,
    prev: Vec<usize>,
    next: Vec<Option<usize>>,
}

impl EventList {
    fn new<I, O>(ops: &[&Operation<I, O>]) -> Self {
        let mut events: Vec<(Timestamp, EventKind, usize)> = Vec::with_capacity(ops.len() * 2);
        for (id, op) in ops.iter().enumerate() {
            events.push((op.call, EventKind::Call, id));
            events.push((op.return_time, EventKind::Return, id));
        }
        events.sort_by_key(|&(time, kind, _)| (time, kind));

        let len = events.len() + 1;
        let mut list = Self {
            op: vec![0; len],
            kind: vec![EventKind::Call; len],
            matched: vec![HEAD; len],
            prev: vec![HEAD; len],
            next: vec![None; len],
        };

        let mut return_node = vec![HEAD; ops.len()];
        for (position, &(_, kind, id)) in events.iter().enumerate() {
            let node = position + 1;
            list.op[node] = id;
            list.kind[node] = kind;
            list.prev[node] = node - 1;
            list.next[node - 1] = Some(node);
            if kind == EventKind::Return {
                return_node[id] = node;
            }
        }
        for node in 1..len {
            if list.kind[node] == EventKind::Call {
                list.matched[node] = return_node[list.op[node]];
            }
        }
        list
    }

    fn first(&self) -> Option<usize> {
        self.next[HEAD]
    }

    fn unlink(&mut self, node: usize) {
        let (prev, next) = (self.prev[node], self.next[node]);
        self.next[prev] = next;
        if let Some(next) = next {
            self.prev[next] = prev;
        }
    }

    fn relink(&mut self, node: usize) {
        let (prev, next) = (self.prev[node], self.next[node]);
        self.next[prev] = Some(node);
        if let Some(next) = next {
            self.prev[next] = node;
        }
    }

    /// Remove a call and its return
    fn lift(&mut self, call: usize) {
        self.unlink(call);
        self.unlink(self.matched[call]);
    }

    /// Undo the most recent `lift`
    fn unlift(&mut self, call: usize) {
        self.relink(self.matched[call]);
        self.relink(call);
    }
}

/// Longest linearized prefix seen so far that contains each operation
struct Longest {
    best: Vec<Option<Rc<[usize]>>>,
}

impl Longest {
    fn new(ops: usize) -> Self {
        Self {
            best: vec![None; ops],
        }
    }

    fn record(&mut self, prefix: &[usize]) {
        let mut shared: Option<Rc<[usize]>> = None;
        for &id in prefix {
            if self.best[id]
                .as_ref()
                .is_none_or(|seq| prefix.len() > seq.len())
            {
                let seq = shared.get_or_insert_with(|| Rc::from(prefix));
                self.best[id] = Some(Rc::clone(seq));
            }
        }
    }

    /// Distinct prefixes, longest first
    fn finish(self) -> Vec<Vec<usize>> {
        let mut seen = HashSet::new();
        let mut seqs: Vec<Vec<usize>> = Vec::new();
        for seq in self.best.into_iter().flatten() {
            if seen.insert(Rc::as_ptr(&seq).cast::<usize>()) {
                seqs.push(seq.to_vec());
            }
        }
        seqs.sort();
        seqs.dedup();
        seqs.sort_by(|a, b| b.len().cmp(&a.len()));
        seqs
    }
}
