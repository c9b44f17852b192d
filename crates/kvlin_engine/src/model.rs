//! Sequential models and the operations checked against them.

use kvlin_core::{ClientId, Timestamp};

/// One completed operation of a concurrent history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation<I, O> {
    /// Issuing client, for display only
    pub client_id: ClientId,
    /// What was requested
    pub input: I,
    /// When it was invoked
    pub call: Timestamp,
    /// What was observed
    pub output: O,
    /// When the result was observed
    pub return_time: Timestamp,
}

/// Sequential behavior of an object.
///
/// The engine explores candidate orders by repeatedly calling [`Model::step`]
/// and backtracking when it returns `false`, so `step` must be pure and must
/// never panic on inputs it does not understand: it reports them illegal.
pub trait Model: Sync {
    /// Abstract state explored during the search
    type State: Clone + Eq + std::hash::Hash;
    /// Operation arguments
    type Input: Sync;
    /// Observed results
    type Output: Sync;

    /// State before any operation
    fn init(&self) -> Self::State;

    /// Apply one operation.
    ///
    /// Returns whether `output` is a legal result of `input` in `state`,
    /// and the state after it.
    fn step(
        &self,
        state: &Self::State,
        input: &Self::Input,
        output: &Self::Output,
    ) -> (bool, Self::State);

    /// Split a history into groups that can be checked independently.
    ///
    /// Each inner vector holds indices into `history`; together the groups
    /// must cover every index exactly once. The default keeps everything in
    /// one group.
    fn partition(&self, history: &[Operation<Self::Input, Self::Output>]) -> Vec<Vec<usize>> {
        vec![(0..history.len()).collect()]
    }

    /// Human-readable operation, for diagnostics only
    fn describe_operation(&self, input: &Self::Input, output: &Self::Output) -> String;

    /// Human-readable state, for diagnostics only
    fn describe_state(&self, state: &Self::State) -> String;
}

/// Replay a sequence of operations from the initial state.
///
/// Returns the final state, or the position of the first illegal step.
pub fn replay<'a, M, It>(model: &M, steps: It) -> Result<M::State, usize>
where
    M: Model,
    M::Input: 'a,
    M::Output: 'a,
    It: IntoIterator<Item = (&'a M::Input, &'a M::Output)>,
{
    let mut state = model.init();
    for (position, (input, output)) in steps.into_iter().enumerate() {
        let (legal, next) = model.step(&state, input, output);
        if !legal {
            return Err(position);
        }
        state = next;
    }
    Ok(state)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Single integer register; writes always succeed, reads must match.
    pub(crate) struct Register;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum RegOp {
        Write(u32),
        Read,
    }

    impl Model for Register {
        type State = u32;
        type Input = RegOp;
        type Output = u32;

        fn init(&self) -> u32 {
            0
        }

        fn step(&self, state: &u32, input: &RegOp, output: &u32) -> (bool, u32) {
            match input {
                RegOp::Write(v) => (true, *v),
                RegOp::Read => (output == state, *state),
            }
        }

        fn describe_operation(&self, input: &RegOp, output: &u32) -> String {
            match input {
                RegOp::Write(v) => format!("write({v})"),
                RegOp::Read => format!("read() -> {output}"),
            }
        }

        fn describe_state(&self, state: &u32) -> String {
            state.to_string()
        }
    }

    pub(crate) fn op(client: i64, input: RegOp, call: i64, output: u32, ret: i64) -> Operation<RegOp, u32> {
        Operation {
            client_id: ClientId::new(client),
            input,
            call: Timestamp::from_raw(call),
            output,
            return_time: Timestamp::from_raw(ret),
        }
    }

    #[test]
    fn test_default_partition_is_single_group() {
        let history = vec![
            op(0, RegOp::Write(1), 0, 0, 1),
            op(1, RegOp::Read, 2, 1, 3),
        ];
        assert_eq!(Register.partition(&history), vec![vec![0, 1]]);
    }

    #[test]
    fn test_replay() {
        let ops = [(RegOp::Write(4), 0), (RegOp::Read, 4), (RegOp::Read, 5)];
        let steps = ops.iter().map(|(i, o)| (i, o));
        assert_eq!(replay(&Register, steps), Err(2));

        let steps = ops[..2].iter().map(|(i, o)| (i, o));
        assert_eq!(replay(&Register, steps), Ok(4));
    }
}
