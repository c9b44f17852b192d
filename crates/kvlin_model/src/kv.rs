//! The key-value state machine.

use indexmap::IndexMap;
use kvlin_engine::{Model, Operation};
use kvlin_history::{Input, Output};
use std::collections::BTreeMap;

/// Abstract store contents. An absent key is distinct from an empty value.
pub type KvState = BTreeMap<String, String>;

/// Operation shape checked by [`KvModel`]
pub type KvOperation = Operation<Input, Output>;

/// Sequential semantics of the key-value store
#[derive(Debug, Clone, Copy, Default)]
pub struct KvModel;

impl KvModel {
    /// Create the model
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Model for KvModel {
    type State = KvState;
    type Input = Input;
    type Output = Output;

    fn init(&self) -> KvState {
        KvState::new()
    }

    fn step(&self, state: &KvState, input: &Input, output: &Output) -> (bool, KvState) {
        match input {
            Input::Put { key, value } => {
                let mut next = state.clone();
                next.insert(key.clone(), value.clone());
                (true, next)
            }
            Input::Get { key } => {
                let legal = output.is_ok() && output.value.as_ref() == state.get(key);
                (legal, state.clone())
            }
            Input::Delete { key } => {
                if !state.contains_key(key) {
                    return (true, state.clone());
                }
                let mut next = state.clone();
                next.remove(key);
                (true, next)
            }
        }
    }

    /// One group per key, in order of first appearance.
    ///
    /// Every input carries a key once parsed, so no operation ever lands in
    /// a keyless group.
    fn partition(&self, history: &[KvOperation]) -> Vec<Vec<usize>> {
        let mut groups: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (index, op) in history.iter().enumerate() {
            groups.entry(op.input.key()).or_default().push(index);
        }
        groups.into_values().collect()
    }

    fn describe_operation(&self, input: &Input, output: &Output) -> String {
        match input {
            Input::Put { key, value } => format!("Put('{key}', '{value}')"),
            Input::Get { key } => match (&output.status, &output.value) {
                (Some(status), _) if !output.is_ok() => format!("Get('{key}') failed: '{status}'"),
                (_, Some(value)) => format!("Get('{key}') -> '{value}'"),
                (_, None) => format!("Get('{key}') -> nil"),
            },
            Input::Delete { key } => format!("Delete('{key}')"),
        }
    }

    fn describe_state(&self, state: &KvState) -> String {
        let entries: Vec<String> = state
            .iter()
            .map(|(key, value)| format!("'{key}': '{value}'"))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}
