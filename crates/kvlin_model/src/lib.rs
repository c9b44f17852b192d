//! kvlin Key-Value Model
//!
//! Sequential semantics of a string key-value store with `Put`, `Get` and
//! `Delete`, expressed as a [`kvlin_engine::Model`]. Operations on different
//! keys never constrain each other, so histories are partitioned by key and
//! each key is checked on its own.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod kv;

pub use kv::{KvModel, KvOperation, KvState};
