//! kvlin Checking Engine
//!
//! Decides whether a history of concurrent operations is linearizable with
//! respect to a sequential [`Model`]. Callers supply the model, the
//! operations with their call/return timestamps, and an optional deadline;
//! the engine answers with a [`Verdict`] and the partial linearizations it
//! found, which [`visualize`] renders as an HTML page.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod checker;
pub mod info;
pub mod model;
pub mod visualize;
pub mod wgl;

pub use checker::{CheckOutcome, Checker};
pub use info::{LinearizationInfo, PartitionInfo, PartitionOutcome, Verdict};
pub use model::{replay, Model, Operation};
pub use visualize::{visualize, RenderError};
pub use wgl::{WglChecker, WglConfig};
