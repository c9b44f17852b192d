//! kvlin Core Types
//!
//! Pure types shared by every kvlin crate. No I/O happens here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;
pub mod time;

pub use error::{CoreError, CoreResult};
pub use id::ClientId;
pub use time::{Interval, Timestamp};
