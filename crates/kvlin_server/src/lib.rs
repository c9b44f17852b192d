//! kvlin Viewer Server
//!
//! Serves one rendered report page over HTTP so it can be opened in a
//! browser. Every path answers with the page, re-read on each request.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod viewer;

pub use viewer::{ServerConfig, ServerError, ViewerServer, DEFAULT_HOST, DEFAULT_PORT};
