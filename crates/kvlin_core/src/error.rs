//! Core error types for kvlin.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// An operation returned before it was called
    #[error("invalid interval: return {return_time} precedes call {call}")]
    InvertedInterval {
        /// Call timestamp
        call: i64,
        /// Return timestamp
        return_time: i64,
    },
}
