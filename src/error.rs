use std::io;

use thiserror::Error;

/// Result type for tracker operations.
pub type ProgressResult<T> = Result<T, ProgressError>;

/// Errors reported by a [`ProgressTracker`](crate::ProgressTracker).
///
/// Overshooting the target count is deliberately *not* an error: bursty
/// concurrent callers are expected to race past the total, and the excess is
/// clamped instead.
#[derive(Debug, Error)]
pub enum ProgressError {
    /// The target count was zero at construction or reset.
    #[error("total must be greater than zero")]
    ZeroTotal,

    /// A negative increment was passed to an update; progress is
    /// monotonically non-decreasing within a run.
    #[error("progress increment must be non-negative, got {0}")]
    NegativeProgress(i64),

    /// The render surface failed. Propagated as-is so callers don't mistake
    /// a dead output stream for silent progress.
    #[error("render surface error: {0}")]
    Io(#[from] io::Error),
}
