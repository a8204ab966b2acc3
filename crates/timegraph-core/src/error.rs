//! Timeline engine error types

use crate::types::SegmentId;
use thiserror::Error;

/// Errors that can occur inside the timeline engine
///
/// All variants are local and recoverable: the operation that triggered the
/// error is rejected and the visual/model state is left unchanged.
#[derive(Error, Debug)]
pub enum TimeGraphError {
    /// Interval with end before start, rejected at the index boundary
    #[error("inverted interval: end {end_ms} is before start {start_ms}")]
    InvalidInterval { start_ms: i64, end_ms: i64 },

    /// Interval covering more bins than the index will materialize
    #[error("interval [{start_ms}, {end_ms}] spans too many bins to index")]
    OversizedInterval { start_ms: i64, end_ms: i64 },

    /// Write-back affecting a segment id no longer tracked (e.g. deleted)
    #[error("segment {0} is no longer tracked")]
    StaleSegment(SegmentId),

    /// Zoom would drive scale to zero/infinity; the viewport clamps instead
    #[error("zoom would produce a degenerate scale: {0}")]
    DegenerateScale(f64),

    /// The collaborator store refused a boundary update
    #[error("store rejected the update for segment {0}")]
    WriteBackRejected(SegmentId),
}

/// Result type for engine operations
pub type TimeGraphResult<T> = Result<T, TimeGraphError>;
