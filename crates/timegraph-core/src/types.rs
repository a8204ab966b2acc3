//! Core types shared across the timeline engine
//!
//! Segments are owned by the collaborator store; the engine only mirrors
//! them and references them by id inside the bin index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for a time segment, assigned by the collaborator store
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SegmentId(pub u64);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single tracked time interval
///
/// `start_ms`/`end_ms` are integer epoch milliseconds. Committed segments
/// always satisfy `start_ms <= end_ms`; transient drag states may propose an
/// inverted interval and are rejected before commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSegment {
    /// Store-owned identifier
    pub id: SegmentId,
    /// Interval start, epoch milliseconds
    pub start_ms: i64,
    /// Interval end, epoch milliseconds
    pub end_ms: i64,
    /// Display-only label
    pub label: String,
}

impl TimeSegment {
    /// Create a segment
    pub fn new(id: SegmentId, start_ms: i64, end_ms: i64, label: impl Into<String>) -> Self {
        Self {
            id,
            start_ms,
            end_ms,
            label: label.into(),
        }
    }

    /// Interval length in milliseconds (negative while inverted)
    pub fn duration_ms(&self) -> i64 {
        self.end_ms - self.start_ms
    }

    /// True if the interval violates the committed `start <= end` invariant
    pub fn is_inverted(&self) -> bool {
        self.end_ms < self.start_ms
    }

    /// True if the interval touches the closed time range `[t0, t1]`
    pub fn overlaps(&self, t0: i64, t1: i64) -> bool {
        self.end_ms >= t0 && self.start_ms <= t1
    }
}

/// Screen-space point for pointer events
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Malformed pointer input (NaN/infinite coordinates) is dropped
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
