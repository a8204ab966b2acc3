//! Collision-aware clipping for interactive resize
//!
//! Overlap is measured with an edge heuristic: a neighbor counts when its
//! start or end falls strictly inside the candidate range, at most once per
//! neighbor. A drag that does not increase that count is accepted as-is;
//! otherwise the proposed boundary is clipped to the nearest neighbor edge
//! between it and the pre-drag boundary.

use crate::types::{SegmentId, TimeSegment};

/// Count how often a candidate interval intersects other segments' edges
///
/// A segment counts when its start or end lies strictly inside
/// `(candidate_start, candidate_end)`; the segment being edited is excluded.
pub fn count_intersections(
    candidate_start: i64,
    candidate_end: i64,
    excluding: SegmentId,
    against: &[&TimeSegment],
) -> usize {
    let mut count = 0;
    for other in against {
        if other.id == excluding {
            continue;
        }
        if candidate_start < other.start_ms && candidate_end > other.start_ms {
            count += 1;
        } else if candidate_start < other.end_ms && candidate_end > other.end_ms {
            count += 1;
        }
    }
    count
}

/// Clip a proposed start so the segment cannot slide past a neighbor it was
/// not already overlapping
///
/// Among the other segments, finds the latest end in
/// `(proposed_start, segment.start_ms]` and clamps the proposal up to it.
pub fn clip_start(segment: &TimeSegment, proposed_start: i64, against: &[&TimeSegment]) -> i64 {
    let old_start = segment.start_ms;
    let mut clipped = proposed_start;
    for other in against {
        if other.id == segment.id {
            continue;
        }
        let end = other.end_ms;
        if end <= clipped {
            continue;
        }
        if end <= old_start && end >= proposed_start {
            clipped = end;
        }
    }
    clipped
}

/// Mirror of [`clip_start`] for the end boundary
///
/// Finds the earliest neighbor start in `[segment.end_ms, proposed_end)`
/// and clamps the proposal down to it.
pub fn clip_end(segment: &TimeSegment, proposed_end: i64, against: &[&TimeSegment]) -> i64 {
    let old_end = segment.end_ms;
    let mut clipped = proposed_end;
    for other in against {
        if other.id == segment.id {
            continue;
        }
        let start = other.start_ms;
        if start >= clipped {
            continue;
        }
        if start >= old_end && start <= proposed_end {
            clipped = start;
        }
    }
    clipped
}

/// Resolve a proposed new start against the visible segments
///
/// Returns the boundary to commit, or None when the edit is rejected
/// (inverted interval) or clipping found nothing better than the status quo.
pub fn resolve_start(
    segment: &TimeSegment,
    proposed_start: i64,
    against: &[&TimeSegment],
) -> Option<i64> {
    if proposed_start > segment.end_ms {
        log::debug!(
            "segment {}: start {} would pass end {}, skipping edit",
            segment.id,
            proposed_start,
            segment.end_ms
        );
        return None;
    }
    let before = count_intersections(segment.start_ms, segment.end_ms, segment.id, against);
    let after = count_intersections(proposed_start, segment.end_ms, segment.id, against);
    if after <= before {
        return Some(proposed_start);
    }
    let clipped = clip_start(segment, proposed_start, against);
    (clipped != proposed_start).then_some(clipped)
}

/// Resolve a proposed new end against the visible segments
pub fn resolve_end(
    segment: &TimeSegment,
    proposed_end: i64,
    against: &[&TimeSegment],
) -> Option<i64> {
    if proposed_end < segment.start_ms {
        log::debug!(
            "segment {}: end {} would pass start {}, skipping edit",
            segment.id,
            proposed_end,
            segment.start_ms
        );
        return None;
    }
    let before = count_intersections(segment.start_ms, segment.end_ms, segment.id, against);
    let after = count_intersections(segment.start_ms, proposed_end, segment.id, against);
    if after <= before {
        return Some(proposed_end);
    }
    let clipped = clip_end(segment, proposed_end, against);
    (clipped != proposed_end).then_some(clipped)
}
