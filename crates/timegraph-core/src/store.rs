//! Collaborator store contract
//!
//! The persistence layer owns segment data and durability. The engine only
//! proposes edits through write-back calls and reverts its optimistic local
//! state when the store refuses.

use crate::error::{TimeGraphError, TimeGraphResult};
use crate::types::{SegmentId, TimeSegment};
use std::collections::HashMap;

/// Write-back interface to the persistence layer
pub trait SegmentStore {
    /// Persist new boundaries for a segment
    fn update_boundary(
        &mut self,
        id: SegmentId,
        new_start_ms: i64,
        new_end_ms: i64,
    ) -> TimeGraphResult<()>;

    /// Persist a new display label for a segment
    fn update_label(&mut self, id: SegmentId, label: &str) -> TimeGraphResult<()>;
}

/// In-memory store for tests and standalone hosts
#[derive(Debug, Default)]
pub struct MemoryStore {
    segments: HashMap<SegmentId, TimeSegment>,
    /// When set, every write-back is refused (failure-path testing)
    refuse_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, segment: TimeSegment) {
        self.segments.insert(segment.id, segment);
    }

    pub fn get(&self, id: SegmentId) -> Option<&TimeSegment> {
        self.segments.get(&id)
    }

    /// Current segment list, the shape the engine's `reload` consumes
    pub fn list(&self) -> Vec<TimeSegment> {
        self.segments.values().cloned().collect()
    }

    pub fn set_refuse_writes(&mut self, refuse: bool) {
        self.refuse_writes = refuse;
    }
}

impl SegmentStore for MemoryStore {
    fn update_boundary(
        &mut self,
        id: SegmentId,
        new_start_ms: i64,
        new_end_ms: i64,
    ) -> TimeGraphResult<()> {
        if self.refuse_writes {
            return Err(TimeGraphError::WriteBackRejected(id));
        }
        let segment = self
            .segments
            .get_mut(&id)
            .ok_or(TimeGraphError::StaleSegment(id))?;
        if new_end_ms < new_start_ms {
            return Err(TimeGraphError::InvalidInterval {
                start_ms: new_start_ms,
                end_ms: new_end_ms,
            });
        }
        segment.start_ms = new_start_ms;
        segment.end_ms = new_end_ms;
        Ok(())
    }

    fn update_label(&mut self, id: SegmentId, label: &str) -> TimeGraphResult<()> {
        if self.refuse_writes {
            return Err(TimeGraphError::WriteBackRejected(id));
        }
        let segment = self
            .segments
            .get_mut(&id)
            .ok_or(TimeGraphError::StaleSegment(id))?;
        segment.label = label.to_string();
        Ok(())
    }
}
