//! Temporal bin index for fast viewport queries
//!
//! Segments are mapped into fixed-size time bins keyed by
//! `div_euclid(time, bin_size)`. Range queries union the covered bins, so
//! they may over-return; callers re-check exact overlap when it matters.
//! Bin size tracks the viewport (one bin roughly spans a viewport width),
//! and the whole index is rebuilt when it changes — bin boundaries are not
//! stable across rescales.

use crate::error::{TimeGraphError, TimeGraphResult};
use crate::types::{SegmentId, TimeSegment};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Smallest permitted bin size in milliseconds
pub const MIN_BIN_SIZE_MS: i64 = 1;

/// Hard cap on bins materialized per segment
///
/// A bin roughly spans a viewport width, so any real segment covers a
/// handful of bins; the cap keeps a pathological interval from allocating
/// an unbounded number of them.
pub const MAX_BINS_PER_SEGMENT: i64 = 1 << 20;

/// Mutable spatial index mapping time bins to overlapping segments
#[derive(Debug)]
pub struct TemporalBinIndex {
    bin_size_ms: i64,
    bins: BTreeMap<i64, HashSet<SegmentId>>,
    /// Last-known bin key range per segment, for O(range) removal
    ranges: HashMap<SegmentId, (i64, i64)>,
}

impl TemporalBinIndex {
    pub fn new(bin_size_ms: i64) -> Self {
        Self {
            bin_size_ms: bin_size_ms.max(MIN_BIN_SIZE_MS),
            bins: BTreeMap::new(),
            ranges: HashMap::new(),
        }
    }

    /// Derive the bin size for a viewport: inversely proportional to scale
    /// so that one bin roughly spans one viewport width
    pub fn bin_size_for(scale: f64, width_px: f64) -> i64 {
        if !scale.is_finite() || scale <= 0.0 || !width_px.is_finite() || width_px <= 0.0 {
            return MIN_BIN_SIZE_MS;
        }
        let span = width_px / scale;
        if span >= i64::MAX as f64 {
            return i64::MAX;
        }
        (span as i64).max(MIN_BIN_SIZE_MS)
    }

    pub fn bin_size_ms(&self) -> i64 {
        self.bin_size_ms
    }

    /// Number of indexed segments
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn contains(&self, id: SegmentId) -> bool {
        self.ranges.contains_key(&id)
    }

    /// Bin keys covered by a segment: end bin gets one bin of slack so
    /// segments exactly at a boundary are found
    fn key_range(&self, start_ms: i64, end_ms: i64) -> (i64, i64) {
        let start_key = start_ms.div_euclid(self.bin_size_ms);
        let end_key = end_ms.div_euclid(self.bin_size_ms).saturating_add(1);
        (start_key, end_key)
    }

    /// Reject intervals the index will not place: inverted bounds, or a
    /// span covering more than [`MAX_BINS_PER_SEGMENT`] bins
    fn check_placement(&self, segment: &TimeSegment) -> TimeGraphResult<()> {
        if segment.is_inverted() {
            return Err(TimeGraphError::InvalidInterval {
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
            });
        }
        let (start_key, end_key) = self.key_range(segment.start_ms, segment.end_ms);
        if end_key.saturating_sub(start_key) > MAX_BINS_PER_SEGMENT {
            return Err(TimeGraphError::OversizedInterval {
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
            });
        }
        Ok(())
    }

    /// Add a segment to every bin it overlaps, creating bins lazily
    ///
    /// Rejects inverted or oversized intervals without touching the index.
    pub fn insert(&mut self, segment: &TimeSegment) -> TimeGraphResult<()> {
        self.check_placement(segment)?;
        let (start_key, end_key) = self.key_range(segment.start_ms, segment.end_ms);
        for key in start_key..=end_key {
            self.bins.entry(key).or_default().insert(segment.id);
        }
        self.ranges.insert(segment.id, (start_key, end_key));
        Ok(())
    }

    /// Erase a segment from every bin it occupies
    ///
    /// Returns false for ids the index does not track.
    pub fn remove(&mut self, id: SegmentId) -> bool {
        let Some((start_key, end_key)) = self.ranges.remove(&id) else {
            return false;
        };
        for key in start_key..=end_key {
            if let Some(bin) = self.bins.get_mut(&key) {
                bin.remove(&id);
                if bin.is_empty() {
                    self.bins.remove(&key);
                }
            }
        }
        true
    }

    /// Re-bin a segment after a boundary mutation
    ///
    /// Equivalent to remove + insert with the new bounds; an unplaceable
    /// interval is rejected before anything is removed.
    pub fn update(&mut self, segment: &TimeSegment) -> TimeGraphResult<()> {
        self.check_placement(segment)?;
        self.remove(segment.id);
        self.insert(segment)
    }

    /// Union of segments in bins overlapping `[t0, t1]`, in discovery order
    ///
    /// May over-return because bins are coarser than exact intervals.
    pub fn query_range(&self, t0: i64, t1: i64) -> Vec<SegmentId> {
        if t1 < t0 {
            return Vec::new();
        }
        let start_key = t0.div_euclid(self.bin_size_ms);
        let end_key = t1.div_euclid(self.bin_size_ms);
        let mut seen = HashSet::new();
        let mut found = Vec::new();
        for (_, bin) in self.bins.range(start_key..=end_key) {
            for &id in bin {
                if seen.insert(id) {
                    found.push(id);
                }
            }
        }
        found
    }

    /// Clear all bins and reinsert; called whenever the bin size changes
    pub fn rebuild<'a>(
        &mut self,
        segments: impl IntoIterator<Item = &'a TimeSegment>,
        new_bin_size_ms: i64,
    ) {
        self.bin_size_ms = new_bin_size_ms.max(MIN_BIN_SIZE_MS);
        self.bins.clear();
        self.ranges.clear();
        for segment in segments {
            if let Err(e) = self.insert(segment) {
                log::warn!("rebuild: skipping segment {}: {}", segment.id, e);
            }
        }
        log::debug!(
            "rebuilt bin index: {} segments, bin size {}ms",
            self.ranges.len(),
            self.bin_size_ms
        );
    }
}
