//! Timeline engine composition root
//!
//! Owns the viewport, the bin index, and the visible-segment set. The
//! collaborator store pushes segment notifications in; the engine emits
//! render commands out and proposes boundary edits back to the store.
//!
//! Everything runs on the host's single event-processing thread: no
//! operation blocks, there is no internal queue or locking, and hosts with
//! background data loads marshal notifications onto the owning thread
//! before calling in.

use crate::bins::TemporalBinIndex;
use crate::config::TimeGraphConfig;
use crate::drag::{DragController, DragMode, DragRequest};
use crate::error::{TimeGraphError, TimeGraphResult};
use crate::overlap;
use crate::render::RenderSurface;
use crate::store::SegmentStore;
use crate::ticks::TickStepCalculator;
use crate::types::{Point, SegmentId, TimeSegment};
use crate::viewport::Viewport;
use chrono::{Local, TimeZone};
use std::collections::{HashMap, HashSet};

/// Which boundary of a segment a resize targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResizeEdge {
    Start,
    End,
}

/// Interactive timeline engine
///
/// Generic over the collaborator store (write-backs) and the render surface
/// (command sink); both are owned for the engine's lifetime.
pub struct TimelineEngine<S: SegmentStore, R: RenderSurface> {
    config: TimeGraphConfig,
    viewport: Viewport,
    index: TemporalBinIndex,
    /// Engine-side mirror of store-owned segments, keyed by id
    segments: HashMap<SegmentId, TimeSegment>,
    /// Currently visible segments in discovery order
    visible: Vec<SegmentId>,
    visible_set: HashSet<SegmentId>,
    drag: DragController,
    /// While bound, the rightmost visible time tracks the latest segment
    /// end; any manual pan unbinds
    follow_latest: bool,
    store: S,
    surface: R,
}

impl<S: SegmentStore, R: RenderSurface> TimelineEngine<S, R> {
    /// Create an engine over an empty segment set
    ///
    /// Follow-latest starts bound, so the first segments scroll into view;
    /// it stays bound until the user pans.
    pub fn new(config: TimeGraphConfig, width_px: f64, store: S, surface: R) -> Self {
        let config = config.validated();
        let viewport = Viewport::new(&config, width_px);
        let bin_size = TemporalBinIndex::bin_size_for(viewport.scale(), viewport.width_px());
        Self {
            config,
            viewport,
            index: TemporalBinIndex::new(bin_size),
            segments: HashMap::new(),
            visible: Vec::new(),
            visible_set: HashSet::new(),
            drag: DragController::new(),
            follow_latest: true,
            store,
            surface,
        }
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    pub fn segment(&self, id: SegmentId) -> Option<&TimeSegment> {
        self.segments.get(&id)
    }

    /// Visible segment ids in discovery order
    pub fn visible_segments(&self) -> &[SegmentId] {
        &self.visible
    }

    pub fn drag_mode(&self) -> DragMode {
        self.drag.mode()
    }

    pub fn is_following_latest(&self) -> bool {
        self.follow_latest
    }

    // --- store-driven notifications -------------------------------------

    /// Replace the whole segment set with the store's current list
    pub fn reload(&mut self, segments: impl IntoIterator<Item = TimeSegment>) {
        for &id in &self.visible {
            self.surface.remove_visual(id);
        }
        self.visible.clear();
        self.visible_set.clear();
        self.segments.clear();
        for segment in segments {
            if segment.is_inverted() {
                log::warn!("reload: skipping inverted segment {}", segment.id);
                continue;
            }
            self.segments.insert(segment.id, segment);
        }
        let bin_size =
            TemporalBinIndex::bin_size_for(self.viewport.scale(), self.viewport.width_px());
        self.index.rebuild(self.segments.values(), bin_size);
        if self.follow_latest {
            self.apply_follow();
        }
        self.refresh_visible();
        self.redraw_ticks();
    }

    /// The store reported a new segment
    pub fn add_segment(&mut self, segment: TimeSegment) -> TimeGraphResult<()> {
        if segment.is_inverted() {
            return Err(TimeGraphError::InvalidInterval {
                start_ms: segment.start_ms,
                end_ms: segment.end_ms,
            });
        }
        // re-announcement of a known id replaces the old interval
        if self.segments.contains_key(&segment.id) {
            self.remove_segment(segment.id);
        }
        self.index.insert(&segment)?;
        let snapshot = segment.clone();
        self.segments.insert(segment.id, segment);
        if self.follow_latest {
            self.apply_follow();
            self.after_viewport_change();
        } else {
            self.sync_visibility(&snapshot);
        }
        Ok(())
    }

    /// The store reported a segment removal
    ///
    /// Unknown ids are a logged no-op, not an error: the segment may have
    /// been removed concurrently through another view.
    pub fn remove_segment(&mut self, id: SegmentId) -> bool {
        if self.segments.remove(&id).is_none() {
            log::debug!("remove for untracked segment {}, ignoring", id);
            return false;
        }
        self.index.remove(id);
        if self.visible_set.remove(&id) {
            self.visible.retain(|&visible_id| visible_id != id);
            self.surface.remove_visual(id);
        }
        // the removed segment may have carried the latest end
        if self.follow_latest {
            self.apply_follow();
            self.after_viewport_change();
        }
        true
    }

    /// The store reported an external boundary edit (e.g. another view)
    pub fn segment_boundary_changed(
        &mut self,
        id: SegmentId,
        new_start_ms: i64,
        new_end_ms: i64,
    ) -> TimeGraphResult<()> {
        if new_end_ms < new_start_ms {
            return Err(TimeGraphError::InvalidInterval {
                start_ms: new_start_ms,
                end_ms: new_end_ms,
            });
        }
        if !self.segments.contains_key(&id) {
            log::debug!("boundary change for untracked segment {}, ignoring", id);
            return Err(TimeGraphError::StaleSegment(id));
        }
        self.apply_local_boundary(id, new_start_ms, new_end_ms);
        if self.follow_latest {
            self.apply_follow();
            self.after_viewport_change();
        }
        Ok(())
    }

    /// Rename a segment, writing through to the store first
    pub fn rename_segment(&mut self, id: SegmentId, label: &str) -> TimeGraphResult<()> {
        if !self.segments.contains_key(&id) {
            return Err(TimeGraphError::StaleSegment(id));
        }
        self.store.update_label(id, label)?;
        let snapshot = match self.segments.get_mut(&id) {
            Some(segment) => {
                segment.label = label.to_string();
                segment.clone()
            }
            None => return Err(TimeGraphError::StaleSegment(id)),
        };
        if self.visible_set.contains(&id) {
            // the label only travels on the add command
            self.surface.remove_visual(id);
            let x = self.viewport.x_at(snapshot.start_ms);
            let width = self.viewport.scale() * snapshot.duration_ms() as f64;
            self.surface.add_visual(id, x, width, &snapshot.label);
        }
        Ok(())
    }

    // --- viewport commands ----------------------------------------------

    pub fn zoom_by(&mut self, steps: i32) {
        self.viewport.zoom_by(steps);
        if self.follow_latest {
            self.apply_follow();
        }
        self.after_viewport_change();
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(1);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(-1);
    }

    pub fn zoom_reset(&mut self) {
        self.viewport.zoom_reset();
        if self.follow_latest {
            self.apply_follow();
        }
        self.after_viewport_change();
    }

    /// Manual pan; unbinds follow-latest
    pub fn pan_by(&mut self, delta_px: f64) {
        self.follow_latest = false;
        self.viewport.pan_by(delta_px);
        self.after_viewport_change();
    }

    pub fn resize_width(&mut self, new_width_px: f64) {
        self.viewport.resize_width(new_width_px);
        if self.follow_latest {
            self.apply_follow();
        }
        self.after_viewport_change();
    }

    /// Center the viewport on a time; unbinds follow-latest
    pub fn jump_to_time(&mut self, time_ms: i64) {
        self.follow_latest = false;
        self.viewport.center_on(time_ms);
        self.after_viewport_change();
    }

    /// Bind the pan so the rightmost visible time tracks the latest
    /// segment end, until the user pans manually
    pub fn jump_to_latest(&mut self) {
        self.follow_latest = true;
        self.apply_follow();
        self.after_viewport_change();
    }

    // --- pointer input ---------------------------------------------------

    /// The background was hit; subsequent drags pan
    pub fn begin_pan(&mut self) {
        self.drag.begin_pan();
    }

    /// A start-side resize handle was hit
    pub fn begin_resize_start(&mut self, id: SegmentId) -> TimeGraphResult<()> {
        if !self.segments.contains_key(&id) {
            return Err(TimeGraphError::StaleSegment(id));
        }
        self.drag.begin_resize_start(id);
        Ok(())
    }

    /// An end-side resize handle was hit
    pub fn begin_resize_end(&mut self, id: SegmentId) -> TimeGraphResult<()> {
        if !self.segments.contains_key(&id) {
            return Err(TimeGraphError::StaleSegment(id));
        }
        self.drag.begin_resize_end(id);
        Ok(())
    }

    pub fn pointer_down(&mut self, pos: Point) {
        self.drag.pointer_down(pos);
    }

    pub fn pointer_move(&mut self, pos: Point) {
        match self.drag.pointer_move(pos, &self.viewport) {
            None => {}
            Some(DragRequest::Pan { delta_x }) => {
                self.follow_latest = false;
                self.viewport.pan_by(delta_x);
                self.after_viewport_change();
            }
            Some(DragRequest::MoveStart { id, time_ms }) => {
                self.apply_resize(id, ResizeEdge::Start, time_ms);
            }
            Some(DragRequest::MoveEnd { id, time_ms }) => {
                self.apply_resize(id, ResizeEdge::End, time_ms);
            }
        }
    }

    pub fn pointer_up(&mut self, pos: Point) {
        self.drag.pointer_up(pos);
    }

    // --- internals -------------------------------------------------------

    /// Run the accept-or-clip rule for a dragged boundary and commit
    fn apply_resize(&mut self, id: SegmentId, edge: ResizeEdge, time_ms: i64) {
        let Some(target) = self.segments.get(&id).cloned() else {
            log::warn!("resize for untracked segment {}, ignoring", id);
            return;
        };
        let resolved = {
            let visible: Vec<&TimeSegment> = self
                .visible
                .iter()
                .filter(|&&visible_id| visible_id != id)
                .filter_map(|visible_id| self.segments.get(visible_id))
                .collect();
            match edge {
                ResizeEdge::Start => overlap::resolve_start(&target, time_ms, &visible),
                ResizeEdge::End => overlap::resolve_end(&target, time_ms, &visible),
            }
        };
        let Some(value) = resolved else { return };
        let (new_start, new_end) = match edge {
            ResizeEdge::Start => (value, target.end_ms),
            ResizeEdge::End => (target.start_ms, value),
        };
        if (new_start, new_end) == (target.start_ms, target.end_ms) {
            return;
        }
        self.commit_boundary(id, (target.start_ms, target.end_ms), (new_start, new_end));
    }

    /// Optimistically apply a boundary, then write back; roll back on refusal
    fn commit_boundary(&mut self, id: SegmentId, old: (i64, i64), new: (i64, i64)) {
        self.apply_local_boundary(id, new.0, new.1);
        if let Err(e) = self.store.update_boundary(id, new.0, new.1) {
            log::warn!(
                "store rejected boundary update for segment {}: {}; rolling back",
                id,
                e
            );
            self.apply_local_boundary(id, old.0, old.1);
        }
    }

    /// Mutate the mirror, re-bin, and sync the segment's visual
    fn apply_local_boundary(&mut self, id: SegmentId, start_ms: i64, end_ms: i64) {
        let snapshot = match self.segments.get_mut(&id) {
            Some(segment) => {
                segment.start_ms = start_ms;
                segment.end_ms = end_ms;
                segment.clone()
            }
            None => {
                log::debug!("boundary update for untracked segment {}, ignoring", id);
                return;
            }
        };
        if let Err(e) = self.index.update(&snapshot) {
            log::warn!("re-bin failed for segment {}: {}", id, e);
        }
        self.sync_visibility(&snapshot);
    }

    /// Diff one segment's visibility against the current window
    fn sync_visibility(&mut self, segment: &TimeSegment) {
        let t0 = self.viewport.visible_start();
        let t1 = self.viewport.visible_end();
        let now_visible = segment.overlaps(t0, t1);
        let was_visible = self.visible_set.contains(&segment.id);
        let x = self.viewport.x_at(segment.start_ms);
        let width = self.viewport.scale() * segment.duration_ms() as f64;
        match (was_visible, now_visible) {
            (false, true) => {
                self.surface.add_visual(segment.id, x, width, &segment.label);
                self.visible.push(segment.id);
                self.visible_set.insert(segment.id);
            }
            (true, true) => self.surface.update_visual(segment.id, x, width),
            (true, false) => {
                self.surface.remove_visual(segment.id);
                self.visible.retain(|&visible_id| visible_id != segment.id);
                self.visible_set.remove(&segment.id);
            }
            (false, false) => {}
        }
    }

    /// Pin the rightmost visible time to the latest segment end
    fn apply_follow(&mut self) {
        let Some(latest) = self.segments.values().map(|segment| segment.end_ms).max() else {
            return;
        };
        let pan = self.viewport.width_px() - self.viewport.scale() * latest as f64;
        self.viewport.set_pan_offset(pan);
    }

    /// Re-derive bins, visible set, and ticks after any viewport change
    fn after_viewport_change(&mut self) {
        let bin_size =
            TemporalBinIndex::bin_size_for(self.viewport.scale(), self.viewport.width_px());
        if bin_size != self.index.bin_size_ms() {
            self.index.rebuild(self.segments.values(), bin_size);
        }
        self.refresh_visible();
        self.redraw_ticks();
    }

    /// Recompute the visible set and emit a render diff
    ///
    /// Bins over-return, so candidates are re-checked for exact overlap.
    /// Commands go out in discovery order; removals first.
    fn refresh_visible(&mut self) {
        let t0 = self.viewport.visible_start();
        let t1 = self.viewport.visible_end();
        let mut next = Vec::new();
        let mut next_set = HashSet::new();
        for id in self.index.query_range(t0, t1) {
            if let Some(segment) = self.segments.get(&id) {
                if segment.overlaps(t0, t1) {
                    next.push(id);
                    next_set.insert(id);
                }
            }
        }
        for &id in &self.visible {
            if !next_set.contains(&id) {
                self.surface.remove_visual(id);
            }
        }
        for &id in &next {
            let Some(segment) = self.segments.get(&id) else {
                continue;
            };
            let x = self.viewport.x_at(segment.start_ms);
            let width = self.viewport.scale() * segment.duration_ms() as f64;
            if self.visible_set.contains(&id) {
                self.surface.update_visual(id, x, width);
            } else {
                self.surface.add_visual(id, x, width, &segment.label);
            }
        }
        log::debug!(
            "visible set: {} -> {} segments in [{}, {}]",
            self.visible.len(),
            next.len(),
            t0,
            t1
        );
        self.visible = next;
        self.visible_set = next_set;
    }

    /// Redraw all visible axis ticks for the current scale
    fn redraw_ticks(&mut self) {
        self.surface.clear_ticks();
        let step =
            TickStepCalculator::ticks_step(self.config.min_tick_spacing_px, self.viewport.scale());
        if step <= 0 {
            return;
        }
        // the visible range saturates near i64::MAX after extreme jumps, so
        // the tick bounds have to as well
        let first = step.saturating_mul(self.viewport.visible_start().div_euclid(step));
        let last = step.saturating_mul(
            self.viewport.visible_end().div_euclid(step).saturating_add(1),
        );
        let mut tick = first;
        while tick <= last {
            let label = self.format_tick(tick);
            self.surface.draw_tick(self.viewport.x_at(tick), &label);
            match tick.checked_add(step) {
                Some(next) => tick = next,
                None => break,
            }
        }
    }

    fn format_tick(&self, time_ms: i64) -> String {
        match Local.timestamp_millis_opt(time_ms).single() {
            Some(datetime) => datetime.format(&self.config.tick_label_format).to_string(),
            None => time_ms.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{RecordingSurface, RenderCommand};
    use crate::store::MemoryStore;

    /// 1 px/ms, 1000px wide: the window shows [pan-relative] 1000ms
    fn engine() -> TimelineEngine<MemoryStore, RecordingSurface> {
        let config = TimeGraphConfig {
            default_scale: 1.0,
            ..TimeGraphConfig::default()
        };
        TimelineEngine::new(config, 1_000.0, MemoryStore::new(), RecordingSurface::new())
    }

    /// Engine with follow-latest unbound and pan at 0 (window [0, 1000])
    fn static_engine() -> TimelineEngine<MemoryStore, RecordingSurface> {
        let mut eng = engine();
        eng.pan_by(0.0);
        eng.surface_mut().clear();
        eng
    }

    fn seg(id: u64, start: i64, end: i64) -> TimeSegment {
        TimeSegment::new(SegmentId(id), start, end, format!("seg-{id}"))
    }

    /// Add a segment to the store and announce it to the engine
    fn add(eng: &mut TimelineEngine<MemoryStore, RecordingSurface>, segment: TimeSegment) {
        eng.store_mut().insert(segment.clone());
        eng.add_segment(segment).expect("add");
    }

    #[test]
    fn test_add_segment_in_range_emits_add() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        assert_eq!(
            eng.surface().commands,
            vec![RenderCommand::AddVisual {
                id: SegmentId(1),
                x_px: 100.0,
                width_px: 200.0,
                label: "seg-1".to_string(),
            }]
        );
        assert_eq!(eng.visible_segments(), &[SegmentId(1)]);
    }

    #[test]
    fn test_add_segment_out_of_range_emits_nothing() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 5_000, 6_000)).expect("add");
        assert!(eng.surface().commands.is_empty());
        assert!(eng.visible_segments().is_empty());
    }

    #[test]
    fn test_add_inverted_segment_rejected() {
        let mut eng = static_engine();
        assert!(matches!(
            eng.add_segment(seg(1, 300, 100)),
            Err(TimeGraphError::InvalidInterval { .. })
        ));
        assert!(eng.segment(SegmentId(1)).is_none());
    }

    #[test]
    fn test_remove_segment_emits_remove() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        eng.surface_mut().clear();
        assert!(eng.remove_segment(SegmentId(1)));
        assert_eq!(
            eng.surface().commands,
            vec![RenderCommand::RemoveVisual { id: SegmentId(1) }]
        );
        // stale removal is a no-op
        assert!(!eng.remove_segment(SegmentId(1)));
        assert_eq!(eng.surface().commands.len(), 1);
    }

    #[test]
    fn test_follow_latest_tracks_newest_end() {
        let mut eng = engine();
        assert!(eng.is_following_latest());
        eng.add_segment(seg(1, 500_000, 600_000)).expect("add");
        // rightmost visible time sits on the latest end
        assert_eq!(eng.viewport().visible_end(), 600_000);
        assert_eq!(eng.visible_segments(), &[SegmentId(1)]);
        // a later segment drags the window along
        eng.add_segment(seg(2, 700_000, 800_000)).expect("add");
        assert_eq!(eng.viewport().visible_end(), 800_000);
    }

    #[test]
    fn test_follow_latest_retracts_on_removal() {
        let mut eng = engine();
        eng.add_segment(seg(1, 500_000, 600_000)).expect("add");
        eng.add_segment(seg(2, 700_000, 800_000)).expect("add");
        assert_eq!(eng.viewport().visible_end(), 800_000);
        // removing the segment with the latest end snaps back to the next one
        assert!(eng.remove_segment(SegmentId(2)));
        assert_eq!(eng.viewport().visible_end(), 600_000);
        assert_eq!(eng.visible_segments(), &[SegmentId(1)]);
        // removing the last segment leaves the window where it was
        assert!(eng.remove_segment(SegmentId(1)));
        assert_eq!(eng.viewport().visible_end(), 600_000);
    }

    #[test]
    fn test_manual_pan_unbinds_follow() {
        let mut eng = engine();
        eng.jump_to_latest();
        assert!(eng.is_following_latest());
        eng.pan_by(10.0);
        assert!(!eng.is_following_latest());
        eng.jump_to_latest();
        assert!(eng.is_following_latest());
    }

    #[test]
    fn test_pointer_pan_unbinds_follow() {
        let mut eng = engine();
        eng.begin_pan();
        eng.pointer_down(Point::new(100.0, 0.0));
        eng.pointer_move(Point::new(150.0, 0.0));
        assert!(!eng.is_following_latest());
    }

    #[test]
    fn test_boundary_change_updates_visual() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        eng.surface_mut().clear();
        eng.segment_boundary_changed(SegmentId(1), 100, 400)
            .expect("change");
        assert_eq!(
            eng.surface().commands,
            vec![RenderCommand::UpdateVisual {
                id: SegmentId(1),
                x_px: 100.0,
                width_px: 300.0,
            }]
        );
        // moving fully out of range erases the visual
        eng.surface_mut().clear();
        eng.segment_boundary_changed(SegmentId(1), 5_000, 6_000)
            .expect("change");
        assert_eq!(
            eng.surface().commands,
            vec![RenderCommand::RemoveVisual { id: SegmentId(1) }]
        );
        assert!(eng.visible_segments().is_empty());
    }

    #[test]
    fn test_boundary_change_rejects_inversion_and_stale() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        assert!(matches!(
            eng.segment_boundary_changed(SegmentId(1), 400, 300),
            Err(TimeGraphError::InvalidInterval { .. })
        ));
        assert!(matches!(
            eng.segment_boundary_changed(SegmentId(9), 0, 10),
            Err(TimeGraphError::StaleSegment(_))
        ));
        let segment = eng.segment(SegmentId(1)).expect("segment");
        assert_eq!((segment.start_ms, segment.end_ms), (100, 300));
    }

    #[test]
    fn test_pan_emits_visible_diff() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        eng.add_segment(seg(2, 5_000, 6_000)).expect("add");
        eng.surface_mut().clear();
        // pan left by 5000px: window becomes [5000, 6000]
        eng.pan_by(-5_000.0);
        let removed = eng.surface().removed_ids();
        let added = eng.surface().added_ids();
        assert_eq!(removed, vec![SegmentId(1)]);
        assert_eq!(added, vec![SegmentId(2)]);
        assert_eq!(eng.visible_segments(), &[SegmentId(2)]);
    }

    #[test]
    fn test_ticks_redrawn_on_viewport_change() {
        let mut eng = static_engine();
        eng.surface_mut().clear();
        eng.pan_by(0.0);
        // 1px/ms, 100px min spacing -> 1s step; window [0,1000] plus the
        // slack tick -> 0, 1000, 2000
        assert_eq!(eng.surface().tick_count(), 3);
        let ticks: Vec<f64> = eng
            .surface()
            .commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::DrawTick { x_px, .. } => Some(*x_px),
                _ => None,
            })
            .collect();
        assert_eq!(ticks, vec![0.0, 1_000.0, 2_000.0]);
    }

    #[test]
    fn test_zoom_in_out_round_trips_scale() {
        let mut eng = static_engine();
        let scale = eng.viewport().scale();
        eng.zoom_by(3);
        eng.zoom_by(-3);
        assert!((eng.viewport().scale() - scale).abs() < scale * 1e-9);
    }

    #[test]
    fn test_zoom_out_pulls_far_segment_into_view() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        eng.add_segment(seg(2, 1_500, 1_600)).expect("add");
        assert_eq!(eng.visible_segments(), &[SegmentId(1)]);
        eng.surface_mut().clear();
        // window triples around the center; [1500,1600] now overlaps
        eng.zoom_by(-6);
        assert!(eng.surface().added_ids().contains(&SegmentId(2)));
        assert!(eng.visible_segments().contains(&SegmentId(2)));
    }

    #[test]
    fn test_drag_resize_commits_and_clips() {
        let mut eng = static_engine();
        add(&mut eng, seg(1, 0, 100));
        add(&mut eng, seg(2, 150, 200));

        eng.begin_resize_end(SegmentId(1)).expect("begin");
        eng.pointer_down(Point::new(100.0, 0.0));
        // no intersection increase: accepted unclipped
        eng.pointer_move(Point::new(140.0, 0.0));
        assert_eq!(eng.store().get(SegmentId(1)).expect("stored").end_ms, 140);

        // crossing B's start: clipped to 150
        eng.pointer_move(Point::new(180.0, 0.0));
        assert_eq!(eng.store().get(SegmentId(1)).expect("stored").end_ms, 150);
        assert_eq!(eng.segment(SegmentId(1)).expect("segment").end_ms, 150);

        eng.pointer_up(Point::new(180.0, 0.0));
        assert_eq!(eng.drag_mode(), DragMode::Idle);
    }

    #[test]
    fn test_drag_past_other_edge_is_skipped() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 200, 400)).expect("add");
        eng.begin_resize_start(SegmentId(1)).expect("begin");
        eng.pointer_down(Point::new(200.0, 0.0));
        // start past the end: rejected, nothing committed
        eng.pointer_move(Point::new(500.0, 0.0));
        let segment = eng.segment(SegmentId(1)).expect("segment");
        assert_eq!((segment.start_ms, segment.end_ms), (200, 400));
    }

    #[test]
    fn test_write_back_failure_rolls_back() {
        let mut eng = static_engine();
        add(&mut eng, seg(1, 0, 100));
        eng.store_mut().set_refuse_writes(true);
        eng.begin_resize_end(SegmentId(1)).expect("begin");
        eng.pointer_down(Point::new(100.0, 0.0));
        eng.pointer_move(Point::new(140.0, 0.0));
        // local edit reverted to the pre-drag boundary
        let segment = eng.segment(SegmentId(1)).expect("segment");
        assert_eq!((segment.start_ms, segment.end_ms), (0, 100));
        // and the visual was restored
        match eng.surface().commands.last() {
            Some(RenderCommand::UpdateVisual { id, width_px, .. }) => {
                assert_eq!(*id, SegmentId(1));
                assert_eq!(*width_px, 100.0);
            }
            other => panic!("expected restoring update, got {:?}", other),
        }
    }

    #[test]
    fn test_jump_to_time_centers_window() {
        let mut eng = static_engine();
        eng.jump_to_time(50_000);
        assert!(!eng.is_following_latest());
        assert_eq!(eng.viewport().time_at(500.0), 50_000);
    }

    #[test]
    fn test_jump_to_extreme_times_does_not_overflow() {
        let mut eng = static_engine();
        // visible times saturate at the ends of the i64 range; tick bounds
        // must follow suit instead of overflowing
        eng.jump_to_time(i64::MAX);
        assert_eq!(eng.viewport().visible_end(), i64::MAX);
        eng.jump_to_time(i64::MIN);
        assert_eq!(eng.viewport().visible_start(), i64::MIN);
    }

    #[test]
    fn test_reload_replaces_visible_set() {
        let mut eng = static_engine();
        eng.add_segment(seg(1, 100, 300)).expect("add");
        eng.surface_mut().clear();
        eng.reload(vec![seg(2, 400, 500), seg(3, 9_000, 9_500)]);
        assert_eq!(eng.surface().removed_ids(), vec![SegmentId(1)]);
        assert_eq!(eng.surface().added_ids(), vec![SegmentId(2)]);
        assert!(eng.segment(SegmentId(1)).is_none());
    }

    #[test]
    fn test_begin_resize_stale_id() {
        let mut eng = static_engine();
        assert!(matches!(
            eng.begin_resize_start(SegmentId(1)),
            Err(TimeGraphError::StaleSegment(_))
        ));
        assert_eq!(eng.drag_mode(), DragMode::Idle);
    }

    #[test]
    fn test_rename_writes_through_and_redraws() {
        let mut eng = static_engine();
        add(&mut eng, seg(1, 100, 300));
        eng.surface_mut().clear();
        eng.rename_segment(SegmentId(1), "renamed").expect("rename");
        assert_eq!(eng.store().get(SegmentId(1)).expect("stored").label, "renamed");
        assert_eq!(
            eng.surface().commands,
            vec![
                RenderCommand::RemoveVisual { id: SegmentId(1) },
                RenderCommand::AddVisual {
                    id: SegmentId(1),
                    x_px: 100.0,
                    width_px: 200.0,
                    label: "renamed".to_string(),
                },
            ]
        );
    }
}
