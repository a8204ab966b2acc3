//! Pointer drag state machine
//!
//! Translates pointer-down/move/up into pan or resize requests. The mode is
//! chosen externally by whichever visual element was hit: a resize handle
//! selects `ResizingStart`/`ResizingEnd`, the background selects `Panning`.
//! The controller borrows the viewport read-only to convert coordinates and
//! returns requests; the engine applies them.

use crate::types::{Point, SegmentId};
use crate::viewport::Viewport;

/// Drag modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragMode {
    /// No drag in progress
    #[default]
    Idle,
    /// The graph is being scrolled
    Panning,
    /// A segment's start boundary is being dragged
    ResizingStart,
    /// A segment's end boundary is being dragged
    ResizingEnd,
}

/// Operation requested by a pointer move, applied by the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragRequest {
    /// Scroll the viewport horizontally
    Pan { delta_x: f64 },
    /// Propose a new start boundary for a segment
    MoveStart { id: SegmentId, time_ms: i64 },
    /// Propose a new end boundary for a segment
    MoveEnd { id: SegmentId, time_ms: i64 },
}

/// Long-lived pointer state; owned exclusively by the engine
#[derive(Debug, Default)]
pub struct DragController {
    mode: DragMode,
    /// Screen position recorded at drag start, reset on every handled move
    anchor: Option<Point>,
    /// Segment under edit, set only when resizing
    target: Option<SegmentId>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> DragMode {
        self.mode
    }

    pub fn anchor(&self) -> Option<Point> {
        self.anchor
    }

    pub fn target(&self) -> Option<SegmentId> {
        self.target
    }

    /// The background was hit: subsequent moves pan the graph
    pub fn begin_pan(&mut self) {
        self.mode = DragMode::Panning;
        self.target = None;
    }

    /// A start-side resize handle was hit
    pub fn begin_resize_start(&mut self, id: SegmentId) {
        self.mode = DragMode::ResizingStart;
        self.target = Some(id);
    }

    /// An end-side resize handle was hit
    pub fn begin_resize_end(&mut self, id: SegmentId) {
        self.mode = DragMode::ResizingEnd;
        self.target = Some(id);
    }

    /// Record the drag anchor; the mode is left as set by hit-testing
    pub fn pointer_down(&mut self, pos: Point) {
        if !pos.is_finite() {
            return;
        }
        self.anchor = Some(pos);
    }

    /// Translate a pointer move into a request, resetting the anchor
    ///
    /// Returns None when idle, when no anchor was recorded, or for
    /// malformed (NaN) coordinates.
    pub fn pointer_move(&mut self, pos: Point, viewport: &Viewport) -> Option<DragRequest> {
        if !pos.is_finite() {
            return None;
        }
        let anchor = self.anchor?;
        let request = match self.mode {
            DragMode::Idle => None,
            DragMode::Panning => Some(DragRequest::Pan {
                delta_x: pos.x - anchor.x,
            }),
            DragMode::ResizingStart => self.target.map(|id| DragRequest::MoveStart {
                id,
                time_ms: viewport.time_at(pos.x),
            }),
            DragMode::ResizingEnd => self.target.map(|id| DragRequest::MoveEnd {
                id,
                time_ms: viewport.time_at(pos.x),
            }),
        };
        if request.is_some() {
            self.anchor = Some(pos);
        }
        request
    }

    /// End the drag; a pointer-up with no net movement is an implicit cancel
    pub fn pointer_up(&mut self, _pos: Point) {
        self.mode = DragMode::Idle;
        self.anchor = None;
        self.target = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeGraphConfig;

    fn viewport_1px_per_ms() -> Viewport {
        let config = TimeGraphConfig {
            default_scale: 1.0,
            ..TimeGraphConfig::default()
        };
        Viewport::new(&config, 1_000.0)
    }

    #[test]
    fn test_starts_idle_and_returns_to_idle() {
        let vp = viewport_1px_per_ms();
        let mut drag = DragController::new();
        assert_eq!(drag.mode(), DragMode::Idle);
        drag.pointer_down(Point::new(10.0, 10.0));
        assert_eq!(drag.pointer_move(Point::new(20.0, 10.0), &vp), None);
        drag.begin_pan();
        drag.pointer_up(Point::new(20.0, 10.0));
        assert_eq!(drag.mode(), DragMode::Idle);
        assert_eq!(drag.anchor(), None);
    }

    #[test]
    fn test_pan_delta_and_anchor_reset() {
        let vp = viewport_1px_per_ms();
        let mut drag = DragController::new();
        drag.begin_pan();
        drag.pointer_down(Point::new(100.0, 50.0));
        assert_eq!(
            drag.pointer_move(Point::new(130.0, 50.0), &vp),
            Some(DragRequest::Pan { delta_x: 30.0 })
        );
        // anchor moved with the pointer
        assert_eq!(
            drag.pointer_move(Point::new(120.0, 50.0), &vp),
            Some(DragRequest::Pan { delta_x: -10.0 })
        );
    }

    #[test]
    fn test_resize_converts_to_time() {
        let vp = viewport_1px_per_ms();
        let mut drag = DragController::new();
        drag.begin_resize_end(SegmentId(7));
        drag.pointer_down(Point::new(100.0, 0.0));
        assert_eq!(
            drag.pointer_move(Point::new(140.0, 0.0), &vp),
            Some(DragRequest::MoveEnd {
                id: SegmentId(7),
                time_ms: 140
            })
        );
        drag.begin_resize_start(SegmentId(7));
        assert_eq!(
            drag.pointer_move(Point::new(60.0, 0.0), &vp),
            Some(DragRequest::MoveStart {
                id: SegmentId(7),
                time_ms: 60
            })
        );
    }

    #[test]
    fn test_nan_coordinates_dropped() {
        let vp = viewport_1px_per_ms();
        let mut drag = DragController::new();
        drag.begin_pan();
        drag.pointer_down(Point::new(f64::NAN, 0.0));
        assert_eq!(drag.anchor(), None);
        drag.pointer_down(Point::new(10.0, 0.0));
        assert_eq!(drag.pointer_move(Point::new(f64::NAN, 0.0), &vp), None);
        // state unchanged, a normal move still works
        assert_eq!(
            drag.pointer_move(Point::new(15.0, 0.0), &vp),
            Some(DragRequest::Pan { delta_x: 5.0 })
        );
    }

    #[test]
    fn test_move_without_anchor_is_ignored() {
        let vp = viewport_1px_per_ms();
        let mut drag = DragController::new();
        drag.begin_pan();
        assert_eq!(drag.pointer_move(Point::new(10.0, 0.0), &vp), None);
    }
}
