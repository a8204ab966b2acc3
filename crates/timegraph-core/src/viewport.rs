//! Viewport: affine mapping between time and screen coordinates
//!
//! The mapping is `x = pan_offset_px + scale * time_ms` with `scale` in
//! pixels per millisecond. Zoom is multiplicative and anchored at the
//! viewport center so the time under the center stays put.

use crate::config::TimeGraphConfig;
use crate::error::TimeGraphError;

/// Visible time window expressed via scale and pan offset
#[derive(Debug, Clone)]
pub struct Viewport {
    /// Pixels per millisecond, always strictly positive
    scale: f64,
    /// Horizontal pan offset in pixels
    pan_offset_px: f64,
    /// Visible width in pixels
    width_px: f64,
    /// Scale the viewport resets to
    default_scale: f64,
    min_scale: f64,
    max_scale: f64,
    zoom_step_factor: f64,
}

impl Viewport {
    /// Create a viewport at the configured default scale, pan 0
    pub fn new(config: &TimeGraphConfig, width_px: f64) -> Self {
        let config = config.validated();
        Self {
            scale: config.default_scale,
            pan_offset_px: 0.0,
            width_px: width_px.max(0.0),
            default_scale: config.default_scale,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step_factor: config.zoom_step_factor,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan_offset_px(&self) -> f64 {
        self.pan_offset_px
    }

    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    /// Map a screen x coordinate to a time, rounded to the nearest millisecond
    pub fn time_at(&self, x_px: f64) -> i64 {
        ((x_px - self.pan_offset_px) / self.scale).round() as i64
    }

    /// Map a time to a screen x coordinate
    pub fn x_at(&self, time_ms: i64) -> f64 {
        self.pan_offset_px + self.scale * time_ms as f64
    }

    /// Earliest visible time (at x = 0)
    pub fn visible_start(&self) -> i64 {
        self.time_at(0.0)
    }

    /// Latest visible time (at x = width)
    pub fn visible_end(&self) -> i64 {
        self.time_at(self.width_px)
    }

    /// Zoom by a number of steps, anchored at the viewport center
    ///
    /// Positive steps zoom in. The resulting scale is clamped to the
    /// configured strictly-positive range; a degenerate result is clamped,
    /// never applied.
    pub fn zoom_by(&mut self, step_count: i32) {
        let factor = self.zoom_step_factor.powi(step_count);
        self.set_scale_anchored(self.scale * factor);
    }

    /// Reset to the default scale, keeping the center anchored
    pub fn zoom_reset(&mut self) {
        self.set_scale_anchored(self.default_scale);
    }

    /// Apply a new scale while keeping the time under the viewport center fixed
    fn set_scale_anchored(&mut self, new_scale: f64) {
        let new_scale = if new_scale.is_finite() && new_scale > 0.0 {
            new_scale.clamp(self.min_scale, self.max_scale)
        } else {
            log::warn!(
                "zoom rejected: {}",
                TimeGraphError::DegenerateScale(new_scale)
            );
            self.scale
        };
        let center_x = self.width_px / 2.0;
        // Fractional time under the anchor, kept in f64 so zoom in/out round-trips
        let anchor_time = (center_x - self.pan_offset_px) / self.scale;
        self.scale = new_scale;
        self.pan_offset_px = center_x - anchor_time * self.scale;
    }

    /// Adjust the pan offset by a pixel delta
    pub fn pan_by(&mut self, delta_px: f64) {
        if delta_px.is_finite() {
            self.pan_offset_px += delta_px;
        }
    }

    /// Set the pan offset directly (used for follow-latest and jumps)
    pub fn set_pan_offset(&mut self, pan_px: f64) {
        if pan_px.is_finite() {
            self.pan_offset_px = pan_px;
        }
    }

    /// Center the viewport on a time
    pub fn center_on(&mut self, time_ms: i64) {
        self.pan_offset_px = self.width_px / 2.0 - self.scale * time_ms as f64;
    }

    /// Update the visible width; does not change scale
    pub fn resize_width(&mut self, new_width_px: f64) {
        if new_width_px.is_finite() {
            self.width_px = new_width_px.max(0.0);
        }
    }
}
