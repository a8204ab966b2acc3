//! Render surface contract
//!
//! The engine never draws pixels; it emits commands to a host-supplied sink.
//! Visual positions are in screen pixels, already mapped by the viewport.

use crate::types::SegmentId;

/// Sink for render commands emitted by the engine
pub trait RenderSurface {
    /// A segment entered the visible range
    fn add_visual(&mut self, id: SegmentId, x_px: f64, width_px: f64, label: &str);
    /// A visible segment's geometry changed
    fn update_visual(&mut self, id: SegmentId, x_px: f64, width_px: f64);
    /// A segment left the visible range or was deleted
    fn remove_visual(&mut self, id: SegmentId);
    /// Draw one labeled axis tick
    fn draw_tick(&mut self, x_px: f64, label: &str);
    /// Drop all ticks before a full tick redraw
    fn clear_ticks(&mut self);
}

/// A recorded render command, for tests and headless hosts
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    AddVisual {
        id: SegmentId,
        x_px: f64,
        width_px: f64,
        label: String,
    },
    UpdateVisual {
        id: SegmentId,
        x_px: f64,
        width_px: f64,
    },
    RemoveVisual {
        id: SegmentId,
    },
    DrawTick {
        x_px: f64,
        label: String,
    },
    ClearTicks,
}

/// Render surface that records every command in call order
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub commands: Vec<RenderCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget recorded commands (between test phases)
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Ids with an add command recorded, in call order
    pub fn added_ids(&self) -> Vec<SegmentId> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::AddVisual { id, .. } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Ids with a remove command recorded, in call order
    pub fn removed_ids(&self) -> Vec<SegmentId> {
        self.commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::RemoveVisual { id } => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Number of ticks drawn since the last clear_ticks
    pub fn tick_count(&self) -> usize {
        let last_clear = self
            .commands
            .iter()
            .rposition(|command| matches!(command, RenderCommand::ClearTicks));
        let tail = match last_clear {
            Some(i) => &self.commands[i..],
            None => &self.commands[..],
        };
        tail.iter()
            .filter(|command| matches!(command, RenderCommand::DrawTick { .. }))
            .count()
    }
}

impl RenderSurface for RecordingSurface {
    fn add_visual(&mut self, id: SegmentId, x_px: f64, width_px: f64, label: &str) {
        self.commands.push(RenderCommand::AddVisual {
            id,
            x_px,
            width_px,
            label: label.to_string(),
        });
    }

    fn update_visual(&mut self, id: SegmentId, x_px: f64, width_px: f64) {
        self.commands
            .push(RenderCommand::UpdateVisual { id, x_px, width_px });
    }

    fn remove_visual(&mut self, id: SegmentId) {
        self.commands.push(RenderCommand::RemoveVisual { id });
    }

    fn draw_tick(&mut self, x_px: f64, label: &str) {
        self.commands.push(RenderCommand::DrawTick {
            x_px,
            label: label.to_string(),
        });
    }

    fn clear_ticks(&mut self) {
        self.commands.push(RenderCommand::ClearTicks);
    }
}
