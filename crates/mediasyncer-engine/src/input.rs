//! Pointer, wheel and keyboard handling on the canvas.
//!
//! Positions are canvas-space. A press is resolved against the hotspots
//! first, then dividers, then the delete button, and only then starts a
//! reorder drag.

use mediasyncer_core::{MediaId, Rect, Vec2};
use tracing::debug;

use crate::compare::{audio_hotspot, compare_hotspot, delete_button};
use crate::registry::ViewMode;
use crate::session::{strictly_inside, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Space,
    ArrowLeft,
    ArrowRight,
}

/// Follow-up the UI has to perform for a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputResponse {
    #[default]
    None,
    /// Show the file picker; the split view passes the slot that was clicked.
    OpenImporter { slot: Option<usize> },
}

/// Gesture in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    None,
    /// Grid item being moved to a new cell
    Reorder { id: MediaId },
    /// Compare divider grabbed inside `frame`
    CompareDivider { frame: Rect },
    SplitDivider,
    /// Middle-button pan, with the last pointer position
    Pan { last: Vec2 },
}

impl Session {
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    pub fn pointer_moved(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        match self.drag {
            DragState::Pan { last } => {
                let reference = self.reference_dims();
                self.zoom.pan_by(pos - last, reference);
                self.drag = DragState::Pan { last: pos };
            }
            DragState::CompareDivider { frame } => self.compare.drag_divider(frame, pos.x),
            DragState::SplitDivider => {
                let dest = self.split_dest();
                self.split.drag_to(dest, pos.x);
            }
            DragState::Reorder { .. } | DragState::None => {}
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    pub fn pointer_pressed(&mut self, pos: Vec2, button: PointerButton) -> InputResponse {
        self.pointer = Some(pos);
        let inside = strictly_inside(self.canvas, pos);

        if self.registry.active_len() == 0 && inside {
            return match button {
                PointerButton::Primary => InputResponse::OpenImporter { slot: None },
                _ => InputResponse::None,
            };
        }
        if button == PointerButton::Middle && inside {
            self.drag = DragState::Pan { last: pos };
            return InputResponse::None;
        }
        if button != PointerButton::Primary || self.dragged().is_some() {
            return InputResponse::None;
        }

        match self.registry.mode() {
            ViewMode::Split => self.press_split(pos),
            ViewMode::Grid => {
                self.press_grid(pos);
                InputResponse::None
            }
        }
    }

    fn press_split(&mut self, pos: Vec2) -> InputResponse {
        let dest = self.split_dest();
        let both = self.registry.split_count() == 2;
        if self.split.hits_handle(dest, pos, both) {
            self.drag = DragState::SplitDivider;
            return InputResponse::None;
        }
        if strictly_inside(dest, pos) {
            let slot = self.split.slot_at(dest, pos.x, self.compare.on_right_side);
            if self.registry.split_slot(slot).is_none() {
                return InputResponse::OpenImporter { slot: Some(slot) };
            }
        }
        InputResponse::None
    }

    fn press_grid(&mut self, pos: Vec2) {
        let tiles = self.grid_tiles();

        for tile in &tiles {
            let Some(frame) = tile.frame() else {
                continue;
            };
            let is_video = self.registry.get(tile.id).is_some_and(|m| m.is_video());
            if !is_video {
                continue;
            }
            if compare_hotspot(frame).contains_inclusive(pos) {
                self.compare.toggle_primary(tile.id);
                debug!("Compare primary: {:?}", self.compare.primary);
                return;
            }
            if audio_hotspot(frame).contains_inclusive(pos) {
                self.audio.toggle_lock(tile.id);
                debug!("Audio lock: {:?}", self.audio.locked);
                return;
            }
        }

        if self.compare.primary.is_some() {
            let grabbed = tiles
                .iter()
                .filter_map(|t| t.frame())
                .find(|&f| self.compare.near_divider(f, pos));
            if let Some(frame) = grabbed {
                self.drag = DragState::CompareDivider { frame };
                return;
            }
        }

        let Some(hovered) = self.hovered_tile(&tiles) else {
            return;
        };
        if let Some(frame) = hovered.frame() {
            if strictly_inside(delete_button(frame), pos) {
                self.remove(hovered.id);
                return;
            }
        }
        self.drag = DragState::Reorder { id: hovered.id };
    }

    pub fn pointer_released(&mut self, pos: Vec2) {
        self.pointer = Some(pos);
        if let DragState::Reorder { id } = self.drag {
            if self.registry.mode() == ViewMode::Grid {
                if let Some(from) = self.registry.grid().iter().position(|m| m.id == id) {
                    let remaining = self.registry.grid_len() - 1;
                    let to = self.grid.drop_index(self.canvas, remaining, pos);
                    debug!("Reorder {} → {}", from, to);
                    self.registry.move_grid(from, to);
                }
            }
        }
        self.drag = DragState::None;
    }

    /// Wheel zoom anchored at the pointer. Positive `delta` zooms out.
    pub fn wheel(&mut self, pos: Vec2, delta: f32) {
        if !strictly_inside(self.canvas, pos) || self.registry.active_len() == 0 {
            return;
        }
        let area = match self.registry.mode() {
            ViewMode::Grid => {
                let dims = self.grid_dims();
                dims.cell_rect(self.canvas, dims.cell_index_at(self.canvas, pos))
            }
            ViewMode::Split => self.split_dest(),
        };
        let reference = self.reference_dims();
        let step = self.config.zoom_step;
        self.zoom.zoom_at(delta, step, area, pos, reference);
    }

    pub fn key_pressed(&mut self, key: Key) {
        match key {
            Key::Space => {
                self.toggle_play_pause();
            }
            Key::ArrowLeft => {
                self.step_frame(-1);
            }
            Key::ArrowRight => {
                self.step_frame(1);
            }
        }
    }
}
