//! Split view: two slots side by side behind one draggable divider.

use mediasyncer_core::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Width of the divider's grab area.
pub const SPLIT_HANDLE_WIDTH: f32 = 32.0;

/// Radius of the knob drawn on the divider.
pub const SPLIT_KNOB_RADIUS: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitState {
    /// Divider position across the destination rect, `[0, 1]`
    pub slider_pos: f32,
}

impl Default for SplitState {
    fn default() -> Self {
        Self { slider_pos: 0.5 }
    }
}

impl SplitState {
    pub fn reset(&mut self) {
        self.slider_pos = 0.5;
    }

    pub fn divider_x(&self, dest: Rect) -> f32 {
        dest.x + dest.width * self.slider_pos
    }

    /// Pointer is over the divider handle. Only draggable with both slots
    /// filled.
    pub fn hits_handle(&self, dest: Rect, point: Vec2, both_loaded: bool) -> bool {
        let x = self.divider_x(dest);
        both_loaded
            && point.x > x - SPLIT_HANDLE_WIDTH * 0.5
            && point.x < x + SPLIT_HANDLE_WIDTH * 0.5
            && point.y > dest.y
            && point.y < dest.bottom()
    }

    pub fn drag_to(&mut self, dest: Rect, x: f32) {
        if dest.width <= 0.0 {
            return;
        }
        let pos = (x - dest.x) / dest.width;
        if pos.is_finite() {
            self.slider_pos = pos.clamp(0.0, 1.0);
        }
    }

    /// `(left, right)` halves of `dest`.
    pub fn halves(&self, dest: Rect) -> (Rect, Rect) {
        dest.split_at_x(self.divider_x(dest))
    }

    /// Slot shown under `x`.
    pub fn slot_at(&self, dest: Rect, x: f32, on_right_side: bool) -> usize {
        let is_left = x < self.divider_x(dest);
        let (left, right) = visual_slots(on_right_side);
        if is_left {
            left
        } else {
            right
        }
    }
}

/// Slots shown on the `(left, right)`. Slot 0 is on the left unless the
/// compare side is flipped.
pub fn visual_slots(on_right_side: bool) -> (usize, usize) {
    if on_right_side {
        (0, 1)
    } else {
        (1, 0)
    }
}

/// Area both slots are drawn into: the canvas fitted to the reference
/// slot's aspect (slot 0, else slot 1), or the whole canvas.
pub fn split_dest_rect(canvas: Rect, reference_aspect: Option<f32>) -> Rect {
    match reference_aspect {
        Some(aspect) if aspect.is_finite() && aspect > 0.0 => canvas.fit_aspect(aspect),
        _ => canvas,
    }
}

/// How a batch of files reached the viewer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImportOrigin {
    /// Dropped onto the canvas at a canvas-space position
    Dropped(Vec2),
    /// Chosen from the file picker or another source without a position
    Picked,
    /// Importer opened by clicking an empty split half
    Slot(usize),
}

/// Slot for each file of a split-view import. Files beyond the second
/// are ignored.
pub fn plan_split_slots(
    count: usize,
    origin: ImportOrigin,
    occupied: [bool; 2],
    slot_at_pointer: impl FnOnce(Vec2) -> usize,
) -> Vec<usize> {
    match count {
        0 => Vec::new(),
        1 => {
            let slot = match origin {
                ImportOrigin::Dropped(pos) => slot_at_pointer(pos),
                ImportOrigin::Slot(slot) => slot.min(1),
                ImportOrigin::Picked => {
                    if !occupied[0] {
                        0
                    } else if !occupied[1] {
                        1
                    } else {
                        0
                    }
                }
            };
            vec![slot]
        }
        _ => vec![0, 1],
    }
}
