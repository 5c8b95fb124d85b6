//! Grid compare overlay: one primary video drawn over every tile.
//!
//! Each occupied tile shows its own media on one side of a shared split
//! ratio and the primary on the other. Dragging the divider of any tile
//! moves all of them.

use mediasyncer_core::limits::{MAX_SPLIT_RATIO, MIN_SPLIT_RATIO};
use mediasyncer_core::{MediaId, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::grid::GridDims;
use crate::zoom::{map_media, Placement, ZoomPan};

/// Side of the compare / audio hotspots.
pub const HOTSPOT_SIZE: f32 = 22.0;

/// Side of the delete button.
pub const DELETE_BUTTON_SIZE: f32 = 24.0;

/// Horizontal hit tolerance of a tile divider.
pub const DIVIDER_TOLERANCE: f32 = 8.0;

/// Inner padding of the filename badge.
pub const BADGE_PADDING: f32 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompareState {
    /// Video overlaid on every tile; weak, cleared when it is removed
    pub primary: Option<MediaId>,
    pub split_ratio: f32,
    /// The primary occupies the right side of each tile
    pub on_right_side: bool,
}

impl Default for CompareState {
    fn default() -> Self {
        Self {
            primary: None,
            split_ratio: 0.5,
            on_right_side: true,
        }
    }
}

impl CompareState {
    /// Select `id` as primary, or clear it if it already is.
    pub fn toggle_primary(&mut self, id: MediaId) {
        self.primary = if self.primary == Some(id) { None } else { Some(id) };
    }

    pub fn forget(&mut self, id: MediaId) {
        if self.primary == Some(id) {
            self.primary = None;
        }
    }

    /// Back to no primary and a centred divider; the side is kept.
    pub fn reset(&mut self) {
        self.primary = None;
        self.split_ratio = 0.5;
    }

    pub fn divider_x(&self, frame: Rect) -> f32 {
        frame.x + frame.width * self.split_ratio
    }

    /// Move the shared divider to `x` within `frame`.
    pub fn drag_divider(&mut self, frame: Rect, x: f32) {
        if frame.width <= 0.0 {
            return;
        }
        let local = (x - frame.x) / frame.width;
        if local.is_finite() {
            self.split_ratio = local.clamp(MIN_SPLIT_RATIO, MAX_SPLIT_RATIO);
        }
    }

    /// Pointer is over this frame's divider.
    pub fn near_divider(&self, frame: Rect, point: Vec2) -> bool {
        frame.contains_inclusive(point) && (point.x - self.divider_x(frame)).abs() <= DIVIDER_TOLERANCE
    }

    /// Part of `frame` covered by the primary.
    pub fn overlay_side(&self, frame: Rect) -> Option<Rect> {
        let (left, right) = frame.split_at_x(self.divider_x(frame));
        let side = if self.on_right_side { right } else { left };
        (!side.is_empty()).then_some(side)
    }
}

// ── Tiles ───────────────────────────────────────────────────────

/// One occupied grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tile {
    pub id: MediaId,
    /// Index in the grid collection
    pub index: usize,
    pub cell: Rect,
    /// `None` until the media's size is known
    pub placement: Option<Placement>,
}

impl Tile {
    /// Visible rectangle of the tile's media.
    pub fn frame(&self) -> Option<Rect> {
        self.placement.map(|p| p.clip)
    }
}

/// Assign grid items to cells, skipping the drop-preview cell.
pub fn layout_tiles<I>(
    canvas: Rect,
    dims: GridDims,
    items: I,
    preview: Option<usize>,
    view: &ZoomPan,
) -> Vec<Tile>
where
    I: IntoIterator<Item = (usize, MediaId, Option<(u32, u32)>)>,
{
    let mut items = items.into_iter();
    let mut tiles = Vec::new();
    for cell_index in 0..dims.cell_count() {
        if preview == Some(cell_index) {
            continue;
        }
        let Some((index, id, size)) = items.next() else {
            break;
        };
        let cell = dims.cell_rect(canvas, cell_index);
        tiles.push(Tile {
            id,
            index,
            cell,
            placement: size.and_then(|s| map_media(cell, s, view)),
        });
    }
    tiles
}

pub fn compare_hotspot(frame: Rect) -> Rect {
    Rect::new(
        frame.right() - HOTSPOT_SIZE,
        frame.bottom() - HOTSPOT_SIZE,
        HOTSPOT_SIZE,
        HOTSPOT_SIZE,
    )
}

pub fn audio_hotspot(frame: Rect) -> Rect {
    Rect::new(
        frame.x,
        frame.bottom() - HOTSPOT_SIZE,
        HOTSPOT_SIZE,
        HOTSPOT_SIZE,
    )
}

pub fn delete_button(frame: Rect) -> Rect {
    Rect::new(
        frame.right() - DELETE_BUTTON_SIZE,
        frame.y,
        DELETE_BUTTON_SIZE,
        DELETE_BUTTON_SIZE,
    )
}

/// Room left for the filename beside the delete button.
pub fn filename_width(frame: Rect) -> f32 {
    (frame.width - DELETE_BUTTON_SIZE - BADGE_PADDING * 3.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_primary() {
        let (a, b) = (MediaId::new(), MediaId::new());
        let mut state = CompareState::default();
        state.toggle_primary(a);
        assert_eq!(state.primary, Some(a));
        state.toggle_primary(b);
        assert_eq!(state.primary, Some(b));
        state.toggle_primary(b);
        assert_eq!(state.primary, None);
    }

    #[test]
    fn test_divider_drag_clamped() {
        let frame = Rect::new(100.0, 0.0, 200.0, 100.0);
        let mut state = CompareState::default();
        assert_eq!(state.divider_x(frame), 200.0);
        state.drag_divider(frame, 150.0);
        assert_eq!(state.split_ratio, 0.25);
        state.drag_divider(frame, -500.0);
        assert_eq!(state.split_ratio, MIN_SPLIT_RATIO);
        state.drag_divider(frame, 900.0);
        assert_eq!(state.split_ratio, MAX_SPLIT_RATIO);
    }

    #[test]
    fn test_near_divider_tolerance() {
        let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
        let state = CompareState::default();
        assert!(state.near_divider(frame, Vec2::new(108.0, 50.0)));
        assert!(!state.near_divider(frame, Vec2::new(109.0, 50.0)));
        assert!(!state.near_divider(frame, Vec2::new(100.0, 150.0)));
    }

    #[test]
    fn test_overlay_side() {
        let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
        let mut state = CompareState::default();
        assert_eq!(state.overlay_side(frame), Some(Rect::new(100.0, 0.0, 100.0, 100.0)));
        state.on_right_side = false;
        assert_eq!(state.overlay_side(frame), Some(Rect::new(0.0, 0.0, 100.0, 100.0)));
    }

    #[test]
    fn test_hotspots() {
        let frame = Rect::new(0.0, 0.0, 200.0, 100.0);
        assert_eq!(compare_hotspot(frame), Rect::new(178.0, 78.0, 22.0, 22.0));
        assert_eq!(audio_hotspot(frame), Rect::new(0.0, 78.0, 22.0, 22.0));
        assert_eq!(delete_button(frame), Rect::new(176.0, 0.0, 24.0, 24.0));
        assert_eq!(filename_width(frame), 158.0);
    }

    #[test]
    fn test_layout_skips_preview_cell() {
        let canvas = Rect::new(0.0, 0.0, 200.0, 200.0);
        let dims = GridDims::new(2, 2);
        let items: Vec<_> = (0..3).map(|i| (i, MediaId::new(), Some((10, 10)))).collect();
        let tiles = layout_tiles(canvas, dims, items.clone(), Some(1), &ZoomPan::default());
        assert_eq!(tiles.len(), 3);
        assert_eq!(tiles[0].cell, Rect::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(tiles[1].cell, Rect::new(0.0, 100.0, 100.0, 100.0));
        assert_eq!(tiles[1].id, items[1].1);
        assert!(tiles.iter().all(|t| t.frame().is_some()));
    }
}
