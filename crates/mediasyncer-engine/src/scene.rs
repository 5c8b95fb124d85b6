//! The render pass: session state in, draw list out.

use mediasyncer_core::{Rect, Vec2};

use crate::compare::{
    audio_hotspot, compare_hotspot, delete_button, filename_width, Tile, BADGE_PADDING,
    DELETE_BUTTON_SIZE,
};
use crate::input::DragState;
use crate::registry::{MediaItem, ViewMode};
use crate::render::{truncate_to_width, ColorRole, CursorHint, DrawCommand, Scene, TextAnchor, TextMeasure};
use crate::session::Session;
use crate::split::{visual_slots, SPLIT_KNOB_RADIUS};
use crate::zoom::map_media;

/// Prompt shown wherever media can be imported.
pub const IMPORT_PROMPT: &str = "Drag & Drop or Click to Import Media";

const DRAG_THUMBNAIL_WIDTH: f32 = 150.0;
const BADGE_TEXT_SIZE: f32 = 12.0;
const DIVIDER_HANDLE: (f32, f32) = (5.0, 30.0);

/// The full uv rectangle.
const FULL_UV: Rect = Rect::new(0.0, 0.0, 1.0, 1.0);

impl Session {
    /// Lay out the active view and describe how to paint it.
    pub fn build_scene(&self, measure: &dyn TextMeasure) -> Scene {
        let mut scene = Scene::new();
        match self.registry.mode() {
            ViewMode::Grid => self.grid_scene(&mut scene, measure),
            ViewMode::Split => self.split_scene(&mut scene),
        }
        scene.commands.push(DrawCommand::StrokeRect {
            rect: self.canvas,
            role: ColorRole::Border,
            width: 1.0,
            dashed: self.rejected,
        });
        scene
    }

    fn grid_scene(&self, scene: &mut Scene, measure: &dyn TextMeasure) {
        let dragged = self.dragged();
        let panning = matches!(self.drag, DragState::Pan { .. });
        let tiles = self.grid_tiles();
        let hovered = self.hovered_tile(&tiles);

        scene.cursor = if panning {
            CursorHint::Grabbing
        } else if hovered.is_some() {
            CursorHint::Grab
        } else if self.registry.grid_len() == 0 {
            CursorHint::Pointer
        } else {
            CursorHint::Default
        };

        if self.registry.grid_len() == 0 {
            scene.text(
                self.canvas.center(),
                IMPORT_PROMPT,
                24.0,
                ColorRole::CanvasText,
                TextAnchor::Center,
            );
            return;
        }

        if let Some(cell) = self.drop_preview_cell() {
            let rect = self.grid_dims().cell_rect(self.canvas, cell);
            scene.fill(rect, ColorRole::DropPreview, 8.0);
        }

        for tile in &tiles {
            if let (Some(placement), Some(item)) = (tile.placement, self.registry.get(tile.id)) {
                if let Some(dims) = item.dimensions() {
                    scene.image(tile.id, placement.dest, placement.uv(dims), placement.clip);
                }
            }
        }

        self.compare_overlay(scene, &tiles);

        if let Some(tile) = hovered {
            self.hover_badges(scene, &tile, measure);
        }

        if let Some(item) = dragged.and_then(|id| self.registry.get(id)) {
            drag_thumbnail(scene, item, self.pointer);
        }
    }

    /// Primary drawn over one side of every tile, plus the dividers.
    fn compare_overlay(&self, scene: &mut Scene, tiles: &[Tile]) {
        let Some(primary) = self.compare.primary.and_then(|id| self.registry.get(id)) else {
            return;
        };
        let Some(dims) = primary.dimensions() else {
            return;
        };
        let dragging = matches!(self.drag, DragState::CompareDivider { .. });

        for tile in tiles {
            let Some(side) = tile.frame().and_then(|f| self.compare.overlay_side(f)) else {
                continue;
            };
            // Mapped against the cell so it lines up with the tile beneath
            if let Some(placement) = map_media(tile.cell, dims, &self.zoom) {
                if let Some(clip) = placement.clip.intersection(side) {
                    scene.image(primary.id, placement.dest, placement.uv(dims), clip);
                }
            }
        }

        for frame in tiles.iter().filter_map(Tile::frame) {
            let hover = self
                .pointer
                .is_some_and(|p| self.compare.near_divider(frame, p));
            let role = if hover || dragging {
                ColorRole::Accent
            } else {
                ColorRole::DividerIdle
            };
            if hover || dragging {
                scene.cursor = CursorHint::ResizeHorizontal;
            }
            let x = self.compare.divider_x(frame);
            scene.line(Vec2::new(x, frame.y), Vec2::new(x, frame.bottom()), role, 1.25);
            let (w, h) = DIVIDER_HANDLE;
            scene.fill(Rect::new(x - w * 0.5, frame.y + h * 0.5, w, h), role, 1.0);
            scene.fill(Rect::new(x - w * 0.5, frame.bottom() - h * 1.5, w, h), role, 1.0);
        }
    }

    fn hover_badges(&self, scene: &mut Scene, tile: &Tile, measure: &dyn TextMeasure) {
        let (Some(frame), Some(item)) = (tile.frame(), self.registry.get(tile.id)) else {
            return;
        };

        if item.is_video() {
            let hotspot = compare_hotspot(frame);
            let glyph = if self.compare.primary == Some(item.id) { "✓" } else { "⇆" };
            scene.fill(hotspot, ColorRole::HotspotBackground, 4.0);
            scene.text(hotspot.center(), glyph, BADGE_TEXT_SIZE, ColorRole::BadgeText, TextAnchor::Center);

            let hotspot = audio_hotspot(frame);
            let glyph = if self.audio.locked == Some(item.id) { "🔒" } else { "🔈" };
            scene.fill(hotspot, ColorRole::HotspotBackground, 4.0);
            scene.text(hotspot.center(), glyph, BADGE_TEXT_SIZE, ColorRole::BadgeText, TextAnchor::Center);
        }

        let name = truncate_to_width(&item.display_name, filename_width(frame), BADGE_TEXT_SIZE, measure);
        let badge_width = measure.text_width(&name, BADGE_TEXT_SIZE) + BADGE_PADDING * 2.0;
        scene.fill(
            Rect::new(frame.x, frame.y, badge_width, 14.0 + BADGE_PADDING * 2.0),
            ColorRole::BadgeBackground,
            4.0,
        );
        scene.text(
            Vec2::new(frame.x + BADGE_PADDING, frame.y + BADGE_PADDING + 2.0),
            name,
            BADGE_TEXT_SIZE,
            ColorRole::BadgeText,
            TextAnchor::LeftTop,
        );

        let button = delete_button(frame);
        scene.fill(button, ColorRole::BadgeBackground, 4.0);
        scene.text(button.center(), "×", DELETE_BUTTON_SIZE * 0.75, ColorRole::BadgeText, TextAnchor::Center);
    }

    fn split_scene(&self, scene: &mut Scene) {
        let dest = self.split_dest();
        let divider = self.split.divider_x(dest);
        let (left, right) = self.split.halves(dest);
        let (left_slot, right_slot) = visual_slots(self.compare.on_right_side);
        let filled = self.registry.split_count();

        let hovering_handle = self
            .pointer
            .is_some_and(|p| self.split.hits_handle(dest, p, filled == 2));
        scene.cursor = match self.drag {
            DragState::SplitDivider | DragState::Pan { .. } => CursorHint::Grabbing,
            _ if hovering_handle => CursorHint::ResizeHorizontal,
            _ if filled < 2 => CursorHint::Pointer,
            _ => CursorHint::Default,
        };

        for (slot, half) in [(right_slot, right), (left_slot, left)] {
            match self.registry.split_slot(slot) {
                Some(item) => {
                    let placement = item
                        .dimensions()
                        .and_then(|dims| map_media(dest, dims, &self.zoom).map(|p| (p, dims)));
                    if let Some((placement, dims)) = placement {
                        if let Some(clip) = placement.clip.intersection(half) {
                            scene.image(item.id, placement.dest, placement.uv(dims), clip);
                        }
                    }
                }
                None => scene.text(
                    Vec2::new(half.center().x, dest.center().y),
                    IMPORT_PROMPT,
                    18.0,
                    ColorRole::CanvasText,
                    TextAnchor::Center,
                ),
            }
        }

        scene.line(
            Vec2::new(divider, dest.y),
            Vec2::new(divider, dest.bottom()),
            ColorRole::Accent,
            2.0,
        );
        scene.commands.push(DrawCommand::Circle {
            center: Vec2::new(divider, dest.center().y),
            radius: SPLIT_KNOB_RADIUS,
            role: ColorRole::Accent,
        });
    }
}

/// The dragged media follows the pointer as a small thumbnail.
fn drag_thumbnail(scene: &mut Scene, item: &MediaItem, pointer: Option<Vec2>) {
    let (Some(pointer), Some(aspect)) = (pointer, item.aspect()) else {
        return;
    };
    let width = DRAG_THUMBNAIL_WIDTH;
    let height = width / aspect;
    let dest = Rect::new(pointer.x - width * 0.5, pointer.y - height * 0.5, width, height);
    scene.image(item.id, dest, FULL_UV, dest);
}
