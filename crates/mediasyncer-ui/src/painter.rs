//! Paints an engine [`Scene`] with egui primitives.
//!
//! Scene coordinates are canvas-local; the painter offsets them by the
//! canvas origin on screen. Decoded frames are uploaded once per new frame
//! and kept in a texture cache keyed by media id.

use std::collections::HashMap;
use std::sync::Arc;

use egui::{Align2, Color32, FontId, Pos2, Rounding, Shape, Stroke, TextureHandle, TextureOptions};
use mediasyncer_core::{MediaId, Rect, SharedFrameBuffer, Vec2};
use mediasyncer_engine::{CursorHint, DrawCommand, Scene, Session, TextAnchor, TextMeasure};
use tracing::debug;

use crate::theme::Palette;

const DASH_LENGTH: f32 = 6.0;
const DASH_GAP: f32 = 4.0;

/// Canvas-space rect to screen space.
pub fn to_screen(rect: Rect, origin: Pos2) -> egui::Rect {
    egui::Rect::from_min_size(
        Pos2::new(origin.x + rect.x, origin.y + rect.y),
        egui::vec2(rect.width, rect.height),
    )
}

fn point_to_screen(p: Vec2, origin: Pos2) -> Pos2 {
    Pos2::new(origin.x + p.x, origin.y + p.y)
}

/// Screen position to canvas space.
pub fn to_canvas(pos: Pos2, origin: Pos2) -> Vec2 {
    Vec2::new(pos.x - origin.x, pos.y - origin.y)
}

pub fn cursor_icon(hint: CursorHint) -> egui::CursorIcon {
    match hint {
        CursorHint::Default => egui::CursorIcon::Default,
        CursorHint::Pointer => egui::CursorIcon::PointingHand,
        CursorHint::Grab => egui::CursorIcon::Grab,
        CursorHint::Grabbing => egui::CursorIcon::Grabbing,
        CursorHint::ResizeHorizontal => egui::CursorIcon::ResizeHorizontal,
    }
}

/// Measures text with the context's fonts.
pub struct EguiMeasure<'a> {
    pub ctx: &'a egui::Context,
}

impl TextMeasure for EguiMeasure<'_> {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        self.ctx.fonts(|fonts| {
            fonts
                .layout_no_wrap(text.to_owned(), FontId::proportional(size), Color32::WHITE)
                .size()
                .x
        })
    }
}

// ── Texture cache ──────────────────────────────────────────────

struct CachedTexture {
    /// Frame the texture was last uploaded from
    frame: SharedFrameBuffer,
    handle: TextureHandle,
}

#[derive(Default)]
pub struct ScenePainter {
    textures: HashMap<MediaId, CachedTexture>,
}

impl ScenePainter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload frames that changed since the last call and release textures
    /// of media that are gone.
    pub fn sync_textures(&mut self, ctx: &egui::Context, session: &Session) {
        let registry = session.registry();
        self.textures.retain(|id, _| registry.get(*id).is_some());

        for item in registry.all() {
            let Some(frame) = item.element.frame() else {
                continue;
            };
            if frame.width == 0 || frame.height == 0 {
                continue;
            }
            match self.textures.get_mut(&item.id) {
                Some(cached) if Arc::ptr_eq(&cached.frame, &frame) => {}
                Some(cached) => {
                    cached.handle.set(color_image(&frame), TextureOptions::LINEAR);
                    cached.frame = frame;
                }
                None => {
                    debug!("Creating texture for {}", item.display_name);
                    let handle = ctx.load_texture(
                        format!("media_{}", item.id),
                        color_image(&frame),
                        TextureOptions::LINEAR,
                    );
                    self.textures.insert(item.id, CachedTexture { frame, handle });
                }
            }
        }
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    /// Paint `scene` with its canvas origin at `origin`.
    pub fn paint(&self, painter: &egui::Painter, origin: Pos2, scene: &Scene, palette: &Palette) {
        for command in &scene.commands {
            match command {
                DrawCommand::Image {
                    media,
                    dest,
                    src,
                    clip,
                } => {
                    let Some(cached) = self.textures.get(media) else {
                        continue;
                    };
                    let uv = egui::Rect::from_min_max(
                        Pos2::new(src.x, src.y),
                        Pos2::new(src.right(), src.bottom()),
                    );
                    painter.with_clip_rect(to_screen(*clip, origin)).image(
                        cached.handle.id(),
                        to_screen(*dest, origin),
                        uv,
                        Color32::WHITE,
                    );
                }
                DrawCommand::FillRect {
                    rect,
                    role,
                    rounding,
                } => {
                    painter.rect_filled(
                        to_screen(*rect, origin),
                        Rounding::same(*rounding),
                        palette.role(*role),
                    );
                }
                DrawCommand::StrokeRect {
                    rect,
                    role,
                    width,
                    dashed,
                } => {
                    let rect = to_screen(*rect, origin);
                    let stroke = Stroke::new(*width, palette.role(*role));
                    if *dashed {
                        let outline = [
                            rect.left_top(),
                            rect.right_top(),
                            rect.right_bottom(),
                            rect.left_bottom(),
                            rect.left_top(),
                        ];
                        painter.extend(Shape::dashed_line(&outline, stroke, DASH_LENGTH, DASH_GAP));
                    } else {
                        painter.rect_stroke(rect, Rounding::ZERO, stroke);
                    }
                }
                DrawCommand::Line {
                    from,
                    to,
                    role,
                    width,
                } => {
                    painter.line_segment(
                        [point_to_screen(*from, origin), point_to_screen(*to, origin)],
                        Stroke::new(*width, palette.role(*role)),
                    );
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    role,
                } => {
                    painter.circle_filled(point_to_screen(*center, origin), *radius, palette.role(*role));
                }
                DrawCommand::Text {
                    pos,
                    text,
                    size,
                    role,
                    anchor,
                } => {
                    let align = match anchor {
                        TextAnchor::LeftTop => Align2::LEFT_TOP,
                        TextAnchor::Center => Align2::CENTER_CENTER,
                    };
                    painter.text(
                        point_to_screen(*pos, origin),
                        align,
                        text,
                        FontId::proportional(*size),
                        palette.role(*role),
                    );
                }
            }
        }
    }
}

fn color_image(frame: &SharedFrameBuffer) -> egui::ColorImage {
    egui::ColorImage::from_rgba_unmultiplied(
        [frame.width as usize, frame.height as usize],
        &frame.data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_round_trip() {
        let origin = Pos2::new(10.0, 40.0);
        let rect = to_screen(Rect::new(5.0, 5.0, 100.0, 50.0), origin);
        assert_eq!(rect.min, Pos2::new(15.0, 45.0));
        assert_eq!(rect.size(), egui::vec2(100.0, 50.0));
        assert_eq!(to_canvas(Pos2::new(15.0, 45.0), origin), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_cursor_mapping() {
        assert_eq!(cursor_icon(CursorHint::Grabbing), egui::CursorIcon::Grabbing);
        assert_eq!(
            cursor_icon(CursorHint::ResizeHorizontal),
            egui::CursorIcon::ResizeHorizontal
        );
    }
}
