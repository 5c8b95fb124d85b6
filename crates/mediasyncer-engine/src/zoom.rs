//! Zoom, pan and the per-media crop mapping.
//!
//! Zooming first grows a media from "contain" towards "cover" inside its
//! destination rectangle. Once it covers the rectangle, further zoom crops
//! the source instead, and pan moves the crop window.

use mediasyncer_core::limits::{MAX_ZOOM, MIN_ZOOM};
use mediasyncer_core::{Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Where and how one media is drawn into a destination rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Drawn rectangle in canvas space; may overflow the destination
    pub dest: Rect,
    /// Source region in media pixels
    pub src: Rect,
    /// Visible part of `dest`
    pub clip: Rect,
    /// Source magnification; 1 until the media covers its rectangle
    pub crop_zoom: f32,
}

impl Placement {
    /// Source region normalized to `[0, 1]` of the media size.
    pub fn uv(&self, media: (u32, u32)) -> Rect {
        let (w, h) = (media.0.max(1) as f32, media.1.max(1) as f32);
        Rect::new(
            self.src.x / w,
            self.src.y / h,
            self.src.width / w,
            self.src.height / h,
        )
    }
}

fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Map a media of natural size `media` into `rect` at the given view.
///
/// Returns `None` for degenerate inputs (unknown size, empty rectangle).
pub fn map_media(rect: Rect, media: (u32, u32), view: &ZoomPan) -> Option<Placement> {
    if rect.is_empty() || media.0 == 0 || media.1 == 0 {
        return None;
    }
    let (mw, mh) = (media.0 as f32, media.1 as f32);
    let contain = (rect.width / mw).min(rect.height / mh);
    let cover = (rect.width / mw).max(rect.height / mh);
    let scale_to_fill = cover / contain;
    let zoom = view.zoom.max(MIN_ZOOM);

    let (scale, src, crop_zoom) = if zoom <= scale_to_fill {
        let t = if scale_to_fill > 1.0 {
            (zoom - 1.0) / (scale_to_fill - 1.0)
        } else {
            1.0
        };
        let scale = contain + (cover - contain) * smoothstep(t);
        (scale, Rect::new(0.0, 0.0, mw, mh), 1.0)
    } else {
        let crop_zoom = zoom / scale_to_fill;
        let sw = mw / crop_zoom;
        let sh = mh / crop_zoom;
        let sx = ((mw - sw) * 0.5 + view.pan_x).clamp(0.0, mw - sw);
        let sy = ((mh - sh) * 0.5 + view.pan_y).clamp(0.0, mh - sh);
        (cover, Rect::new(sx, sy, sw, sh), crop_zoom)
    };

    let dest = Rect::from_center_size(rect.center(), Vec2::new(mw * scale, mh * scale));
    let clip = dest.intersection(rect)?;
    Some(Placement {
        dest,
        src,
        clip,
        crop_zoom,
    })
}

/// Zoom and pan shared by every media of the active collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPan {
    pub zoom: f32,
    /// Crop window offset in media pixels
    pub pan_x: f32,
    pub pan_y: f32,
    max_zoom: f32,
}

impl Default for ZoomPan {
    fn default() -> Self {
        Self::new(MAX_ZOOM)
    }
}

impl ZoomPan {
    pub fn new(max_zoom: f32) -> Self {
        Self {
            zoom: MIN_ZOOM,
            pan_x: 0.0,
            pan_y: 0.0,
            max_zoom: if max_zoom.is_finite() {
                max_zoom.max(MIN_ZOOM)
            } else {
                MAX_ZOOM
            },
        }
    }

    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    pub fn reset(&mut self) {
        self.zoom = MIN_ZOOM;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
    }

    fn clamp_zoom(&self, zoom: f32) -> f32 {
        if zoom.is_finite() {
            zoom.clamp(MIN_ZOOM, self.max_zoom)
        } else {
            MIN_ZOOM
        }
    }

    /// Clamp pan so the crop window of `reference` stays inside the media.
    /// Without a reference the pan is reset.
    pub fn constrain_pan(&mut self, reference: Option<(u32, u32)>) {
        let Some((w, h)) = reference.filter(|&(w, h)| w > 0 && h > 0) else {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            return;
        };
        let (w, h) = (w as f32, h as f32);
        let max_x = (w - w / self.zoom) * 0.5;
        let max_y = (h - h / self.zoom) * 0.5;
        self.pan_x = if max_x >= 0.0 {
            self.pan_x.clamp(-max_x, max_x)
        } else {
            0.0
        };
        self.pan_y = if max_y >= 0.0 {
            self.pan_y.clamp(-max_y, max_y)
        } else {
            0.0
        };
    }

    /// Set zoom directly (zoom slider).
    pub fn set_zoom(&mut self, zoom: f32, reference: Option<(u32, u32)>) {
        self.zoom = self.clamp_zoom(zoom);
        self.constrain_pan(reference);
    }

    /// Wheel zoom anchored at `pointer` inside `area`, the rectangle the
    /// reference media is drawn into. The source pixel under the pointer
    /// stays put while the crop window allows it.
    pub fn zoom_at(
        &mut self,
        wheel_delta: f32,
        step: f32,
        area: Rect,
        pointer: Vec2,
        reference: Option<(u32, u32)>,
    ) {
        if wheel_delta == 0.0 || !wheel_delta.is_finite() {
            return;
        }
        let old = self.zoom;
        let step = if wheel_delta > 0.0 { step } else { -step };
        let before = reference.and_then(|media| map_media(area, media, self));
        self.zoom = self.clamp_zoom(old - step * old);

        if let (Some(media), Some(before)) = (reference, before) {
            let at = before.dest.normalized(pointer);
            let source = Vec2::new(
                before.src.x + at.x * before.src.width,
                before.src.y + at.y * before.src.height,
            );
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            if let Some(after) = map_media(area, media, self) {
                let at = after.dest.normalized(pointer);
                let (mw, mh) = (media.0 as f32, media.1 as f32);
                let slack_x = (mw - after.src.width) * 0.5;
                let slack_y = (mh - after.src.height) * 0.5;
                self.pan_x = (source.x - at.x * after.src.width - slack_x).clamp(-slack_x, slack_x);
                self.pan_y = (source.y - at.y * after.src.height - slack_y).clamp(-slack_y, slack_y);
            }
        }
        self.constrain_pan(reference);
    }

    /// Middle-button drag: move the crop window against the pointer.
    pub fn pan_by(&mut self, delta: Vec2, reference: Option<(u32, u32)>) {
        self.pan_x -= delta.x;
        self.pan_y -= delta.y;
        self.constrain_pan(reference);
    }
}
