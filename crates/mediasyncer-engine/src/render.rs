//! Draw list produced by the per-tick render pass.
//!
//! The engine never touches a painter. It emits canvas-space
//! [`DrawCommand`]s tagged with semantic colours, and the UI maps them onto
//! its own primitives and theme.

use mediasyncer_core::{MediaId, Rect, Vec2};

/// Semantic colours, resolved by the UI theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    /// Prompt text on the canvas
    CanvasText,
    /// Canvas border
    Border,
    Accent,
    /// Drop target placeholder while reordering
    DropPreview,
    /// Dark backing behind badges
    BadgeBackground,
    /// Lighter backing behind corner hotspots
    HotspotBackground,
    BadgeText,
    /// Compare divider when not hovered
    DividerIdle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    LeftTop,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Blit the current frame of `media`. `src` is normalized to the media
    /// size; nothing outside `clip` is drawn.
    Image {
        media: MediaId,
        dest: Rect,
        src: Rect,
        clip: Rect,
    },
    FillRect {
        rect: Rect,
        role: ColorRole,
        rounding: f32,
    },
    StrokeRect {
        rect: Rect,
        role: ColorRole,
        width: f32,
        dashed: bool,
    },
    Line {
        from: Vec2,
        to: Vec2,
        role: ColorRole,
        width: f32,
    },
    Circle {
        center: Vec2,
        radius: f32,
        role: ColorRole,
    },
    Text {
        pos: Vec2,
        text: String,
        size: f32,
        role: ColorRole,
        anchor: TextAnchor,
    },
}

/// Pointer shape requested by the render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    ResizeHorizontal,
}

/// One frame's worth of drawing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub commands: Vec<DrawCommand>,
    pub cursor: CursorHint,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn image(&mut self, media: MediaId, dest: Rect, src: Rect, clip: Rect) {
        self.commands.push(DrawCommand::Image {
            media,
            dest,
            src,
            clip,
        });
    }

    pub fn fill(&mut self, rect: Rect, role: ColorRole, rounding: f32) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            role,
            rounding,
        });
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, role: ColorRole, width: f32) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            role,
            width,
        });
    }

    pub fn text(&mut self, pos: Vec2, text: impl Into<String>, size: f32, role: ColorRole, anchor: TextAnchor) {
        self.commands.push(DrawCommand::Text {
            pos,
            text: text.into(),
            size,
            role,
            anchor,
        });
    }

    /// Media drawn this frame, in paint order.
    pub fn images(&self) -> impl Iterator<Item = (MediaId, Rect)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Image { media, clip, .. } => Some((*media, *clip)),
            _ => None,
        })
    }

    /// All text drawn this frame.
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Text metrics supplied by the UI's font system.
pub trait TextMeasure {
    /// Width of `text` rendered at `size` points.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Fixed advance per character. Stands in for a real font where none is
/// available (tests, benchmarks).
#[derive(Debug, Clone, Copy)]
pub struct ApproxMeasure {
    pub advance: f32,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * self.advance
    }
}

/// Shorten `text` with a trailing `...` until it fits `max_width`.
pub fn truncate_to_width(text: &str, max_width: f32, size: f32, measure: &dyn TextMeasure) -> String {
    if measure.text_width(text, size) <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        let candidate: String = chars.iter().collect::<String>() + "...";
        if measure.text_width(&candidate, size) <= max_width {
            return candidate;
        }
        chars.pop();
    }
    "...".to_string()
}
