//! Geometric primitives for canvas-space layout.

use glam::Vec2 as GlamVec2;
use serde::{Deserialize, Serialize};

/// 2D vector.
pub type Vec2 = GlamVec2;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from center and size.
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        Self {
            x: center.x - size.x * 0.5,
            y: center.y - size.y * 0.5,
            width: size.x,
            height: size.y,
        }
    }

    #[inline]
    pub fn right(self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(self) -> f32 {
        self.y + self.height
    }

    /// Center point.
    #[inline]
    pub fn center(self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Size as a vector.
    #[inline]
    pub fn size(self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    /// Width over height, or `None` for a degenerate rectangle.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        (self.width > 0.0 && self.height > 0.0).then(|| self.width / self.height)
    }

    /// True when either side is zero or negative.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Closed containment test, edges included. Used for hit-testing so a
    /// pointer resting on a tile border still counts as inside it.
    #[inline]
    pub fn contains_inclusive(self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Compute intersection with another rectangle.
    pub fn intersection(self, other: Self) -> Option<Self> {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.width).min(other.x + other.width);
        let y2 = (self.y + self.height).min(other.y + other.height);

        if x1 < x2 && y1 < y2 {
            Some(Self::new(x1, y1, x2 - x1, y2 - y1))
        } else {
            None
        }
    }

    /// Split vertically at absolute `x`, returning the left and right parts.
    /// Either part may come back with zero width.
    pub fn split_at_x(self, x: f32) -> (Self, Self) {
        let x = x.clamp(self.x, self.right());
        (
            Self::new(self.x, self.y, x - self.x, self.height),
            Self::new(x, self.y, self.right() - x, self.height),
        )
    }

    /// Position of `point` relative to this rectangle, normalized so the
    /// top-left corner is `(0, 0)` and the bottom-right corner is `(1, 1)`.
    pub fn normalized(self, point: Vec2) -> Vec2 {
        let w = if self.width != 0.0 { self.width } else { 1.0 };
        let h = if self.height != 0.0 { self.height } else { 1.0 };
        Vec2::new((point.x - self.x) / w, (point.y - self.y) / h)
    }

    /// Largest rectangle of the given aspect ratio centered inside `self`.
    pub fn fit_aspect(self, aspect: f32) -> Self {
        let Some(own) = self.aspect() else {
            return self;
        };
        if aspect <= 0.0 || !aspect.is_finite() {
            return self;
        }
        if aspect > own {
            let h = self.width / aspect;
            Self::new(self.x, self.y + (self.height - h) * 0.5, self.width, h)
        } else {
            let w = self.height * aspect;
            Self::new(self.x + (self.width - w) * 0.5, self.y, w, self.height)
        }
    }
}
