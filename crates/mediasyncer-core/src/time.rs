//! Frame rates and timecode formatting.
//!
//! Media clocks report plain `f64` seconds; the frame rate only decides how
//! long a single manual step is and how the frame counter reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Frame rate as a rational number (e.g., 30000/1001 for 29.97 fps).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameRate {
    /// Numerator (e.g., 30000)
    pub numerator: u32,
    /// Denominator (e.g., 1001)
    pub denominator: u32,
}

impl FrameRate {
    /// Create a new frame rate.
    #[inline]
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Build a frame rate from a user-entered fps value.
    ///
    /// Non-finite or non-positive input falls back to 30 fps, matching what
    /// an empty frame-rate field means.
    pub fn from_fps_f64(fps: f64) -> Self {
        if !fps.is_finite() || fps <= 0.0 {
            return Self::FPS_30;
        }
        if (fps - fps.round()).abs() < 1e-9 {
            return Self::new(fps.round() as u32, 1);
        }
        const PRECISION: u32 = 1000;
        Self::new((fps * PRECISION as f64).round() as u32, PRECISION)
    }

    /// Convert to frames per second as f64.
    #[inline]
    pub fn to_fps_f64(self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.numerator as f64 / self.denominator as f64
    }

    /// Duration of a single frame, in seconds.
    #[inline]
    pub fn frame_duration(self) -> f64 {
        if self.numerator == 0 {
            return 1.0 / 30.0;
        }
        self.denominator as f64 / self.numerator as f64
    }

    /// Frame index at `seconds`, rounded to the nearest frame.
    #[inline]
    pub fn frame_at(self, seconds: f64) -> i64 {
        (seconds * self.to_fps_f64()).round() as i64
    }

    /// Common frame rates
    pub const FPS_25: Self = Self::new(25, 1);
    pub const FPS_29_97: Self = Self::new(30000, 1001);
    pub const FPS_30: Self = Self::new(30, 1);
}

impl Default for FrameRate {
    fn default() -> Self {
        Self::FPS_30
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fps = self.to_fps_f64();
        if (fps - fps.round()).abs() < 0.001 {
            write!(f, "{} fps", fps.round() as u32)
        } else {
            write!(f, "{:.3} fps", fps)
        }
    }
}

/// Format seconds as `MM:SS.cc` (minutes, seconds, hundredths).
///
/// Unknown durations (NaN, infinity) read as `00:00.00`.
pub fn format_clock(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00.00".to_string();
    }
    let minutes = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let hundredths = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{:02}:{:02}.{:02}", minutes, secs, hundredths.min(99))
}

/// Format the `current / total` frame counter shown beside the timecode.
pub fn format_frame_counter(current: f64, total: f64, rate: FrameRate) -> String {
    let current = if current.is_finite() { rate.frame_at(current) } else { 0 };
    let total = if total.is_finite() { rate.frame_at(total) } else { 0 };
    format!("{} / {}", current, total)
}
