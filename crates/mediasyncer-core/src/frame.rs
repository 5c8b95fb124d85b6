//! Frame buffers handed from decoders to the painter.
//!
//! Every decoded picture is tightly packed RGBA8; the painter uploads it
//! straight into a texture.

use std::sync::Arc;

/// A decoded picture in CPU memory (RGBA8, no row padding).
#[derive(Debug, Clone, PartialEq)]
pub struct FrameBuffer {
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Packed RGBA8 pixel data, `width * height * 4` bytes
    pub data: Vec<u8>,
}

impl FrameBuffer {
    /// Create a black, fully opaque frame.
    pub fn new(width: u32, height: u32) -> Self {
        let mut data = vec![0u8; Self::byte_len(width, height)];
        for px in data.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Wrap existing RGBA8 bytes. Returns `None` if the length does not match.
    pub fn from_rgba(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        (data.len() == Self::byte_len(width, height)).then_some(Self {
            width,
            height,
            data,
        })
    }

    /// Expand packed RGB24 bytes (as emitted by `ffmpeg -pix_fmt rgb24`).
    pub fn from_rgb24(width: u32, height: u32, rgb: &[u8]) -> Option<Self> {
        let pixels = width as usize * height as usize;
        if rgb.len() != pixels * 3 {
            return None;
        }
        let mut data = Vec::with_capacity(pixels * 4);
        for chunk in rgb.chunks_exact(3) {
            data.extend_from_slice(chunk);
            data.push(255);
        }
        Some(Self {
            width,
            height,
            data,
        })
    }

    /// Number of bytes an RGBA8 frame of the given size occupies.
    #[inline]
    pub fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    /// Create a test pattern frame (color bars), tinted by `hue_shift` so
    /// several synthetic sources are distinguishable side by side.
    pub fn test_pattern(width: u32, height: u32, hue_shift: usize) -> Self {
        const BARS: [[u8; 4]; 8] = [
            [255, 255, 255, 255], // White
            [255, 255, 0, 255],   // Yellow
            [0, 255, 255, 255],   // Cyan
            [0, 255, 0, 255],     // Green
            [255, 0, 255, 255],   // Magenta
            [255, 0, 0, 255],     // Red
            [0, 0, 255, 255],     // Blue
            [0, 0, 0, 255],       // Black
        ];
        let mut frame = Self::new(width, height);
        if width == 0 {
            return frame;
        }
        let stride = width as usize * 4;
        for y in 0..height as usize {
            let row = &mut frame.data[y * stride..(y + 1) * stride];
            for x in 0..width as usize {
                let bar = (x * 8 / width as usize + hue_shift) % BARS.len();
                row[x * 4..x * 4 + 4].copy_from_slice(&BARS[bar]);
            }
        }
        frame
    }
}

/// Arc-wrapped frame buffer for shared ownership.
pub type SharedFrameBuffer = Arc<FrameBuffer>;
