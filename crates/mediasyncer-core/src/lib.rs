//! MediaSyncer Core - Foundation types for the comparison viewer
//!
//! This crate provides the fundamental types used throughout MediaSyncer:
//! - Time representation (FrameRate, timecode formatting)
//! - Frame buffers handed from decoders to the painter
//! - Geometric primitives
//! - The `MediaElement` contract every loaded source implements
//! - Persisted viewer configuration

pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod media;
pub mod time;

pub use config::{config_file_path, ViewerConfig};
pub use error::{Result, SyncError};
pub use frame::{FrameBuffer, SharedFrameBuffer};
pub use geometry::{Rect, Vec2};
pub use media::{MediaElement, MediaEvent, MediaId, MediaKind, SeekTicket};
pub use time::{format_clock, FrameRate};

/// Interaction constants shared by the engine and the painter.
pub mod limits {
    /// Lower zoom bound (no magnification).
    pub const MIN_ZOOM: f32 = 1.0;

    /// Upper zoom bound, applied to grid and split view alike.
    pub const MAX_ZOOM: f32 = 10.0;

    /// Slider resolution used by the seek and A-B sliders.
    pub const SLIDER_STEPS: u32 = 1000;

    /// Lower bound of the loop boundary tolerance, in seconds.
    pub const MIN_LOOP_EPSILON: f64 = 0.008;

    /// Compare split ratio bounds.
    pub const MIN_SPLIT_RATIO: f32 = 0.02;
    pub const MAX_SPLIT_RATIO: f32 = 0.98;
}
