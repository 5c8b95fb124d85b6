//! The contract every loaded media source implements.
//!
//! The engine never decodes anything itself. It drives sources through
//! [`MediaElement`] and learns about asynchronous progress (metadata,
//! seek completion, failure) by polling [`MediaEvent`]s once per tick.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use crate::frame::SharedFrameBuffer;

/// Unique identifier for a loaded media item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MediaId(pub Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a source is. Images have no timeline and never drive playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MediaKind {
    Video,
    Image,
}

impl MediaKind {
    #[inline]
    pub fn is_video(self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => write!(f, "video"),
            MediaKind::Image => write!(f, "image"),
        }
    }
}

/// Token returned by [`MediaElement::set_time`].
///
/// Tickets increase monotonically per element. A completion carrying an
/// older ticket than the element's latest seek is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SeekTicket(pub u64);

impl SeekTicket {
    /// The ticket following this one.
    #[inline]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Asynchronous notifications drained from an element each tick.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Duration and dimensions are now known.
    Loaded,
    /// The seek identified by the ticket has landed.
    SeekCompleted(SeekTicket),
    /// Loading or decoding failed; the item should be dropped.
    Failed(String),
}

/// A playable (or static) media source.
///
/// Times are seconds. Before [`MediaEvent::Loaded`] arrives `duration`
/// reports 0 and `dimensions` reports `None`.
pub trait MediaElement: Send {
    fn kind(&self) -> MediaKind;

    /// Current playback position.
    fn time(&self) -> f64;

    /// Start a seek. Completion is reported later through `poll_events`.
    fn set_time(&mut self, seconds: f64) -> SeekTicket;

    fn duration(&self) -> f64;

    /// Natural pixel size, once known.
    fn dimensions(&self) -> Option<(u32, u32)>;

    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;

    fn set_rate(&mut self, rate: f64);
    fn rate(&self) -> f64;

    /// Output gain in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    fn volume(&self) -> f32;

    /// Drain pending events. Also where elements advance internal state.
    fn poll_events(&mut self) -> Vec<MediaEvent>;

    /// Most recent decoded picture, if any.
    fn frame(&self) -> Option<SharedFrameBuffer>;

    /// Path on disk, for collaborators (audio) that open the file again.
    fn source_path(&self) -> Option<&Path> {
        None
    }

    /// True once the position has reached the end of the timeline.
    fn ended(&self) -> bool {
        let d = self.duration();
        d > 0.0 && self.time() >= d
    }
}
