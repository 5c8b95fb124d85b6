//! MediaSyncer Media - FFmpeg-backed media elements
//!
//! This crate handles:
//! - Media file probing through ffprobe
//! - Background frame decoding through ffmpeg
//! - Video and still-image elements implementing `MediaElement`
//! - Synthetic media with a manual clock for tests
//! - Classifying imported files

pub mod decoder;
pub mod element;
pub mod loader;
pub mod probe;
pub mod synthetic;

pub use decoder::{DecodeSettings, DecodeWorker, DecodedFrame};
pub use element::{ImageElement, PlaybackClock, VideoElement};
pub use loader::{classify_path, display_name, open_media};
pub use probe::MediaProbe;
pub use synthetic::{SyntheticHandle, SyntheticMedia};

/// Check that the external ffmpeg tools are reachable (call once at startup).
pub fn tools_available() -> bool {
    let ffmpeg = ffmpeg_sidecar::command::ffmpeg_is_installed();
    if ffmpeg {
        tracing::info!("MediaSyncer media initialized (ffmpeg found)");
    } else {
        tracing::warn!("ffmpeg was not found on PATH; videos will fail to load");
    }
    ffmpeg
}
