//! File-backed media elements.
//!
//! [`VideoElement`] pairs a wall-clock playback clock with a decode worker
//! and presents the newest decoded frame whose timestamp the clock has
//! reached. [`ImageElement`] decodes a still picture once.

use crossbeam_channel::{bounded, Receiver};
use mediasyncer_core::{
    FrameBuffer, MediaElement, MediaEvent, MediaKind, SeekTicket, SharedFrameBuffer,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::decoder::{DecodeMessage, DecodeSettings, DecodeWorker, DecodedFrame};
use crate::probe::MediaProbe;

/// Largest texture side we hand to the painter for still images.
const MAX_IMAGE_SIDE: u32 = 4096;

/// Wall-clock driven playback position.
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    position: f64,
    anchor: Option<Instant>,
    rate: f64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self {
            position: 0.0,
            anchor: None,
            rate: 1.0,
        }
    }
}

impl PlaybackClock {
    /// Position at `now`, clamped to `[0, duration]` when the duration is known.
    pub fn position_at(&self, now: Instant, duration: f64) -> f64 {
        let t = match self.anchor {
            Some(anchor) => {
                self.position + now.saturating_duration_since(anchor).as_secs_f64() * self.rate
            }
            None => self.position,
        };
        if duration > 0.0 {
            t.clamp(0.0, duration)
        } else {
            t.max(0.0)
        }
    }

    pub fn is_running(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        if self.anchor.is_none() {
            self.anchor = Some(now);
        }
    }

    pub fn stop(&mut self, now: Instant, duration: f64) {
        self.position = self.position_at(now, duration);
        self.anchor = None;
    }

    /// Jump to `seconds`, keeping the running state.
    pub fn set(&mut self, now: Instant, seconds: f64) {
        self.position = seconds.max(0.0);
        if self.anchor.is_some() {
            self.anchor = Some(now);
        }
    }

    pub fn set_rate(&mut self, now: Instant, rate: f64, duration: f64) {
        if self.anchor.is_some() {
            self.position = self.position_at(now, duration);
            self.anchor = Some(now);
        }
        self.rate = rate;
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }
}

/// A video file decoded by a background ffmpeg worker.
pub struct VideoElement {
    path: PathBuf,
    worker: DecodeWorker,
    probe: Option<MediaProbe>,
    clock: PlaybackClock,
    paused: bool,
    volume: f32,
    /// Last ticket handed out by `set_time`
    ticket: SeekTicket,
    /// Decode epoch of the latest seek
    epoch: u64,
    /// Seek waiting for its first frame
    pending_seek: Option<SeekTicket>,
    current: Option<SharedFrameBuffer>,
    next: Option<DecodedFrame>,
    failed: bool,
}

impl VideoElement {
    /// Start loading `path`. Metadata arrives later as [`MediaEvent::Loaded`].
    pub fn open(path: impl Into<PathBuf>, settings: DecodeSettings) -> Self {
        let path = path.into();
        info!("Opening video file: {}", path.display());
        let worker = DecodeWorker::spawn(path.clone(), settings);
        Self {
            path,
            worker,
            probe: None,
            clock: PlaybackClock::default(),
            paused: true,
            volume: 1.0,
            ticket: SeekTicket::default(),
            epoch: 0,
            pending_seek: None,
            current: None,
            next: None,
            failed: false,
        }
    }

    /// Probe result, once loaded.
    pub fn probe(&self) -> Option<&MediaProbe> {
        self.probe.as_ref()
    }

    fn half_frame(&self) -> f64 {
        self.probe
            .as_ref()
            .and_then(|p| p.primary_video())
            .map(|v| v.frame_rate.frame_duration() * 0.5)
            .unwrap_or(1.0 / 60.0)
    }

    fn complete_pending_seek(&mut self, out: &mut Vec<MediaEvent>) {
        if let Some(ticket) = self.pending_seek.take() {
            debug!("Seek {:?} landed for {}", ticket, self.path.display());
            out.push(MediaEvent::SeekCompleted(ticket));
        }
    }

    /// Pull worker messages and advance the presented frame.
    fn pump(&mut self, out: &mut Vec<MediaEvent>) {
        let now = Instant::now();
        loop {
            if self.next.is_none() {
                match self.worker.try_recv() {
                    Some(DecodeMessage::Probed(probe)) => {
                        info!(
                            "Loaded {} ({:.2}s, {:?})",
                            self.path.display(),
                            probe.duration,
                            probe.primary_video().map(|v| (v.width, v.height))
                        );
                        self.probe = Some(*probe);
                        out.push(MediaEvent::Loaded);
                        continue;
                    }
                    Some(DecodeMessage::Frame(frame)) => {
                        if frame.epoch != self.epoch {
                            continue;
                        }
                        self.next = Some(frame);
                    }
                    Some(DecodeMessage::EndOfStream { epoch }) => {
                        // Seeking at or past the last frame yields nothing to show.
                        if epoch == self.epoch {
                            self.complete_pending_seek(out);
                        }
                        continue;
                    }
                    Some(DecodeMessage::Error(message)) => {
                        warn!("Video {} failed: {}", self.path.display(), message);
                        self.failed = true;
                        out.push(MediaEvent::Failed(message));
                        return;
                    }
                    None => break,
                }
            }

            let Some(frame) = self.next.as_ref() else {
                break;
            };
            let due = self.pending_seek.is_some()
                || frame.pts <= self.clock.position_at(now, self.duration()) + self.half_frame();
            if !due {
                break;
            }
            if let Some(frame) = self.next.take() {
                self.current = Some(frame.buffer);
            }
            self.complete_pending_seek(out);
        }

        let duration = self.duration();
        if !self.paused && duration > 0.0 && self.clock.position_at(now, duration) >= duration {
            self.clock.stop(now, duration);
            self.paused = true;
        }
    }
}

impl MediaElement for VideoElement {
    fn kind(&self) -> MediaKind {
        MediaKind::Video
    }

    fn time(&self) -> f64 {
        self.clock.position_at(Instant::now(), self.duration())
    }

    fn set_time(&mut self, seconds: f64) -> SeekTicket {
        let duration = self.duration();
        let target = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        self.ticket = self.ticket.next();
        self.epoch += 1;
        self.pending_seek = Some(self.ticket);
        self.next = None;
        self.clock.set(Instant::now(), target);
        self.worker.seek(self.epoch, target);
        self.ticket
    }

    fn duration(&self) -> f64 {
        self.probe.as_ref().map_or(0.0, |p| p.duration)
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.probe
            .as_ref()
            .and_then(|p| p.primary_video())
            .map(|v| (v.width, v.height))
            .filter(|(w, h)| *w > 0 && *h > 0)
    }

    fn play(&mut self) {
        if self.failed || !self.paused {
            return;
        }
        let duration = self.duration();
        if duration > 0.0 && self.time() >= duration {
            return;
        }
        self.paused = false;
        self.clock.start(Instant::now());
    }

    fn pause(&mut self) {
        if self.paused {
            return;
        }
        self.paused = true;
        let duration = self.duration();
        self.clock.stop(Instant::now(), duration);
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn set_rate(&mut self, rate: f64) {
        if rate.is_finite() && rate > 0.0 {
            let duration = self.duration();
            self.clock.set_rate(Instant::now(), rate, duration);
        }
    }

    fn rate(&self) -> f64 {
        self.clock.rate()
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.volume
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut out = Vec::new();
        if !self.failed {
            self.pump(&mut out);
        }
        out
    }

    fn frame(&self) -> Option<SharedFrameBuffer> {
        self.current.clone()
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}

/// A still image decoded once on a background thread.
pub struct ImageElement {
    path: PathBuf,
    pending: Option<Receiver<Result<FrameBuffer, String>>>,
    frame: Option<SharedFrameBuffer>,
    dimensions: Option<(u32, u32)>,
    ticket: SeekTicket,
    events: Vec<MediaEvent>,
}

impl ImageElement {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        info!("Opening image file: {}", path.display());
        let (tx, rx) = bounded(1);
        let load_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("mediasyncer-image".into())
            .spawn(move || {
                let _ = tx.send(decode_image(&load_path));
            });
        let mut events = Vec::new();
        if let Err(e) = spawned {
            events.push(MediaEvent::Failed(format!("failed to spawn image loader: {}", e)));
        }
        Self {
            path,
            pending: Some(rx),
            frame: None,
            dimensions: None,
            ticket: SeekTicket::default(),
            events,
        }
    }
}

fn decode_image(path: &Path) -> Result<FrameBuffer, String> {
    let img = image::open(path).map_err(|e| format!("failed to decode image: {}", e))?;
    let img = if img.width() > MAX_IMAGE_SIDE || img.height() > MAX_IMAGE_SIDE {
        img.thumbnail(MAX_IMAGE_SIDE, MAX_IMAGE_SIDE)
    } else {
        img
    };
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    FrameBuffer::from_rgba(width, height, rgba.into_raw())
        .ok_or_else(|| "image buffer size mismatch".to_string())
}

impl MediaElement for ImageElement {
    fn kind(&self) -> MediaKind {
        MediaKind::Image
    }

    fn time(&self) -> f64 {
        0.0
    }

    fn set_time(&mut self, _seconds: f64) -> SeekTicket {
        self.ticket = self.ticket.next();
        self.events.push(MediaEvent::SeekCompleted(self.ticket));
        self.ticket
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    fn play(&mut self) {}

    fn pause(&mut self) {}

    fn is_paused(&self) -> bool {
        true
    }

    fn set_rate(&mut self, _rate: f64) {}

    fn rate(&self) -> f64 {
        1.0
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn volume(&self) -> f32 {
        0.0
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        let mut out = std::mem::take(&mut self.events);
        let Some(rx) = self.pending.as_ref() else {
            return out;
        };
        if let Ok(result) = rx.try_recv() {
            self.pending = None;
            match result {
                Ok(frame) => {
                    info!(
                        "Loaded {} ({}x{})",
                        self.path.display(),
                        frame.width,
                        frame.height
                    );
                    self.dimensions = Some((frame.width, frame.height));
                    self.frame = Some(Arc::new(frame));
                    out.push(MediaEvent::Loaded);
                }
                Err(message) => {
                    warn!("Image {} failed: {}", self.path.display(), message);
                    out.push(MediaEvent::Failed(message));
                }
            }
        }
        out
    }

    fn frame(&self) -> Option<SharedFrameBuffer> {
        self.frame.clone()
    }

    fn source_path(&self) -> Option<&Path> {
        Some(&self.path)
    }
}
