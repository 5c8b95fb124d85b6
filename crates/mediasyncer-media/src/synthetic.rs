//! Deterministic in-memory media for tests and benchmarks.
//!
//! A [`SyntheticMedia`] behaves like a real element but its clock only moves
//! when [`SyntheticHandle::advance`] is called, and seeks stay pending until
//! [`SyntheticHandle::complete_seeks`] releases them. The handle is shared
//! with the element so a test can keep driving media that a session owns.

use mediasyncer_core::{
    FrameBuffer, MediaElement, MediaEvent, MediaKind, SeekTicket, SharedFrameBuffer,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
struct SyntheticState {
    kind: MediaKind,
    /// Duration and size reported once loaded
    natural_duration: f64,
    natural_size: (u32, u32),
    loaded: bool,
    time: f64,
    paused: bool,
    rate: f64,
    volume: f32,
    ticket: SeekTicket,
    pending: Vec<SeekTicket>,
    instant_seeks: bool,
    /// Pause on reaching the end, like a real player
    pause_at_end: bool,
    events: Vec<MediaEvent>,
    frame: Option<SharedFrameBuffer>,
    seek_log: Vec<f64>,
}

/// Test-side controller for a [`SyntheticMedia`].
#[derive(Debug, Clone)]
pub struct SyntheticHandle {
    state: Arc<Mutex<SyntheticState>>,
}

/// In-memory media element with a manual clock.
#[derive(Debug)]
pub struct SyntheticMedia {
    state: Arc<Mutex<SyntheticState>>,
}

impl SyntheticMedia {
    /// A video whose metadata is announced on the first poll.
    pub fn video(duration: f64, width: u32, height: u32) -> (Self, SyntheticHandle) {
        Self::build(MediaKind::Video, duration, (width, height), true)
    }

    /// A video whose metadata arrives only after [`SyntheticHandle::finish_loading`].
    pub fn video_loading(duration: f64, width: u32, height: u32) -> (Self, SyntheticHandle) {
        Self::build(MediaKind::Video, duration, (width, height), false)
    }

    /// A still image.
    pub fn image(width: u32, height: u32) -> (Self, SyntheticHandle) {
        Self::build(MediaKind::Image, 0.0, (width, height), true)
    }

    fn build(
        kind: MediaKind,
        duration: f64,
        size: (u32, u32),
        loaded: bool,
    ) -> (Self, SyntheticHandle) {
        let mut state = SyntheticState {
            kind,
            natural_duration: duration.max(0.0),
            natural_size: size,
            loaded: false,
            time: 0.0,
            paused: true,
            rate: 1.0,
            volume: 1.0,
            ticket: SeekTicket::default(),
            pending: Vec::new(),
            instant_seeks: false,
            pause_at_end: false,
            events: Vec::new(),
            frame: None,
            seek_log: Vec::new(),
        };
        if loaded {
            state.mark_loaded();
        }
        let state = Arc::new(Mutex::new(state));
        (
            Self {
                state: Arc::clone(&state),
            },
            SyntheticHandle { state },
        )
    }
}

impl SyntheticState {
    fn mark_loaded(&mut self) {
        if self.loaded {
            return;
        }
        self.loaded = true;
        let (w, h) = self.natural_size;
        if w > 0 && h > 0 {
            let shift = (w as usize + h as usize) % 8;
            self.frame = Some(Arc::new(FrameBuffer::test_pattern(
                w.min(64),
                h.min(64),
                shift,
            )));
        }
        self.events.push(MediaEvent::Loaded);
    }

    fn duration(&self) -> f64 {
        if self.loaded {
            self.natural_duration
        } else {
            0.0
        }
    }
}

impl SyntheticHandle {
    /// Advance the clock by `dt` seconds if playing. The position stops at
    /// the end; the element stays unpaused unless `pause_at_end` is set.
    pub fn advance(&self, dt: f64) {
        let mut s = self.state.lock();
        if s.paused || s.kind != MediaKind::Video {
            return;
        }
        let duration = s.duration();
        let next = s.time + dt * s.rate;
        s.time = if duration > 0.0 { next.min(duration) } else { next };
        if s.pause_at_end && duration > 0.0 && s.time >= duration {
            s.paused = true;
        }
    }

    /// Release every outstanding seek.
    pub fn complete_seeks(&self) {
        let mut s = self.state.lock();
        let pending = std::mem::take(&mut s.pending);
        s.events
            .extend(pending.into_iter().map(MediaEvent::SeekCompleted));
    }

    /// Release only the oldest outstanding seek.
    pub fn complete_oldest_seek(&self) {
        let mut s = self.state.lock();
        if !s.pending.is_empty() {
            let ticket = s.pending.remove(0);
            s.events.push(MediaEvent::SeekCompleted(ticket));
        }
    }

    /// Complete seeks as soon as they are issued.
    pub fn set_instant_seeks(&self, instant: bool) {
        self.state.lock().instant_seeks = instant;
    }

    pub fn set_pause_at_end(&self, pause: bool) {
        self.state.lock().pause_at_end = pause;
    }

    /// Announce metadata for a media created with `video_loading`.
    pub fn finish_loading(&self) {
        self.state.lock().mark_loaded();
    }

    /// Report a load failure on the next poll.
    pub fn fail(&self, reason: &str) {
        self.state
            .lock()
            .events
            .push(MediaEvent::Failed(reason.to_string()));
    }

    /// Move the clock without going through a seek (external drift).
    pub fn force_time(&self, seconds: f64) {
        self.state.lock().time = seconds;
    }

    pub fn time(&self) -> f64 {
        self.state.lock().time
    }

    pub fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    pub fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    pub fn pending_seeks(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Every target passed to `set_time`, in order.
    pub fn seek_log(&self) -> Vec<f64> {
        self.state.lock().seek_log.clone()
    }

    /// True once the element has been dropped by its owner.
    pub fn is_released(&self) -> bool {
        Arc::strong_count(&self.state) == 1
    }
}

impl MediaElement for SyntheticMedia {
    fn kind(&self) -> MediaKind {
        self.state.lock().kind
    }

    fn time(&self) -> f64 {
        self.state.lock().time
    }

    fn set_time(&mut self, seconds: f64) -> SeekTicket {
        let mut s = self.state.lock();
        let duration = s.duration();
        s.time = if duration > 0.0 {
            seconds.clamp(0.0, duration)
        } else {
            seconds.max(0.0)
        };
        s.seek_log.push(seconds);
        s.ticket = s.ticket.next();
        let ticket = s.ticket;
        if s.instant_seeks {
            s.events.push(MediaEvent::SeekCompleted(ticket));
        } else {
            s.pending.push(ticket);
        }
        ticket
    }

    fn duration(&self) -> f64 {
        self.state.lock().duration()
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        let s = self.state.lock();
        let (w, h) = s.natural_size;
        (s.loaded && w > 0 && h > 0).then_some((w, h))
    }

    fn play(&mut self) {
        let mut s = self.state.lock();
        if s.kind == MediaKind::Video {
            s.paused = false;
        }
    }

    fn pause(&mut self) {
        self.state.lock().paused = true;
    }

    fn is_paused(&self) -> bool {
        self.state.lock().paused
    }

    fn set_rate(&mut self, rate: f64) {
        self.state.lock().rate = rate;
    }

    fn rate(&self) -> f64 {
        self.state.lock().rate
    }

    fn set_volume(&mut self, volume: f32) {
        self.state.lock().volume = volume.clamp(0.0, 1.0);
    }

    fn volume(&self) -> f32 {
        self.state.lock().volume
    }

    fn poll_events(&mut self) -> Vec<MediaEvent> {
        std::mem::take(&mut self.state.lock().events)
    }

    fn frame(&self) -> Option<SharedFrameBuffer> {
        self.state.lock().frame.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loaded_event_on_first_poll() {
        let (mut media, _handle) = SyntheticMedia::video(10.0, 1920, 1080);
        assert_eq!(media.poll_events(), vec![MediaEvent::Loaded]);
        assert!(media.poll_events().is_empty());
        assert_eq!(media.duration(), 10.0);
        assert_eq!(media.dimensions(), Some((1920, 1080)));
    }

    #[test]
    fn test_deferred_loading() {
        let (mut media, handle) = SyntheticMedia::video_loading(5.0, 640, 480);
        assert_eq!(media.duration(), 0.0);
        assert!(media.dimensions().is_none());
        assert!(media.poll_events().is_empty());
        handle.finish_loading();
        assert_eq!(media.poll_events(), vec![MediaEvent::Loaded]);
        assert_eq!(media.duration(), 5.0);
    }

    #[test]
    fn test_manual_clock() {
        let (mut media, handle) = SyntheticMedia::video(4.0, 10, 10);
        handle.advance(1.0);
        assert_eq!(media.time(), 0.0);
        media.play();
        media.set_rate(2.0);
        handle.advance(1.0);
        assert_eq!(media.time(), 2.0);
        handle.advance(5.0);
        assert_eq!(media.time(), 4.0);
        assert!(!media.is_paused());
    }

    #[test]
    fn test_seek_completion_is_deferred() {
        let (mut media, handle) = SyntheticMedia::video(10.0, 10, 10);
        media.poll_events();
        let first = media.set_time(3.0);
        let second = media.set_time(4.0);
        assert!(second > first);
        assert_eq!(media.time(), 4.0);
        assert!(media.poll_events().is_empty());
        handle.complete_seeks();
        assert_eq!(
            media.poll_events(),
            vec![
                MediaEvent::SeekCompleted(first),
                MediaEvent::SeekCompleted(second)
            ]
        );
    }

    #[test]
    fn test_release_tracking() {
        let (media, handle) = SyntheticMedia::image(10, 10);
        assert!(!handle.is_released());
        drop(media);
        assert!(handle.is_released());
    }
}
