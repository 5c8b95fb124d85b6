//! Transport: play, pause, step and seek across the active videos.
//!
//! Every operation is scoped to the videos of the active collection and is
//! a no-op without a master. Group seeks go through a [`SeekBarrier`] so
//! playback only resumes once every element has landed.

use mediasyncer_core::{FrameRate, MediaId, SeekTicket};
use tracing::debug;

use crate::barrier::SeekBarrier;
use crate::master::master_clock;
use crate::registry::Registry;

/// Highest value of the seek slider.
pub const SEEK_SLIDER_MAX: f64 = mediasyncer_core::limits::SLIDER_STEPS as f64;

/// Playback state shared by all active videos.
#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub is_playing: bool,
    /// The seek slider is being dragged
    pub scrubbing: bool,
    pub playback_rate: f64,
    pub is_looping: bool,
    pub frame_rate: FrameRate,
    barrier: Option<SeekBarrier>,
}

impl Default for Transport {
    fn default() -> Self {
        Self::new(1.0, true, FrameRate::default())
    }
}

impl Transport {
    pub fn new(playback_rate: f64, is_looping: bool, frame_rate: FrameRate) -> Self {
        Self {
            is_playing: false,
            scrubbing: false,
            playback_rate,
            is_looping,
            frame_rate,
            barrier: None,
        }
    }

    /// A scrub or a group seek is in flight.
    pub fn is_seeking(&self) -> bool {
        self.scrubbing || self.barrier.is_some()
    }

    pub fn barrier(&self) -> Option<&SeekBarrier> {
        self.barrier.as_ref()
    }

    /// Add a late seek (e.g. a video finishing its load) to the outstanding barrier.
    pub fn join_barrier(&mut self, id: MediaId, ticket: SeekTicket) -> bool {
        match self.barrier.as_mut() {
            Some(barrier) => {
                barrier.expect(id, ticket);
                true
            }
            None => false,
        }
    }

    pub fn cancel_barrier(&mut self) {
        if self.barrier.take().is_some() {
            debug!("Seek barrier cancelled");
        }
    }

    fn set_playing(&mut self, playing: bool) {
        self.is_playing = playing;
        if let Some(barrier) = self.barrier.as_mut() {
            barrier.resume = playing;
        }
    }

    // ── Play / pause ────────────────────────────────────────────

    /// Returns false when there is no master to drive playback.
    pub fn toggle_play_pause(&mut self, registry: &mut Registry, master: Option<MediaId>) -> bool {
        let Some((time, duration)) = master_clock(registry, master) else {
            return false;
        };
        let frame = self.frame_rate.frame_duration();

        if !self.is_playing && !self.is_looping && duration > 0.0 && time >= duration - frame {
            debug!("Replaying from the start");
            self.cancel_barrier();
            let rate = self.playback_rate;
            for item in registry.active_videos_mut() {
                item.element.set_rate(rate);
                item.element.set_time(0.0);
                item.element.play();
            }
            self.is_playing = true;
            return true;
        }

        self.set_playing(!self.is_playing);
        if self.is_playing {
            // An outstanding barrier resumes playback itself once it lands
            if self.barrier.is_none() {
                self.play_active(registry);
            }
        } else {
            pause_all(registry);
        }
        true
    }

    /// Start every active video that has not reached its end.
    pub fn play_active(&self, registry: &mut Registry) {
        let rate = self.playback_rate;
        for item in registry.active_videos_mut() {
            item.element.set_rate(rate);
            if item.time() < item.duration() {
                item.element.play();
            }
        }
    }

    /// Pause everything and forget any pending jump.
    pub fn stop(&mut self, registry: &mut Registry) {
        self.cancel_barrier();
        self.set_playing(false);
        pause_all(registry);
    }

    pub fn set_rate(&mut self, registry: &mut Registry, rate: f64) {
        self.playback_rate = rate;
        for item in registry.active_videos_mut() {
            item.element.set_rate(rate);
        }
    }

    // ── Stepping and seeking ────────────────────────────────────

    /// Move one frame forward (`+1`) or back (`-1`), pausing first.
    pub fn step_frame(&mut self, registry: &mut Registry, master: Option<MediaId>, direction: i32) -> bool {
        let Some((time, _)) = master_clock(registry, master) else {
            return false;
        };
        if self.is_playing {
            self.set_playing(false);
            pause_all(registry);
        }
        self.cancel_barrier();

        let target = time + direction.signum() as f64 * self.frame_rate.frame_duration();
        for item in registry.active_videos_mut() {
            let own = item.duration();
            item.element.set_time(target.clamp(0.0, own));
        }
        true
    }

    /// Seek from the slider position (`0..=1000`).
    ///
    /// `ab` carries the A-B range in seconds when A-B looping is enabled;
    /// while playing, the target is kept inside it.
    pub fn seek_to(
        &mut self,
        registry: &mut Registry,
        master: Option<MediaId>,
        slider: f64,
        ab: Option<(f64, f64)>,
    ) -> bool {
        let Some((_, duration)) = master_clock(registry, master) else {
            return false;
        };
        let slider = if slider.is_finite() {
            slider.clamp(0.0, SEEK_SLIDER_MAX)
        } else {
            0.0
        };
        let raw = slider / SEEK_SLIDER_MAX * duration;
        let target = match ab {
            Some((a, b)) if self.is_playing => raw.clamp(a, b.max(a)),
            _ => raw.clamp(0.0, duration),
        };
        self.barrier_jump(registry, target);
        true
    }

    /// Pause all active videos, send each to `min(target, own duration)`
    /// and resume once every seek has completed. Replaces any outstanding
    /// barrier.
    pub fn barrier_jump(&mut self, registry: &mut Registry, target: f64) {
        let mut barrier = SeekBarrier::new(target, self.is_playing);
        for item in registry.active_videos_mut() {
            item.element.pause();
            let ticket = item.element.set_time(target.min(item.duration()));
            barrier.expect(item.id, ticket);
        }

        if self.barrier.is_some() {
            debug!("Seek barrier superseded by jump to {:.3}s", target);
        }
        if barrier.is_resolved() {
            self.barrier = None;
            if barrier.resume {
                self.play_active(registry);
            }
            return;
        }
        debug!(
            "Seek barrier to {:.3}s waiting on {} media",
            target,
            barrier.remaining()
        );
        self.barrier = Some(barrier);
    }

    /// Feed a seek completion reported by `id`.
    pub fn on_seek_completed(&mut self, registry: &mut Registry, id: MediaId, ticket: SeekTicket) {
        let Some(barrier) = self.barrier.as_mut() else {
            return;
        };
        if barrier.complete(id, ticket) && barrier.is_resolved() {
            self.finish_barrier(registry);
        }
    }

    /// Stop waiting on a media that left the registry.
    pub fn forget(&mut self, registry: &mut Registry, id: MediaId) {
        let Some(barrier) = self.barrier.as_mut() else {
            return;
        };
        barrier.forget(id);
        if barrier.is_resolved() {
            self.finish_barrier(registry);
        }
    }

    fn finish_barrier(&mut self, registry: &mut Registry) {
        let Some(barrier) = self.barrier.take() else {
            return;
        };
        debug!("Seek barrier to {:.3}s resolved", barrier.target());
        if barrier.resume && self.is_playing {
            self.play_active(registry);
        }
    }
}

/// Pause every active video.
pub fn pause_all(registry: &mut Registry) {
    for item in registry.active_videos_mut() {
        item.element.pause();
    }
}

/// Send every active video to `time`, clamped to its own duration.
pub fn set_all_times(registry: &mut Registry, time: f64) {
    for item in registry.active_videos_mut() {
        let own = item.duration();
        item.element.set_time(time.clamp(0.0, own));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::elect;
    use crate::registry::MediaItem;
    use mediasyncer_core::MediaElement;
    use mediasyncer_media::{SyntheticHandle, SyntheticMedia};

    fn loaded_video(reg: &mut Registry, duration: f64) -> (MediaId, SyntheticHandle) {
        let (mut media, handle) = SyntheticMedia::video(duration, 16, 9);
        media.poll_events();
        let item = MediaItem::new(Box::new(media), "clip.mp4");
        let id = item.id;
        reg.push_grid(item);
        (id, handle)
    }

    #[test]
    fn test_no_master_is_noop() {
        let mut reg = Registry::new();
        let mut transport = Transport::default();
        assert!(!transport.toggle_play_pause(&mut reg, None));
        assert!(!transport.is_playing);
        assert!(!transport.step_frame(&mut reg, None, 1));
        assert!(!transport.seek_to(&mut reg, None, 500.0, None));
        assert!(!transport.is_seeking());
    }

    #[test]
    fn test_toggle_plays_only_unfinished() {
        let mut reg = Registry::new();
        let (_, long) = loaded_video(&mut reg, 10.0);
        let (_, short) = loaded_video(&mut reg, 4.0);
        short.force_time(4.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        assert!(transport.toggle_play_pause(&mut reg, master));
        assert!(transport.is_playing);
        assert!(!long.is_paused());
        assert!(short.is_paused());

        transport.toggle_play_pause(&mut reg, master);
        assert!(!transport.is_playing);
        assert!(long.is_paused());
    }

    #[test]
    fn test_replay_from_end() {
        let mut reg = Registry::new();
        let (_, handle) = loaded_video(&mut reg, 10.0);
        handle.force_time(9.99);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.is_looping = false;
        transport.toggle_play_pause(&mut reg, master);
        assert!(transport.is_playing);
        assert_eq!(handle.time(), 0.0);
        assert!(!handle.is_paused());
    }

    #[test]
    fn test_step_frame_pauses_and_clamps() {
        let mut reg = Registry::new();
        let (_, long) = loaded_video(&mut reg, 10.0);
        let (_, short) = loaded_video(&mut reg, 4.0);
        long.force_time(5.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.frame_rate = FrameRate::FPS_25;
        transport.toggle_play_pause(&mut reg, master);
        transport.step_frame(&mut reg, master, 1);

        assert!(!transport.is_playing);
        assert!(long.is_paused());
        assert!((long.time() - 5.04).abs() < 1e-9);
        assert_eq!(short.time(), 4.0);

        transport.step_frame(&mut reg, master, -1);
        assert!((long.time() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_seek_waits_for_every_completion() {
        let mut reg = Registry::new();
        let (a, ha) = loaded_video(&mut reg, 10.0);
        let (b, hb) = loaded_video(&mut reg, 4.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.toggle_play_pause(&mut reg, master);
        transport.seek_to(&mut reg, master, 500.0, None);

        assert!(transport.is_seeking());
        assert_eq!(ha.time(), 5.0);
        assert_eq!(hb.time(), 4.0);
        assert!(ha.is_paused() && hb.is_paused());

        transport.on_seek_completed(&mut reg, a, SeekTicket(1));
        assert!(transport.is_seeking());
        assert!(ha.is_paused());

        transport.on_seek_completed(&mut reg, b, SeekTicket(1));
        assert!(!transport.is_seeking());
        assert!(!ha.is_paused());
        // The short video sits at its end and stays paused
        assert!(hb.is_paused());
    }

    #[test]
    fn test_seek_clamps_into_ab_while_playing() {
        let mut reg = Registry::new();
        let (_, handle) = loaded_video(&mut reg, 10.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.seek_to(&mut reg, master, 100.0, Some((2.0, 8.0)));
        assert_eq!(handle.time(), 1.0);

        transport.is_playing = true;
        transport.seek_to(&mut reg, master, 100.0, Some((2.0, 8.0)));
        assert_eq!(handle.time(), 2.0);
        transport.seek_to(&mut reg, master, 950.0, Some((2.0, 8.0)));
        assert_eq!(handle.time(), 8.0);
    }

    #[test]
    fn test_last_seek_wins() {
        let mut reg = Registry::new();
        let (a, handle) = loaded_video(&mut reg, 10.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.toggle_play_pause(&mut reg, master);
        transport.seek_to(&mut reg, master, 200.0, None);
        transport.seek_to(&mut reg, master, 700.0, None);
        assert_eq!(transport.barrier().map(|b| b.target()), Some(7.0));

        // Completion of the superseded seek does not release playback
        transport.on_seek_completed(&mut reg, a, SeekTicket(1));
        assert!(transport.is_seeking());
        assert!(handle.is_paused());

        transport.on_seek_completed(&mut reg, a, SeekTicket(2));
        assert!(!transport.is_seeking());
        assert!(!handle.is_paused());
    }

    #[test]
    fn test_pause_during_barrier_prevents_resume() {
        let mut reg = Registry::new();
        let (a, handle) = loaded_video(&mut reg, 10.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.toggle_play_pause(&mut reg, master);
        transport.seek_to(&mut reg, master, 300.0, None);
        transport.toggle_play_pause(&mut reg, master);
        transport.on_seek_completed(&mut reg, a, SeekTicket(1));
        assert!(!transport.is_seeking());
        assert!(handle.is_paused());
    }

    #[test]
    fn test_forget_resolves_barrier() {
        let mut reg = Registry::new();
        let (a, _) = loaded_video(&mut reg, 10.0);
        let (b, hb) = loaded_video(&mut reg, 8.0);
        let master = elect(&reg);

        let mut transport = Transport::default();
        transport.toggle_play_pause(&mut reg, master);
        transport.seek_to(&mut reg, master, 100.0, None);
        transport.on_seek_completed(&mut reg, b, SeekTicket(1));

        drop(reg.remove(a));
        transport.forget(&mut reg, a);
        assert!(!transport.is_seeking());
        assert!(!hb.is_paused());
    }
}
