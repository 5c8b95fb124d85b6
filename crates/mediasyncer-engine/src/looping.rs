//! Full-timeline and A-B looping.
//!
//! Boundaries are detected with a tolerance: a playhead within
//! [`loop_epsilon`] of the end counts as having reached it, so a loop fires
//! even when the last decoded position lands just short of the boundary.

use mediasyncer_core::limits::{MIN_LOOP_EPSILON, SLIDER_STEPS};
use mediasyncer_core::{format_clock, MediaId};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::master::master_clock;
use crate::registry::Registry;
use crate::transport::{pause_all, set_all_times, Transport};

/// Boundary tolerance for the range `[start, end]`: one slider step of
/// the range, never less than 8 ms.
pub fn loop_epsilon(start: f64, end: f64) -> f64 {
    let range = (end - start).max(0.0);
    (range / SLIDER_STEPS as f64).max(MIN_LOOP_EPSILON)
}

/// A-B sub-range, stored as ratios of the master duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ABRange {
    start: f64,
    end: f64,
    pub enabled: bool,
}

impl Default for ABRange {
    fn default() -> Self {
        Self {
            start: 0.0,
            end: 1.0,
            enabled: false,
        }
    }
}

impl ABRange {
    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    /// Move A. Moving it past B drags B along.
    pub fn set_start(&mut self, ratio: f64) {
        self.start = clamp_ratio(ratio);
        if self.start > self.end {
            self.end = self.start;
        }
    }

    /// Move B. Moving it before A drags A along.
    pub fn set_end(&mut self, ratio: f64) {
        self.end = clamp_ratio(ratio);
        if self.end < self.start {
            self.start = self.end;
        }
    }

    pub fn toggle(&mut self) {
        self.enabled = !self.enabled;
    }

    /// Absolute `(A, B)` in seconds for a master of `duration`.
    pub fn times(&self, duration: f64) -> (f64, f64) {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        (duration * self.start, duration * self.end)
    }

    /// `A MM:SS.cc → B MM:SS.cc`; zero without a master.
    pub fn readout(&self, duration: Option<f64>) -> String {
        let (a, b) = duration.map_or((0.0, 0.0), |d| self.times(d));
        format!("A {} → B {}", format_clock(a), format_clock(b))
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_finite() {
        ratio.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// What the loop engine did this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoopAction {
    Idle,
    /// Playhead was before A and got snapped onto it
    SnappedToStart(f64),
    /// Barrier jump back to A (or 0 for the full timeline)
    Jumped(f64),
    /// Reached the end without looping
    Stopped,
    /// Count of shorter videos paused at their own end
    Guarded(usize),
}

/// Run one loop check. Only acts while playing with a master and no seek
/// in flight.
pub fn loop_tick(
    transport: &mut Transport,
    registry: &mut Registry,
    master: Option<MediaId>,
    ab: &ABRange,
) -> LoopAction {
    if !transport.is_playing || transport.is_seeking() {
        return LoopAction::Idle;
    }
    let Some((time, duration)) = master_clock(registry, master) else {
        return LoopAction::Idle;
    };
    if duration <= 0.0 {
        return LoopAction::Idle;
    }

    let (a, b) = ab.times(duration);
    let eps_ab = loop_epsilon(a, b);
    let mut time = time;

    if ab.enabled && time < a - eps_ab {
        debug!("Playhead {:.3}s before A, snapping to {:.3}s", time, a);
        set_all_times(registry, a);
        time = a;
        if !(b > a && time >= b - eps_ab) {
            return LoopAction::SnappedToStart(a);
        }
    }

    if ab.enabled && b > a && time >= b - eps_ab {
        debug!("A-B loop: {:.3}s → {:.3}s", time, a);
        transport.barrier_jump(registry, a);
        return LoopAction::Jumped(a);
    }

    // An empty A-B range falls back to the full-timeline end
    if !(ab.enabled && b > a) && time >= duration - loop_epsilon(0.0, duration) {
        if transport.is_looping {
            debug!("Loop: {:.3}s → 0", time);
            transport.barrier_jump(registry, 0.0);
            return LoopAction::Jumped(0.0);
        }
        debug!("Reached the end at {:.3}s", time);
        transport.is_playing = false;
        pause_all(registry);
        for item in registry.active_videos_mut() {
            let own = item.duration();
            item.element.set_time(own);
        }
        return LoopAction::Stopped;
    }

    let mut guarded = 0;
    for item in registry.active_videos_mut() {
        if Some(item.id) == master {
            continue;
        }
        let own = item.duration();
        if own > 0.0 && item.time() >= own && !item.element.is_paused() {
            item.element.pause();
            item.element.set_time(own);
            guarded += 1;
        }
    }
    if guarded > 0 {
        LoopAction::Guarded(guarded)
    } else {
        LoopAction::Idle
    }
}

/// Keep the playhead inside `[A, B]` after a bound moved.
pub fn clamp_playhead_into_ab(
    registry: &mut Registry,
    master: Option<MediaId>,
    ab: &ABRange,
) -> bool {
    let Some((time, duration)) = master_clock(registry, master) else {
        return false;
    };
    let (a, b) = ab.times(duration);
    if time < a {
        set_all_times(registry, a);
        true
    } else if time > b {
        set_all_times(registry, b);
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::master::elect;
    use crate::registry::MediaItem;
    use mediasyncer_core::{MediaElement, SeekTicket};
    use mediasyncer_media::{SyntheticHandle, SyntheticMedia};
    use proptest::prelude::*;

    fn add_video(reg: &mut Registry, duration: f64) -> (MediaId, SyntheticHandle) {
        let (mut media, handle) = SyntheticMedia::video(duration, 16, 9);
        media.poll_events();
        let item = MediaItem::new(Box::new(media), "clip.mp4");
        let id = item.id;
        reg.push_grid(item);
        (id, handle)
    }

    fn playing(reg: &mut Registry) -> (Transport, Option<MediaId>) {
        let master = elect(reg);
        let mut transport = Transport::default();
        transport.toggle_play_pause(reg, master);
        (transport, master)
    }

    #[test]
    fn test_epsilon_values() {
        assert_eq!(loop_epsilon(0.0, 0.0), 0.008);
        assert_eq!(loop_epsilon(0.0, 8.0), 0.008);
        assert!((loop_epsilon(0.0, 100.0) - 0.1).abs() < 1e-12);
        assert_eq!(loop_epsilon(5.0, 1.0), 0.008);
    }

    #[test]
    fn test_ab_bounds_drag_each_other() {
        let mut ab = ABRange::default();
        ab.set_end(0.3);
        ab.set_start(0.6);
        assert_eq!((ab.start(), ab.end()), (0.6, 0.6));
        ab.set_end(0.1);
        assert_eq!((ab.start(), ab.end()), (0.1, 0.1));
        ab.set_start(f64::NAN);
        assert_eq!(ab.start(), 0.0);
    }

    #[test]
    fn test_readout() {
        let mut ab = ABRange::default();
        ab.set_start(0.2);
        ab.set_end(0.8);
        assert_eq!(ab.readout(Some(10.0)), "A 00:02.00 → B 00:08.00");
        assert_eq!(ab.readout(None), "A 00:00.00 → B 00:00.00");
    }

    #[test]
    fn test_ab_jump_near_b() {
        let mut reg = Registry::new();
        let (id, handle) = add_video(&mut reg, 10.0);
        let (mut transport, master) = playing(&mut reg);
        let mut ab = ABRange::default();
        ab.set_start(0.2);
        ab.set_end(0.8);
        ab.enabled = true;

        handle.force_time(7.995);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ab),
            LoopAction::Jumped(2.0)
        );
        assert_eq!(handle.time(), 2.0);
        assert!(handle.is_paused());
        assert!(transport.is_seeking());

        // Nothing else happens while the jump is in flight
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ab),
            LoopAction::Idle
        );

        transport.on_seek_completed(&mut reg, id, SeekTicket(1));
        assert!(!handle.is_paused());
    }

    #[test]
    fn test_prefence_snaps_to_a() {
        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let (mut transport, master) = playing(&mut reg);
        let mut ab = ABRange::default();
        ab.set_start(0.5);
        ab.enabled = true;

        handle.force_time(1.0);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ab),
            LoopAction::SnappedToStart(5.0)
        );
        assert_eq!(handle.time(), 5.0);
        assert!(!transport.is_seeking());
    }

    #[test]
    fn test_full_loop_jumps_to_zero() {
        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let (mut transport, master) = playing(&mut reg);
        handle.force_time(9.995);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ABRange::default()),
            LoopAction::Jumped(0.0)
        );
        assert_eq!(handle.time(), 0.0);
    }

    #[test]
    fn test_empty_ab_range_still_ends_the_timeline() {
        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let (mut transport, master) = playing(&mut reg);
        let mut ab = ABRange::default();
        ab.set_start(0.5);
        ab.set_end(0.5);
        ab.enabled = true;

        handle.force_time(10.0);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ab),
            LoopAction::Jumped(0.0)
        );
        assert_eq!(handle.time(), 0.0);

        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let (mut transport, master) = playing(&mut reg);
        transport.is_looping = false;
        handle.force_time(10.0);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ab),
            LoopAction::Stopped
        );
        assert!(!transport.is_playing);
        assert!(handle.is_paused());
    }

    #[test]
    fn test_end_without_loop_stops() {
        let mut reg = Registry::new();
        let (_, long) = add_video(&mut reg, 10.0);
        let (_, short) = add_video(&mut reg, 4.0);
        let (mut transport, master) = playing(&mut reg);
        transport.is_looping = false;
        long.force_time(10.0);

        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ABRange::default()),
            LoopAction::Stopped
        );
        assert!(!transport.is_playing);
        assert!(long.is_paused() && short.is_paused());
        assert_eq!(short.time(), 4.0);
    }

    #[test]
    fn test_guard_pauses_shorter_video() {
        let mut reg = Registry::new();
        let (_, long) = add_video(&mut reg, 10.0);
        let (_, short) = add_video(&mut reg, 4.0);
        let (mut transport, master) = playing(&mut reg);

        long.advance(5.0);
        short.advance(5.0);
        assert_eq!(short.time(), 4.0);
        assert!(!short.is_paused());

        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ABRange::default()),
            LoopAction::Guarded(1)
        );
        assert!(short.is_paused());
        assert_eq!(short.time(), 4.0);
        assert!(!long.is_paused());
    }

    #[test]
    fn test_idle_when_paused() {
        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let master = elect(&reg);
        let mut transport = Transport::default();
        handle.force_time(10.0);
        assert_eq!(
            loop_tick(&mut transport, &mut reg, master, &ABRange::default()),
            LoopAction::Idle
        );
    }

    #[test]
    fn test_clamp_playhead() {
        let mut reg = Registry::new();
        let (_, handle) = add_video(&mut reg, 10.0);
        let master = elect(&reg);
        let mut ab = ABRange::default();
        ab.set_start(0.3);
        ab.set_end(0.6);

        handle.force_time(1.0);
        assert!(clamp_playhead_into_ab(&mut reg, master, &ab));
        assert_eq!(handle.time(), 3.0);
        handle.force_time(9.0);
        assert!(clamp_playhead_into_ab(&mut reg, master, &ab));
        assert_eq!(handle.time(), 6.0);
        assert!(!clamp_playhead_into_ab(&mut reg, master, &ab));
    }

    proptest! {
        #[test]
        fn prop_ab_ordered_after_any_mutation(ops in prop::collection::vec((any::<bool>(), -0.5f64..1.5), 1..30)) {
            let mut ab = ABRange::default();
            for (is_start, value) in ops {
                if is_start { ab.set_start(value) } else { ab.set_end(value) }
                prop_assert!(ab.start() <= ab.end());
                prop_assert!((0.0..=1.0).contains(&ab.start()));
                prop_assert!((0.0..=1.0).contains(&ab.end()));
            }
        }
    }
}
