//! Group playback scenarios: loop jumps, end guards and seek barriers.

use mediasyncer_engine::{LoopAction, SEEK_SLIDER_MAX};
use proptest::prelude::*;

use crate::harness::{add_video, advance_all, session, settle};

// ── Loop engine ─────────────────────────────────────────────────

#[test]
fn test_ab_jump_waits_for_both_videos() {
    let mut session = session();
    let (_, h1) = add_video(&mut session, "left.mp4", 10.0);
    let (_, h2) = add_video(&mut session, "right.mp4", 10.0);
    settle(&mut session, &[&h1, &h2]);
    assert!(session.transport().is_playing);

    session.set_ab_start(0.2);
    session.set_ab_end(0.8);
    session.toggle_ab();
    assert!(session.ab().enabled);

    h1.force_time(7.995);
    h2.force_time(7.995);
    assert_eq!(session.tick(), LoopAction::Jumped(2.0));
    assert!(h1.is_paused());
    assert!(h2.is_paused());
    assert!(session.transport().is_seeking());

    // One landed seek is not enough to resume
    h1.complete_seeks();
    assert_eq!(session.tick(), LoopAction::Idle);
    assert!(h1.is_paused());
    assert!(h2.is_paused());

    h2.complete_seeks();
    session.tick();
    assert!(!session.transport().is_seeking());
    assert!(!h1.is_paused());
    assert!(!h2.is_paused());
    assert_eq!(h1.time(), 2.0);
    assert_eq!(h2.time(), 2.0);
}

#[test]
fn test_shorter_video_is_held_at_its_end() {
    let mut session = session();
    let (master, long) = add_video(&mut session, "long.mp4", 10.0);
    let (_, short) = add_video(&mut session, "short.mp4", 4.0);
    settle(&mut session, &[&long, &short]);
    assert_eq!(session.master(), Some(master));

    advance_all(&[&long, &short], 5.0);
    assert_eq!(session.tick(), LoopAction::Guarded(1));
    assert!(short.is_paused());
    assert_eq!(short.time(), 4.0);
    assert!(!long.is_paused());
    assert!(session.transport().is_playing);

    // A second tick finds nothing left to guard
    assert_eq!(session.tick(), LoopAction::Idle);
}

#[test]
fn test_full_loop_restarts_every_video() {
    let mut session = session();
    let (_, long) = add_video(&mut session, "long.mp4", 10.0);
    let (_, short) = add_video(&mut session, "short.mp4", 4.0);
    settle(&mut session, &[&long, &short]);

    advance_all(&[&long, &short], 5.0);
    session.tick();
    advance_all(&[&long, &short], 5.0);
    assert_eq!(session.tick(), LoopAction::Jumped(0.0));

    long.complete_seeks();
    short.complete_seeks();
    session.tick();
    assert_eq!(long.time(), 0.0);
    assert_eq!(short.time(), 0.0);
    assert!(!long.is_paused());
    assert!(!short.is_paused());
}

#[test]
fn test_end_without_looping_stops() {
    let mut session = session();
    let (_, h) = add_video(&mut session, "clip.mp4", 6.0);
    settle(&mut session, &[&h]);
    session.toggle_looping();
    assert!(!session.transport().is_looping);

    advance_all(&[&h], 6.0);
    assert_eq!(session.tick(), LoopAction::Stopped);
    assert!(!session.transport().is_playing);
    assert!(h.is_paused());

    // Play at the end restarts from zero
    assert!(session.toggle_play_pause());
    assert_eq!(h.time(), 0.0);
    assert!(!h.is_paused());
}

// ── Transport ───────────────────────────────────────────────────

#[test]
fn test_empty_session_ignores_transport() {
    let mut session = session();
    assert!(!session.toggle_play_pause());
    assert!(!session.step_frame(1));
    assert!(!session.seek(500.0));
    assert!(!session.transport().is_playing);
    assert_eq!(session.tick(), LoopAction::Idle);
}

#[test]
fn test_superseded_seek_ignores_stale_completions() {
    let mut session = session();
    let (_, h1) = add_video(&mut session, "a.mp4", 10.0);
    let (_, h2) = add_video(&mut session, "b.mp4", 10.0);
    settle(&mut session, &[&h1, &h2]);
    session.toggle_play_pause();
    assert!(!session.transport().is_playing);

    assert!(session.seek(500.0));
    assert!(session.seek(250.0));

    // Completions of the first jump do not settle the second
    h1.complete_oldest_seek();
    h2.complete_oldest_seek();
    session.tick();
    assert!(session.transport().is_seeking());

    h1.complete_seeks();
    h2.complete_seeks();
    session.tick();
    assert!(!session.transport().is_seeking());
    assert_eq!(h1.time(), 2.5);
    assert_eq!(h2.time(), 2.5);
    assert!(h1.is_paused());
    assert!(h2.is_paused());
}

#[test]
fn test_step_frame_moves_both_by_one_frame() {
    let mut session = session();
    let (_, h1) = add_video(&mut session, "a.mp4", 10.0);
    let (_, h2) = add_video(&mut session, "b.mp4", 10.0);
    settle(&mut session, &[&h1, &h2]);
    advance_all(&[&h1, &h2], 1.0);

    assert!(session.step_frame(1));
    assert!(!session.transport().is_playing);
    let frame = session.frame_rate().frame_duration();
    assert!((h1.time() - (1.0 + frame)).abs() < 1e-9);
    assert!((h2.time() - (1.0 + frame)).abs() < 1e-9);
}

#[test]
fn test_scrub_lands_on_release_position() {
    let mut session = session();
    let (_, h) = add_video(&mut session, "a.mp4", 10.0);
    settle(&mut session, &[&h]);

    session.begin_scrub();
    assert!(session.transport().is_seeking());
    session.scrub_to(SEEK_SLIDER_MAX / 2.0);
    session.end_scrub(SEEK_SLIDER_MAX / 4.0);
    h.complete_seeks();
    session.tick();
    assert!(!session.transport().is_seeking());
    assert_eq!(h.time(), 2.5);
    assert!(!h.is_paused());
}

proptest! {
    #[test]
    fn prop_last_seek_decides_the_resting_time(sliders in prop::collection::vec(0.0f64..=1000.0, 1..6)) {
        let mut session = session();
        let (_, h1) = add_video(&mut session, "a.mp4", 10.0);
        let (_, h2) = add_video(&mut session, "b.mp4", 5.0);
        settle(&mut session, &[&h1, &h2]);
        session.toggle_play_pause();

        for slider in &sliders {
            session.seek(*slider);
        }
        h1.complete_seeks();
        h2.complete_seeks();
        session.tick();

        let last = sliders[sliders.len() - 1] / SEEK_SLIDER_MAX * 10.0;
        prop_assert!(!session.transport().is_seeking());
        prop_assert!((h1.time() - last).abs() < 1e-9);
        prop_assert!((h2.time() - last.min(5.0)).abs() < 1e-9);
    }
}
