//! Media lifecycle: loading, removal, failure, view switches and audio routing.

use mediasyncer_core::{MediaElement, Vec2};
use mediasyncer_engine::{ImportOrigin, PointerButton, ViewMode};
use mediasyncer_media::SyntheticMedia;

use crate::harness::{add_video, advance_all, session, settle};

#[test]
fn test_first_video_plays_once_loaded() {
    let mut session = session();
    let (id, h) = add_video(&mut session, "first.mp4", 10.0);
    assert!(!session.transport().is_playing);
    assert!(h.is_paused());

    session.tick();
    assert_eq!(session.master(), Some(id));
    assert!(session.transport().is_playing);
    assert!(!h.is_paused());
}

#[test]
fn test_late_loader_joins_at_master_time() {
    let mut session = session();
    let (master, h1) = add_video(&mut session, "master.mp4", 10.0);
    settle(&mut session, &[&h1]);
    advance_all(&[&h1], 3.0);

    let (media, late) = SyntheticMedia::video_loading(8.0, 200, 200);
    session.import_elements(
        vec![(Box::new(media) as Box<dyn MediaElement>, "late.mp4".to_string())],
        ImportOrigin::Picked,
    );
    session.tick();
    assert!(late.seek_log().is_empty());
    assert_eq!(session.master(), Some(master));

    late.finish_loading();
    session.tick();
    assert_eq!(late.seek_log(), vec![3.0]);
    assert_eq!(late.time(), 3.0);
    assert!(!late.is_paused());
    assert_eq!(session.master(), Some(master));
}

#[test]
fn test_longer_import_takes_over_the_clock() {
    let mut session = session();
    let (first, h1) = add_video(&mut session, "short.mp4", 4.0);
    settle(&mut session, &[&h1]);
    assert_eq!(session.master(), Some(first));

    let (second, h2) = add_video(&mut session, "long.mp4", 12.0);
    settle(&mut session, &[&h1, &h2]);
    assert_eq!(session.master(), Some(second));
    assert!(session.readout().timecode.ends_with("/ 00:12.00"));
}

#[test]
fn test_remove_releases_media_and_weak_ids() {
    let mut session = session();
    let (a, ha) = add_video(&mut session, "a.mp4", 10.0);
    let (b, hb) = add_video(&mut session, "b.mp4", 6.0);
    settle(&mut session, &[&ha, &hb]);

    // Compare and audio badges of the first 200x200 tile
    session.pointer_pressed(Vec2::new(195.0, 195.0), PointerButton::Primary);
    session.pointer_released(Vec2::new(195.0, 195.0));
    session.pointer_pressed(Vec2::new(5.0, 195.0), PointerButton::Primary);
    session.pointer_released(Vec2::new(5.0, 195.0));
    assert_eq!(session.compare().primary, Some(a));
    assert_eq!(session.audio().locked, Some(a));

    assert!(session.remove(a));
    assert!(ha.is_released());
    assert_eq!(session.compare().primary, None);
    assert_eq!(session.audio().locked, None);
    assert_eq!(session.master(), Some(b));
    assert!(!hb.is_released());
}

#[test]
fn test_failed_load_stops_transport() {
    let mut session = session();
    let (id, h) = add_video(&mut session, "broken.mp4", 10.0);
    settle(&mut session, &[&h]);
    assert!(session.transport().is_playing);

    h.fail("unsupported codec");
    session.tick();
    assert!(session.registry().get(id).is_none());
    assert!(h.is_released());
    assert_eq!(session.master(), None);
    assert!(!session.transport().is_playing);
    assert!(!session.controls_state().play);
}

#[test]
fn test_view_switch_pauses_the_grid() {
    let mut session = session();
    let (_, grid_video) = add_video(&mut session, "grid.mp4", 10.0);
    settle(&mut session, &[&grid_video]);

    session.toggle_view();
    assert_eq!(session.mode(), ViewMode::Split);
    assert!(grid_video.is_paused());
    assert_eq!(session.master(), None);
    assert!(!session.controls_state().play);

    let (split_id, split_video) = add_video(&mut session, "split.mp4", 5.0);
    settle(&mut session, &[&split_video]);
    assert_eq!(session.master(), Some(split_id));
    assert!(grid_video.is_paused());

    session.toggle_view();
    assert_eq!(session.mode(), ViewMode::Grid);
    assert!(split_video.is_paused());
}

#[test]
fn test_hover_routes_audio() {
    let mut session = session();
    let (a, ha) = add_video(&mut session, "a.mp4", 10.0);
    let (_, hb) = add_video(&mut session, "b.mp4", 10.0);
    settle(&mut session, &[&ha, &hb]);
    assert_eq!(ha.volume(), 0.0);
    assert_eq!(hb.volume(), 0.0);

    session.pointer_moved(Vec2::new(100.0, 100.0));
    session.tick();
    assert_eq!(session.audio().active, Some(a));
    assert_eq!(ha.volume(), 1.0);
    assert_eq!(hb.volume(), 0.0);

    session.set_master_volume(0.5);
    session.tick();
    assert_eq!(ha.volume(), 0.5);

    session.toggle_mute();
    session.tick();
    assert_eq!(ha.volume(), 0.0);

    session.toggle_mute();
    session.pointer_left();
    session.tick();
    assert_eq!(session.audio().active, None);
    assert_eq!(ha.volume(), 0.0);
}
