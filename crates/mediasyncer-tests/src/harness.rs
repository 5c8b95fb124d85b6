//! Shared helpers for the scenario tests.

use mediasyncer_core::{MediaElement, MediaId, Rect};
use mediasyncer_engine::{ImportOrigin, Session};
use mediasyncer_media::{SyntheticHandle, SyntheticMedia};

pub const CANVAS: Rect = Rect::new(0.0, 0.0, 400.0, 200.0);

pub fn session() -> Session {
    let mut session = Session::default();
    session.set_canvas(CANVAS);
    session
}

/// Import a loaded synthetic video into the active view.
pub fn add_video(session: &mut Session, name: &str, duration: f64) -> (MediaId, SyntheticHandle) {
    let (media, handle) = SyntheticMedia::video(duration, 200, 200);
    let ids = session.import_elements(
        vec![(Box::new(media) as Box<dyn MediaElement>, name.to_string())],
        ImportOrigin::Picked,
    );
    (ids[0], handle)
}

/// Tick until the on-load seeks have landed.
pub fn settle(session: &mut Session, handles: &[&SyntheticHandle]) {
    session.tick();
    for handle in handles {
        handle.complete_seeks();
    }
    session.tick();
}

pub fn advance_all(handles: &[&SyntheticHandle], dt: f64) {
    for handle in handles {
        handle.advance(dt);
    }
}
