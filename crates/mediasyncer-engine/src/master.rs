//! Master clock election.
//!
//! The longest video of the active collection drives the transport
//! readout, the A-B range and the loop boundaries. Images never qualify.

use mediasyncer_core::MediaId;

use crate::registry::Registry;

/// Pick the longest duration; ties go to the first candidate.
///
/// Unknown (NaN, infinite, negative) durations count as 0, so a video whose
/// metadata has not arrived yet can still be elected when it is alone.
pub fn select_master<I>(videos: I) -> Option<MediaId>
where
    I: IntoIterator<Item = (MediaId, f64)>,
{
    let mut best: Option<(MediaId, f64)> = None;
    for (id, duration) in videos {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration
        } else {
            0.0
        };
        match best {
            Some((_, longest)) if duration <= longest => {}
            _ => best = Some((id, duration)),
        }
    }
    best.map(|(id, _)| id)
}

/// Elect the master of the registry's active collection.
pub fn elect(registry: &Registry) -> Option<MediaId> {
    select_master(registry.active_videos().map(|m| (m.id, m.duration())))
}

/// Current time and duration of the master, if there is one.
pub fn master_clock(registry: &Registry, master: Option<MediaId>) -> Option<(f64, f64)> {
    let item = registry.get(master?)?;
    Some((item.time(), item.duration()))
}
