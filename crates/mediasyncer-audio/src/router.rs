//! Audio routing: which single video is audible, and how loud.

use mediasyncer_core::MediaId;
use serde::{Deserialize, Serialize};

/// Routing decision shared by the engine and the audio output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioRouting {
    /// Source pinned by clicking its audio badge (grid only)
    pub locked: Option<MediaId>,
    /// Source heard this tick; recomputed every tick
    pub active: Option<MediaId>,
    pub master_volume: f32,
    pub muted: bool,
}

impl Default for AudioRouting {
    fn default() -> Self {
        Self {
            locked: None,
            active: None,
            master_volume: 1.0,
            muted: false,
        }
    }
}

impl AudioRouting {
    pub fn with_master_volume(volume: f32) -> Self {
        Self {
            master_volume: volume.clamp(0.0, 1.0),
            ..Self::default()
        }
    }

    /// Clicking the badge of the locked source unlocks it; any other
    /// source takes the lock.
    pub fn toggle_lock(&mut self, id: MediaId) {
        if self.locked == Some(id) {
            self.locked = None;
        } else {
            self.locked = Some(id);
        }
    }

    /// Set the master volume. Raising it from zero while muted unmutes.
    pub fn set_master_volume(&mut self, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        if self.muted && self.master_volume <= 0.0 && volume > 0.0 {
            self.muted = false;
        }
        self.master_volume = volume;
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    /// Pick the audible source: the lock wins over the hovered item.
    pub fn resolve(&mut self, hovered: Option<MediaId>, lock_allowed: bool) -> Option<MediaId> {
        let locked = if lock_allowed { self.locked } else { None };
        self.active = locked.or(hovered);
        self.active
    }

    /// Output level for a video with `item_volume`.
    pub fn effective_volume(&self, id: MediaId, item_volume: f32) -> f32 {
        if self.active != Some(id) || self.muted {
            return 0.0;
        }
        (item_volume * self.master_volume).clamp(0.0, 1.0)
    }

    /// Forget `id` if it was locked or active.
    pub fn forget(&mut self, id: MediaId) {
        if self.locked == Some(id) {
            self.locked = None;
        }
        if self.active == Some(id) {
            self.active = None;
        }
    }
}
