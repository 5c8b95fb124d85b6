//! Loaded media, per view mode.
//!
//! The grid owns an ordered collection, the split view owns two slots.
//! Items are dropped (and their element released) when they leave the
//! registry, whether by removal, clearing or being overwritten.

use mediasyncer_core::{MediaElement, MediaId, MediaKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which collection is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Grid,
    Split,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::Split,
            ViewMode::Split => ViewMode::Grid,
        }
    }
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::Grid => write!(f, "grid"),
            ViewMode::Split => write!(f, "split"),
        }
    }
}

/// Where an item lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Grid(usize),
    Split(usize),
}

/// A loaded source and its viewer-side metadata.
pub struct MediaItem {
    pub id: MediaId,
    pub element: Box<dyn MediaElement>,
    pub kind: MediaKind,
    pub display_name: String,
    /// Per-item gain in `[0, 1]`
    pub volume: f32,
    /// Start playback when metadata arrives (first video imported)
    pub(crate) autoplay_on_load: bool,
}

impl MediaItem {
    pub fn new(element: Box<dyn MediaElement>, display_name: impl Into<String>) -> Self {
        let kind = element.kind();
        Self {
            id: MediaId::new(),
            element,
            kind,
            display_name: display_name.into(),
            volume: 1.0,
            autoplay_on_load: false,
        }
    }

    #[inline]
    pub fn is_video(&self) -> bool {
        self.kind.is_video()
    }

    /// Duration in seconds; unknown or invalid durations count as 0.
    pub fn duration(&self) -> f64 {
        let d = self.element.duration();
        if d.is_finite() && d > 0.0 {
            d
        } else {
            0.0
        }
    }

    pub fn time(&self) -> f64 {
        self.element.time()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.element.dimensions().filter(|&(w, h)| w > 0 && h > 0)
    }

    /// Aspect ratio of the natural size, once known.
    pub fn aspect(&self) -> Option<f32> {
        self.dimensions().map(|(w, h)| w as f32 / h as f32)
    }
}

impl fmt::Debug for MediaItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaItem")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("display_name", &self.display_name)
            .field("volume", &self.volume)
            .finish_non_exhaustive()
    }
}

/// Both collections plus the current view mode.
#[derive(Debug, Default)]
pub struct Registry {
    grid: Vec<MediaItem>,
    split: [Option<MediaItem>; 2],
    mode: ViewMode,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ViewMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ViewMode) {
        self.mode = mode;
    }

    // ── Grid collection ─────────────────────────────────────────

    pub fn grid(&self) -> &[MediaItem] {
        &self.grid
    }

    pub fn grid_len(&self) -> usize {
        self.grid.len()
    }

    pub fn push_grid(&mut self, item: MediaItem) {
        self.grid.push(item);
    }

    /// Move the grid item at `from` so it ends up at `to` (clamped).
    pub fn move_grid(&mut self, from: usize, to: usize) {
        if from >= self.grid.len() {
            return;
        }
        let item = self.grid.remove(from);
        let to = to.min(self.grid.len());
        self.grid.insert(to, item);
    }

    /// Remove every grid item, handing them back for bookkeeping.
    pub fn clear_grid(&mut self) -> Vec<MediaItem> {
        std::mem::take(&mut self.grid)
    }

    // ── Split collection ────────────────────────────────────────

    pub fn split_slot(&self, slot: usize) -> Option<&MediaItem> {
        self.split.get(slot).and_then(Option::as_ref)
    }

    pub fn split_count(&self) -> usize {
        self.split.iter().flatten().count()
    }

    /// Put `item` into `slot`, returning whatever occupied it.
    pub fn place_split(&mut self, slot: usize, item: MediaItem) -> Option<MediaItem> {
        let slot = slot.min(1);
        self.split[slot].replace(item)
    }

    pub fn clear_split(&mut self) -> Vec<MediaItem> {
        self.split.iter_mut().filter_map(Option::take).collect()
    }

    // ── Lookup ──────────────────────────────────────────────────

    pub fn locate(&self, id: MediaId) -> Option<Location> {
        if let Some(i) = self.grid.iter().position(|m| m.id == id) {
            return Some(Location::Grid(i));
        }
        self.split
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|m| m.id == id))
            .map(Location::Split)
    }

    pub fn get(&self, id: MediaId) -> Option<&MediaItem> {
        match self.locate(id)? {
            Location::Grid(i) => self.grid.get(i),
            Location::Split(s) => self.split[s].as_ref(),
        }
    }

    pub fn get_mut(&mut self, id: MediaId) -> Option<&mut MediaItem> {
        match self.locate(id)? {
            Location::Grid(i) => self.grid.get_mut(i),
            Location::Split(s) => self.split[s].as_mut(),
        }
    }

    /// True when `id` belongs to the collection on screen.
    pub fn is_active(&self, id: MediaId) -> bool {
        matches!(
            (self.mode, self.locate(id)),
            (ViewMode::Grid, Some(Location::Grid(_))) | (ViewMode::Split, Some(Location::Split(_)))
        )
    }

    /// Remove `id` from whichever collection holds it.
    pub fn remove(&mut self, id: MediaId) -> Option<MediaItem> {
        match self.locate(id)? {
            Location::Grid(i) => Some(self.grid.remove(i)),
            Location::Split(s) => self.split[s].take(),
        }
    }

    // ── Iteration ───────────────────────────────────────────────

    /// Items of the collection on screen, in order.
    pub fn active(&self) -> impl Iterator<Item = &MediaItem> + '_ {
        let (grid, split): (&[MediaItem], &[Option<MediaItem>]) = match self.mode {
            ViewMode::Grid => (self.grid.as_slice(), Default::default()),
            ViewMode::Split => (Default::default(), self.split.as_slice()),
        };
        grid.iter().chain(split.iter().flatten())
    }

    pub fn active_mut(&mut self) -> impl Iterator<Item = &mut MediaItem> + '_ {
        let (grid, split): (&mut [MediaItem], &mut [Option<MediaItem>]) = match self.mode {
            ViewMode::Grid => (self.grid.as_mut_slice(), Default::default()),
            ViewMode::Split => (Default::default(), self.split.as_mut_slice()),
        };
        grid.iter_mut().chain(split.iter_mut().flatten())
    }

    pub fn active_videos(&self) -> impl Iterator<Item = &MediaItem> + '_ {
        self.active().filter(|m| m.is_video())
    }

    pub fn active_videos_mut(&mut self) -> impl Iterator<Item = &mut MediaItem> + '_ {
        self.active_mut().filter(|m| m.is_video())
    }

    pub fn active_len(&self) -> usize {
        self.active().count()
    }

    /// Items of both collections.
    pub fn all(&self) -> impl Iterator<Item = &MediaItem> + '_ {
        self.grid.iter().chain(self.split.iter().flatten())
    }

    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut MediaItem> + '_ {
        self.grid.iter_mut().chain(self.split.iter_mut().flatten())
    }

    /// Number of videos across both views.
    pub fn video_count(&self) -> usize {
        self.all().filter(|m| m.is_video()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasyncer_media::SyntheticMedia;

    fn video(duration: f64, name: &str) -> MediaItem {
        let (media, _) = SyntheticMedia::video(duration, 64, 36);
        MediaItem::new(Box::new(media), name)
    }

    fn image(name: &str) -> MediaItem {
        let (media, _) = SyntheticMedia::image(64, 64);
        MediaItem::new(Box::new(media), name)
    }

    #[test]
    fn test_active_follows_mode() {
        let mut reg = Registry::new();
        reg.push_grid(video(5.0, "a.mp4"));
        reg.push_grid(image("b.png"));
        reg.place_split(1, video(3.0, "c.mp4"));

        assert_eq!(reg.active_len(), 2);
        assert_eq!(reg.active_videos().count(), 1);

        reg.set_mode(ViewMode::Split);
        let names: Vec<_> = reg.active().map(|m| m.display_name.as_str()).collect();
        assert_eq!(names, vec!["c.mp4"]);
        assert_eq!(reg.all().count(), 3);
        assert_eq!(reg.video_count(), 2);
    }

    #[test]
    fn test_place_split_returns_replaced() {
        let mut reg = Registry::new();
        assert!(reg.place_split(0, video(1.0, "a.mp4")).is_none());
        let old = reg.place_split(0, video(2.0, "b.mp4")).unwrap();
        assert_eq!(old.display_name, "a.mp4");
        assert_eq!(reg.split_count(), 1);
    }

    #[test]
    fn test_remove_releases_element() {
        let mut reg = Registry::new();
        let (media, handle) = SyntheticMedia::video(2.0, 8, 8);
        let item = MediaItem::new(Box::new(media), "a.mp4");
        let id = item.id;
        reg.push_grid(item);
        assert!(!handle.is_released());

        drop(reg.remove(id));
        assert!(handle.is_released());
        assert!(reg.get(id).is_none());
        assert!(reg.remove(id).is_none());
    }

    #[test]
    fn test_move_grid_clamps_target() {
        let mut reg = Registry::new();
        for name in ["a", "b", "c"] {
            reg.push_grid(image(name));
        }
        reg.move_grid(0, 10);
        let order: Vec<_> = reg.grid().iter().map(|m| m.display_name.clone()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);

        reg.move_grid(2, 0);
        let order: Vec<_> = reg.grid().iter().map(|m| m.display_name.clone()).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_is_active() {
        let mut reg = Registry::new();
        let g = video(1.0, "g");
        let s = video(1.0, "s");
        let (gid, sid) = (g.id, s.id);
        reg.push_grid(g);
        reg.place_split(0, s);
        assert!(reg.is_active(gid));
        assert!(!reg.is_active(sid));
        reg.set_mode(ViewMode::Split);
        assert!(reg.is_active(sid));
        assert_eq!(reg.locate(sid), Some(Location::Split(0)));
    }
}
