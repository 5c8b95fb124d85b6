//! The viewer session: every piece of engine state behind one struct.
//!
//! The UI owns a single [`Session`], forwards input to it, calls
//! [`Session::tick`] once per frame and paints the scene it builds.

use mediasyncer_audio::{AudioRouting, AudioTarget};
use mediasyncer_core::{FrameRate, MediaElement, MediaEvent, MediaId, Rect, Result, Vec2, ViewerConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::compare::{layout_tiles, CompareState, Tile};
use crate::grid::{GridDims, GridSpec};
use crate::input::DragState;
use crate::looping::{clamp_playhead_into_ab, loop_tick, ABRange, LoopAction};
use crate::master::{elect, master_clock};
use crate::readout::{ControlsState, TransportReadout};
use crate::registry::{Location, MediaItem, Registry, ViewMode};
use crate::split::{plan_split_slots, split_dest_rect, ImportOrigin, SplitState};
use crate::transport::{pause_all, Transport};
use crate::zoom::ZoomPan;

/// Opens a file as a media element.
pub trait MediaOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaElement>>;
}

impl<F> MediaOpener for F
where
    F: Fn(&Path) -> Result<Box<dyn MediaElement>>,
{
    fn open(&self, path: &Path) -> Result<Box<dyn MediaElement>> {
        self(path)
    }
}

/// Badge name for `path`.
fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `rect` contains `point` with every edge excluded.
pub(crate) fn strictly_inside(rect: Rect, point: Vec2) -> bool {
    point.x > rect.x && point.x < rect.right() && point.y > rect.y && point.y < rect.bottom()
}

pub struct Session {
    pub(crate) config: ViewerConfig,
    pub(crate) registry: Registry,
    pub(crate) master: Option<MediaId>,
    pub(crate) transport: Transport,
    pub(crate) ab: ABRange,
    pub(crate) zoom: ZoomPan,
    pub(crate) grid: GridSpec,
    pub(crate) compare: CompareState,
    pub(crate) split: SplitState,
    pub(crate) audio: AudioRouting,
    pub(crate) speed_index: usize,
    pub(crate) canvas: Rect,
    pub(crate) pointer: Option<Vec2>,
    pub(crate) drag: DragState,
    /// Last import contained a file that could not be opened
    pub(crate) rejected: bool,
    pub(crate) readout: TransportReadout,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl Session {
    pub fn new(config: ViewerConfig) -> Self {
        let config = config.sanitized();
        let transport = Transport::new(
            config.default_speed(),
            config.loop_by_default,
            config.frame_rate(),
        );
        Self {
            zoom: ZoomPan::new(config.max_zoom),
            audio: AudioRouting::with_master_volume(config.master_volume),
            speed_index: config.default_speed_index,
            transport,
            registry: Registry::new(),
            master: None,
            ab: ABRange::default(),
            grid: GridSpec::Auto,
            compare: CompareState::default(),
            split: SplitState::default(),
            canvas: Rect::new(0.0, 0.0, 1280.0, 720.0),
            pointer: None,
            drag: DragState::None,
            rejected: false,
            readout: TransportReadout::default(),
            config,
        }
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn mode(&self) -> ViewMode {
        self.registry.mode()
    }

    pub fn master(&self) -> Option<MediaId> {
        self.master
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    pub fn ab(&self) -> &ABRange {
        &self.ab
    }

    pub fn zoom(&self) -> &ZoomPan {
        &self.zoom
    }

    pub fn grid_spec(&self) -> GridSpec {
        self.grid
    }

    pub fn compare(&self) -> &CompareState {
        &self.compare
    }

    pub fn split(&self) -> &SplitState {
        &self.split
    }

    pub fn audio(&self) -> &AudioRouting {
        &self.audio
    }

    pub fn readout(&self) -> &TransportReadout {
        &self.readout
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn rejected(&self) -> bool {
        self.rejected
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn set_canvas(&mut self, canvas: Rect) {
        self.canvas = canvas;
    }

    pub fn speed_levels(&self) -> &[f64] {
        &self.config.speed_levels
    }

    pub fn speed_index(&self) -> usize {
        self.speed_index
    }

    /// Current `(time, duration)` of the master.
    pub fn clock(&self) -> Option<(f64, f64)> {
        master_clock(&self.registry, self.master)
    }

    /// A-B bounds in seconds while A-B looping is on.
    fn ab_bounds(&self) -> Option<(f64, f64)> {
        if !self.ab.enabled {
            return None;
        }
        self.clock().map(|(_, duration)| self.ab.times(duration))
    }

    /// Natural size of the first active item that knows it; pan is
    /// measured in its pixels.
    pub(crate) fn reference_dims(&self) -> Option<(u32, u32)> {
        self.registry.active().find_map(MediaItem::dimensions)
    }

    // ── Layout ──────────────────────────────────────────────────

    /// Grid item being dragged to a new position.
    pub fn dragged(&self) -> Option<MediaId> {
        match self.drag {
            DragState::Reorder { id } => Some(id),
            _ => None,
        }
    }

    /// Grid dimensions for the current item count. A dragged item keeps
    /// its cell as the drop preview.
    pub fn grid_dims(&self) -> GridDims {
        let aspect = self.canvas.aspect().unwrap_or(1.0);
        self.grid.dims(self.registry.grid_len(), aspect)
    }

    pub fn grid_tiles(&self) -> Vec<Tile> {
        let dims = self.grid_dims();
        let dragged = self.dragged();
        let preview = self.drop_preview_cell();
        let items = self
            .registry
            .grid()
            .iter()
            .enumerate()
            .filter(|(_, m)| Some(m.id) != dragged)
            .map(|(i, m)| (i, m.id, m.dimensions()));
        layout_tiles(self.canvas, dims, items, preview, &self.zoom)
    }

    /// Cell under the pointer while reordering.
    pub(crate) fn drop_preview_cell(&self) -> Option<usize> {
        self.dragged()?;
        let pointer = self.pointer?;
        Some(self.grid_dims().cell_index_at(self.canvas, pointer))
    }

    /// Tile under the pointer, when nothing is being dragged.
    pub fn hovered_tile(&self, tiles: &[Tile]) -> Option<Tile> {
        if self.registry.mode() != ViewMode::Grid || !matches!(self.drag, DragState::None) {
            return None;
        }
        let pointer = self.pointer?;
        tiles
            .iter()
            .find(|t| t.frame().is_some_and(|f| strictly_inside(f, pointer)))
            .copied()
    }

    /// Area the split view draws into.
    pub fn split_dest(&self) -> Rect {
        let reference = self
            .registry
            .split_slot(0)
            .or_else(|| self.registry.split_slot(1))
            .and_then(MediaItem::aspect);
        split_dest_rect(self.canvas, reference)
    }

    // ── Import / removal ────────────────────────────────────────

    /// Open and import `paths` into the active view. Files that cannot be
    /// opened are skipped and raise the rejected hint.
    pub fn import_paths(
        &mut self,
        paths: &[PathBuf],
        origin: ImportOrigin,
        opener: &dyn MediaOpener,
    ) -> Vec<MediaId> {
        let mut opened = Vec::with_capacity(paths.len());
        let mut rejected = false;
        for path in paths {
            match opener.open(path) {
                Ok(element) => opened.push((element, file_label(path))),
                Err(e) => {
                    warn!("Rejected {}: {}", path.display(), e);
                    rejected = true;
                }
            }
        }
        self.rejected = rejected;
        self.import_elements(opened, origin)
    }

    /// Add already opened elements to the active view.
    pub fn import_elements(
        &mut self,
        elements: Vec<(Box<dyn MediaElement>, String)>,
        origin: ImportOrigin,
    ) -> Vec<MediaId> {
        if elements.is_empty() {
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(elements.len());
        match self.registry.mode() {
            ViewMode::Grid => {
                for (element, name) in elements {
                    let item = self.prepare_item(element, name);
                    ids.push(item.id);
                    self.registry.push_grid(item);
                }
                self.grid = GridSpec::Auto;
            }
            ViewMode::Split => {
                let occupied = [
                    self.registry.split_slot(0).is_some(),
                    self.registry.split_slot(1).is_some(),
                ];
                let dest = self.split_dest();
                let on_right = self.compare.on_right_side;
                let split = self.split;
                let slots = plan_split_slots(elements.len(), origin, occupied, |pos| {
                    split.slot_at(dest, pos.x, on_right)
                });
                if elements.len() > slots.len() {
                    debug!("Split view takes two media, ignoring {}", elements.len() - slots.len());
                }
                for ((element, name), slot) in elements.into_iter().zip(slots) {
                    let item = self.prepare_item(element, name);
                    ids.push(item.id);
                    if let Some(old) = self.registry.place_split(slot, item) {
                        info!("Replaced {} in split slot {}", old.display_name, slot);
                        self.forget(old.id);
                    }
                }
            }
        }
        self.reelect();
        ids
    }

    fn prepare_item(&self, element: Box<dyn MediaElement>, name: String) -> MediaItem {
        let mut item = MediaItem::new(element, name);
        item.autoplay_on_load = item.is_video() && self.registry.video_count() == 0;
        info!(
            "Importing {} ({}) into the {} view",
            item.display_name,
            item.kind,
            self.registry.mode()
        );
        item
    }

    /// Remove one item and every weak reference to it.
    pub fn remove(&mut self, id: MediaId) -> bool {
        let location = self.registry.locate(id);
        let Some(item) = self.registry.remove(id) else {
            return false;
        };
        info!("Removed {}", item.display_name);
        drop(item);
        self.forget(id);
        if matches!(location, Some(Location::Grid(_))) {
            self.grid = GridSpec::Auto;
        }
        self.reelect();
        true
    }

    fn forget(&mut self, id: MediaId) {
        self.transport.forget(&mut self.registry, id);
        self.compare.forget(id);
        self.audio.forget(id);
        if self.dragged() == Some(id) {
            self.drag = DragState::None;
        }
    }

    pub fn clear_grid(&mut self) {
        let active = self.registry.mode() == ViewMode::Grid;
        if active && self.transport.is_playing {
            self.toggle_play_pause();
        }
        if active {
            self.transport.cancel_barrier();
        }
        let removed = self.registry.clear_grid();
        info!("Cleared {} grid media", removed.len());
        for item in removed {
            self.forget(item.id);
        }
        self.compare.reset();
        self.grid = GridSpec::Auto;
        self.reelect();
    }

    pub fn clear_split(&mut self) {
        let active = self.registry.mode() == ViewMode::Split;
        if active && self.transport.is_playing {
            self.toggle_play_pause();
        }
        if active {
            self.transport.cancel_barrier();
        }
        let removed = self.registry.clear_split();
        info!("Cleared {} split media", removed.len());
        for item in removed {
            self.forget(item.id);
        }
        self.split.reset();
        self.reelect();
    }

    fn reelect(&mut self) {
        let master = elect(&self.registry);
        if master != self.master {
            match master.and_then(|id| self.registry.get(id)) {
                Some(item) => info!(
                    "Master clock: {} ({:.2}s)",
                    item.display_name,
                    item.duration()
                ),
                None => info!("No master clock"),
            }
            self.master = master;
        }
        if self.master.is_none() && self.transport.is_playing {
            self.transport.stop(&mut self.registry);
        }
    }

    // ── View ────────────────────────────────────────────────────

    /// Switch between grid and split. The leaving collection is paused and
    /// the entering one picks up the transport state.
    pub fn toggle_view(&mut self) {
        pause_all(&mut self.registry);
        self.transport.cancel_barrier();
        self.transport.scrubbing = false;
        self.drag = DragState::None;

        let mode = self.registry.mode().toggled();
        self.registry.set_mode(mode);
        info!("Switched to the {} view", mode);
        self.zoom.reset();
        self.reelect();

        let rate = self.transport.playback_rate;
        self.transport.set_rate(&mut self.registry, rate);
        if self.transport.is_playing {
            self.transport.play_active(&mut self.registry);
        }
    }

    pub fn toggle_compare_side(&mut self) {
        self.compare.on_right_side = !self.compare.on_right_side;
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        let reference = self.reference_dims();
        self.zoom.set_zoom(zoom, reference);
    }

    pub fn set_grid_cols(&mut self, cols: u32) {
        self.grid = GridSpec::pin_cols(cols, self.registry.grid_len());
    }

    pub fn set_grid_rows(&mut self, rows: u32) {
        self.grid = GridSpec::pin_rows(rows, self.registry.grid_len());
    }

    pub fn auto_layout(&mut self) {
        self.grid = GridSpec::Auto;
    }

    // ── Transport ───────────────────────────────────────────────

    pub fn toggle_play_pause(&mut self) -> bool {
        self.transport.toggle_play_pause(&mut self.registry, self.master)
    }

    pub fn step_frame(&mut self, direction: i32) -> bool {
        self.transport.step_frame(&mut self.registry, self.master, direction)
    }

    /// Seek from a seek-slider value (`0..=1000`).
    pub fn seek(&mut self, slider: f64) -> bool {
        let ab = self.ab_bounds();
        self.transport.seek_to(&mut self.registry, self.master, slider, ab)
    }

    /// The seek slider was grabbed.
    pub fn begin_scrub(&mut self) {
        if self.master.is_some() {
            self.transport.scrubbing = true;
        }
    }

    /// The seek slider moved while held.
    pub fn scrub_to(&mut self, slider: f64) -> bool {
        self.seek(slider)
    }

    /// The seek slider was released at `slider`.
    pub fn end_scrub(&mut self, slider: f64) -> bool {
        self.transport.scrubbing = false;
        self.seek(slider)
    }

    pub fn playback_rate(&self) -> f64 {
        self.transport.playback_rate
    }

    pub fn set_speed_index(&mut self, index: usize) {
        let Some(&rate) = self.config.speed_levels.get(index) else {
            return;
        };
        self.speed_index = index;
        self.transport.set_rate(&mut self.registry, rate);
        debug!("Playback rate {:.2}x", rate);
    }

    /// Switch between half speed and normal speed.
    pub fn toggle_slow_mo(&mut self) {
        let rate = if (self.transport.playback_rate - 0.5).abs() < f64::EPSILON {
            1.0
        } else {
            0.5
        };
        if let Some(index) = self
            .config
            .speed_levels
            .iter()
            .position(|s| (*s - rate).abs() < f64::EPSILON)
        {
            self.speed_index = index;
        }
        self.transport.set_rate(&mut self.registry, rate);
    }

    /// Flip full-timeline looping. Turning it on while paused starts
    /// playback.
    pub fn toggle_looping(&mut self) {
        self.transport.is_looping = !self.transport.is_looping;
        if self.transport.is_looping && !self.transport.is_playing && self.master.is_some() {
            self.toggle_play_pause();
        }
    }

    pub fn set_frame_rate(&mut self, fps: f64) {
        let rate = FrameRate::from_fps_f64(fps);
        self.transport.frame_rate = rate;
        self.config.frame_rate = rate.to_fps_f64();
    }

    pub fn frame_rate(&self) -> FrameRate {
        self.transport.frame_rate
    }

    // ── A-B loop ────────────────────────────────────────────────

    pub fn set_ab_start(&mut self, ratio: f64) {
        self.ab.set_start(ratio);
        self.after_ab_change();
    }

    pub fn set_ab_end(&mut self, ratio: f64) {
        self.ab.set_end(ratio);
        self.after_ab_change();
    }

    pub fn toggle_ab(&mut self) {
        self.ab.toggle();
        debug!("A-B loop {}", if self.ab.enabled { "on" } else { "off" });
    }

    fn after_ab_change(&mut self) {
        if self.ab.enabled && self.transport.is_playing {
            clamp_playhead_into_ab(&mut self.registry, self.master, &self.ab);
        }
    }

    // ── Audio ───────────────────────────────────────────────────

    pub fn set_master_volume(&mut self, volume: f32) {
        self.audio.set_master_volume(volume);
    }

    pub fn toggle_mute(&mut self) {
        self.audio.toggle_mute();
    }

    pub fn set_item_volume(&mut self, id: MediaId, volume: f32) {
        if let Some(item) = self.registry.get_mut(id) {
            item.volume = if volume.is_finite() {
                volume.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
    }

    /// What the audio output should play right now.
    pub fn audio_target(&self) -> Option<AudioTarget> {
        let id = self.audio.active?;
        let item = self.registry.get(id)?;
        let path = item.element.source_path()?.to_path_buf();
        Some(AudioTarget {
            id,
            path,
            time: item.time(),
            rate: item.element.rate(),
            gain: self.audio.effective_volume(id, item.volume),
            playing: !item.element.is_paused(),
        })
    }

    fn hovered_audio_source(&self) -> Option<MediaId> {
        let pointer = self.pointer?;
        let id = match self.registry.mode() {
            ViewMode::Grid => self.hovered_tile(&self.grid_tiles())?.id,
            ViewMode::Split => {
                let dest = self.split_dest();
                if !strictly_inside(dest, pointer) {
                    return None;
                }
                let slot = self.split.slot_at(dest, pointer.x, self.compare.on_right_side);
                self.registry.split_slot(slot)?.id
            }
        };
        self.registry.get(id).filter(|m| m.is_video()).map(|m| m.id)
    }

    fn route_audio(&mut self) {
        let hovered = self.hovered_audio_source();
        let lock_allowed = self.registry.mode() == ViewMode::Grid;
        self.audio.resolve(hovered, lock_allowed);
        for item in self.registry.all_mut() {
            if item.is_video() {
                let volume = self.audio.effective_volume(item.id, item.volume);
                item.element.set_volume(volume);
            }
        }
    }

    // ── Tick ────────────────────────────────────────────────────

    /// Advance the session by one UI frame: drain media events, run the
    /// loop engine, route audio and refresh the readout.
    pub fn tick(&mut self) -> LoopAction {
        let mut events = Vec::new();
        for item in self.registry.all_mut() {
            for event in item.element.poll_events() {
                events.push((item.id, event));
            }
        }
        for (id, event) in events {
            match event {
                MediaEvent::Loaded => self.on_loaded(id),
                MediaEvent::SeekCompleted(ticket) => {
                    self.transport.on_seek_completed(&mut self.registry, id, ticket);
                }
                MediaEvent::Failed(reason) => {
                    let name = self
                        .registry
                        .get(id)
                        .map(|m| m.display_name.clone())
                        .unwrap_or_default();
                    warn!("Failed to load {}: {}", name, reason);
                    self.remove(id);
                }
            }
        }

        let action = loop_tick(&mut self.transport, &mut self.registry, self.master, &self.ab);
        self.route_audio();
        self.refresh_readout();
        action
    }

    fn on_loaded(&mut self, id: MediaId) {
        let Some(item) = self.registry.get(id) else {
            return;
        };
        info!(
            "Loaded {} ({}, {:.2}s, {:?})",
            item.display_name,
            item.kind,
            item.duration(),
            item.dimensions()
        );
        if !item.is_video() {
            return;
        }
        let rate = self.transport.playback_rate;

        if !self.registry.is_active(id) {
            if let Some(item) = self.registry.get_mut(id) {
                item.autoplay_on_load = false;
                item.element.set_volume(0.0);
                item.element.set_rate(rate);
                item.element.pause();
            }
            return;
        }

        let master_time = self.clock().map_or(0.0, |(time, _)| time);
        let Some(item) = self.registry.get_mut(id) else {
            return;
        };
        item.element.set_volume(0.0);
        item.element.set_rate(rate);
        let ticket = item.element.set_time(master_time.min(item.duration()));
        let autoplay = std::mem::take(&mut item.autoplay_on_load);
        self.transport.join_barrier(id, ticket);
        self.reelect();

        if autoplay && !self.transport.is_playing {
            self.toggle_play_pause();
            return;
        }
        let resume = self.transport.is_playing && self.transport.barrier().is_none();
        if let Some(item) = self.registry.get_mut(id) {
            if resume && item.time() < item.duration() {
                item.element.play();
            } else {
                item.element.pause();
            }
        }
    }

    pub fn controls_state(&self) -> ControlsState {
        let has_master = self.master.is_some();
        ControlsState {
            play: has_master,
            step: has_master,
            seek: has_master,
            speed: has_master,
            looping: has_master,
            clear_grid: self.registry.grid_len() > 0,
            clear_split: self.registry.split_count() > 0,
        }
    }

    fn refresh_readout(&mut self) {
        let controls = self.controls_state();
        let clock = self.clock();
        self.readout.update(
            clock,
            self.transport.is_seeking(),
            self.transport.frame_rate,
            &self.ab,
            controls,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasyncer_core::SyncError;
    use mediasyncer_media::{SyntheticHandle, SyntheticMedia};

    fn video(session: &mut Session, duration: f64) -> (MediaId, SyntheticHandle) {
        let (media, handle) = SyntheticMedia::video(duration, 160, 90);
        let ids = session.import_elements(
            vec![(Box::new(media) as Box<dyn MediaElement>, format!("{duration}s.mp4"))],
            ImportOrigin::Picked,
        );
        (ids[0], handle)
    }

    #[test]
    fn test_first_video_autoplays_on_load() {
        let mut session = Session::default();
        let (id, handle) = video(&mut session, 10.0);
        assert!(!session.transport().is_playing);

        session.tick();
        assert_eq!(session.master(), Some(id));
        assert!(session.transport().is_playing);
        assert!(!handle.is_paused());
        assert_eq!(handle.volume(), 0.0);
    }

    #[test]
    fn test_later_video_syncs_to_master() {
        let mut session = Session::default();
        let (_, long) = video(&mut session, 10.0);
        session.tick();
        long.force_time(3.0);

        let (_, short) = video(&mut session, 6.0);
        session.tick();
        assert_eq!(short.time(), 3.0);
        assert!(!short.is_paused());
        assert_eq!(short.rate(), 1.0);
    }

    #[test]
    fn test_remove_clears_weak_ids() {
        let mut session = Session::default();
        let (a, _) = video(&mut session, 10.0);
        let (b, _) = video(&mut session, 5.0);
        session.tick();
        session.compare.toggle_primary(a);
        session.audio.toggle_lock(a);

        assert!(session.remove(a));
        assert_eq!(session.compare().primary, None);
        assert_eq!(session.audio().locked, None);
        assert_eq!(session.master(), Some(b));
        assert!(!session.remove(a));
    }

    #[test]
    fn test_failure_removes_item() {
        let mut session = Session::default();
        let (id, handle) = video(&mut session, 10.0);
        handle.fail("decoder crashed");
        session.tick();
        assert!(session.registry().get(id).is_none());
        assert!(handle.is_released());
        assert_eq!(session.master(), None);
        assert!(!session.transport().is_playing);
    }

    #[test]
    fn test_rejected_import_sets_hint() {
        let mut session = Session::default();
        let opener = |path: &Path| -> Result<Box<dyn MediaElement>> {
            if path.extension().is_some_and(|e| e == "mp4") {
                let (media, _) = SyntheticMedia::video(1.0, 4, 4);
                Ok(Box::new(media))
            } else {
                Err(SyncError::UnsupportedFormat(path.display().to_string()))
            }
        };
        let ids = session.import_paths(
            &[PathBuf::from("notes.txt"), PathBuf::from("/tmp/take.mp4")],
            ImportOrigin::Picked,
            &opener,
        );
        assert_eq!(ids.len(), 1);
        assert!(session.rejected());
        assert_eq!(session.registry().grid()[0].display_name, "take.mp4");

        session.import_paths(&[PathBuf::from("b.mp4")], ImportOrigin::Picked, &opener);
        assert!(!session.rejected());
    }

    #[test]
    fn test_import_resets_pinned_layout() {
        let mut session = Session::default();
        video(&mut session, 1.0);
        session.set_grid_cols(3);
        assert!(!session.grid_spec().is_auto());
        video(&mut session, 1.0);
        assert!(session.grid_spec().is_auto());
    }

    #[test]
    fn test_split_import_placement() {
        let mut session = Session::default();
        session.toggle_view();
        assert_eq!(session.mode(), ViewMode::Split);

        let (a, _) = video(&mut session, 4.0);
        let (b, _) = video(&mut session, 5.0);
        assert_eq!(session.registry().split_slot(0).map(|m| m.id), Some(a));
        assert_eq!(session.registry().split_slot(1).map(|m| m.id), Some(b));

        // Both slots full: a picked file replaces slot 0
        let (c, _) = video(&mut session, 3.0);
        assert_eq!(session.registry().split_slot(0).map(|m| m.id), Some(c));
        assert_eq!(session.registry().split_count(), 2);
        assert!(session.registry().get(a).is_none());
    }

    #[test]
    fn test_view_switch_rescopes_transport() {
        let mut session = Session::default();
        let (grid_id, grid_video) = video(&mut session, 10.0);
        session.tick();
        assert!(session.transport().is_playing);
        session.set_zoom(3.0);

        session.toggle_view();
        assert!(grid_video.is_paused());
        assert_eq!(session.zoom().zoom, 1.0);
        assert_eq!(session.master(), None);
        assert!(!session.transport().is_playing);

        session.toggle_view();
        assert_eq!(session.master(), Some(grid_id));
    }

    #[test]
    fn test_clear_grid_resets_compare() {
        let mut session = Session::default();
        let (a, handle) = video(&mut session, 10.0);
        session.tick();
        session.compare.toggle_primary(a);
        session.compare.split_ratio = 0.3;

        session.clear_grid();
        assert!(handle.is_released());
        assert_eq!(session.compare().primary, None);
        assert_eq!(session.compare().split_ratio, 0.5);
        assert!(!session.transport().is_playing);
        assert!(!session.controls_state().clear_grid);
    }

    #[test]
    fn test_speed_and_slow_mo() {
        let mut session = Session::default();
        let (_, handle) = video(&mut session, 10.0);
        session.tick();
        session.set_speed_index(8);
        assert_eq!(handle.rate(), 2.0);
        session.toggle_slow_mo();
        assert_eq!(handle.rate(), 0.5);
        assert_eq!(session.speed_index(), 2);
        session.toggle_slow_mo();
        assert_eq!(session.playback_rate(), 1.0);
        session.set_speed_index(99);
        assert_eq!(session.playback_rate(), 1.0);
    }

    #[test]
    fn test_loop_toggle_starts_playback() {
        let mut session = Session::default();
        video(&mut session, 10.0);
        session.tick();
        session.toggle_play_pause();
        session.toggle_looping();
        assert!(!session.transport().is_looping);
        assert!(!session.transport().is_playing);
        session.toggle_looping();
        assert!(session.transport().is_playing);
    }

    #[test]
    fn test_ab_bound_clamps_playhead_while_playing() {
        let mut session = Session::default();
        let (_, handle) = video(&mut session, 10.0);
        session.tick();
        handle.force_time(1.0);
        session.toggle_ab();
        session.set_ab_start(0.3);
        assert_eq!(handle.time(), 3.0);
        assert_eq!(session.readout().ab, "A 00:00.00 → B 00:10.00");
        session.tick();
        assert_eq!(session.readout().ab, "A 00:03.00 → B 00:10.00");
    }

    #[test]
    fn test_readout_follows_master() {
        let mut session = Session::default();
        let (_, handle) = video(&mut session, 10.0);
        session.tick();
        handle.force_time(2.5);
        session.tick();
        assert_eq!(session.readout().slider, 250.0);
        assert!(session.readout().controls.play);
        assert!(!session.readout().controls.clear_split);
    }
}
