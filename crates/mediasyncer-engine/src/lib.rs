//! MediaSyncer Engine - Synchronized playback and comparison layout
//!
//! Everything between loaded media and pixels on screen:
//! - The media registry for the grid and split views
//! - Master clock election and the seek barrier
//! - Transport, full and A-B looping
//! - Zoom/pan mapping, grid layout and the compare overlay
//! - Pointer input and the per-tick draw list

pub mod barrier;
pub mod compare;
pub mod grid;
pub mod input;
pub mod looping;
pub mod master;
pub mod readout;
pub mod registry;
pub mod render;
pub mod scene;
pub mod session;
pub mod split;
pub mod transport;
pub mod zoom;

pub use barrier::SeekBarrier;
pub use compare::{CompareState, Tile};
pub use grid::{best_grid, GridDims, GridSpec};
pub use input::{DragState, InputResponse, Key, PointerButton};
pub use looping::{ABRange, LoopAction};
pub use readout::{ControlsState, TransportReadout};
pub use registry::{MediaItem, Registry, ViewMode};
pub use render::{ApproxMeasure, ColorRole, CursorHint, DrawCommand, Scene, TextAnchor, TextMeasure};
pub use scene::IMPORT_PROMPT;
pub use session::{MediaOpener, Session};
pub use split::{ImportOrigin, SplitState};
pub use transport::{Transport, SEEK_SLIDER_MAX};
pub use zoom::{map_media, Placement, ZoomPan};
