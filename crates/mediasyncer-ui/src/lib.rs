//! MediaSyncer UI - egui front end for the comparison viewer
//!
//! Provides UI components:
//! - Light/dark theme
//! - Canvas painter for engine scenes
//! - Toolbar, transport bar and media panel

pub mod canvas;
pub mod media_panel;
pub mod painter;
pub mod theme;
pub mod toolbar;
pub mod transport_bar;

pub use canvas::{handle_keys, show_canvas, CanvasAction};
pub use media_panel::{show_media_panel, MediaPanelAction};
pub use painter::{EguiMeasure, ScenePainter};
pub use theme::{Palette, Theme, ThemeMode};
pub use toolbar::{show_toolbar, ToolbarAction};
pub use transport_bar::{show_transport_bar, TransportAction};
