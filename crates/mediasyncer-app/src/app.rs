//! The eframe application: owns the session and drives it once per frame.

use std::path::{Path, PathBuf};

use eframe::egui;
use mediasyncer_audio::AudioEngine;
use mediasyncer_core::{MediaElement, Result, ViewerConfig};
use mediasyncer_engine::{ImportOrigin, MediaOpener, Session, ViewMode};
use mediasyncer_media::{open_media, DecodeSettings};
use mediasyncer_ui::{
    handle_keys, show_canvas, show_media_panel, show_toolbar, show_transport_bar, CanvasAction,
    Palette, ScenePainter, Theme, ThemeMode, ToolbarAction,
};
use tracing::{info, warn};

/// eframe storage key of the theme preference.
const THEME_KEY: &str = "theme";

/// Opens files through ffmpeg at the configured decode width.
struct FfmpegOpener {
    settings: DecodeSettings,
}

impl MediaOpener for FfmpegOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn MediaElement>> {
        open_media(path, self.settings)
    }
}

pub struct ViewerApp {
    session: Session,
    opener: FfmpegOpener,
    painter: ScenePainter,
    /// `None` when no output device could be opened
    audio: Option<AudioEngine>,
    theme: ThemeMode,
    path_input: String,
}

impl ViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: ViewerConfig, paths: Vec<PathBuf>) -> Self {
        let theme = ThemeMode::from_stored(
            cc.storage
                .and_then(|storage| storage.get_string(THEME_KEY))
                .as_deref(),
        );
        Theme::apply(&cc.egui_ctx, theme);

        let audio = match AudioEngine::new() {
            Ok(engine) => Some(engine),
            Err(e) => {
                warn!("Audio disabled: {}", e);
                None
            }
        };

        let opener = FfmpegOpener {
            settings: DecodeSettings {
                max_width: config.decode_max_width,
            },
        };
        let mut app = Self {
            session: Session::new(config),
            opener,
            painter: ScenePainter::new(),
            audio,
            theme,
            path_input: String::new(),
        };

        if !paths.is_empty() {
            info!("Importing {} file(s) from the command line", paths.len());
            app.import(&paths, ImportOrigin::Picked);
        }
        app
    }

    fn import(&mut self, paths: &[PathBuf], origin: ImportOrigin) {
        self.session.import_paths(paths, origin, &self.opener);
    }

    /// Show the file picker. `slot` targets one split half.
    fn pick_files(&mut self, slot: Option<usize>) {
        let dialog = rfd::FileDialog::new()
            .set_title("Import Media")
            .add_filter(
                "Media",
                &[
                    "mp4", "mov", "mkv", "webm", "avi", "m4v", "png", "jpg", "jpeg", "gif", "bmp",
                    "webp", "tiff",
                ],
            );
        // One file per split half, any number into the grid
        let paths = match (self.session.mode(), slot) {
            (ViewMode::Split, Some(_)) => dialog.pick_file().map(|p| vec![p]),
            _ => dialog.pick_files(),
        };
        let Some(paths) = paths else {
            return;
        };
        let origin = slot.map_or(ImportOrigin::Picked, ImportOrigin::Slot);
        self.import(&paths, origin);
    }

    fn toggle_theme(&mut self, ctx: &egui::Context) {
        self.theme = self.theme.toggled();
        Theme::apply(ctx, self.theme);
    }

    fn path_field(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("Path to media")
                    .desired_width(ui.available_width() - 48.0),
            );
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            if (ui.button("Open").clicked() || submitted) && !self.path_input.trim().is_empty() {
                let path = PathBuf::from(self.path_input.trim());
                self.path_input.clear();
                self.import(&[path], ImportOrigin::Picked);
            }
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let palette = Palette::for_mode(self.theme);

        self.session.tick();
        handle_keys(ctx, &mut self.session);

        egui::TopBottomPanel::top("toolbar")
            .frame(Theme::bar_frame(&palette))
            .show(ctx, |ui| {
                for action in show_toolbar(ui, &self.session, self.theme, &palette) {
                    match action {
                        ToolbarAction::Import => self.pick_files(None),
                        ToolbarAction::ToggleTheme => self.toggle_theme(ctx),
                        other => {
                            other.apply(&mut self.session);
                        }
                    }
                }
            });

        egui::TopBottomPanel::bottom("transport")
            .frame(Theme::bar_frame(&palette))
            .show(ctx, |ui| {
                for action in show_transport_bar(ui, &self.session, &palette) {
                    action.apply(&mut self.session);
                }
            });

        egui::SidePanel::right("media_panel")
            .resizable(true)
            .default_width(220.0)
            .frame(Theme::panel_frame(&palette))
            .show(ctx, |ui| {
                self.path_field(ui);
                ui.separator();
                for action in show_media_panel(ui, &self.session, &palette) {
                    action.apply(&mut self.session);
                }
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(palette.bg))
            .show(ctx, |ui| {
                for action in show_canvas(ui, &mut self.session, &mut self.painter, &palette) {
                    match action {
                        CanvasAction::OpenImporter { slot } => self.pick_files(slot),
                        CanvasAction::Import { paths, origin } => self.import(&paths, origin),
                    }
                }
            });

        if let Some(audio) = self.audio.as_mut() {
            audio.follow(self.session.audio_target().as_ref());
        }

        // Frames and seek completions arrive asynchronously
        if self.session.registry().all().next().is_some() {
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        storage.set_string(THEME_KEY, self.theme.as_str().to_string());
    }
}
