//! Top toolbar: import, view, layout, zoom, frame rate, speed and loop.

use egui::{Ui, Vec2};
use mediasyncer_engine::{GridSpec, Session, ViewMode};

use crate::theme::{Palette, Theme, ThemeMode};

// ── Actions returned from the toolbar ──────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    Import,
    ToggleView,
    AutoLayout,
    SetCols(u32),
    SetRows(u32),
    ClearGrid,
    ClearSplit,
    ToggleCompareSide,
    ToggleTheme,
    SetZoom(f32),
    SetFrameRate(f64),
    SetSpeed(usize),
    ToggleSlowMo,
    ToggleLoop,
}

impl ToolbarAction {
    /// Apply a session-level action. Returns `false` for actions the app
    /// handles itself (import, theme).
    pub fn apply(&self, session: &mut Session) -> bool {
        match *self {
            ToolbarAction::ToggleView => session.toggle_view(),
            ToolbarAction::AutoLayout => session.auto_layout(),
            ToolbarAction::SetCols(cols) => session.set_grid_cols(cols),
            ToolbarAction::SetRows(rows) => session.set_grid_rows(rows),
            ToolbarAction::ClearGrid => session.clear_grid(),
            ToolbarAction::ClearSplit => session.clear_split(),
            ToolbarAction::ToggleCompareSide => session.toggle_compare_side(),
            ToolbarAction::SetZoom(zoom) => session.set_zoom(zoom),
            ToolbarAction::SetFrameRate(fps) => session.set_frame_rate(fps),
            ToolbarAction::SetSpeed(index) => session.set_speed_index(index),
            ToolbarAction::ToggleSlowMo => session.toggle_slow_mo(),
            ToolbarAction::ToggleLoop => session.toggle_looping(),
            ToolbarAction::Import | ToolbarAction::ToggleTheme => return false,
        }
        true
    }
}

// ── Rendering ──────────────────────────────────────────────────

fn speed_label(speed: f64) -> String {
    format!("{speed}x")
}

/// Show the toolbar and return any actions.
pub fn show_toolbar(ui: &mut Ui, session: &Session, theme: ThemeMode, palette: &Palette) -> Vec<ToolbarAction> {
    let mut actions = Vec::new();
    let controls = session.readout().controls;

    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing = Vec2::new(Theme::SPACE_SM, Theme::SPACE_XS);

        if ui.button("Import…").clicked() {
            actions.push(ToolbarAction::Import);
        }
        let view_label = match session.mode() {
            ViewMode::Grid => "Split View",
            ViewMode::Split => "Grid View",
        };
        if ui.button(view_label).clicked() {
            actions.push(ToolbarAction::ToggleView);
        }

        ui.separator();

        match session.mode() {
            ViewMode::Grid => {
                let dims = session.grid_dims();
                let auto = session.grid_spec().is_auto();
                if ui.selectable_label(auto, "Auto").clicked() && !auto {
                    actions.push(ToolbarAction::AutoLayout);
                }
                let mut cols = dims.cols;
                ui.label("Cols");
                if ui.add(egui::DragValue::new(&mut cols).range(1..=16)).changed() {
                    actions.push(ToolbarAction::SetCols(cols));
                }
                let mut rows = dims.rows;
                ui.label("Rows");
                if ui.add(egui::DragValue::new(&mut rows).range(1..=16)).changed() {
                    actions.push(ToolbarAction::SetRows(rows));
                }
                if ui
                    .add_enabled(controls.clear_grid, egui::Button::new("Clear Grid"))
                    .clicked()
                {
                    actions.push(ToolbarAction::ClearGrid);
                }
                if matches!(session.grid_spec(), GridSpec::Pinned(_)) {
                    ui.label(
                        egui::RichText::new("pinned")
                            .size(Theme::FONT_XS)
                            .color(palette.text_muted),
                    );
                }
            }
            ViewMode::Split => {
                if ui
                    .add_enabled(controls.clear_split, egui::Button::new("Clear Split"))
                    .clicked()
                {
                    actions.push(ToolbarAction::ClearSplit);
                }
            }
        }
        if ui.button("⇆ Side").on_hover_text("Swap compare sides").clicked() {
            actions.push(ToolbarAction::ToggleCompareSide);
        }

        ui.separator();

        let mut zoom = session.zoom().zoom;
        let max_zoom = session.zoom().max_zoom();
        ui.label("Zoom");
        if ui
            .add(egui::Slider::new(&mut zoom, 1.0..=max_zoom).fixed_decimals(1).suffix("x"))
            .changed()
        {
            actions.push(ToolbarAction::SetZoom(zoom));
        }

        let mut fps = session.frame_rate().to_fps_f64();
        ui.label("FPS");
        if ui
            .add(egui::DragValue::new(&mut fps).range(1.0..=240.0).max_decimals(3))
            .changed()
        {
            actions.push(ToolbarAction::SetFrameRate(fps));
        }

        ui.separator();

        let current = session.speed_index();
        ui.add_enabled_ui(controls.speed, |ui| {
            egui::ComboBox::from_id_salt("speed")
                .selected_text(speed_label(session.playback_rate()))
                .show_ui(ui, |ui| {
                    for (index, speed) in session.speed_levels().iter().enumerate() {
                        if ui.selectable_label(index == current, speed_label(*speed)).clicked() {
                            actions.push(ToolbarAction::SetSpeed(index));
                        }
                    }
                });
            let slow = (session.playback_rate() - 0.5).abs() < f64::EPSILON;
            if ui.selectable_label(slow, "Slow-mo").clicked() {
                actions.push(ToolbarAction::ToggleSlowMo);
            }
        });

        let looping = session.transport().is_looping;
        if ui
            .add_enabled(controls.looping, egui::SelectableLabel::new(looping, "⟲ Loop"))
            .clicked()
        {
            actions.push(ToolbarAction::ToggleLoop);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui
                .button(theme.toggled().icon())
                .on_hover_text("Toggle light / dark")
                .clicked()
            {
                actions.push(ToolbarAction::ToggleTheme);
            }
        });
    });

    actions
}
