//! Bottom transport bar: play, step, seek, A-B range and the readouts.

use egui::{RichText, Ui, Vec2};
use mediasyncer_engine::{Session, SEEK_SLIDER_MAX};

use crate::theme::{Palette, Theme};

// ── Actions ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransportAction {
    TogglePlay,
    Step(i32),
    /// Click on the seek track without dragging
    Seek(f64),
    BeginScrub,
    Scrub(f64),
    EndScrub(f64),
    SetAbStart(f64),
    SetAbEnd(f64),
    ToggleAb,
}

impl TransportAction {
    pub fn apply(self, session: &mut Session) {
        match self {
            TransportAction::TogglePlay => {
                session.toggle_play_pause();
            }
            TransportAction::Step(direction) => {
                session.step_frame(direction);
            }
            TransportAction::Seek(slider) => {
                session.seek(slider);
            }
            TransportAction::BeginScrub => session.begin_scrub(),
            TransportAction::Scrub(slider) => {
                session.scrub_to(slider);
            }
            TransportAction::EndScrub(slider) => {
                session.end_scrub(slider);
            }
            TransportAction::SetAbStart(ratio) => session.set_ab_start(ratio),
            TransportAction::SetAbEnd(ratio) => session.set_ab_end(ratio),
            TransportAction::ToggleAb => session.toggle_ab(),
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────

pub fn show_transport_bar(ui: &mut Ui, session: &Session, palette: &Palette) -> Vec<TransportAction> {
    let mut actions = Vec::new();
    let readout = session.readout();
    let controls = readout.controls;

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = Vec2::new(Theme::SPACE_SM, 0.0);

        let play_icon = if session.transport().is_playing {
            "\u{23F8}" // ⏸
        } else {
            "\u{25B6}" // ▶
        };
        if ui.add_enabled(controls.play, egui::Button::new(play_icon)).clicked() {
            actions.push(TransportAction::TogglePlay);
        }
        if ui
            .add_enabled(controls.step, egui::Button::new("\u{23EE}"))
            .on_hover_text("Previous frame")
            .clicked()
        {
            actions.push(TransportAction::Step(-1));
        }
        if ui
            .add_enabled(controls.step, egui::Button::new("\u{23ED}"))
            .on_hover_text("Next frame")
            .clicked()
        {
            actions.push(TransportAction::Step(1));
        }

        let mut slider = readout.slider;
        ui.spacing_mut().slider_width = (ui.available_width() - 260.0).max(120.0);
        let response = ui.add_enabled(
            controls.seek,
            egui::Slider::new(&mut slider, 0.0..=SEEK_SLIDER_MAX).show_value(false),
        );
        if response.drag_started() {
            actions.push(TransportAction::BeginScrub);
        }
        if response.drag_stopped() {
            actions.push(TransportAction::EndScrub(slider));
        } else if response.changed() {
            if response.dragged() {
                actions.push(TransportAction::Scrub(slider));
            } else {
                actions.push(TransportAction::Seek(slider));
            }
        }

        ui.label(RichText::new(&readout.timecode).monospace().size(Theme::FONT_MONO));
        ui.label(
            RichText::new(&readout.frame_counter)
                .monospace()
                .size(Theme::FONT_XS)
                .color(palette.text_muted),
        );
    });

    ui.horizontal(|ui| {
        ui.spacing_mut().item_spacing = Vec2::new(Theme::SPACE_SM, 0.0);
        let ab = session.ab();
        if ui.selectable_label(ab.enabled, "A-B Loop").clicked() {
            actions.push(TransportAction::ToggleAb);
        }
        let mut start = ab.start();
        if ui
            .add(egui::Slider::new(&mut start, 0.0..=1.0).show_value(false).text("A"))
            .changed()
        {
            actions.push(TransportAction::SetAbStart(start));
        }
        let mut end = ab.end();
        if ui
            .add(egui::Slider::new(&mut end, 0.0..=1.0).show_value(false).text("B"))
            .changed()
        {
            actions.push(TransportAction::SetAbEnd(end));
        }
        ui.label(
            RichText::new(&readout.ab)
                .monospace()
                .size(Theme::FONT_XS)
                .color(palette.text_muted),
        );
    });

    actions
}
