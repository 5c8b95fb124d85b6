//! Side panel: master volume, mute and the active collection.

use egui::{RichText, Ui};
use mediasyncer_core::MediaId;
use mediasyncer_engine::Session;

use crate::theme::{Palette, Theme};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaPanelAction {
    SetMasterVolume(f32),
    ToggleMute,
    SetVolume(MediaId, f32),
    Remove(MediaId),
}

impl MediaPanelAction {
    pub fn apply(self, session: &mut Session) {
        match self {
            MediaPanelAction::SetMasterVolume(volume) => session.set_master_volume(volume),
            MediaPanelAction::ToggleMute => session.toggle_mute(),
            MediaPanelAction::SetVolume(id, volume) => session.set_item_volume(id, volume),
            MediaPanelAction::Remove(id) => {
                session.remove(id);
            }
        }
    }
}

pub fn show_media_panel(ui: &mut Ui, session: &Session, palette: &Palette) -> Vec<MediaPanelAction> {
    let mut actions = Vec::new();
    let audio = session.audio();

    ui.label(RichText::new("Audio").size(Theme::FONT_SM).strong());
    ui.horizontal(|ui| {
        let icon = if audio.muted { "\u{1F507}" } else { "\u{1F50A}" };
        if ui.button(icon).on_hover_text("Mute").clicked() {
            actions.push(MediaPanelAction::ToggleMute);
        }
        let mut volume = audio.master_volume;
        if ui.add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false)).changed() {
            actions.push(MediaPanelAction::SetMasterVolume(volume));
        }
    });

    ui.separator();
    ui.label(RichText::new(format!("{} view", session.mode())).size(Theme::FONT_SM).strong());

    if session.registry().active_len() == 0 {
        ui.label(
            RichText::new("No media")
                .size(Theme::FONT_XS)
                .color(palette.text_muted),
        );
        return actions;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for item in session.registry().active() {
            ui.horizontal(|ui| {
                let is_master = session.master() == Some(item.id);
                let is_active = audio.active == Some(item.id);
                let mut name = RichText::new(&item.display_name).size(Theme::FONT_XS);
                if is_master {
                    name = name.strong();
                }
                if is_active {
                    name = name.color(palette.accent);
                }
                ui.label(name).on_hover_text(format!("{} · {}", item.kind, item.display_name));
                if ui.small_button("×").on_hover_text("Remove").clicked() {
                    actions.push(MediaPanelAction::Remove(item.id));
                }
            });
            if item.is_video() {
                let mut volume = item.volume;
                if ui
                    .add(egui::Slider::new(&mut volume, 0.0..=1.0).show_value(false))
                    .changed()
                {
                    actions.push(MediaPanelAction::SetVolume(item.id, volume));
                }
            }
        }
    });

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediasyncer_core::MediaElement;
    use mediasyncer_engine::ImportOrigin;
    use mediasyncer_media::SyntheticMedia;

    #[test]
    fn test_actions_reach_session() {
        let mut session = Session::default();
        let (media, _) = SyntheticMedia::video(5.0, 64, 64);
        let ids = session.import_elements(
            vec![(Box::new(media) as Box<dyn MediaElement>, "a.mp4".into())],
            ImportOrigin::Picked,
        );
        let id = ids[0];

        MediaPanelAction::SetVolume(id, 0.25).apply(&mut session);
        assert_eq!(session.registry().get(id).map(|m| m.volume), Some(0.25));
        MediaPanelAction::ToggleMute.apply(&mut session);
        assert!(session.audio().muted);
        MediaPanelAction::Remove(id).apply(&mut session);
        assert!(session.registry().get(id).is_none());
    }
}
