//! The comparison canvas: routes pointer input into the session and paints
//! the resulting scene.

use std::path::PathBuf;

use egui::Sense;
use mediasyncer_core::Rect;
use mediasyncer_engine::{DragState, ImportOrigin, InputResponse, Key, PointerButton, Session};

use crate::painter::{cursor_icon, to_canvas, EguiMeasure, ScenePainter};
use crate::theme::Palette;

// ── Actions ────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum CanvasAction {
    /// Open the file picker; `slot` targets one split half
    OpenImporter { slot: Option<usize> },
    /// Files dropped onto the canvas
    Import {
        paths: Vec<PathBuf>,
        origin: ImportOrigin,
    },
}

fn map_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        _ => None,
    }
}

// ── Rendering ──────────────────────────────────────────────────

/// Show the canvas in the remaining space of `ui`.
pub fn show_canvas(
    ui: &mut egui::Ui,
    session: &mut Session,
    painter_state: &mut ScenePainter,
    palette: &Palette,
) -> Vec<CanvasAction> {
    let mut actions = Vec::new();
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click_and_drag());
    let rect = response.rect;
    let origin = rect.min;
    session.set_canvas(Rect::new(0.0, 0.0, rect.width(), rect.height()));

    painter.rect_filled(rect, 0.0, palette.canvas);

    let events = ui.input(|i| i.events.clone());
    let dragging = !matches!(session.drag(), DragState::None);
    for event in events {
        match event {
            egui::Event::PointerMoved(pos) => {
                if rect.contains(pos) || dragging {
                    session.pointer_moved(to_canvas(pos, origin));
                } else {
                    session.pointer_left();
                }
            }
            egui::Event::PointerGone => session.pointer_left(),
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } => {
                let Some(button) = map_button(button) else {
                    continue;
                };
                let local = to_canvas(pos, origin);
                if pressed && rect.contains(pos) {
                    if let InputResponse::OpenImporter { slot } = session.pointer_pressed(local, button) {
                        actions.push(CanvasAction::OpenImporter { slot });
                    }
                } else if !pressed {
                    session.pointer_released(local);
                }
            }
            _ => {}
        }
    }

    if response.hovered() {
        let (scroll, hover) = ui.input(|i| (i.raw_scroll_delta.y, i.pointer.hover_pos()));
        if let Some(pos) = hover.filter(|_| scroll != 0.0) {
            // Scrolling up zooms in
            session.wheel(to_canvas(pos, origin), -scroll);
        }
    }

    let (dropped, drop_pos) = ui.input(|i| {
        let paths: Vec<PathBuf> = i.raw.dropped_files.iter().filter_map(|f| f.path.clone()).collect();
        (paths, i.pointer.hover_pos())
    });
    if !dropped.is_empty() {
        let import_origin = drop_pos
            .filter(|p| rect.contains(*p))
            .map(|p| ImportOrigin::Dropped(to_canvas(p, origin)))
            .unwrap_or(ImportOrigin::Picked);
        actions.push(CanvasAction::Import {
            paths: dropped,
            origin: import_origin,
        });
    }

    let scene = session.build_scene(&EguiMeasure { ctx: ui.ctx() });
    painter_state.sync_textures(ui.ctx(), session);
    painter_state.paint(&painter.with_clip_rect(rect), origin, &scene, palette);
    if response.hovered() || dragging {
        ui.ctx().set_cursor_icon(cursor_icon(scene.cursor));
    }

    actions
}

/// Space and the arrow keys drive the transport unless a text field has
/// keyboard focus.
pub fn handle_keys(ctx: &egui::Context, session: &mut Session) {
    if ctx.wants_keyboard_input() {
        return;
    }
    let keys = ctx.input(|i| {
        [
            (egui::Key::Space, Key::Space),
            (egui::Key::ArrowLeft, Key::ArrowLeft),
            (egui::Key::ArrowRight, Key::ArrowRight),
        ]
        .into_iter()
        .filter(|(k, _)| i.key_pressed(*k))
        .map(|(_, key)| key)
        .collect::<Vec<_>>()
    });
    for key in keys {
        session.key_pressed(key);
    }
}
