//! Light and dark palettes, and the mapping from draw roles to colours.

use egui::{Color32, Rounding, Stroke, Vec2};
use mediasyncer_engine::ColorRole;

// ── Mode ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    /// Value stored under the `theme` preference key.
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeMode::Light => "light",
            ThemeMode::Dark => "dark",
        }
    }

    /// Parse a stored preference. Anything unrecognised is dark.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("light") => ThemeMode::Light,
            _ => ThemeMode::Dark,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        }
    }

    /// Glyph for the theme toggle button.
    pub fn icon(self) -> &'static str {
        match self {
            ThemeMode::Light => "\u{263C}", // ☼
            ThemeMode::Dark => "\u{263E}",  // ☾
        }
    }
}

// ── Palette ────────────────────────────────────────────────────

/// Every colour the UI paints with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub bg: Color32,
    pub panel: Color32,
    pub widget: Color32,
    pub widget_hover: Color32,
    pub canvas: Color32,
    pub text: Color32,
    pub text_muted: Color32,
    pub border: Color32,
    pub accent: Color32,
    pub danger: Color32,
}

impl Palette {
    pub const fn dark() -> Self {
        Self {
            bg: Color32::from_rgb(18, 18, 22),
            panel: Color32::from_rgb(28, 28, 34),
            widget: Color32::from_rgb(45, 45, 55),
            widget_hover: Color32::from_rgb(55, 55, 68),
            canvas: Color32::from_rgb(12, 12, 15),
            text: Color32::from_rgb(235, 235, 235),
            text_muted: Color32::from_rgb(153, 153, 153),
            border: Color32::from_rgb(70, 70, 82),
            accent: Color32::from_rgb(86, 130, 255),
            danger: Color32::from_rgb(255, 88, 85),
        }
    }

    pub const fn light() -> Self {
        Self {
            bg: Color32::from_rgb(242, 242, 246),
            panel: Color32::from_rgb(250, 250, 252),
            widget: Color32::from_rgb(225, 225, 232),
            widget_hover: Color32::from_rgb(210, 210, 220),
            canvas: Color32::from_rgb(232, 232, 238),
            text: Color32::from_rgb(28, 28, 34),
            text_muted: Color32::from_rgb(100, 100, 110),
            border: Color32::from_rgb(180, 180, 192),
            accent: Color32::from_rgb(40, 96, 230),
            danger: Color32::from_rgb(215, 55, 50),
        }
    }

    pub const fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::light(),
            ThemeMode::Dark => Self::dark(),
        }
    }

    /// Colour of a canvas draw role. Badges stay dark in both modes so they
    /// read over any video.
    pub fn role(&self, role: ColorRole) -> Color32 {
        match role {
            ColorRole::CanvasText => self.text_muted,
            ColorRole::Border => self.border,
            ColorRole::Accent => self.accent,
            ColorRole::DropPreview => Theme::with_alpha(self.accent, 60),
            ColorRole::BadgeBackground => Color32::from_rgba_unmultiplied(0, 0, 0, 150),
            ColorRole::HotspotBackground => Color32::from_rgba_unmultiplied(255, 255, 255, 70),
            ColorRole::BadgeText => Color32::WHITE,
            ColorRole::DividerIdle => Color32::from_rgba_unmultiplied(255, 255, 255, 140),
        }
    }
}

// ── Theme ──────────────────────────────────────────────────────

pub struct Theme;

impl Theme {
    pub const FONT_XS: f32 = 11.0;
    pub const FONT_SM: f32 = 13.0;
    pub const FONT_MONO: f32 = 13.0;

    pub const SPACE_XS: f32 = 4.0;
    pub const SPACE_SM: f32 = 8.0;
    pub const SPACE_MD: f32 = 16.0;

    pub const RADIUS: f32 = 6.0;
    pub const STROKE_SUBTLE: f32 = 0.5;

    /// Return a color with replaced alpha.
    pub const fn with_alpha(c: Color32, a: u8) -> Color32 {
        Color32::from_rgba_premultiplied(
            (c.r() as u16 * a as u16 / 255) as u8,
            (c.g() as u16 * a as u16 / 255) as u8,
            (c.b() as u16 * a as u16 / 255) as u8,
            a,
        )
    }

    /// Frame for the toolbar and transport bar.
    pub fn bar_frame(palette: &Palette) -> egui::Frame {
        egui::Frame::none()
            .fill(palette.panel)
            .stroke(Stroke::new(Self::STROKE_SUBTLE, palette.border))
            .inner_margin(egui::Margin::symmetric(12.0, 6.0))
    }

    /// Frame for the media side panel.
    pub fn panel_frame(palette: &Palette) -> egui::Frame {
        egui::Frame::none()
            .fill(palette.panel)
            .inner_margin(egui::Margin::same(Self::SPACE_SM))
    }

    /// Apply `mode` to an egui context.
    pub fn apply(ctx: &egui::Context, mode: ThemeMode) {
        let palette = Palette::for_mode(mode);
        let mut style = (*ctx.style()).clone();
        let visuals = &mut style.visuals;
        *visuals = match mode {
            ThemeMode::Light => egui::Visuals::light(),
            ThemeMode::Dark => egui::Visuals::dark(),
        };

        visuals.panel_fill = palette.panel;
        visuals.window_fill = palette.panel;
        visuals.extreme_bg_color = palette.bg;
        visuals.faint_bg_color = palette.widget;
        visuals.override_text_color = Some(palette.text);

        for widget in [
            &mut visuals.widgets.noninteractive,
            &mut visuals.widgets.inactive,
            &mut visuals.widgets.open,
        ] {
            widget.rounding = Rounding::same(Self::RADIUS);
        }
        visuals.widgets.inactive.bg_fill = palette.widget;
        visuals.widgets.inactive.weak_bg_fill = palette.widget;
        visuals.widgets.hovered.bg_fill = palette.widget_hover;
        visuals.widgets.hovered.weak_bg_fill = palette.widget_hover;
        visuals.widgets.hovered.bg_stroke = Stroke::new(1.0, Self::with_alpha(palette.accent, 120));
        visuals.widgets.hovered.rounding = Rounding::same(Self::RADIUS);
        visuals.widgets.active.bg_stroke = Stroke::new(1.0, palette.accent);
        visuals.widgets.active.rounding = Rounding::same(Self::RADIUS);

        visuals.selection.bg_fill = Self::with_alpha(palette.accent, 90);
        visuals.selection.stroke = Stroke::new(1.0, palette.accent);
        visuals.window_shadow = egui::epaint::Shadow {
            offset: Vec2::new(0.0, 4.0),
            blur: 20.0,
            spread: 0.0,
            color: Color32::from_rgba_premultiplied(0, 0, 0, 80),
        };

        style.interaction.tooltip_delay = 0.4;
        ctx.set_style(style);
    }
}
