use crate::bridge::ColorScheme;
use crate::event::LogLevel;
use eframe::egui::{self, Color32, CornerRadius, FontId, Frame, Margin, Stroke, TextStyle};

#[derive(Debug, Clone)]
pub struct Theme {
    pub scheme: ColorScheme,
    pub surface_1: Color32,
    pub surface_2: Color32,
    pub surface_3: Color32,
    pub accent_primary: Color32,
    pub accent_muted: Color32,
    pub success: Color32,
    pub warning: Color32,
    pub danger: Color32,
    pub text_primary: Color32,
    pub text_muted: Color32,
    pub border_subtle: Color32,
    pub spacing_8: f32,
    pub spacing_12: f32,
    pub radius_10: u8,
    pub radius_12: u8,
}

impl Theme {
    pub fn from_scheme(scheme: ColorScheme) -> Self {
        match scheme {
            ColorScheme::Dark => Self::dark(),
            ColorScheme::Light => Self::light(),
        }
    }

    pub fn dark() -> Self {
        Self {
            scheme: ColorScheme::Dark,
            surface_1: Color32::from_rgb(0x16, 0x1A, 0x20),
            surface_2: Color32::from_rgb(0x1C, 0x22, 0x2B),
            surface_3: Color32::from_rgb(0x22, 0x2A, 0x35),
            accent_primary: Color32::from_rgb(0x3B, 0x82, 0xF6),
            accent_muted: Color32::from_rgb(0x2F, 0x6E, 0xD8),
            success: Color32::from_rgb(0x22, 0xC5, 0x5E),
            warning: Color32::from_rgb(0xF5, 0x9E, 0x0B),
            danger: Color32::from_rgb(0xEF, 0x44, 0x44),
            text_primary: Color32::from_rgb(0xE6, 0xED, 0xF3),
            text_muted: Color32::from_rgb(0x8B, 0x94, 0x9E),
            border_subtle: Color32::from_rgba_premultiplied(255, 255, 255, 13),
            spacing_8: 8.0,
            spacing_12: 12.0,
            radius_10: 10,
            radius_12: 12,
        }
    }

    pub fn light() -> Self {
        Self {
            scheme: ColorScheme::Light,
            surface_1: Color32::from_rgb(0xF6, 0xF8, 0xFA),
            surface_2: Color32::from_rgb(0xFF, 0xFF, 0xFF),
            surface_3: Color32::from_rgb(0xEA, 0xEE, 0xF2),
            accent_primary: Color32::from_rgb(0x2F, 0x6E, 0xD8),
            accent_muted: Color32::from_rgb(0x3B, 0x82, 0xF6),
            success: Color32::from_rgb(0x15, 0x80, 0x3D),
            warning: Color32::from_rgb(0xB4, 0x6A, 0x02),
            danger: Color32::from_rgb(0xB9, 0x1C, 0x1C),
            text_primary: Color32::from_rgb(0x1B, 0x21, 0x28),
            text_muted: Color32::from_rgb(0x5B, 0x64, 0x6E),
            border_subtle: Color32::from_rgba_premultiplied(0, 0, 0, 18),
            spacing_8: 8.0,
            spacing_12: 12.0,
            radius_10: 10,
            radius_12: 12,
        }
    }

    pub fn level_color(&self, level: LogLevel) -> Color32 {
        match level {
            LogLevel::Info => self.text_muted,
            LogLevel::Success => self.success,
            LogLevel::Warning => self.warning,
            LogLevel::Error => self.danger,
        }
    }

    pub fn apply_visuals(&self, ctx: &egui::Context) {
        let mut visuals = match self.scheme {
            ColorScheme::Dark => egui::Visuals::dark(),
            ColorScheme::Light => egui::Visuals::light(),
        };
        visuals.panel_fill = self.surface_1;
        visuals.override_text_color = Some(self.text_primary);
        visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;
        visuals.widgets.noninteractive.bg_fill = self.surface_2;
        visuals.widgets.noninteractive.weak_bg_fill = self.surface_2;
        visuals.widgets.inactive.bg_fill = self.surface_2;
        visuals.widgets.inactive.fg_stroke.color = self.text_primary;
        visuals.widgets.hovered.bg_fill = self.surface_3;
        visuals.widgets.hovered.fg_stroke.color = self.text_primary;
        visuals.widgets.active.bg_fill = self.accent_muted;
        visuals.widgets.active.fg_stroke.color = self.text_primary;
        visuals.selection.bg_fill = self.accent_muted;
        visuals.hyperlink_color = self.accent_primary;
        visuals.window_fill = self.surface_1;
        visuals.window_stroke = Stroke::new(1.0, self.border_subtle);
        visuals.window_corner_radius = CornerRadius::same(self.radius_10);

        let mut style = (*ctx.style()).clone();
        style.visuals = visuals;
        style.spacing.item_spacing = egui::vec2(self.spacing_8, self.spacing_8);
        style.spacing.button_padding = egui::vec2(12.0, 8.0);
        style.text_styles.insert(TextStyle::Heading, FontId::proportional(17.0));
        style.text_styles.insert(TextStyle::Body, FontId::proportional(14.0));
        style.text_styles.insert(TextStyle::Monospace, FontId::monospace(13.0));
        style.text_styles.insert(TextStyle::Small, FontId::proportional(12.0));
        ctx.set_style(style);
    }

    pub fn card_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_2)
            .inner_margin(Margin::same(self.spacing_12 as i8))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::new(1.0, self.border_subtle))
    }

    pub fn composer_frame(&self) -> Frame {
        Frame::new()
            .fill(self.surface_2)
            .inner_margin(Margin::symmetric(self.spacing_12 as i8, 10))
            .corner_radius(CornerRadius::same(self.radius_12))
            .stroke(Stroke::NONE)
    }
}

#[cfg(test)]
mod tests {
    use super::Theme;
    use crate::bridge::ColorScheme;
    use crate::event::LogLevel;

    #[test]
    fn from_scheme_selects_the_matching_palette() {
        assert_eq!(Theme::from_scheme(ColorScheme::Dark).scheme, ColorScheme::Dark);
        assert_eq!(Theme::from_scheme(ColorScheme::Light).scheme, ColorScheme::Light);
    }

    #[test]
    fn log_levels_map_to_distinct_colors() {
        let theme = Theme::dark();
        let colors = [
            theme.level_color(LogLevel::Info),
            theme.level_color(LogLevel::Success),
            theme.level_color(LogLevel::Warning),
            theme.level_color(LogLevel::Error),
        ];
        for (index, color) in colors.iter().enumerate() {
            for other in &colors[index + 1..] {
                assert_ne!(color, other);
            }
        }
    }
}
