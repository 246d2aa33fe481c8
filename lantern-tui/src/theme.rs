//! Lantern theme and color utilities.

use ratatui::style::Color;

use crate::notifications::NotificationLevel;

#[derive(Debug, Clone)]
pub struct LanternTheme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub tertiary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub text_muted: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Default for LanternTheme {
    fn default() -> Self {
        Self::lantern()
    }
}

impl LanternTheme {
    pub fn lantern() -> Self {
        Self {
            bg: Color::Rgb(12, 12, 14),
            bg_highlight: Color::Rgb(40, 40, 46),
            primary: Color::Rgb(255, 102, 0),
            primary_dim: Color::Rgb(140, 60, 0),
            secondary: Color::Rgb(0, 200, 255),
            tertiary: Color::Rgb(255, 221, 0),
            success: Color::Rgb(0, 220, 90),
            warning: Color::Rgb(255, 221, 0),
            error: Color::Rgb(255, 60, 60),
            info: Color::Rgb(0, 200, 255),
            text: Color::Rgb(240, 240, 240),
            text_dim: Color::Rgb(140, 140, 140),
            text_muted: Color::Rgb(80, 80, 80),
            border: Color::Rgb(70, 70, 70),
            border_focus: Color::Rgb(255, 102, 0),
        }
    }
}

pub fn notification_color(level: NotificationLevel, theme: &LanternTheme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}

/// Author color for a comment nested `depth` levels deep.
pub fn depth_color(depth: usize, theme: &LanternTheme) -> Color {
    match depth % 3 {
        0 => theme.primary,
        1 => theme.secondary,
        _ => theme.tertiary,
    }
}

/// Color for a probability of precipitation in `[0, 1]`.
pub fn rain_chance_color(pop: f64, theme: &LanternTheme) -> Color {
    if pop < 0.3 {
        theme.success
    } else if pop < 0.7 {
        theme.warning
    } else {
        theme.info
    }
}
