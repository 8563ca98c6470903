use ratatui::style::Color;

use crate::model::UiConfig;
use crate::model::classification::Classification;

/// Parsed color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub interested: Color,
    pub selected: Color,
    pub hidden: Color,
    pub selection_bg: Color,
    /// Fill behind event blocks
    pub block_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            interested: Color::Rgb(0x44, 0xDD, 0xFF),
            selected: Color::Rgb(0x44, 0xFF, 0x88),
            hidden: Color::Rgb(0x5A, 0x55, 0x80),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            block_bg: Color::Rgb(0x1A, 0x0D, 0x2E),
        }
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}

impl Theme {
    /// Create a theme from project UI config, falling back to defaults
    pub fn from_config(ui: &UiConfig) -> Self {
        let mut theme = Theme::default();

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                tracing::warn!(key = %key, value = %value, "ignoring invalid color");
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "interested" => theme.interested = color,
                "selected" => theme.selected = color,
                "hidden" => theme.hidden = color,
                "selection_bg" => theme.selection_bg = color,
                "block_bg" => theme.block_bg = color,
                _ => {}
            }
        }

        theme
    }

    /// Foreground for an event with the given classification
    pub fn class_color(&self, class: Option<Classification>) -> Color {
        match class {
            None => self.text,
            Some(Classification::Interested) => self.interested,
            Some(Classification::Selected) => self.selected,
            Some(Classification::Hidden) => self.hidden,
        }
    }
}
