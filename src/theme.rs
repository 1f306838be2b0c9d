//! Theme colors, optionally read from a kitty-style color file
//! (`color4 #89b4fa`, `background #1e1e2e`, ...).

use ratatui::style::Color;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Theme colors for the page and its overlays
#[derive(Debug, Clone)]
pub struct Theme {
    pub accent: Color,      // Focus rings, top-most panel border (color4/blue)
    pub text: Color,        // Primary text (foreground)
    pub text_dim: Color,    // Secondary text, dimmed page under a backdrop (color8)
    pub page: Color,        // Page background (background)
    pub panel: Color,       // Panel background (color0)
    pub backdrop: Color,    // Tint behind the top-most panel
    pub focus_bg: Color,    // Focused element background (selection_background)
    pub inactive: Color,    // Borders of panels that are not on top, drag handle
    pub header: Color,      // Panel titles and page heading (color5/magenta)
}

impl Default for Theme {
    fn default() -> Self {
        // Catppuccin-inspired fallback
        Self {
            accent: Color::Rgb(137, 180, 250),
            text: Color::Rgb(205, 214, 244),
            text_dim: Color::Rgb(108, 112, 134),
            page: Color::Rgb(30, 30, 46),
            panel: Color::Rgb(49, 50, 68),
            backdrop: Color::Rgb(17, 17, 27),
            focus_bg: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(88, 91, 112),
            header: Color::Rgb(203, 166, 247),
        }
    }
}

impl Theme {
    /// Load a theme file, falling back to the built-in palette.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match fs::read_to_string(path) {
            Ok(content) => Self::from_kitty_conf(&content),
            Err(e) => {
                tracing::warn!("Failed to read theme {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Map kitty colors onto the theme; missing keys keep their defaults.
    pub fn from_kitty_conf(content: &str) -> Self {
        let colors = Self::parse_kitty_conf(content);
        let base = Self::default();
        let pick = |keys: &[&str], fallback: Color| {
            keys.iter()
                .find_map(|key| colors.get(*key).copied())
                .unwrap_or(fallback)
        };

        Self {
            accent: pick(&["color4", "color12"], base.accent),
            text: pick(&["foreground"], base.text),
            text_dim: pick(&["color8"], base.text_dim),
            page: pick(&["background"], base.page),
            panel: pick(&["color0", "background"], base.panel),
            backdrop: base.backdrop,
            focus_bg: pick(&["selection_background", "color8"], base.focus_bg),
            inactive: pick(&["inactive_border_color", "color8"], base.inactive),
            header: pick(&["color5", "color13"], base.header),
        }
    }

    /// Parse kitty.conf format: `key value` or `key #hexcolor`
    fn parse_kitty_conf(content: &str) -> HashMap<String, Color> {
        let mut colors = HashMap::new();

        for line in content.lines() {
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some((key, value)) = line.split_once(char::is_whitespace) {
                if let Some(color) = Self::parse_hex_color(value) {
                    colors.insert(key.trim().to_string(), color);
                }
            }
        }

        colors
    }

    /// Parse a hex color string (#RRGGBB or #RGB)
    fn parse_hex_color(s: &str) -> Option<Color> {
        let s = s.trim().trim_start_matches('#');
        if !s.is_ascii() {
            return None;
        }
        let channel = |hex: &str| u8::from_str_radix(hex, 16).ok();

        match s.len() {
            6 => Some(Color::Rgb(channel(&s[0..2])?, channel(&s[2..4])?, channel(&s[4..6])?)),
            3 => Some(Color::Rgb(
                channel(&s[0..1])? * 17,
                channel(&s[1..2])? * 17,
                channel(&s[2..3])? * 17,
            )),
            _ => None,
        }
    }
}
