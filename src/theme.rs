//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::Palette;

/// Block and UI colours, One Dark by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Block colours by colour index. Pieces use the first three.
    pub cells: [Color; 6],
    /// Background behind the hive.
    pub bg: Color,
    /// Empty donut cell.
    pub empty: Color,
    /// The spawn hole in the middle of the hive.
    pub hole: Color,
    /// Borders.
    pub div_line: Color,
    /// Text (score, level).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Ghost piece and secondary text.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark_default()
    }
}

impl Theme {
    /// One Dark values from onedark.theme.
    pub const fn onedark_default() -> Self {
        Self {
            cells: [
                Color::Rgb(0xE5, 0xC0, 0x7B), // title / yellow
                Color::Rgb(0x98, 0xC3, 0x79), // mem_box / green
                Color::Rgb(0xE0, 0x6C, 0x75), // cpu_end / red
                Color::Rgb(0x61, 0xAF, 0xEF), // cpu_box / blue
                Color::Rgb(0xC6, 0x78, 0xDD), // net_box / magenta
                Color::Rgb(0x56, 0xB6, 0xC2), // hi_fg / cyan
            ],
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            empty: Color::Rgb(0x31, 0x35, 0x3F),
            hole: Color::Rgb(0x21, 0x25, 0x2B),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70),
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Default theme for a palette when no file is loaded.
    pub fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.cells = [
                    Color::Rgb(0xFF, 0xD0, 0x00), // honey
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                    Color::Rgb(0x00, 0xFF, 0xFF),
                ];
            }
            Palette::Colorblind => {
                // Okabe-Ito style: no red/green pair among the piece colours
                self.cells = [
                    Color::Rgb(0xEE, 0x77, 0x33),
                    Color::Rgb(0x00, 0x77, 0xBB),
                    Color::Rgb(0xBB, 0xBB, 0x00),
                    Color::Rgb(0x00, 0x99, 0x88),
                    Color::Rgb(0xEE, 0x33, 0x77),
                    Color::Rgb(0xCC, 0x33, 0x11),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let base = Self::onedark_default();
        // Keys match onedark.theme; anything missing keeps the One Dark value.
        Self {
            cells: [
                get("title").or_else(|| get("cpu_mid")).unwrap_or(base.cells[0]),
                get("mem_box").or_else(|| get("cpu_start")).unwrap_or(base.cells[1]),
                get("cpu_end").or_else(|| get("temp_end")).unwrap_or(base.cells[2]),
                get("cpu_box").unwrap_or(base.cells[3]),
                get("net_box").unwrap_or(base.cells[4]),
                get("hi_fg").or_else(|| get("proc_misc")).unwrap_or(base.cells[5]),
            ],
            bg: get("main_bg").unwrap_or(base.bg),
            empty: get("meter_bg").unwrap_or(base.empty),
            hole: get("selected_bg").unwrap_or(base.hole),
            div_line: get("div_line").unwrap_or(base.div_line),
            main_fg: get("main_fg").unwrap_or(base.main_fg),
            title: get("title").unwrap_or(base.title),
            inactive_fg: get("inactive_fg").unwrap_or(base.inactive_fg),
        }
    }

    /// Block colour for a colour index.
    #[inline]
    pub fn cell_color(&self, index: u8) -> Color {
        self.cells[(index as usize) % self.cells.len()]
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let bad = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(bad)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(bad()),
    };
    Ok(Color::Rgb(r, g, b))
}

/// Scale an RGB colour toward black (`factor < 1`) or white (`factor > 1`).
pub fn shade(color: Color, factor: f32) -> Color {
    let (r, g, b) = match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Red => (255, 0, 0),
        Color::Green => (0, 255, 0),
        Color::Yellow => (255, 255, 0),
        Color::Blue => (0, 0, 255),
        Color::White => (255, 255, 255),
        _ => (128, 128, 128),
    };
    let f = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
    Color::Rgb(f(r), f(g), f(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GG0000").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[meter_bg]="#31353F""##);
        assert_eq!(map.get("meter_bg"), Some(&"#31353F".to_string()));
    }

    #[test]
    fn test_missing_keys_fall_back() {
        let map = parse_theme_file(r##"theme[cpu_box]="#000000""##);
        let t = Theme::from_map(&map);
        assert_eq!(t.cells[3], Color::Rgb(0, 0, 0));
        assert_eq!(t.empty, Theme::onedark_default().empty);
    }

    #[test]
    fn test_palette_changes_cells_only() {
        let t = Theme::default_for_palette(Palette::Colorblind);
        assert_ne!(t.cells, Theme::onedark_default().cells);
        assert_eq!(t.bg, Theme::onedark_default().bg);
    }

    #[test]
    fn test_shade_darkens() {
        assert_eq!(shade(Color::Rgb(200, 100, 0), 0.5), Color::Rgb(100, 50, 0));
    }
}
