use std::collections::HashMap;

use crate::ir::BoxStyle;

/// Colour of the bottom row when a box has no explicit background.
pub const ACCENT_YELLOW: &str = "#FFCE33";
/// Tint the upper rows fade towards.
pub const GRADIENT_LIGHT: &str = "#FFFEF0";
/// Share of the accent-to-tint range the row gradient may use.
const GRADIENT_RANGE: f64 = 0.5;

pub const RED: &str = "#FF0000";
pub const GRAY: &str = "#D3D3D3";
pub const PURPLE: &str = "#ecbae6";
pub const LIGHT_PURPLE: &str = "#f5dbf2";
pub const NONE: &str = "none";

const BOLD_BORDER_WIDTH: u32 = 3;
const DOUBLE_FONT_SIZE: u32 = 48;

/// Resolves a dash-joined style list such as `rb-g-rt`.
///
/// Unknown codes fall through to `custom_colors`: `name` sets the background
/// and `namet` sets the text colour. Codes matching neither are ignored.
pub fn parse_box_styles(styles: &str, custom_colors: &HashMap<String, String>) -> BoxStyle {
    let mut style = BoxStyle::default();
    let styles = styles.trim();
    if styles.is_empty() {
        return style;
    }
    for code in styles.split('-').map(str::trim) {
        if !apply_builtin(code, &mut style) {
            apply_custom(code, custom_colors, &mut style);
        }
    }
    style
}

fn apply_builtin(code: &str, style: &mut BoxStyle) -> bool {
    match code {
        "rb" => {
            style.border_color = Some(RED.to_string());
            style.border_width = Some(BOLD_BORDER_WIDTH);
        }
        "g" => style.background = Some(GRAY.to_string()),
        "p" => style.background = Some(PURPLE.to_string()),
        "lp" => style.background = Some(LIGHT_PURPLE.to_string()),
        "nbb" => {
            style.background = Some(NONE.to_string());
            style.border_color = Some(NONE.to_string());
            style.border_width = None;
        }
        "rt" => style.text_color = Some(RED.to_string()),
        "2t" => style.font_size = Some(DOUBLE_FONT_SIZE),
        _ => return false,
    }
    true
}

fn apply_custom(code: &str, custom_colors: &HashMap<String, String>, style: &mut BoxStyle) {
    if let Some(hex) = custom_colors.get(code) {
        style.background = Some(hex.clone());
    } else if let Some(name) = code.strip_suffix('t') {
        if let Some(hex) = custom_colors.get(name) {
            style.text_color = Some(hex.clone());
        }
    }
}

/// Parses `#RRGGBB` (the `#` is optional). Anything else reads as black.
pub fn parse_hex_color(hex: &str) -> (u8, u8, u8) {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return (0, 0, 0);
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => (r, g, b),
        _ => (0, 0, 0),
    }
}

pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{r:02X}{g:02X}{b:02X}")
}

/// Linear blend; `factor` 0.0 yields `from`, 1.0 yields `to`.
pub fn interpolate_color(from: &str, to: &str, factor: f64) -> String {
    let (r1, g1, b1) = parse_hex_color(from);
    let (r2, g2, b2) = parse_hex_color(to);
    let mix = |a: u8, b: u8| {
        let value = a as f64 + (b as f64 - a as f64) * factor;
        value.clamp(0.0, 255.0) as u8
    };
    rgb_to_hex(mix(r1, r2), mix(g1, g2), mix(b1, b2))
}

/// Row gradient: the bottom row (`max_grid_y`) gets `base`, rows above fade
/// towards [`GRADIENT_LIGHT`] using half of the available range.
pub fn gradient_color(grid_y: i32, max_grid_y: i32, base: &str) -> String {
    if max_grid_y <= 1 {
        return base.to_string();
    }
    let factor = (max_grid_y - grid_y) as f64 / (max_grid_y - 1) as f64 * GRADIENT_RANGE;
    interpolate_color(base, GRADIENT_LIGHT, factor)
}
