use std::collections::BTreeMap;
use std::str::FromStr;

use eframe::egui::Color32;
use palette::Srgb;

use crate::data::model::FieldValue;

// ---------------------------------------------------------------------------
// Palettes
// ---------------------------------------------------------------------------

/// Qualitative "Bold" palette used for per-category colouring.
pub const BOLD: &[&str] = &[
    "#7F3C8D", "#11A579", "#3969AC", "#F2B701", "#E73F74", "#80BA5A", "#E68310", "#008695",
    "#CF1C90", "#F97B72", "#A5AA99",
];

pub const HEADER_BLUE: &str = "#00b4d8";
pub const SIDEBAR_BLUE: &str = "#e3f2fd";
pub const PAGE_BACKGROUND: &str = "#f4f9f9";

/// Parse a `#rrggbb` / `#rgb` hex code. Unparsable codes render grey.
pub fn hex_color(hex: &str) -> Color32 {
    match Srgb::<u8>::from_str(hex) {
        Ok(rgb) => Color32::from_rgb(rgb.red, rgb.green, rgb.blue),
        Err(e) => {
            log::warn!("Invalid colour {hex:?}: {e}");
            Color32::GRAY
        }
    }
}

/// Parse every entry of a palette.
pub fn palette_colors(hexes: &[&str]) -> Vec<Color32> {
    hexes.iter().map(|h| hex_color(h)).collect()
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps category values to palette colours, in the order the categories are
/// given, cycling through the palette when it runs out.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<FieldValue, Color32>,
    default_color: Color32,
}

impl ColorMap {
    pub fn new<'a>(categories: impl IntoIterator<Item = &'a FieldValue>, palette: &[Color32]) -> Self {
        let mut mapping = BTreeMap::new();
        if !palette.is_empty() {
            for value in categories {
                let next = palette[mapping.len() % palette.len()];
                mapping.entry(value.clone()).or_insert(next);
            }
        }
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given category.
    pub fn color_for(&self, value: &FieldValue) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_codes() {
        assert_eq!(hex_color("#ff6b6b"), Color32::from_rgb(0xff, 0x6b, 0x6b));
        assert_eq!(hex_color("not a colour"), Color32::GRAY);
    }

    #[test]
    fn color_map_cycles_palette() {
        let palette = palette_colors(&["#000000", "#ffffff"]);
        let values: Vec<FieldValue> = ["a", "b", "c", "a"]
            .iter()
            .map(|s| FieldValue::Text(s.to_string()))
            .collect();
        let map = ColorMap::new(&values, &palette);
        assert_eq!(map.color_for(&values[0]), Color32::BLACK);
        assert_eq!(map.color_for(&values[1]), Color32::WHITE);
        assert_eq!(map.color_for(&values[2]), Color32::BLACK);
        assert_eq!(map.color_for(&FieldValue::Null), Color32::GRAY);
    }
}
