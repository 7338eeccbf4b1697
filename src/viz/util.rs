//! Utility functions for visualization: colors and gutter sizing.

use plotters::prelude::*;

use super::text::estimate_text_width_px;

/// Fill color of skill bars (`#2563EB`, the palette blue).
pub const SKILL_BAR_COLOR: RGBColor = RGBColor(37, 99, 235);

/// Parse a `#RRGGBB` palette token. Anything unparsable falls back to a
/// neutral gray so an odd token never aborts a render.
pub fn parse_hex_color(token: &str) -> RGBColor {
    let hex = token.trim().trim_start_matches('#');
    if hex.len() == 6
        && hex.bytes().all(|b| b.is_ascii_hexdigit())
        && let Ok(r) = u8::from_str_radix(&hex[0..2], 16)
        && let Ok(g) = u8::from_str_radix(&hex[2..4], 16)
        && let Ok(b) = u8::from_str_radix(&hex[4..6], 16)
    {
        return RGBColor(r, g, b);
    }
    RGBColor(165, 165, 165)
}

/// Compute a tight left label area width (in pixels) for a set of category
/// labels at the given font size, clamped to a sensible range.
pub fn compute_left_label_area_px<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    font_px: u32,
) -> u32 {
    let mut max_px = 0u32;
    for label in labels {
        max_px = max_px.max(estimate_text_width_px(label, font_px));
    }
    // Padding for tick marks plus a little breathing room.
    max_px.saturating_add(18).clamp(48, 140)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_tokens() {
        assert_eq!(parse_hex_color("#2563EB"), RGBColor(37, 99, 235));
        assert_eq!(parse_hex_color("7C3AED"), RGBColor(124, 58, 237));
    }

    #[test]
    fn junk_tokens_fall_back_to_gray() {
        assert_eq!(parse_hex_color("plaid"), RGBColor(165, 165, 165));
        assert_eq!(parse_hex_color("#12"), RGBColor(165, 165, 165));
    }

    #[test]
    fn gutter_width_is_clamped() {
        assert_eq!(compute_left_label_area_px(["ab"], 12), 48);
        let long = "a very very long category label indeed";
        assert_eq!(compute_left_label_area_px([long], 14), 140);
    }
}
