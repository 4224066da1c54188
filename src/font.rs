//! Caption rendering on the local composite, using the `font8x8` bitmap font.
//!
//! Glyphs come from the basic (ASCII) and Latin-1 tables, so accented names
//! render too. Characters missing from both render as a blank cell.

use font8x8::{UnicodeFonts, BASIC_FONTS, LATIN_FONTS};
use image::{Rgba, RgbaImage};

/// Glyph cell width in font pixels.
pub const GLYPH_WIDTH: u32 = 8;
/// Glyph cell height in font pixels.
pub const GLYPH_HEIGHT: u32 = 8;

/// Rows of a glyph, top to bottom. Bit 0 is the leftmost column.
fn glyph(ch: char) -> [u8; 8] {
    BASIC_FONTS.get(ch).or_else(|| LATIN_FONTS.get(ch)).unwrap_or([0; 8])
}

/// Rendered width of `text` at `scale` (pixels per font pixel).
#[must_use]
pub fn text_width(text: &str, scale: u32) -> u32 {
    let count = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    count.saturating_mul(GLYPH_WIDTH).saturating_mul(scale)
}

/// Largest scale in `1..=max_scale` at which `text` fits in `max_width`.
#[must_use]
pub fn fit_scale(text: &str, max_width: u32, max_scale: u32) -> u32 {
    (1..=max_scale.max(1)).rev().find(|&s| text_width(text, s) <= max_width).unwrap_or(1)
}

/// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the canvas are clipped.
pub fn draw_text(img: &mut RgbaImage, text: &str, x: u32, y: u32, scale: u32, color: Rgba<u8>) {
    let (w, h) = img.dimensions();
    let mut pen_x = x;
    for ch in text.chars() {
        for (row, bits) in (0u32..).zip(glyph(ch)) {
            for col in (0..GLYPH_WIDTH).filter(|&col| bits & (1 << col) != 0) {
                let top = y + row * scale;
                let left = pen_x + col * scale;
                for py in (top..top + scale).filter(|&py| py < h) {
                    for px in (left..left + scale).filter(|&px| px < w) {
                        img.put_pixel(px, py, color);
                    }
                }
            }
        }
        pen_x = pen_x.saturating_add(GLYPH_WIDTH * scale);
    }
}
