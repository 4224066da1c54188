//! Deterministic local composite used when no provider produces an image.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use crate::codec::encode_png;
use crate::error::CodecError;
use crate::font::{self, GLYPH_HEIGHT};

/// Card width in pixels.
pub const CARD_WIDTH: u32 = 1200;
/// Card height in pixels.
pub const CARD_HEIGHT: u32 = 800;
/// Inset of the photo from the card edges.
pub const PHOTO_INSET: u32 = 48;
/// Share of the card width reserved for the photo.
const PHOTO_REGION_FRACTION: f32 = 0.55;

const BACKGROUND: Rgba<u8> = Rgba([18, 92, 58, 255]);
const FRAME: Rgba<u8> = Rgba([245, 245, 240, 255]);
const CAPTION: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SUBTITLE: Rgba<u8> = Rgba([214, 230, 196, 255]);

/// Vignette layer is built small, blurred, then scaled up.
const VIGNETTE_W: u32 = 120;
const VIGNETTE_H: u32 = 80;
const VIGNETTE_ALPHA: u8 = 170;
const VIGNETTE_SIGMA: f32 = 6.0;

const FRAME_WIDTH: u32 = 6;

/// Placement of the user photo on the card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoPlacement {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Scaled width.
    pub width: u32,
    /// Scaled height.
    pub height: u32,
}

/// Width of the region the photo must fit in.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn photo_region_width() -> u32 {
    (CARD_WIDTH as f32 * PHOTO_REGION_FRACTION) as u32
}

/// Fit a `width`×`height` photo inside the left region, preserving aspect ratio.
#[must_use]
pub fn place_photo(width: u32, height: u32) -> PhotoPlacement {
    let max_w = photo_region_width() - 2 * PHOTO_INSET;
    let max_h = CARD_HEIGHT - 2 * PHOTO_INSET;
    let (w, h) = (u64::from(width.max(1)), u64::from(height.max(1)));
    // Scale = min(max_w / w, max_h / h), computed in integers.
    let (scaled_w, scaled_h) = if u64::from(max_w) * h <= u64::from(max_h) * w {
        (u64::from(max_w), (u64::from(max_w) * h / w).max(1))
    } else {
        ((u64::from(max_h) * w / h).max(1), u64::from(max_h))
    };
    #[allow(clippy::cast_possible_truncation)]
    let (scaled_w, scaled_h) = (scaled_w as u32, scaled_h as u32);
    PhotoPlacement {
        x: PHOTO_INSET + (max_w - scaled_w) / 2,
        y: PHOTO_INSET + (max_h - scaled_h) / 2,
        width: scaled_w,
        height: scaled_h,
    }
}

/// Radial darkening layer, blurred and stretched to card size.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn vignette() -> RgbaImage {
    let (cx, cy) = (VIGNETTE_W as f32 / 2.0, VIGNETTE_H as f32 / 2.0);
    let small = RgbaImage::from_fn(VIGNETTE_W, VIGNETTE_H, |x, y| {
        let dx = (x as f32 - cx) / cx;
        let dy = (y as f32 - cy) / cy;
        let falloff = ((dx * dx + dy * dy) / 2.0).clamp(0.0, 1.0);
        let v = (255.0 * (1.0 - 0.75 * falloff)) as u8;
        Rgba([v, v, v, VIGNETTE_ALPHA])
    });
    let blurred = imageops::blur(&small, VIGNETTE_SIGMA);
    imageops::resize(&blurred, CARD_WIDTH, CARD_HEIGHT, FilterType::Triangle)
}

/// Multiply `overlay` onto `base`, weighted by the overlay's alpha.
fn multiply(base: &mut RgbaImage, overlay: &RgbaImage) {
    for (b, o) in base.pixels_mut().zip(overlay.pixels()) {
        let alpha = u32::from(o[3]);
        for c in 0..3 {
            let base_c = u32::from(b[c]);
            let product = base_c * u32::from(o[c]) / 255;
            #[allow(clippy::cast_possible_truncation)]
            {
                b[c] = ((product * alpha + base_c * (255 - alpha)) / 255) as u8;
            }
        }
    }
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    let (cw, ch) = img.dimensions();
    for py in y..(y + h).min(ch) {
        for px in x..(x + w).min(cw) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Render the composite card as pixels.
#[must_use]
pub fn render_fallback_card(user: &RgbaImage, caption: &str, subtitle: &str) -> RgbaImage {
    let mut card = RgbaImage::from_pixel(CARD_WIDTH, CARD_HEIGHT, BACKGROUND);
    multiply(&mut card, &vignette());

    let place = place_photo(user.width(), user.height());
    fill_rect(
        &mut card,
        place.x.saturating_sub(FRAME_WIDTH),
        place.y.saturating_sub(FRAME_WIDTH),
        place.width + 2 * FRAME_WIDTH,
        place.height + 2 * FRAME_WIDTH,
        FRAME,
    );
    let photo = imageops::resize(user, place.width, place.height, FilterType::Triangle);
    imageops::overlay(&mut card, &photo, i64::from(place.x), i64::from(place.y));

    let text_left = photo_region_width() + PHOTO_INSET / 2;
    let text_width = CARD_WIDTH - text_left - PHOTO_INSET;
    let caption_scale = font::fit_scale(caption, text_width, 7);
    let subtitle_scale = font::fit_scale(subtitle, text_width, 4);
    let caption_h = GLYPH_HEIGHT * caption_scale;
    let subtitle_h = GLYPH_HEIGHT * subtitle_scale;
    let gap = 3 * subtitle_scale;
    let top = (CARD_HEIGHT.saturating_sub(caption_h + gap + subtitle_h)) / 2;

    font::draw_text(&mut card, caption, text_left, top, caption_scale, CAPTION);
    let subtitle_top = top + caption_h + gap;
    font::draw_text(&mut card, subtitle, text_left, subtitle_top, subtitle_scale, SUBTITLE);
    card
}

/// Render and PNG-encode the composite card.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] only if the in-memory PNG encoder fails.
pub fn compose_fallback_card(
    user: &RgbaImage,
    caption: &str,
    subtitle: &str,
) -> Result<Vec<u8>, CodecError> {
    encode_png(&render_fallback_card(user, caption, subtitle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_photo() -> RgbaImage {
        RgbaImage::from_pixel(64, 64, Rgba([200, 40, 40, 255]))
    }

    #[test]
    fn square_photo_fits_left_region() {
        let place = place_photo(1024, 1024);
        assert_eq!(place.width, place.height);
        assert!(place.x >= PHOTO_INSET);
        assert!(place.x + place.width <= photo_region_width() - PHOTO_INSET);
        assert!(place.y + place.height <= CARD_HEIGHT - PHOTO_INSET);
    }

    #[test]
    fn wide_photo_is_width_bound() {
        let place = place_photo(2000, 500);
        assert_eq!(place.width, photo_region_width() - 2 * PHOTO_INSET);
        assert!(place.height < place.width);
    }

    #[test]
    fn card_contains_photo_pixels() {
        let card = render_fallback_card(&user_photo(), "You with Tiger Woods", "Fat Hacks 2025");
        assert_eq!(card.dimensions(), (CARD_WIDTH, CARD_HEIGHT));
        let place = place_photo(64, 64);
        let center = card.get_pixel(place.x + place.width / 2, place.y + place.height / 2);
        assert!(center[0].abs_diff(200) <= 1 && center[1].abs_diff(40) <= 1, "{center:?}");
    }

    #[test]
    fn vignette_darkens_corners() {
        let card = render_fallback_card(&user_photo(), "", "");
        let corner = card.get_pixel(CARD_WIDTH - 2, 1);
        assert!(corner[1] < BACKGROUND[1]);
    }

    #[test]
    fn rendering_is_deterministic() {
        let photo = user_photo();
        let render = || compose_fallback_card(&photo, "You with John Daly", "Fat Hacks 2025");
        let (a, b) = (render().unwrap(), render().unwrap());
        assert_eq!(a, b);
        assert_eq!(&a[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }

    #[test]
    fn caption_is_drawn_in_text_region() {
        let card = render_fallback_card(&user_photo(), "WWWW", "");
        let text_left = photo_region_width() + PHOTO_INSET / 2;
        let has_caption = card
            .enumerate_pixels()
            .any(|(x, _, p)| x >= text_left && *p == CAPTION);
        assert!(has_caption);
    }
}
