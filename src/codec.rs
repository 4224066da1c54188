//! Image decoding, square normalization, edit masks and encoding.
//!
//! Everything here is pure: bytes in, bytes out, no I/O.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::error::CodecError;

/// A decoded upload after square normalization.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Normalized square as PNG bytes.
    pub png: Arc<[u8]>,
    /// The same square as pixels, for local compositing.
    pub pixels: Arc<RgbaImage>,
}

/// Rectangle, in pixels, that an editing provider may repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditableRegion {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

impl EditableRegion {
    /// Full-height strip covering the right `fraction` of the canvas.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn right_fraction(canvas_width: u32, canvas_height: u32, fraction: f32) -> Self {
        let width = ((canvas_width as f32) * fraction.clamp(0.0, 1.0)).round() as u32;
        let width = width.min(canvas_width);
        Self { x: canvas_width - width, y: 0, width, height: canvas_height }
    }

    /// Whether pixel `(px, py)` lies inside the region.
    #[must_use]
    pub fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Color convention a provider uses to mark editable pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskEncoding {
    /// Editable pixels are transparent black, preserved pixels opaque white.
    /// Used by edit APIs that read the alpha channel.
    #[default]
    BlackEditable,
    /// Editable pixels are opaque white, preserved pixels opaque black.
    WhiteEditable,
}

impl MaskEncoding {
    /// Marker color for editable pixels.
    #[must_use]
    pub fn editable(self) -> Rgba<u8> {
        match self {
            Self::BlackEditable => Rgba([0, 0, 0, 0]),
            Self::WhiteEditable => Rgba([255, 255, 255, 255]),
        }
    }

    /// Marker color for preserved pixels.
    #[must_use]
    pub fn preserved(self) -> Rgba<u8> {
        match self {
            Self::BlackEditable => Rgba([255, 255, 255, 255]),
            Self::WhiteEditable => Rgba([0, 0, 0, 255]),
        }
    }
}

/// Decode arbitrary image bytes.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] if the format is unknown or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, CodecError> {
    image::load_from_memory(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Center-crop to a square on the shorter side and resize to `edge`.
///
/// Images that are already `edge`×`edge` pass through untouched.
#[must_use]
pub fn square(img: &DynamicImage, edge: u32) -> RgbaImage {
    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    if w == edge && h == edge {
        return rgba;
    }
    let side = w.min(h);
    let cropped = imageops::crop_imm(&rgba, (w - side) / 2, (h - side) / 2, side, side).to_image();
    if side == edge {
        return cropped;
    }
    imageops::resize(&cropped, edge, edge, FilterType::Lanczos3)
}

/// Encode pixels as PNG.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the encoder fails.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, CodecError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

/// Decode, square and re-encode an upload as PNG, keeping the pixels.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed input.
pub fn prepare(bytes: &[u8], edge: u32) -> Result<PreparedImage, CodecError> {
    let decoded = decode(bytes)?;
    let pixels = square(&decoded, edge);
    let png = encode_png(&pixels)?;
    Ok(PreparedImage { png: Arc::from(png), pixels: Arc::new(pixels) })
}

/// Pixels of an edit mask. See [`build_edit_mask`].
#[must_use]
pub fn edit_mask(
    width: u32,
    height: u32,
    region: EditableRegion,
    encoding: MaskEncoding,
) -> RgbaImage {
    let editable = encoding.editable();
    let preserved = encoding.preserved();
    RgbaImage::from_fn(width, height, |x, y| {
        if region.contains(x, y) {
            editable
        } else {
            preserved
        }
    })
}

/// Full-canvas PNG mask with `region` marked editable per `encoding`.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if the encoder fails.
pub fn build_edit_mask(
    width: u32,
    height: u32,
    region: EditableRegion,
    encoding: MaskEncoding,
) -> Result<Vec<u8>, CodecError> {
    encode_png(&edit_mask(width, height, region, encoding))
}

/// Build a `data:` URL from a MIME type and bytes.
#[must_use]
pub fn data_url(mime_type: &str, data: &[u8]) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(data);
    format!("data:{mime_type};base64,{encoded}")
}

/// Sniff the MIME type of encoded image bytes, defaulting to PNG.
#[must_use]
pub fn sniff_mime(data: &[u8]) -> &'static str {
    match image::guess_format(data) {
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        Ok(ImageFormat::WebP) => "image/webp",
        _ => "image/png",
    }
}
