//! Canvas export.
//!
//! Serializes a finished canvas to JPEG at a fixed high-quality setting and
//! derives a download-safe filename from the event name. Nothing here
//! touches storage; the caller owns persistence.

use image::{ExtendedColorType, ImageEncoder, RgbaImage, codecs::jpeg::JpegEncoder};

use crate::compose::{Orientation, RenderResult};
use crate::error::AficheError;

/// JPEG quality (0-100) used for every export.
const JPEG_QUALITY: u8 = 95;

/// Token used when slugifying an empty event name.
const EMPTY_NAME_TOKEN: &str = "event";

/// Encode the canvas and build the suggested filename.
pub fn encode(canvas: &RgbaImage, event_name: &str, orientation: Orientation) -> Result<RenderResult, AficheError> {
    // JPEG carries no alpha; the canvas is fully opaque by construction.
    let rgb = image::DynamicImage::ImageRgba8(canvas.clone()).to_rgb8();

    let mut bytes = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY);
    encoder
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| AficheError::Export(format!("JPEG encoding failed: {e}")))?;

    Ok(RenderResult {
        image_bytes: bytes,
        suggested_filename: suggested_filename(event_name, orientation),
    })
}

/// `{slug}_{orientation}_qr_poster.jpg`
pub fn suggested_filename(event_name: &str, orientation: Orientation) -> String {
    format!("{}_{}_qr_poster.jpg", slugify(event_name), orientation)
}

/// Lowercase, keep `[a-z0-9]`, collapse everything else into single
/// underscores, trim the edges. Empty input slugs to a fixed token.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_sep = true;
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('_');
            last_was_sep = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    if slug.is_empty() {
        EMPTY_NAME_TOKEN.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slug_keeps_only_lowercase_alphanumerics_and_underscores() {
        let slug = slugify("Ana & Juan's Wedding!!");
        assert_eq!(slug, "ana_juan_s_wedding");
        assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    }

    #[test]
    fn empty_name_gets_fallback_token() {
        assert_eq!(slugify(""), "event");
        assert_eq!(slugify("!!!"), "event");
    }

    #[test]
    fn filename_includes_orientation_and_suffix() {
        assert_eq!(
            suggested_filename("Gala 2026", Orientation::Landscape),
            "gala_2026_landscape_qr_poster.jpg"
        );
    }

    #[test]
    fn encode_produces_jpeg_bytes() {
        let canvas = RgbaImage::from_pixel(32, 32, image::Rgba([10, 20, 30, 255]));
        let result = encode(&canvas, "Test", Orientation::Portrait).unwrap();
        // JPEG SOI marker.
        assert_eq!(&result.image_bytes[..2], &[0xFF, 0xD8]);
        assert_eq!(result.suggested_filename, "test_portrait_qr_poster.jpg");
    }
}
