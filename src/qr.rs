//! QR code rasterization.
//!
//! Encodes a payload URL and renders the module matrix into a square RGBA
//! image. The highest error-correction level is always used so printed
//! posters survive scanner noise and partial occlusion.
//!
//! Unlike the background and emblem assets, QR generation is mandatory:
//! any failure here aborts the whole render.

use image::{Rgba, RgbaImage};
use qrcode::{EcLevel, QrCode};

use crate::error::AficheError;

/// Rendering options for the QR raster.
#[derive(Debug, Clone, Copy)]
pub struct QrOptions {
    /// Requested edge length in pixels. The rendered image snaps to a whole
    /// number of pixels per module, so the result may be slightly smaller.
    pub size: u32,
    /// Quiet zone width in modules on each side.
    pub margin: u32,
    pub dark: Rgba<u8>,
    pub light: Rgba<u8>,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            size: 600,
            // Standard quiet zone: four modules on each side.
            margin: 4,
            dark: Rgba([0, 0, 0, 255]),
            light: Rgba([255, 255, 255, 255]),
        }
    }
}

/// Encode `payload` and render it as a square RGBA image.
///
/// Always uses [`EcLevel::H`]. Fails with [`AficheError::QrEncoding`] when
/// the payload cannot be encoded (e.g. too long for the symbol capacity).
pub fn encode_payload(payload: &str, opts: QrOptions) -> Result<RgbaImage, AficheError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
        .map_err(|e| AficheError::QrEncoding(format!("cannot encode payload: {e}")))?;

    let modules = code.width() as u32;
    let total = modules + 2 * opts.margin;
    let cell = (opts.size / total).max(1);
    let rendered = total * cell;

    let mut img = RgbaImage::from_pixel(rendered, rendered, opts.light);

    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx as usize, qy as usize)] != qrcode::Color::Dark {
                continue;
            }
            let x0 = (opts.margin + qx) * cell;
            let y0 = (opts.margin + qy) * cell;
            for py in y0..y0 + cell {
                for px in x0..x0 + cell {
                    img.put_pixel(px, py, opts.dark);
                }
            }
        }
    }

    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_square_image_near_requested_size() {
        let img = encode_payload("https://example.com/e/123", QrOptions::default()).unwrap();
        assert_eq!(img.width(), img.height());
        assert!(img.width() <= 600);
        assert!(img.width() >= 300);
    }

    #[test]
    fn quiet_zone_is_four_modules_by_default() {
        let opts = QrOptions::default();
        assert_eq!(opts.margin, 4);

        let img = encode_payload("https://example.com", opts).unwrap();
        let code = QrCode::with_error_correction_level(b"https://example.com", EcLevel::H).unwrap();
        let cell = opts.size / (code.width() as u32 + 2 * opts.margin);
        // The full four-module band along the top edge is light.
        for y in 0..4 * cell {
            for x in 0..img.width() {
                assert_eq!(*img.get_pixel(x, y), opts.light);
            }
        }
        assert_eq!(*img.get_pixel(img.width() - 1, img.height() - 1), opts.light);
    }

    #[test]
    fn contains_dark_modules() {
        let img = encode_payload("https://example.com", QrOptions::default()).unwrap();
        assert!(img.pixels().any(|p| p.0[0] == 0));
    }

    #[test]
    fn oversized_payload_is_a_hard_error() {
        let payload = "a".repeat(3000);
        let err = encode_payload(&payload, QrOptions::default()).unwrap_err();
        assert!(matches!(err, AficheError::QrEncoding(_)));
    }
}
