//! Single-line text rasterization.
//!
//! Renders text to an anti-aliased f32 coverage buffer that the compositor
//! colors and blends onto the canvas. Uses ab_glyph with a system TTF face
//! when one can be found (override via `AFICHE_FONT` / `AFICHE_FONT_BOLD`);
//! otherwise falls back to the Spleen bitmap font scaled to the requested
//! pixel height, so text rendering always succeeds.
//!
//! There is deliberately no wrapping or shaping here: poster titles and
//! captions are single centered lines.

use ab_glyph::{Font, FontArc, ScaleFont};
use spleen_font::{FONT_12X24, PSF2Font};
use std::sync::OnceLock;

static REGULAR_FACE: OnceLock<Option<FontArc>> = OnceLock::new();
static BOLD_FACE: OnceLock<Option<FontArc>> = OnceLock::new();

const REGULAR_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
];

const BOLD_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
];

fn load_face(env_var: &str, candidates: &[&str]) -> Option<FontArc> {
    let from_env = std::env::var(env_var).ok();
    let paths = from_env.iter().map(String::as_str).chain(candidates.iter().copied());
    for path in paths {
        if let Ok(bytes) = std::fs::read(path)
            && let Ok(face) = FontArc::try_from_vec(bytes)
        {
            return Some(face);
        }
    }
    None
}

fn ttf_face(bold: bool) -> Option<&'static FontArc> {
    if bold {
        // A bold request degrades to the regular face before hitting the
        // bitmap fallback.
        BOLD_FACE
            .get_or_init(|| load_face("AFICHE_FONT_BOLD", BOLD_CANDIDATES))
            .as_ref()
            .or_else(|| ttf_face(false))
    } else {
        REGULAR_FACE
            .get_or_init(|| load_face("AFICHE_FONT", REGULAR_CANDIDATES))
            .as_ref()
    }
}

/// Rendered text as an anti-aliased grayscale coverage buffer.
///
/// Coverage values: 0.0 = transparent, 1.0 = fully covered.
pub struct TextRaster {
    pub width: u32,
    pub height: u32,
    pub coverage: Vec<f32>,
}

impl TextRaster {
    fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            coverage: vec![0.0; (width * height) as usize],
        }
    }

    #[inline]
    pub fn coverage_at(&self, x: u32, y: u32) -> f32 {
        self.coverage[(y * self.width + x) as usize]
    }
}

/// Rasterize one line of text at the given pixel height.
///
/// The result is clamped to `max_width`; callers center it themselves.
/// Empty text yields a 1px-wide blank raster (an empty line, not an error).
pub fn rasterize_line(text: &str, pixel_height: f32, bold: bool, max_width: u32) -> TextRaster {
    match ttf_face(bold) {
        Some(face) => rasterize_ttf(face, text, pixel_height, max_width),
        None => rasterize_bitmap(text, pixel_height, bold, max_width),
    }
}

fn rasterize_ttf(face: &FontArc, text: &str, pixel_height: f32, max_width: u32) -> TextRaster {
    let scaled = face.as_scaled(pixel_height);

    // Layout: advance-only, single line.
    let mut glyphs = Vec::new();
    let mut caret_x = 0.0f32;
    for ch in text.chars() {
        let glyph_id = face.glyph_id(ch);
        glyphs.push((glyph_id, caret_x));
        caret_x += scaled.h_advance(glyph_id);
    }

    let full_width = (caret_x.ceil() as u32).max(1);
    let width = full_width.min(max_width.max(1));
    // Overflow is trimmed equally from both ends so the line stays centered.
    let trim = ((full_width - width) / 2) as f32;
    let ascent = scaled.ascent();
    let height = ((ascent - scaled.descent()).ceil() as u32).max(1);
    let mut raster = TextRaster::blank(width, height);

    for &(glyph_id, glyph_x) in &glyphs {
        let glyph = glyph_id.with_scale_and_position(pixel_height, ab_glyph::point(glyph_x - trim, ascent));
        let Some(outlined) = face.outline_glyph(glyph) else {
            continue;
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|px, py, cov| {
            let x = px as i32 + bounds.min.x as i32;
            let y = py as i32 + bounds.min.y as i32;
            if x >= 0 && (x as u32) < width && y >= 0 && (y as u32) < height {
                let idx = (y as u32 * width + x as u32) as usize;
                raster.coverage[idx] = (raster.coverage[idx] + cov).min(1.0);
            }
        });
    }

    raster
}

/// Bitmap fallback: Spleen 12x24 scaled with nearest neighbor.
fn rasterize_bitmap(text: &str, pixel_height: f32, bold: bool, max_width: u32) -> TextRaster {
    const CELL_W: u32 = 12;
    const CELL_H: u32 = 24;

    let scale = ((pixel_height / CELL_H as f32).round() as u32).max(1);
    let char_w = CELL_W * scale;
    let char_h = CELL_H * scale;
    let chars: Vec<char> = text.chars().collect();
    let full_width = (chars.len() as u32 * char_w).max(1);
    let width = full_width.min(max_width.max(1));
    let trim = ((full_width - width) / 2) as i64;
    let mut raster = TextRaster::blank(width, char_h);

    let Ok(mut font) = PSF2Font::new(FONT_12X24) else {
        return raster;
    };

    for (i, ch) in chars.iter().enumerate() {
        let utf8 = ch.to_string();
        let Some(glyph) = font.glyph_for_utf8(utf8.as_bytes()) else {
            continue;
        };
        let base_x = i as u32 * char_w;
        for (gy, row) in glyph.enumerate() {
            for (gx, on) in row.enumerate() {
                if !on {
                    continue;
                }
                for sy in 0..scale {
                    for sx in 0..scale {
                        let px = (base_x + gx as u32 * scale + sx) as i64 - trim;
                        let py = gy as u32 * scale + sy;
                        if px >= 0 && (px as u32) < width && py < char_h {
                            raster.coverage[(py * width + px as u32) as usize] = 1.0;
                        }
                        // Double-strike for bold, like a dot-matrix pass.
                        if bold && px + 1 >= 0 && ((px + 1) as u32) < width && py < char_h {
                            raster.coverage[(py * width + (px + 1) as u32) as usize] = 1.0;
                        }
                    }
                }
            }
        }
    }

    raster
}
