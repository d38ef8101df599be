//! Raster drawing primitives for the compositor.
//!
//! All routines paint straight onto an owned `RgbaImage` with src-over
//! alpha blending and pixel clipping at the canvas edges. They are strictly
//! write-only towards the layer below: nothing here reads pixels back to
//! make decisions, which keeps the painter's algorithm honest.

use image::{Rgba, RgbaImage, imageops::fast_blur};

use crate::text::TextRaster;

/// Circular clip region, used while painting the emblem.
#[derive(Debug, Clone, Copy)]
pub struct ClipCircle {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
}

impl ClipCircle {
    #[inline]
    fn contains(&self, x: u32, y: u32) -> bool {
        let dx = x as f32 + 0.5 - self.cx;
        let dy = y as f32 + 0.5 - self.cy;
        dx * dx + dy * dy <= self.radius * self.radius
    }
}

#[inline]
fn blend_px(dst: &mut Rgba<u8>, src: Rgba<u8>, alpha: f32) {
    let a = (src.0[3] as f32 / 255.0) * alpha;
    if a <= 0.0 {
        return;
    }
    let inv = 1.0 - a;
    dst.0[0] = (src.0[0] as f32 * a + dst.0[0] as f32 * inv).round() as u8;
    dst.0[1] = (src.0[1] as f32 * a + dst.0[1] as f32 * inv).round() as u8;
    dst.0[2] = (src.0[2] as f32 * a + dst.0[2] as f32 * inv).round() as u8;
    dst.0[3] = 255;
}

#[inline]
fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round() as u8
}

fn lerp_color(a: Rgba<u8>, b: Rgba<u8>, t: f32) -> Rgba<u8> {
    Rgba([
        lerp_channel(a.0[0], b.0[0], t),
        lerp_channel(a.0[1], b.0[1], t),
        lerp_channel(a.0[2], b.0[2], t),
        255,
    ])
}

/// Alpha-blend `over` onto `base` at (`x`, `y`) with a global opacity.
///
/// Coordinates may be negative; out-of-canvas pixels are clipped.
pub fn overlay_alpha(base: &mut RgbaImage, over: &RgbaImage, x: i64, y: i64, opacity: f32) {
    overlay_alpha_clipped(base, over, x, y, opacity, None);
}

/// Same as [`overlay_alpha`], restricted to a circular clip region.
pub fn overlay_alpha_clipped(
    base: &mut RgbaImage,
    over: &RgbaImage,
    x: i64,
    y: i64,
    opacity: f32,
    clip: Option<ClipCircle>,
) {
    for oy in 0..over.height() {
        let by = y + oy as i64;
        if by < 0 || by >= base.height() as i64 {
            continue;
        }
        for ox in 0..over.width() {
            let bx = x + ox as i64;
            if bx < 0 || bx >= base.width() as i64 {
                continue;
            }
            let (bx, by) = (bx as u32, by as u32);
            if let Some(circle) = clip
                && !circle.contains(bx, by)
            {
                continue;
            }
            blend_px(base.get_pixel_mut(bx, by), *over.get_pixel(ox, oy), opacity);
        }
    }
}

/// Vertical three-stop linear gradient: `top` at y=0, `mid` halfway,
/// `bottom` at the last row.
pub fn fill_vertical_gradient(img: &mut RgbaImage, top: Rgba<u8>, mid: Rgba<u8>, bottom: Rgba<u8>) {
    let h = img.height();
    let w = img.width();
    for y in 0..h {
        let t = if h > 1 { y as f32 / (h - 1) as f32 } else { 0.0 };
        let color = if t < 0.5 {
            lerp_color(top, mid, t * 2.0)
        } else {
            lerp_color(mid, bottom, (t - 0.5) * 2.0)
        };
        for x in 0..w {
            img.put_pixel(x, y, color);
        }
    }
}

/// Multiply every RGB channel by `factor` (brightness scaling).
pub fn scale_brightness(img: &mut RgbaImage, factor: f32) {
    for px in img.pixels_mut() {
        px.0[0] = (px.0[0] as f32 * factor).round().min(255.0) as u8;
        px.0[1] = (px.0[1] as f32 * factor).round().min(255.0) as u8;
        px.0[2] = (px.0[2] as f32 * factor).round().min(255.0) as u8;
    }
}

/// Blend a uniform color at `alpha` over the whole canvas.
pub fn flat_overlay(img: &mut RgbaImage, color: Rgba<u8>, alpha: f32) {
    for px in img.pixels_mut() {
        blend_px(px, color, alpha);
    }
}

/// Fill an axis-aligned rounded rectangle.
pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: u32,
    color: Rgba<u8>,
) {
    let r = radius.min(w / 2).min(h / 2) as i64;
    let (wi, hi) = (w as i64, h as i64);
    for yy in 0..hi {
        let by = y + yy;
        if by < 0 || by >= img.height() as i64 {
            continue;
        }
        for xx in 0..wi {
            let bx = x + xx;
            if bx < 0 || bx >= img.width() as i64 {
                continue;
            }
            if r > 0 && outside_rounded_corner(xx, yy, wi, hi, r) {
                continue;
            }
            blend_px(img.get_pixel_mut(bx as u32, by as u32), color, 1.0);
        }
    }
}

/// Paint a blurred dark silhouette of a rounded rectangle (drop shadow).
///
/// `dy` offsets the shadow downward; pass 0 for an even glow.
pub fn rounded_rect_shadow(
    img: &mut RgbaImage,
    x: i64,
    y: i64,
    w: u32,
    h: u32,
    radius: u32,
    sigma: f32,
    alpha: f32,
    dy: i64,
) {
    let pad = (sigma * 3.0).ceil() as u32;
    let mut silhouette = RgbaImage::new(w + 2 * pad, h + 2 * pad);
    let a = (alpha * 255.0).round() as u8;
    let r = radius.min(w / 2).min(h / 2) as i64;
    let (wi, hi) = (w as i64, h as i64);
    // Stamp alpha directly; blending here would bake in a full-opacity shadow.
    for yy in 0..hi {
        for xx in 0..wi {
            if r > 0 && outside_rounded_corner(xx, yy, wi, hi, r) {
                continue;
            }
            silhouette.put_pixel(xx as u32 + pad, yy as u32 + pad, Rgba([0, 0, 0, a]));
        }
    }
    let blurred = fast_blur(&silhouette, sigma);
    overlay_alpha(img, &blurred, x - pad as i64, y - pad as i64 + dy, 1.0);
}

#[inline]
fn outside_rounded_corner(xx: i64, yy: i64, w: i64, h: i64, r: i64) -> bool {
    let cx = if xx < r {
        r - 1
    } else if xx >= w - r {
        w - r
    } else {
        return false;
    };
    let cy = if yy < r {
        r - 1
    } else if yy >= h - r {
        h - r
    } else {
        return false;
    };
    let dx = xx - cx;
    let dy = yy - cy;
    dx * dx + dy * dy > r * r
}

/// Radial "glass" fill inside a circle: `center_alpha` white in the middle
/// fading to `edge_alpha` at the rim, with a soft anti-aliased edge.
pub fn radial_glass(img: &mut RgbaImage, circle: ClipCircle, center_alpha: f32, edge_alpha: f32) {
    let r = circle.radius;
    let x0 = ((circle.cx - r).floor().max(0.0)) as u32;
    let y0 = ((circle.cy - r).floor().max(0.0)) as u32;
    let x1 = ((circle.cx + r).ceil() as u32).min(img.width());
    let y1 = ((circle.cy + r).ceil() as u32).min(img.height());
    let white = Rgba([255, 255, 255, 255]);

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - circle.cx;
            let dy = y as f32 + 0.5 - circle.cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > r {
                continue;
            }
            let t = (dist / r).clamp(0.0, 1.0);
            let mut a = center_alpha + (edge_alpha - center_alpha) * t;
            // Fade over the outermost pixel so the rim isn't jagged.
            if dist > r - 1.0 {
                a *= r - dist;
            }
            blend_px(img.get_pixel_mut(x, y), white, a);
        }
    }
}

/// Stroke a circle as an annular band of the given thickness.
pub fn circle_ring(img: &mut RgbaImage, circle: ClipCircle, thickness: f32, color: Rgba<u8>, alpha: f32) {
    let outer = circle.radius;
    let inner = (outer - thickness).max(0.0);
    let x0 = ((circle.cx - outer).floor().max(0.0)) as u32;
    let y0 = ((circle.cy - outer).floor().max(0.0)) as u32;
    let x1 = ((circle.cx + outer).ceil() as u32).min(img.width());
    let y1 = ((circle.cy + outer).ceil() as u32).min(img.height());

    for y in y0..y1 {
        for x in x0..x1 {
            let dx = x as f32 + 0.5 - circle.cx;
            let dy = y as f32 + 0.5 - circle.cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > outer || dist < inner - 1.0 {
                continue;
            }
            // Anti-alias both band edges over one pixel.
            let mut a = alpha;
            if dist > outer - 1.0 {
                a *= outer - dist;
            }
            if dist < inner {
                a *= 1.0 - (inner - dist);
            }
            if a > 0.0 {
                blend_px(img.get_pixel_mut(x, y), color, a);
            }
        }
    }
}

/// Blurred dark silhouette of a circular ring, offset downward (ring shadow).
pub fn circle_ring_shadow(img: &mut RgbaImage, circle: ClipCircle, thickness: f32, sigma: f32, alpha: f32, dy: i64) {
    let pad = (sigma * 3.0).ceil();
    let size = ((circle.radius * 2.0 + pad * 2.0).ceil()) as u32;
    let mut silhouette = RgbaImage::new(size, size);
    let outer = circle.radius;
    let inner = (outer - thickness).max(0.0);
    let center = circle.radius + pad;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - center;
            let dy2 = y as f32 + 0.5 - center;
            let dist = (dx * dx + dy2 * dy2).sqrt();
            if dist <= outer && dist >= inner {
                silhouette.put_pixel(x, y, Rgba([0, 0, 0, (alpha * 255.0).round() as u8]));
            }
        }
    }
    let blurred = fast_blur(&silhouette, sigma);
    overlay_alpha(
        img,
        &blurred,
        (circle.cx - circle.radius - pad) as i64,
        (circle.cy - circle.radius - pad) as i64 + dy,
        1.0,
    );
}

/// Draw a text coverage raster in a solid color.
pub fn draw_text(img: &mut RgbaImage, raster: &TextRaster, x: i64, y: i64, color: Rgba<u8>, opacity: f32) {
    for ty in 0..raster.height {
        let by = y + ty as i64;
        if by < 0 || by >= img.height() as i64 {
            continue;
        }
        for tx in 0..raster.width {
            let bx = x + tx as i64;
            if bx < 0 || bx >= img.width() as i64 {
                continue;
            }
            let cov = raster.coverage_at(tx, ty);
            if cov > 0.0 {
                blend_px(img.get_pixel_mut(bx as u32, by as u32), color, cov * opacity);
            }
        }
    }
}

/// Draw a blurred dark silhouette of a text raster, then the text itself.
pub fn draw_text_with_shadow(
    img: &mut RgbaImage,
    raster: &TextRaster,
    x: i64,
    y: i64,
    color: Rgba<u8>,
    shadow_sigma: f32,
    shadow_alpha: f32,
    shadow_dy: i64,
) {
    let pad = (shadow_sigma * 3.0).ceil() as u32;
    let mut silhouette = RgbaImage::new(raster.width + 2 * pad, raster.height + 2 * pad);
    for ty in 0..raster.height {
        for tx in 0..raster.width {
            let cov = raster.coverage_at(tx, ty);
            if cov > 0.0 {
                let a = (cov * shadow_alpha * 255.0).round() as u8;
                silhouette.put_pixel(tx + pad, ty + pad, Rgba([0, 0, 0, a]));
            }
        }
    }
    let blurred = fast_blur(&silhouette, shadow_sigma);
    overlay_alpha(img, &blurred, x - pad as i64, y - pad as i64 + shadow_dy, 1.0);
    draw_text(img, raster, x, y, color, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradient_endpoints_are_exact() {
        let mut img = RgbaImage::new(4, 101);
        let top = Rgba([10, 20, 30, 255]);
        let mid = Rgba([100, 110, 120, 255]);
        let bottom = Rgba([200, 210, 220, 255]);
        fill_vertical_gradient(&mut img, top, mid, bottom);
        assert_eq!(*img.get_pixel(0, 0), top);
        assert_eq!(*img.get_pixel(0, 50), mid);
        assert_eq!(*img.get_pixel(0, 100), bottom);
    }

    #[test]
    fn overlay_clips_negative_coordinates() {
        let mut base = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let over = RgbaImage::from_pixel(6, 6, Rgba([255, 255, 255, 255]));
        overlay_alpha(&mut base, &over, -3, -3, 1.0);
        assert_eq!(*base.get_pixel(0, 0), Rgba([255, 255, 255, 255]));
        assert_eq!(*base.get_pixel(3, 3), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn circular_clip_rejects_outside_pixels() {
        let mut base = RgbaImage::from_pixel(20, 20, Rgba([0, 0, 0, 255]));
        let over = RgbaImage::from_pixel(20, 20, Rgba([255, 255, 255, 255]));
        let clip = ClipCircle { cx: 10.0, cy: 10.0, radius: 5.0 };
        overlay_alpha_clipped(&mut base, &over, 0, 0, 1.0, Some(clip));
        assert_eq!(*base.get_pixel(10, 10), Rgba([255, 255, 255, 255]));
        assert_eq!(*base.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*base.get_pixel(19, 10), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn rounded_rect_skips_corners() {
        let mut img = RgbaImage::from_pixel(40, 40, Rgba([0, 0, 0, 255]));
        fill_rounded_rect(&mut img, 0, 0, 40, 40, 12, Rgba([255, 255, 255, 255]));
        // Corner stays background, center is filled.
        assert_eq!(*img.get_pixel(0, 0), Rgba([0, 0, 0, 255]));
        assert_eq!(*img.get_pixel(20, 20), Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn brightness_scaling_darkens() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([200, 100, 50, 255]));
        scale_brightness(&mut img, 0.7);
        assert_eq!(*img.get_pixel(0, 0), Rgba([140, 70, 35, 255]));
    }
}
