//! Aspect-preserving fit rectangles.
//!
//! Pure placement math for putting a source image of arbitrary aspect ratio
//! into a destination rectangle, either covering it completely (`cover_fit`)
//! or staying fully inside it (`contain_fit`). No pixel data is touched here;
//! callers resize and draw using the returned rectangle.

/// Placement rectangle in destination coordinates.
///
/// `x`/`y` may be negative for `cover_fit` (the scaled image overflows the
/// destination and is centered). Recomputed per draw call; carries no state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Scale a source to fully cover the destination, preserving aspect ratio.
///
/// One axis matches the destination exactly; the other overflows and is
/// centered, so the destination is covered with no empty margins.
pub fn cover_fit(src_w: f32, src_h: f32, dst_w: f32, dst_h: f32) -> FitRect {
    let src_aspect = src_w / src_h;
    let dst_aspect = dst_w / dst_h;

    if src_aspect > dst_aspect {
        // Wider than the destination: match height, overflow horizontally.
        let height = dst_h;
        let width = dst_h * src_aspect;
        FitRect {
            x: -(width - dst_w) / 2.0,
            y: 0.0,
            width,
            height,
        }
    } else {
        // Taller (or equal): match width, overflow vertically.
        let width = dst_w;
        let height = dst_w / src_aspect;
        FitRect {
            x: 0.0,
            y: -(height - dst_h) / 2.0,
            width,
            height,
        }
    }
}

/// Fit a source inside a bounding box, preserving aspect ratio, centered.
///
/// Scales down only when the source exceeds the box in either dimension;
/// never upscales past the source's natural size.
pub fn contain_fit(src_w: f32, src_h: f32, box_w: f32, box_h: f32) -> FitRect {
    let scale = (box_w / src_w).min(box_h / src_h).min(1.0);
    let width = src_w * scale;
    let height = src_h * scale;
    FitRect {
        x: (box_w - width) / 2.0,
        y: (box_h - height) / 2.0,
        width,
        height,
    }
}
