//! Layer compositor, the poster rendering core.
//!
//! Drives the whole render: resolves the palette, encodes the QR code,
//! fetches optional assets, then paints the canvas in a fixed layer order:
//!
//! 1. background (image treatment, or gradient fallback)
//! 2. translucent readability overlay (image path only)
//! 3. code panel (white card + QR raster)
//! 4. title text
//! 5. caption text
//! 6. optional circular emblem
//! 7. branding caption
//!
//! The order is never changed: each layer assumes the previous one is
//! committed, and no layer reads pixels back from the canvas.

mod draw;

use std::fmt;

use image::imageops::{FilterType, fast_blur, resize};
use image::{DynamicImage, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assets::AssetLoader;
use crate::error::AficheError;
use crate::export;
use crate::geometry::{contain_fit, cover_fit};
use crate::qr::{self, QrOptions};
use crate::text;
use crate::theme::Palette;
use draw::ClipCircle;

/// Fixed caption drawn below the code panel.
const CAPTION_TEXT: &str = "Scan to find your table";

/// Fixed branding copy near the bottom edge.
const BRANDING_TEXT: &str = "Made with Afiche";

/// Brightness factor applied to the blurred background copy.
const BACKGROUND_DIM: f32 = 0.7;

/// Opacity of the sharp, contain-fitted background copy.
const SHARP_COPY_OPACITY: f32 = 0.85;

/// Fraction of the canvas used as the sharp copy's bounding box.
const SHARP_BOX_FRACTION: f32 = 0.9;

/// Alpha of the full-canvas dark overlay behind the text.
const READABILITY_ALPHA: f32 = 0.25;

/// Background blur radius at the 1080px reference dimension.
const BLUR_REFERENCE: f32 = 40.0;

/// Fraction of the emblem circle's diameter the emblem image may occupy.
const EMBLEM_FIT_FRACTION: f32 = 0.75;

/// Emblem image opacity inside the circle.
const EMBLEM_OPACITY: f32 = 0.95;

/// Largest canvas dimension the engine will allocate.
const MAX_CANVAS_DIM: u32 = 4096;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Poster orientation; fully determines the canvas dimensions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    pub fn canvas_size(self) -> (u32, u32) {
        match self {
            Orientation::Portrait => (1080, 1920),
            Orientation::Landscape => (1920, 1080),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable input for one render call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PosterRequest {
    pub event_name: String,
    #[serde(default)]
    pub orientation: Orientation,
    pub payload_url: String,
    #[serde(default)]
    pub theme_id: Option<String>,
    #[serde(default)]
    pub background_image_ref: Option<String>,
    #[serde(default)]
    pub emblem_image_ref: Option<String>,
}

/// The sole render output; ownership passes to the caller.
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub image_bytes: Vec<u8>,
    pub suggested_filename: String,
}

/// Tunable layout constants, one canonical set per orientation.
///
/// The positions are pixel values at the orientation's native canvas size;
/// nothing is derived from another layer's pixels.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConstants {
    /// Requested QR raster edge (snaps down to whole modules).
    pub qr_size: u32,
    /// White card padding around the QR on each side.
    pub card_padding: u32,
    pub card_corner_radius: u32,
    /// Card shadow blur radius (no offset).
    pub card_shadow_blur: f32,
    pub title_px: f32,
    /// Gap between the card's top edge and the title's bottom edge.
    pub title_offset: u32,
    pub caption_px: f32,
    /// Gap between the card's bottom edge and the caption's top edge.
    pub caption_offset: u32,
    pub emblem_diameter: u32,
    /// Margin from the canvas's top and right edges to the emblem circle.
    pub emblem_margin: u32,
    pub emblem_ring_thickness: f32,
    pub branding_px: f32,
    /// Gap between the canvas's bottom edge and the branding text.
    pub branding_margin: u32,
}

impl LayoutConstants {
    pub fn for_orientation(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self {
                qr_size: 600,
                card_padding: 40,
                card_corner_radius: 28,
                card_shadow_blur: 40.0,
                title_px: 88.0,
                title_offset: 120,
                caption_px: 46.0,
                caption_offset: 140,
                emblem_diameter: 260,
                emblem_margin: 60,
                emblem_ring_thickness: 6.0,
                branding_px: 34.0,
                branding_margin: 64,
            },
            Orientation::Landscape => Self {
                qr_size: 450,
                card_padding: 40,
                card_corner_radius: 28,
                card_shadow_blur: 40.0,
                title_px: 72.0,
                title_offset: 100,
                caption_px: 40.0,
                caption_offset: 110,
                emblem_diameter: 220,
                emblem_margin: 50,
                emblem_ring_thickness: 6.0,
                branding_px: 30.0,
                branding_margin: 52,
            },
        }
    }
}

/// Render a poster with a default asset loader.
pub async fn render(request: &PosterRequest) -> Result<RenderResult, AficheError> {
    let loader = AssetLoader::new()?;
    render_with_loader(request, &loader).await
}

/// Render a poster using the given asset loader.
///
/// QR encoding happens first: it is the one mandatory input, so an invalid
/// payload fails before any network work. Background and emblem fetches are
/// independent and awaited together; either may degrade to `None`.
pub async fn render_with_loader(request: &PosterRequest, loader: &AssetLoader) -> Result<RenderResult, AficheError> {
    let palette = Palette::resolve(request.theme_id.as_deref());
    let layout = LayoutConstants::for_orientation(request.orientation);

    let qr_image = qr::encode_payload(
        &request.payload_url,
        QrOptions {
            size: layout.qr_size,
            ..QrOptions::default()
        },
    )?;

    let (background, emblem) = tokio::join!(
        load_optional(loader, request.background_image_ref.as_deref()),
        load_optional(loader, request.emblem_image_ref.as_deref()),
    );

    debug!(
        event = %request.event_name,
        orientation = %request.orientation,
        background = background.is_some(),
        emblem = emblem.is_some(),
        "compositing poster"
    );

    let canvas = compose(request, &palette, &layout, &qr_image, background.as_ref(), emblem.as_ref())?;
    export::encode(&canvas, &request.event_name, request.orientation)
}

async fn load_optional(loader: &AssetLoader, reference: Option<&str>) -> Option<DynamicImage> {
    match reference {
        Some(r) if !r.is_empty() => loader.load(r).await,
        _ => None,
    }
}

/// Paint the full layer stack onto a freshly allocated canvas.
///
/// Deterministic given identical inputs; all asset fetching has already
/// happened by the time this runs.
pub fn compose(
    request: &PosterRequest,
    palette: &Palette,
    layout: &LayoutConstants,
    qr_image: &RgbaImage,
    background: Option<&DynamicImage>,
    emblem: Option<&DynamicImage>,
) -> Result<RgbaImage, AficheError> {
    let (cw, ch) = request.orientation.canvas_size();
    if cw == 0 || ch == 0 || cw > MAX_CANVAS_DIM || ch > MAX_CANVAS_DIM {
        return Err(AficheError::Canvas(format!("unsupported canvas dimensions {cw}x{ch}")));
    }
    let mut canvas = RgbaImage::new(cw, ch);

    paint_background(&mut canvas, palette, background);
    let (card_top, card_size) = paint_code_panel(&mut canvas, layout, qr_image);
    paint_title(&mut canvas, layout, &request.event_name, card_top);
    paint_caption(&mut canvas, layout, card_top + card_size as i64);
    if let Some(img) = emblem {
        paint_emblem(&mut canvas, layout, img);
    }
    paint_branding(&mut canvas, layout, palette);

    Ok(canvas)
}

/// Layer 1: processed background image, or the gradient fallback.
fn paint_background(canvas: &mut RgbaImage, palette: &Palette, background: Option<&DynamicImage>) {
    let (cw, ch) = canvas.dimensions();
    let Some(img) = background else {
        // The gradient fallback is never skipped.
        draw::fill_vertical_gradient(canvas, palette.secondary, palette.primary, palette.background);
        return;
    };

    let src = img.to_rgba8();
    let (sw, sh) = (src.width() as f32, src.height() as f32);

    // Blurred, darkened cover copy: guarantees no gaps.
    let cover = cover_fit(sw, sh, cw as f32, ch as f32);
    let scaled = resize(
        &src,
        (cover.width.ceil() as u32).max(1),
        (cover.height.ceil() as u32).max(1),
        FilterType::Lanczos3,
    );
    let sigma = BLUR_REFERENCE * (cw.min(ch) as f32 / 1080.0);
    let mut blurred = fast_blur(&scaled, sigma);
    draw::scale_brightness(&mut blurred, BACKGROUND_DIM);
    draw::overlay_alpha(canvas, &blurred, cover.x.floor() as i64, cover.y.floor() as i64, 1.0);

    // Sharp copy inside the 90% box keeps the original legible.
    let box_w = cw as f32 * SHARP_BOX_FRACTION;
    let box_h = ch as f32 * SHARP_BOX_FRACTION;
    let fit = contain_fit(sw, sh, box_w, box_h);
    let sharp = resize(
        &src,
        (fit.width.round() as u32).max(1),
        (fit.height.round() as u32).max(1),
        FilterType::Lanczos3,
    );
    let inset_x = cw as f32 * (1.0 - SHARP_BOX_FRACTION) / 2.0;
    let inset_y = ch as f32 * (1.0 - SHARP_BOX_FRACTION) / 2.0;
    draw::overlay_alpha(
        canvas,
        &sharp,
        (inset_x + fit.x).round() as i64,
        (inset_y + fit.y).round() as i64,
        SHARP_COPY_OPACITY,
    );

    // Text-contrast overlay across the whole canvas.
    draw::flat_overlay(canvas, Rgba([0, 0, 0, 255]), READABILITY_ALPHA);
}

/// Layer 2: white card with a soft shadow, QR raster centered inside.
///
/// Returns the card's top edge and edge length.
fn paint_code_panel(canvas: &mut RgbaImage, layout: &LayoutConstants, qr_image: &RgbaImage) -> (i64, u32) {
    let (cw, ch) = canvas.dimensions();
    let card = qr_image.width() + 2 * layout.card_padding;
    let x = (cw as i64 - card as i64) / 2;
    let y = (ch as i64 - card as i64) / 2;

    draw::rounded_rect_shadow(
        canvas,
        x,
        y,
        card,
        card,
        layout.card_corner_radius,
        layout.card_shadow_blur / 3.0,
        0.45,
        0,
    );
    draw::fill_rounded_rect(canvas, x, y, card, card, layout.card_corner_radius, WHITE);
    draw::overlay_alpha(
        canvas,
        qr_image,
        x + layout.card_padding as i64,
        y + layout.card_padding as i64,
        1.0,
    );

    (y, card)
}

/// Layer 3: event name, single centered line above the card.
fn paint_title(canvas: &mut RgbaImage, layout: &LayoutConstants, event_name: &str, card_top: i64) {
    let cw = canvas.width();
    let raster = text::rasterize_line(event_name, layout.title_px, true, cw);
    let x = ((cw as i64 - raster.width as i64) / 2).max(0);
    let y = card_top - layout.title_offset as i64 - raster.height as i64;
    draw::draw_text_with_shadow(canvas, &raster, x, y, WHITE, 8.0, 0.6, 4);
}

/// Layer 4: fixed instruction caption below the card.
fn paint_caption(canvas: &mut RgbaImage, layout: &LayoutConstants, card_bottom: i64) {
    let cw = canvas.width();
    let raster = text::rasterize_line(CAPTION_TEXT, layout.caption_px, false, cw);
    let x = ((cw as i64 - raster.width as i64) / 2).max(0);
    let y = card_bottom + layout.caption_offset as i64;
    draw::draw_text_with_shadow(canvas, &raster, x, y, WHITE, 6.0, 0.5, 3);
}

/// Layer 5: circular emblem in the top-right corner.
///
/// Skipped entirely when the emblem failed to load; no placeholder.
fn paint_emblem(canvas: &mut RgbaImage, layout: &LayoutConstants, emblem: &DynamicImage) {
    let cw = canvas.width() as f32;
    let d = layout.emblem_diameter as f32;
    let r = d / 2.0;
    let circle = ClipCircle {
        cx: cw - layout.emblem_margin as f32 - r,
        cy: layout.emblem_margin as f32 + r,
        radius: r,
    };

    // Glass fill, then the image, both confined to the circle.
    draw::radial_glass(canvas, circle, 0.25, 0.10);

    let src = emblem.to_rgba8();
    let box_d = d * EMBLEM_FIT_FRACTION;
    let fit = contain_fit(src.width() as f32, src.height() as f32, box_d, box_d);
    let scaled = resize(
        &src,
        (fit.width.round() as u32).max(1),
        (fit.height.round() as u32).max(1),
        FilterType::Lanczos3,
    );
    draw::overlay_alpha_clipped(
        canvas,
        &scaled,
        (circle.cx - box_d / 2.0 + fit.x).round() as i64,
        (circle.cy - box_d / 2.0 + fit.y).round() as i64,
        EMBLEM_OPACITY,
        Some(circle),
    );

    // Clip released: ring and its shadow paint outside the circle edge.
    draw::circle_ring_shadow(canvas, circle, layout.emblem_ring_thickness, 6.0, 0.35, 6);
    draw::circle_ring(canvas, circle, layout.emblem_ring_thickness, WHITE, 0.7);
}

/// Layer 6: fixed branding copy near the bottom edge, accent-colored.
fn paint_branding(canvas: &mut RgbaImage, layout: &LayoutConstants, palette: &Palette) {
    let (cw, ch) = canvas.dimensions();
    let raster = text::rasterize_line(BRANDING_TEXT, layout.branding_px, false, cw);
    let x = ((cw as i64 - raster.width as i64) / 2).max(0);
    let y = ch as i64 - layout.branding_margin as i64 - raster.height as i64;
    draw::draw_text_with_shadow(canvas, &raster, x, y, palette.accent, 4.0, 0.5, 2);
}
