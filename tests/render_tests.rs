//! End-to-end rendering tests.
//!
//! Everything runs offline: assets are injected as in-memory images (or
//! pointed at unreachable addresses to exercise the degradation paths).

use std::time::Duration;

use image::{DynamicImage, Rgba, RgbaImage};
use pretty_assertions::assert_eq;

use afiche::{
    AficheError, LayoutConstants, Orientation, Palette, PosterRequest,
    assets::AssetLoader,
    compose::compose,
    qr::{QrOptions, encode_payload},
    render_with_loader,
};

fn request(orientation: Orientation) -> PosterRequest {
    PosterRequest {
        event_name: "Ana & Juan's Wedding!!".to_string(),
        orientation,
        payload_url: "https://example.com/events/42/tables".to_string(),
        theme_id: Some("unknown-theme".to_string()),
        background_image_ref: None,
        emblem_image_ref: None,
    }
}

fn compose_poster(
    req: &PosterRequest,
    background: Option<&DynamicImage>,
    emblem: Option<&DynamicImage>,
) -> RgbaImage {
    let palette = Palette::resolve(req.theme_id.as_deref());
    let layout = LayoutConstants::for_orientation(req.orientation);
    let qr = encode_payload(
        &req.payload_url,
        QrOptions {
            size: layout.qr_size,
            ..QrOptions::default()
        },
    )
    .unwrap();
    compose(req, &palette, &layout, &qr, background, emblem).unwrap()
}

fn solid_image(w: u32, h: u32, color: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(color)))
}

// Scenario A: no background, no emblem, unknown theme -> default gradient,
// no emblem layer, code panel present.
#[test]
fn scenario_a_gradient_fallback_poster() {
    let req = request(Orientation::Portrait);
    let canvas = compose_poster(&req, None, None);

    assert_eq!(canvas.dimensions(), (1080, 1920));

    // Gradient endpoints come straight from the default palette.
    assert_eq!(*canvas.get_pixel(0, 0), Palette::DEFAULT.secondary);
    assert_eq!(*canvas.get_pixel(0, 1919), Palette::DEFAULT.background);

    // White card present: a pixel inside the card's padding band. The QR
    // raster snaps to whole modules, so derive the card rect from it.
    let layout = LayoutConstants::for_orientation(Orientation::Portrait);
    let qr = encode_payload(
        &req.payload_url,
        QrOptions {
            size: layout.qr_size,
            ..QrOptions::default()
        },
    )
    .unwrap();
    let card = qr.width() + 2 * layout.card_padding;
    let card_top = (1920 - card) / 2;
    let inside_card = *canvas.get_pixel(540, card_top + layout.card_padding / 2);
    assert_eq!(inside_card, Rgba([255, 255, 255, 255]));

    // No emblem drawn: the top-right circle region still matches the
    // horizontally-uniform gradient.
    let emblem_cy = layout.emblem_margin + layout.emblem_diameter / 2;
    let emblem_cx = 1080 - layout.emblem_margin - layout.emblem_diameter / 2;
    assert_eq!(*canvas.get_pixel(emblem_cx, emblem_cy), *canvas.get_pixel(10, emblem_cy));
}

// Scenario B: unreachable background URL degrades to the same gradient
// poster as scenario A, after the timeout budget.
#[tokio::test]
async fn scenario_b_unreachable_background_matches_gradient_poster() {
    let loader = AssetLoader::with_timeout(Duration::from_millis(800)).unwrap();

    let mut with_bad_background = request(Orientation::Portrait);
    // Port 9 refuses connections immediately; no network needed.
    with_bad_background.background_image_ref = Some("http://127.0.0.1:9/bg.jpg".to_string());

    let degraded = render_with_loader(&with_bad_background, &loader).await.unwrap();
    let fallback = render_with_loader(&request(Orientation::Portrait), &loader).await.unwrap();

    assert_eq!(degraded.image_bytes, fallback.image_bytes);
    assert_eq!(degraded.suggested_filename, "ana_juan_s_wedding_portrait_qr_poster.jpg");
}

// A server that accepts the connection but never answers exhausts the
// loader's deadline; the render still degrades to the gradient poster.
#[tokio::test]
async fn stalled_background_server_elapses_timeout_then_degrades() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut open = Vec::new();
        loop {
            match listener.accept().await {
                // Hold the socket open without ever responding.
                Ok((socket, _)) => open.push(socket),
                Err(_) => return,
            }
        }
    });

    let timeout = Duration::from_millis(400);
    let loader = AssetLoader::with_timeout(timeout).unwrap();

    let mut with_stalled = request(Orientation::Portrait);
    with_stalled.background_image_ref = Some(format!("http://{addr}/bg.jpg"));

    let started = std::time::Instant::now();
    let degraded = render_with_loader(&with_stalled, &loader).await.unwrap();
    assert!(started.elapsed() >= timeout);

    let fallback = render_with_loader(&request(Orientation::Portrait), &loader).await.unwrap();
    assert_eq!(degraded.image_bytes, fallback.image_bytes);
}

// Scenario C: landscape canvas is exactly 1920x1080 with its own text scale.
#[test]
fn scenario_c_landscape_dimensions_and_scale() {
    let canvas = compose_poster(&request(Orientation::Landscape), None, None);
    assert_eq!(canvas.dimensions(), (1920, 1080));

    let portrait = LayoutConstants::for_orientation(Orientation::Portrait);
    let landscape = LayoutConstants::for_orientation(Orientation::Landscape);
    assert!(landscape.title_px < portrait.title_px);
}

// Scenario D: filename slug is restricted to [a-z0-9_].
#[tokio::test]
async fn scenario_d_filename_is_slugified() {
    let loader = AssetLoader::new().unwrap();
    let result = render_with_loader(&request(Orientation::Portrait), &loader).await.unwrap();
    let stem = result.suggested_filename.strip_suffix(".jpg").unwrap();
    assert!(stem.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
}

// Scenario E: an un-encodable payload is a hard failure; no bytes produced.
#[tokio::test]
async fn scenario_e_qr_failure_aborts_render() {
    let loader = AssetLoader::new().unwrap();
    let mut req = request(Orientation::Portrait);
    req.payload_url = "a".repeat(3000);
    let err = render_with_loader(&req, &loader).await.unwrap_err();
    assert!(matches!(err, AficheError::QrEncoding(_)));
}

#[test]
fn empty_event_name_still_renders_and_names_the_file() {
    let mut req = request(Orientation::Portrait);
    req.event_name = String::new();
    let canvas = compose_poster(&req, None, None);
    assert_eq!(canvas.dimensions(), (1080, 1920));
    assert_eq!(
        afiche::export::suggested_filename(&req.event_name, req.orientation),
        "event_portrait_qr_poster.jpg"
    );
}

#[test]
fn background_image_changes_the_backdrop() {
    let req = request(Orientation::Portrait);
    let background = solid_image(400, 300, [200, 30, 30, 255]);
    let canvas = compose_poster(&req, Some(&background), None);

    // The backdrop should now be a dimmed red, not the gradient.
    let px = canvas.get_pixel(5, 5);
    assert!(px.0[0] > px.0[1] && px.0[0] > px.0[2], "expected reddish backdrop, got {px:?}");
    assert_ne!(*px, Palette::DEFAULT.secondary);
}

#[test]
fn emblem_is_drawn_only_when_loaded() {
    let req = request(Orientation::Portrait);
    let emblem = solid_image(64, 64, [20, 60, 220, 255]);

    let with_emblem = compose_poster(&req, None, Some(&emblem));
    let without_emblem = compose_poster(&req, None, None);

    let layout = LayoutConstants::for_orientation(Orientation::Portrait);
    let cx = 1080 - layout.emblem_margin - layout.emblem_diameter / 2;
    let cy = layout.emblem_margin + layout.emblem_diameter / 2;
    assert_ne!(*with_emblem.get_pixel(cx, cy), *without_emblem.get_pixel(cx, cy));

    // The emblem stays inside its circle: just past the ring the two
    // posters are identical.
    let outside_x = cx;
    let outside_y = layout.emblem_margin + layout.emblem_diameter + 30;
    assert_eq!(
        *with_emblem.get_pixel(outside_x, outside_y),
        *without_emblem.get_pixel(outside_x, outside_y)
    );
}

#[test]
fn identical_inputs_compose_identically() {
    let req = request(Orientation::Portrait);
    let background = solid_image(640, 480, [40, 90, 160, 255]);
    let emblem = solid_image(100, 80, [250, 250, 250, 255]);

    let first = compose_poster(&req, Some(&background), Some(&emblem));
    let second = compose_poster(&req, Some(&background), Some(&emblem));

    assert_eq!(first.dimensions(), second.dimensions());
    assert_eq!(first.as_raw(), second.as_raw());
}
