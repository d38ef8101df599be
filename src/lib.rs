//! # Afiche - QR Poster Compositing Engine
//!
//! Afiche renders printable QR posters for event consoles: a scannable code
//! on a white card, layered over a themed background with titles, an
//! optional circular emblem, and branding, encoded as a high-quality JPEG.
//!
//! ## Quick Start
//!
//! ```no_run
//! use afiche::{PosterRequest, Orientation, render};
//!
//! # async fn example() -> Result<(), afiche::AficheError> {
//! let request = PosterRequest {
//!     event_name: "Ana & Juan's Wedding".to_string(),
//!     orientation: Orientation::Portrait,
//!     payload_url: "https://example.com/events/42/tables".to_string(),
//!     theme_id: Some("midnight".to_string()),
//!     background_image_ref: None,
//!     emblem_image_ref: None,
//! };
//!
//! let result = render(&request).await?;
//! std::fs::write(&result.suggested_filename, &result.image_bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! Missing or unreachable background/emblem images degrade gracefully (a
//! palette gradient replaces the background; the emblem is simply omitted).
//! Only QR encoding, canvas allocation, and the final export can fail.
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`compose`] | Layer compositor and render orchestration |
//! | [`geometry`] | Cover/contain fit rectangles |
//! | [`theme`] | Theme palettes with default fallback |
//! | [`assets`] | Bounded-wait asset loading |
//! | [`qr`] | QR encoding and rasterization |
//! | [`text`] | Single-line text rasterization |
//! | [`export`] | JPEG export and filename slugging |
//! | [`error`] | Error types |

pub mod assets;
pub mod compose;
pub mod error;
pub mod export;
pub mod geometry;
pub mod qr;
pub mod text;
pub mod theme;

// Re-exports for convenience
pub use compose::{LayoutConstants, Orientation, PosterRequest, RenderResult, render, render_with_loader};
pub use error::AficheError;
pub use theme::Palette;
