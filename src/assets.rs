//! Asset loading with bounded waits and graceful degradation.
//!
//! Background and emblem images come from URLs (or local paths, for the
//! CLI). Every caller has a designed fallback when an asset is missing, so
//! `load` never propagates a hard error: any fetch, decode, or deadline
//! failure becomes `None` plus a logged warning. One attempt, no retries.

use std::time::Duration;

use image::DynamicImage;
use tracing::{debug, warn};

use crate::error::AficheError;

/// Default hard deadline for a single asset fetch + decode.
pub const DEFAULT_ASSET_TIMEOUT: Duration = Duration::from_millis(5000);

/// Loads raster assets over HTTP(S) or from the filesystem.
///
/// Holds one HTTP client, reused across the loads of a render call. No
/// decoded-image cache is kept across calls; each render owns its results.
pub struct AssetLoader {
    client: reqwest::Client,
    timeout: Duration,
}

impl AssetLoader {
    pub fn new() -> Result<Self, AficheError> {
        Self::with_timeout(DEFAULT_ASSET_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, AficheError> {
        let client = reqwest::Client::builder()
            .user_agent("afiche/0.1")
            .build()
            .map_err(|e| AficheError::Image(format!("HTTP client error: {e}")))?;
        Ok(Self { client, timeout })
    }

    /// Fetch and decode an image, or `None` on any failure.
    ///
    /// The whole attempt runs under a structured timeout; an elapsed
    /// deadline is a normal fallback path, not a cancellation error.
    pub async fn load(&self, reference: &str) -> Option<DynamicImage> {
        match tokio::time::timeout(self.timeout, self.fetch(reference)).await {
            Ok(Ok(img)) => {
                debug!(reference, width = img.width(), height = img.height(), "asset loaded");
                Some(img)
            }
            Ok(Err(e)) => {
                warn!(reference, error = %e, "asset load failed, using fallback");
                None
            }
            Err(_) => {
                warn!(reference, timeout_ms = self.timeout.as_millis() as u64, "asset load timed out, using fallback");
                None
            }
        }
    }

    async fn fetch(&self, reference: &str) -> Result<DynamicImage, AficheError> {
        let bytes = if reference.starts_with("http://") || reference.starts_with("https://") {
            let response = self
                .client
                .get(reference)
                .send()
                .await
                .map_err(|e| AficheError::Image(format!("failed to download {reference}: {e}")))?;
            if !response.status().is_success() {
                return Err(AficheError::Image(format!(
                    "failed to download {reference}: HTTP {}",
                    response.status()
                )));
            }
            response
                .bytes()
                .await
                .map_err(|e| AficheError::Image(format!("failed to read image data: {e}")))?
                .to_vec()
        } else {
            tokio::fs::read(reference).await?
        };

        image::load_from_memory(&bytes)
            .map_err(|e| AficheError::Image(format!("failed to decode image: {e}")))
    }
}
