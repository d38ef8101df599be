//! # Error Types
//!
//! This module defines error types used throughout the afiche library.
//!
//! Only code generation, canvas allocation, and final export failures are
//! surfaced to callers. Asset loading failures are absorbed by the
//! compositor's fallback paths and never appear here.

use thiserror::Error;

/// Main error type for afiche operations
#[derive(Debug, Error)]
pub enum AficheError {
    /// The payload could not be encoded as a scannable QR code
    #[error("QR encoding error: {0}")]
    QrEncoding(String),

    /// The output canvas could not be allocated
    #[error("Canvas error: {0}")]
    Canvas(String),

    /// Serializing the finished canvas to bytes failed
    #[error("Export error: {0}")]
    Export(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Malformed render request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
