//! Errors from the surfaces around the renderer.
//!
//! Rendering itself never fails (an undecodable background is dropped with
//! a warning); these cover profile parsing, font file IO, and export
//! encoding.

use thiserror::Error;

/// Convenience alias for results in this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings profile: {0}")]
    Profile(#[from] serde_json::Error),

    #[error("failed to encode {format} export: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("unsupported export size {0}px (expected 400, 800 or 1200)")]
    ExportSize(u32),

    #[error("unknown export format {0:?} (expected webp, png or jpeg)")]
    ExportFormat(String),
}
