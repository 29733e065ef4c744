//! Codec adapter seam: probing and decode-resize-encode live behind a trait
//! so the pipeline never depends on a particular image library.

#[cfg(feature = "image-codec")]
mod image_backend;

use std::path::Path;

#[cfg(feature = "image-codec")]
pub use image_backend::ImageCodec;

use crate::error::CodecError;
use crate::types::{Dimensions, OutputFormat};

/// Decodes source rasters and produces encoded derivatives.
///
/// Implementations must be deterministic for identical inputs and safe to
/// call from several worker threads at once.
pub trait CodecAdapter: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Read intrinsic dimensions without a full decode where possible.
    fn probe(&self, path: &Path) -> Result<Dimensions, CodecError>;

    /// Decode `path`, resize to `width` (aspect preserved) and encode as `format`.
    fn encode(
        &self,
        path: &Path,
        width: u32,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError>;

    /// Whether `format` can be produced at all.
    fn supports(&self, format: OutputFormat) -> bool {
        let _ = format;
        true
    }
}
