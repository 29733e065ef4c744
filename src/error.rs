use std::path::PathBuf;

use thiserror::Error;

use crate::types::OutputFormat;

/// Errors that terminate a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory {path:?} is unreadable: {reason}")]
    DirectoryUnreadable { path: PathBuf, reason: String },

    #[error("failed to write manifest {path:?}: {reason}")]
    ManifestWriteFailure { path: PathBuf, reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Failures contained at file or unit granularity. A run collects these as
/// values and keeps going.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UnitError {
    #[error("metadata unavailable for {source_file}: {reason}")]
    MetadataUnavailable { source_file: String, reason: String },

    #[error("encode failed for {source_file} ({width}px {format}): {reason}")]
    EncodeFailure {
        source_file: String,
        width: u32,
        format: OutputFormat,
        reason: String,
    },

    #[error("write failed for {source_file} ({width}px {format}): {reason}")]
    WriteFailure {
        source_file: String,
        width: u32,
        format: OutputFormat,
        reason: String,
    },

    #[error("{source_file} skipped: derivative names collide with {conflicts_with}")]
    OutputConflict {
        source_file: String,
        conflicts_with: String,
    },
}

impl UnitError {
    /// Source filename the failure belongs to.
    #[must_use]
    pub fn source_file(&self) -> &str {
        match self {
            Self::MetadataUnavailable { source_file, .. }
            | Self::EncodeFailure { source_file, .. }
            | Self::WriteFailure { source_file, .. }
            | Self::OutputConflict { source_file, .. } => source_file,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MetadataUnavailable { .. } => "metadata_unavailable",
            Self::EncodeFailure { .. } => "encode_failure",
            Self::WriteFailure { .. } => "write_failure",
            Self::OutputConflict { .. } => "output_conflict",
        }
    }
}

/// Errors reported by a [`crate::codec::CodecAdapter`].
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("encode failed: {0}")]
    Encode(String),

    #[error("output format {0} is not supported by this codec")]
    Unsupported(OutputFormat),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(feature = "image-codec")]
impl From<image::ImageError> for CodecError {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(io) => Self::Io(io),
            image::ImageError::Decoding(inner) => Self::Decode(inner.to_string()),
            other => Self::Encode(other.to_string()),
        }
    }
}
