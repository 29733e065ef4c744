#![deny(clippy::all, clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![cfg_attr(
    test,
    allow(
        clippy::uninlined_format_args,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )
)]
#![allow(clippy::module_name_repetitions)]
//
// Documentation lints: internal helpers are self-describing; public items carry docs
// where the behaviour is not obvious from the signature.
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]
//
// Builders take owned values and return Self without must_use on every method.
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::collapsible_if)]

//! Web image derivative pipeline.
//!
//! Given a directory of source rasters, produce every configured
//! (width, format) derivative each source can satisfy without upscaling, and
//! record them in a JSON manifest:
//!
//! ```text
//! scan  input dir  →  sorted source names
//! plan  per source →  widths × formats (native width always included)
//! generate         →  {base}-{width}.{ext} under the output root
//! manifest         →  { source: { ext: [ { width, path } ] } }
//! ```
//!
//! Per-file and per-unit failures are collected in [`RunReport::diagnostics`]
//! and never abort a run. Image decoding and encoding sit behind the
//! [`CodecAdapter`] trait; [`ImageCodec`] is the default implementation.

/// The imageset-core crate version (matches `Cargo.toml`).
pub const IMAGESET_CORE_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod codec;
pub mod constants;
pub mod error;
pub mod generate;
pub mod manifest;
pub mod pipeline;
pub mod plan;
pub mod scan;
pub mod types;

#[cfg(feature = "image-codec")]
pub use codec::ImageCodec;
pub use codec::CodecAdapter;
pub use constants::*;
pub use error::{CodecError, PipelineError, Result, UnitError};
pub use generate::{Generated, Generator, UnitOutcome};
pub use manifest::{FormatGroups, Manifest, ManifestEntry, ManifestWriter};
#[cfg(feature = "image-codec")]
pub use pipeline::run;
pub use pipeline::{Pipeline, resolved_manifest_path};
pub use plan::{plan_source, plan_widths};
pub use scan::{is_derivative_name, is_source_file, scan_directory};
pub use types::{
    DerivativeRecord, DerivativeUnit, Dimensions, FormatSpec, OutputFormat, OutputMode,
    PipelineOptions, PipelineOptionsBuilder, RunPhase, RunReport, RunSummary, SourceImage,
    TargetSpec,
};
