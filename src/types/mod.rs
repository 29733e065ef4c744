//! Public types exposed by the `imageset-core` crate.

pub mod format;
pub mod options;
pub mod report;
pub mod source;
pub mod unit;

pub use format::{FormatSpec, OutputFormat};
pub use options::{OutputMode, PipelineOptions, PipelineOptionsBuilder, TargetSpec};
pub use report::{RunPhase, RunReport, RunSummary};
pub use source::{Dimensions, SourceImage};
pub use unit::{DerivativeRecord, DerivativeUnit};
