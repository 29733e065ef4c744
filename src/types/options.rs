//! Run configuration: target ladder, formats, directories and output mode.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::format::{FormatSpec, OutputFormat};
use crate::constants::{
    DEFAULT_INPUT_DIR, DEFAULT_MANIFEST_PATH, DEFAULT_OUTPUT_DIR, DEFAULT_TARGET_WIDTHS,
};
use crate::error::{PipelineError, Result};

fn default_widths() -> Vec<u32> {
    DEFAULT_TARGET_WIDTHS.to_vec()
}

fn default_formats() -> Vec<FormatSpec> {
    [OutputFormat::Webp, OutputFormat::Avif, OutputFormat::Jpeg]
        .into_iter()
        .map(FormatSpec::with_default_quality)
        .collect()
}

/// Requested widths and formats for one run.
///
/// Widths are positive, ascending and unique. Formats keep their configured
/// order; a repeated format keeps its first entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TargetSpecRepr", into = "TargetSpecRepr")]
pub struct TargetSpec {
    widths: Vec<u32>,
    formats: Vec<FormatSpec>,
}

#[derive(Serialize, Deserialize)]
struct TargetSpecRepr {
    #[serde(default = "default_widths")]
    widths: Vec<u32>,
    #[serde(default = "default_formats")]
    formats: Vec<FormatSpec>,
}

impl TargetSpec {
    pub fn new(
        widths: impl IntoIterator<Item = u32>,
        formats: impl IntoIterator<Item = FormatSpec>,
    ) -> Result<Self> {
        let mut widths: Vec<u32> = widths.into_iter().collect();
        if widths.contains(&0) {
            return Err(PipelineError::InvalidConfig {
                reason: "target widths must be positive".into(),
            });
        }
        widths.sort_unstable();
        widths.dedup();

        let mut unique: Vec<FormatSpec> = Vec::new();
        for spec in formats {
            if !(1..=100).contains(&spec.quality) {
                return Err(PipelineError::InvalidConfig {
                    reason: format!(
                        "quality for {} must be within 1..=100 (got {})",
                        spec.format, spec.quality
                    ),
                });
            }
            if unique.iter().all(|existing| existing.format != spec.format) {
                unique.push(spec);
            }
        }
        if unique.is_empty() {
            return Err(PipelineError::InvalidConfig {
                reason: "at least one output format is required".into(),
            });
        }

        Ok(Self {
            widths,
            formats: unique,
        })
    }

    #[must_use]
    pub fn widths(&self) -> &[u32] {
        &self.widths
    }

    #[must_use]
    pub fn formats(&self) -> &[FormatSpec] {
        &self.formats
    }
}

impl Default for TargetSpec {
    fn default() -> Self {
        Self {
            widths: default_widths(),
            formats: default_formats(),
        }
    }
}

impl TryFrom<TargetSpecRepr> for TargetSpec {
    type Error = PipelineError;

    fn try_from(repr: TargetSpecRepr) -> Result<Self> {
        Self::new(repr.widths, repr.formats)
    }
}

impl From<TargetSpec> for TargetSpecRepr {
    fn from(spec: TargetSpec) -> Self {
        Self {
            widths: spec.widths,
            formats: spec.formats,
        }
    }
}

/// Where derivatives are written.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// Derivatives go to `output_dir`; sources are never touched.
    #[default]
    SideDirectory,
    /// Derivatives are written next to their sources in `input_dir`.
    InPlace,
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub manifest_path: PathBuf,
    /// Manifest paths are expressed relative to this directory.
    /// Defaults to the working directory at run time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_root: Option<PathBuf>,
    pub targets: TargetSpec,
    /// Worker threads; defaults to the number of logical CPUs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    pub mode: OutputMode,
    /// Remove a source once all of its derivatives were written. In-place mode only.
    pub delete_originals: bool,
    /// Skip encoding when the derivative on disk is at least as new as its source.
    pub incremental: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from(DEFAULT_INPUT_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            path_root: None,
            targets: TargetSpec::default(),
            workers: None,
            mode: OutputMode::default(),
            delete_originals: false,
            incremental: false,
        }
    }
}

impl PipelineOptions {
    /// Start a fluent builder for `PipelineOptions`.
    #[must_use]
    pub fn builder() -> PipelineOptionsBuilder {
        PipelineOptionsBuilder::default()
    }

    /// Load options from a JSON document. Missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let bytes = fs_err::read(path)?;
        let options: Self = serde_json::from_slice(&bytes)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(PipelineError::InvalidConfig {
                reason: "worker count must be at least 1".into(),
            });
        }
        if self.delete_originals && self.mode != OutputMode::InPlace {
            return Err(PipelineError::InvalidConfig {
                reason: "delete_originals requires in_place output mode".into(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Directory derivatives are written to.
    #[must_use]
    pub fn output_root(&self) -> &Path {
        match self.mode {
            OutputMode::SideDirectory => &self.output_dir,
            OutputMode::InPlace => &self.input_dir,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptionsBuilder {
    inner: PipelineOptions,
    widths: Option<Vec<u32>>,
    formats: Option<Vec<FormatSpec>>,
}

impl PipelineOptionsBuilder {
    pub fn input_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.input_dir = dir.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.inner.output_dir = dir.into();
        self
    }

    pub fn manifest_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.inner.manifest_path = path.into();
        self
    }

    pub fn path_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.inner.path_root = Some(root.into());
        self
    }

    pub fn widths(mut self, widths: impl IntoIterator<Item = u32>) -> Self {
        self.widths = Some(widths.into_iter().collect());
        self
    }

    pub fn formats(mut self, formats: impl IntoIterator<Item = FormatSpec>) -> Self {
        self.formats = Some(formats.into_iter().collect());
        self
    }

    pub fn format(mut self, format: OutputFormat, quality: u8) -> Self {
        self.formats
            .get_or_insert_with(Vec::new)
            .push(FormatSpec::new(format, quality));
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.inner.workers = Some(workers);
        self
    }

    #[must_use]
    pub fn mode(mut self, mode: OutputMode) -> Self {
        self.inner.mode = mode;
        self
    }

    #[must_use]
    pub fn delete_originals(mut self, enabled: bool) -> Self {
        self.inner.delete_originals = enabled;
        self
    }

    #[must_use]
    pub fn incremental(mut self, enabled: bool) -> Self {
        self.inner.incremental = enabled;
        self
    }

    pub fn build(self) -> Result<PipelineOptions> {
        let Self {
            mut inner,
            widths,
            formats,
        } = self;
        if widths.is_some() || formats.is_some() {
            let defaults = TargetSpec::default();
            inner.targets = TargetSpec::new(
                widths.unwrap_or_else(|| defaults.widths().to_vec()),
                formats.unwrap_or_else(|| defaults.formats().to_vec()),
            )?;
        }
        inner.validate()?;
        Ok(inner)
    }
}
