use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::format::{FormatSpec, OutputFormat};
use super::source::SourceImage;

/// One (source, width, format) generation task.
#[derive(Debug, Clone)]
pub struct DerivativeUnit {
    pub source: Arc<SourceImage>,
    pub width: u32,
    pub format: FormatSpec,
}

impl DerivativeUnit {
    /// `{baseName}-{width}.{ext}`
    #[must_use]
    pub fn output_file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            self.source.base_name(),
            self.width,
            self.format.format.extension()
        )
    }

    #[must_use]
    pub fn output_path(&self, output_root: &Path) -> PathBuf {
        output_root.join(self.output_file_name())
    }
}

impl fmt::Display for DerivativeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}px {})",
            self.source.filename(),
            self.width,
            self.format.format
        )
    }
}

/// A derivative that exists on disk after a successful unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivativeRecord {
    pub source_file: String,
    pub format: OutputFormat,
    pub width: u32,
    /// Forward-slash path relative to the run's path root.
    pub path: String,
}
