//! Manifest model and writer.
//!
//! On disk the manifest is pretty-printed JSON shaped as
//! `{ source: { format_ext: [ { width, path }, ... ] } }`. Keys are sorted so
//! an unchanged input produces a byte-identical document.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use atomic_write_file::AtomicWriteFile;
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::types::DerivativeRecord;

/// One derivative as listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub width: u32,
    pub path: String,
}

/// Format extension to its derivatives, ascending by width.
pub type FormatGroups = BTreeMap<String, Vec<ManifestEntry>>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    sources: BTreeMap<String, FormatGroups>,
}

impl Manifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert the completed record group of one source file.
    ///
    /// Records are grouped by format and sorted by width here, so completion
    /// order of the underlying units does not matter. An empty group leaves
    /// the source absent. A second insert for the same source replaces the first.
    pub fn insert_group(&mut self, source_file: &str, records: Vec<DerivativeRecord>) {
        if records.is_empty() {
            self.sources.remove(source_file);
            return;
        }
        let mut groups = FormatGroups::new();
        for record in records {
            groups
                .entry(record.format.extension().to_string())
                .or_default()
                .push(ManifestEntry {
                    width: record.width,
                    path: record.path,
                });
        }
        for entries in groups.values_mut() {
            entries.sort_by_key(|entry| entry.width);
            entries.dedup_by_key(|entry| entry.width);
        }
        self.sources.insert(source_file.to_string(), groups);
    }

    #[must_use]
    pub fn get(&self, source_file: &str) -> Option<&FormatGroups> {
        self.sources.get(source_file)
    }

    /// Widths listed for `source_file` under the format extension `ext`.
    #[must_use]
    pub fn widths(&self, source_file: &str, ext: &str) -> Vec<u32> {
        self.get(source_file)
            .and_then(|groups| groups.get(ext))
            .map(|entries| entries.iter().map(|entry| entry.width).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FormatGroups)> {
        self.sources.iter()
    }

    #[must_use]
    pub fn contains(&self, source_file: &str) -> bool {
        self.sources.contains_key(source_file)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Total number of derivatives across all sources and formats.
    #[must_use]
    pub fn derivative_count(&self) -> usize {
        self.sources
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Read a manifest written by [`ManifestWriter`].
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs_err::read(path)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Persists a manifest at a fixed path, replacing any previous document.
#[derive(Debug, Clone)]
pub struct ManifestWriter {
    path: PathBuf,
}

impl ManifestWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize and swap the document into place. Readers see either the old
    /// file or the complete new one.
    pub fn write(&self, manifest: &Manifest) -> Result<()> {
        let failure = |reason: String| PipelineError::ManifestWriteFailure {
            path: self.path.clone(),
            reason,
        };
        let json = manifest
            .to_json_pretty()
            .map_err(|err| failure(err.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs_err::create_dir_all(parent).map_err(|err| failure(err.to_string()))?;
        }

        let mut file = AtomicWriteFile::options()
            .open(&self.path)
            .map_err(|err| failure(err.to_string()))?;
        file.write_all(json.as_bytes())
            .map_err(|err| failure(err.to_string()))?;
        file.commit().map_err(|err| failure(err.to_string()))?;

        tracing::info!(
            target = "imageset::manifest",
            path = ?self.path,
            sources = manifest.len(),
            derivatives = manifest.derivative_count(),
            "manifest written"
        );
        Ok(())
    }
}
