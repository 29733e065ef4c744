//! Derivative generator: runs one unit through the codec and writes the result.

use std::io::Write;
use std::path::{Component, Path, PathBuf};

use atomic_write_file::AtomicWriteFile;

use crate::codec::CodecAdapter;
use crate::error::UnitError;
use crate::types::{DerivativeRecord, DerivativeUnit};

/// Successful unit result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub record: DerivativeRecord,
    /// The file on disk was already current and was not re-encoded.
    pub reused: bool,
}

/// Result of one unit, returned by a worker to the orchestrator.
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: DerivativeUnit,
    pub result: Result<Generated, UnitError>,
}

/// Executes derivative units against a codec and an output directory.
pub struct Generator<'a> {
    codec: &'a dyn CodecAdapter,
    output_root: &'a Path,
    path_root: &'a Path,
    incremental: bool,
}

impl<'a> Generator<'a> {
    /// `output_root` and `path_root` are expected to be absolute.
    pub fn new(codec: &'a dyn CodecAdapter, output_root: &'a Path, path_root: &'a Path) -> Self {
        Self {
            codec,
            output_root,
            path_root,
            incremental: false,
        }
    }

    #[must_use]
    pub fn incremental(mut self, enabled: bool) -> Self {
        self.incremental = enabled;
        self
    }

    /// Run one unit. Never fails past this call: errors come back as [`UnitError`].
    pub fn run(&self, unit: DerivativeUnit) -> UnitOutcome {
        let result = self.generate(&unit);
        match &result {
            Ok(generated) => tracing::info!(
                target = "imageset::generate",
                source = unit.source.filename(),
                output = %generated.record.path,
                reused = generated.reused,
                "{} -> {}",
                unit.source.filename(),
                unit.output_file_name()
            ),
            Err(err) => tracing::warn!(
                target = "imageset::generate",
                source = unit.source.filename(),
                width = unit.width,
                format = %unit.format.format,
                error = %err,
                "derivative failed"
            ),
        }
        UnitOutcome { unit, result }
    }

    pub fn generate(&self, unit: &DerivativeUnit) -> Result<Generated, UnitError> {
        let output_path = unit.output_path(self.output_root);
        let record = DerivativeRecord {
            source_file: unit.source.filename().to_string(),
            format: unit.format.format,
            width: unit.width,
            path: manifest_path(&output_path, self.path_root),
        };

        if self.incremental && is_up_to_date(unit.source.path(), &output_path) {
            return Ok(Generated {
                record,
                reused: true,
            });
        }

        let bytes = self
            .codec
            .encode(
                unit.source.path(),
                unit.width,
                unit.format.format,
                unit.format.quality,
            )
            .map_err(|err| UnitError::EncodeFailure {
                source_file: record.source_file.clone(),
                width: unit.width,
                format: unit.format.format,
                reason: err.to_string(),
            })?;

        write_atomically(&output_path, &bytes).map_err(|err| UnitError::WriteFailure {
            source_file: record.source_file.clone(),
            width: unit.width,
            format: unit.format.format,
            reason: err.to_string(),
        })?;

        Ok(Generated {
            record,
            reused: false,
        })
    }
}

/// Write to a temporary sibling and rename into place on success.
fn write_atomically(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = AtomicWriteFile::options().open(path)?;
    file.write_all(bytes)?;
    file.commit()
}

fn is_up_to_date(source: &Path, output: &Path) -> bool {
    let modified = |path: &Path| fs_err::metadata(path).and_then(|meta| meta.modified());
    match (modified(source), modified(output)) {
        (Ok(source_time), Ok(output_time)) => output_time >= source_time,
        _ => false,
    }
}

/// Drop `.` components and resolve `..` lexically against an absolute base.
#[must_use]
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Forward-slash path of `output` relative to `root`, or the full path when
/// no relative form exists.
#[must_use]
pub fn manifest_path(output: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(output, root).unwrap_or_else(|| output.to_path_buf());
    relative
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
