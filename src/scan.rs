//! Directory scanner: lists decodable source rasters in a stable order.

use std::path::Path;

use once_cell::sync::OnceCell;
use regex::Regex;

use crate::constants::SOURCE_EXTENSIONS;
use crate::error::{PipelineError, Result};
use crate::types::OutputFormat;

/// True when `filename` carries one of the source extensions (case-insensitive).
#[must_use]
pub fn is_source_file(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(stem, ext)| {
        !stem.is_empty()
            && SOURCE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
    })
}

/// True for names shaped like generated output (`name-640.webp`).
///
/// Used in in-place mode, where derivatives share a directory with sources.
#[must_use]
pub fn is_derivative_name(filename: &str) -> bool {
    static DERIVATIVE_NAME: OnceCell<std::result::Result<Regex, String>> = OnceCell::new();
    let regex = DERIVATIVE_NAME.get_or_init(|| {
        let extensions: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.extension()).collect();
        Regex::new(&format!(r"(?i)^.+-\d+\.(?:{})$", extensions.join("|")))
            .map_err(|err| err.to_string())
    });
    match regex {
        Ok(re) => re.is_match(filename),
        Err(msg) => {
            tracing::error!(target = "imageset::scan", error = %msg, "derivative name regex init failed");
            false
        }
    }
}

/// Returns source filenames in `dir`, sorted lexicographically.
///
/// Subdirectories, non-matching files and non-UTF-8 names are skipped. A
/// missing or unreadable directory is fatal.
pub fn scan_directory(dir: &Path) -> Result<Vec<String>> {
    let unreadable = |reason: String| PipelineError::DirectoryUnreadable {
        path: dir.to_path_buf(),
        reason,
    };

    let metadata = std::fs::metadata(dir).map_err(|err| unreadable(err.to_string()))?;
    if !metadata.is_dir() {
        return Err(unreadable("not a directory".into()));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|err| unreadable(err.to_string()))? {
        let entry = entry.map_err(|err| unreadable(err.to_string()))?;
        let is_file = std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file());
        if !is_file {
            continue;
        }
        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!(
                target = "imageset::scan",
                path = ?entry.path(),
                "skipping non UTF-8 filename"
            );
            continue;
        };
        if is_source_file(&name) {
            files.push(name);
        }
    }
    files.sort();

    tracing::debug!(
        target = "imageset::scan",
        dir = ?dir,
        files = files.len(),
        "scan complete"
    );
    Ok(files)
}
