use serde::{Deserialize, Serialize};

use crate::error::UnitError;
use crate::manifest::Manifest;

/// Orchestrator state. A run moves strictly forward through these phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    #[default]
    Idle,
    Scanning,
    Planning,
    Generating,
    Finalizing,
    Done,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub files_scanned: usize,
    /// Files whose metadata was read and whose units were dispatched.
    pub files_processed: usize,
    pub units_planned: usize,
    pub derivatives_written: usize,
    /// Units satisfied by an up-to-date file from a previous run.
    pub derivatives_reused: usize,
    pub failures: usize,
    pub sources_removed: usize,
}

/// Everything a caller learns from a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub manifest: Manifest,
    pub summary: RunSummary,
    pub diagnostics: Vec<UnitError>,
}

impl RunReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn diagnostics_for<'a>(&'a self, source_file: &'a str) -> impl Iterator<Item = &'a UnitError> {
        self.diagnostics
            .iter()
            .filter(move |diag| diag.source_file() == source_file)
    }
}
