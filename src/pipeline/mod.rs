//! Pipeline orchestrator: scan, plan and generate across all sources, then
//! hand the collected manifest to the writer.
//!
//! The orchestrator is the only owner of the manifest under construction.
//! Probing and generation run on a bounded worker pool; workers return
//! results by value and the orchestrator folds them in on its own thread.

mod workers;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::codec::CodecAdapter;
use crate::error::{Result, UnitError};
use crate::generate::{Generator, UnitOutcome, absolutize};
use crate::manifest::ManifestWriter;
use crate::plan::plan_source;
use crate::scan::{is_derivative_name, scan_directory};
use crate::types::{
    DerivativeRecord, DerivativeUnit, OutputMode, PipelineOptions, RunPhase, RunReport,
    RunSummary, SourceImage,
};

#[cfg(feature = "image-codec")]
use crate::codec::ImageCodec;

/// Per-source bookkeeping while its units are in flight.
#[derive(Debug, Default)]
struct FileProgress {
    remaining: usize,
    failed: usize,
    records: Vec<DerivativeRecord>,
}

/// Drives one or more runs of the derivative pipeline with fixed options.
pub struct Pipeline<C> {
    options: PipelineOptions,
    codec: C,
    phase: RunPhase,
}

#[cfg(feature = "image-codec")]
impl Pipeline<ImageCodec> {
    /// Pipeline backed by the `image` crate codec.
    pub fn with_image_codec(options: PipelineOptions) -> Result<Self> {
        Self::new(options, ImageCodec::new())
    }
}

impl<C: CodecAdapter> Pipeline<C> {
    pub fn new(options: PipelineOptions, codec: C) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            options,
            codec,
            phase: RunPhase::Idle,
        })
    }

    #[must_use]
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Phase reached by the most recent run.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    fn enter(&mut self, phase: RunPhase) {
        tracing::debug!(target = "imageset::pipeline", from = ?self.phase, to = ?phase, "phase");
        self.phase = phase;
    }

    /// Run the pipeline once.
    ///
    /// Only an unreadable input directory or a failed manifest write is
    /// returned as an error; every per-file and per-unit failure ends up in
    /// [`RunReport::diagnostics`].
    pub fn run(&mut self) -> Result<RunReport> {
        let started = Instant::now();
        self.phase = RunPhase::Idle;
        let cwd = std::env::current_dir()?;
        let output_root = absolutize(self.options.output_root(), &cwd);
        let path_root = absolutize(
            self.options.path_root.as_deref().unwrap_or(cwd.as_path()),
            &cwd,
        );
        let manifest_path = absolutize(&self.options.manifest_path, &cwd);
        let workers = self.options.worker_count();

        self.enter(RunPhase::Scanning);
        let mut report = RunReport::default();
        let sources = self.discover(&mut report)?;

        self.enter(RunPhase::Planning);
        let plans = self.plan_all(&sources, workers);

        let mut progress: HashMap<String, FileProgress> = HashMap::new();
        let mut units: Vec<DerivativeUnit> = Vec::new();
        for (source, plan) in sources.iter().zip(plans) {
            match plan {
                Ok(planned) => {
                    report.summary.files_processed += 1;
                    report.summary.units_planned += planned.len();
                    if planned.is_empty() {
                        report.manifest.insert_group(source.filename(), Vec::new());
                        continue;
                    }
                    progress.insert(
                        source.filename().to_string(),
                        FileProgress {
                            remaining: planned.len(),
                            ..FileProgress::default()
                        },
                    );
                    units.extend(planned);
                }
                Err(err) => {
                    tracing::warn!(
                        target = "imageset::pipeline",
                        source = source.filename(),
                        error = %err,
                        "skipping source"
                    );
                    report.diagnostics.push(err);
                }
            }
        }

        self.enter(RunPhase::Generating);
        if !units.is_empty() {
            if let Err(err) = fs_err::create_dir_all(&output_root) {
                // Units will each surface this as a write failure.
                tracing::warn!(
                    target = "imageset::pipeline",
                    error = %err,
                    "could not create output directory"
                );
            }
        }
        let generator = Generator::new(&self.codec, &output_root, &path_root)
            .incremental(self.options.incremental);
        let delete_originals =
            self.options.delete_originals && self.options.mode == OutputMode::InPlace;
        workers::run_pool(
            workers,
            units,
            |unit| generator.run(unit),
            |outcome: UnitOutcome| {
                let filename = outcome.unit.source.filename();
                let Some(file) = progress.get_mut(filename) else {
                    return;
                };
                file.remaining -= 1;
                match outcome.result {
                    Ok(generated) => {
                        if generated.reused {
                            report.summary.derivatives_reused += 1;
                        } else {
                            report.summary.derivatives_written += 1;
                        }
                        file.records.push(generated.record);
                    }
                    Err(err) => {
                        file.failed += 1;
                        report.diagnostics.push(err);
                    }
                }
                if file.remaining == 0 {
                    let records = std::mem::take(&mut file.records);
                    let clean = file.failed == 0;
                    report.manifest.insert_group(filename, records);
                    if delete_originals && clean && remove_source(&outcome.unit.source) {
                        report.summary.sources_removed += 1;
                    }
                }
            },
        );

        self.enter(RunPhase::Finalizing);
        report
            .diagnostics
            .sort_by_cached_key(|diag| (diag.source_file().to_string(), diag.to_string()));
        report.summary.failures = report.diagnostics.len();
        ManifestWriter::new(manifest_path).write(&report.manifest)?;

        self.enter(RunPhase::Done);
        log_summary(&report.summary, started);
        Ok(report)
    }

    /// Scan the input directory and drop sources that cannot produce unique outputs.
    fn discover(&self, report: &mut RunReport) -> Result<Vec<Arc<SourceImage>>> {
        let input_dir = &self.options.input_dir;
        let mut names = scan_directory(input_dir)?;
        if self.options.mode == OutputMode::InPlace {
            names.retain(|name| !is_derivative_name(name));
        }
        report.summary.files_scanned = names.len();

        let mut claimed: HashMap<String, String> = HashMap::new();
        let mut sources = Vec::with_capacity(names.len());
        for name in names {
            let source = SourceImage::new(input_dir, name);
            if let Some(owner) = claimed.get(source.base_name()) {
                let err = UnitError::OutputConflict {
                    source_file: source.filename().to_string(),
                    conflicts_with: owner.clone(),
                };
                tracing::warn!(target = "imageset::pipeline", error = %err, "skipping source");
                report.diagnostics.push(err);
                continue;
            }
            claimed.insert(
                source.base_name().to_string(),
                source.filename().to_string(),
            );
            sources.push(Arc::new(source));
        }
        Ok(sources)
    }

    /// Probe and plan every source on the pool. Results keep scan order.
    fn plan_all(
        &self,
        sources: &[Arc<SourceImage>],
        workers: usize,
    ) -> Vec<std::result::Result<Vec<DerivativeUnit>, UnitError>> {
        let mut plans: Vec<Option<std::result::Result<Vec<DerivativeUnit>, UnitError>>> =
            (0..sources.len()).map(|_| None).collect();
        let jobs: Vec<(usize, Arc<SourceImage>)> =
            sources.iter().cloned().enumerate().collect();
        let codec: &dyn CodecAdapter = &self.codec;
        let targets = &self.options.targets;
        workers::run_pool(
            workers,
            jobs,
            |(index, source)| (index, plan_source(&source, codec, targets)),
            |(index, plan)| plans[index] = Some(plan),
        );
        plans
            .into_iter()
            .zip(sources)
            .map(|(plan, source)| {
                plan.unwrap_or_else(|| {
                    Err(UnitError::MetadataUnavailable {
                        source_file: source.filename().to_string(),
                        reason: "probe did not complete".into(),
                    })
                })
            })
            .collect()
    }
}

fn remove_source(source: &SourceImage) -> bool {
    match fs_err::remove_file(source.path()) {
        Ok(()) => {
            tracing::info!(
                target = "imageset::pipeline",
                source = source.filename(),
                "removed original"
            );
            true
        }
        Err(err) => {
            tracing::warn!(
                target = "imageset::pipeline",
                source = source.filename(),
                error = %err,
                "could not remove original"
            );
            false
        }
    }
}

fn log_summary(summary: &RunSummary, started: Instant) {
    tracing::info!(
        target = "imageset::pipeline",
        files_scanned = summary.files_scanned,
        files_processed = summary.files_processed,
        derivatives_written = summary.derivatives_written,
        derivatives_reused = summary.derivatives_reused,
        failures = summary.failures,
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "{} processed, {} written, {} reused, {} failed",
        summary.files_processed,
        summary.derivatives_written,
        summary.derivatives_reused,
        summary.failures
    );
}

/// Run once with the `image` crate codec.
#[cfg(feature = "image-codec")]
pub fn run(options: PipelineOptions) -> Result<RunReport> {
    Pipeline::with_image_codec(options)?.run()
}

/// Where a run would put its manifest, resolved against the working directory.
pub fn resolved_manifest_path(options: &PipelineOptions) -> Result<PathBuf> {
    Ok(absolutize(&options.manifest_path, &std::env::current_dir()?))
}
