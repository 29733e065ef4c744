//! Command-line entry point for the image derivative pipeline.
//!
//! Usage:
//!   imageset [--config <file>] [--input <dir>] [--output <dir>] [--widths 320,640]
//!            [--format webp:70 ...] [--manifest <file>] [--jobs <n>]
//!
//! Exits 0 when the run completes, even if individual files failed; exits 1
//! when the input directory is unreadable, the configuration is invalid, or
//! the manifest cannot be written.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use imageset_core::{FormatSpec, OutputMode, Pipeline, PipelineOptions, TargetSpec};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "imageset",
    version,
    about = "Generate web-optimized image derivatives and a manifest describing them"
)]
struct Cli {
    /// JSON configuration file; flags override its values
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Directory of source images
    #[arg(long, short = 'i', env = "IMAGES_DIR")]
    input: Option<PathBuf>,

    /// Directory derivatives are written to
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Manifest location
    #[arg(long, short = 'm')]
    manifest: Option<PathBuf>,

    /// Directory manifest paths are relative to (default: working directory)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Target widths, comma separated
    #[arg(long, short = 'w', value_delimiter = ',')]
    widths: Vec<u32>,

    /// Output format with optional quality, e.g. `webp:70`; repeatable
    #[arg(long = "format", short = 'f', value_name = "FORMAT[:QUALITY]")]
    formats: Vec<FormatSpec>,

    /// Worker threads (default: logical CPUs)
    #[arg(long, short = 'j')]
    jobs: Option<usize>,

    /// Write derivatives next to their sources
    #[arg(long)]
    in_place: bool,

    /// Remove a source after all of its derivatives were written (requires --in-place)
    #[arg(long, requires = "in_place")]
    delete_originals: bool,

    /// Reuse derivatives that are newer than their source
    #[arg(long)]
    incremental: bool,

    /// Print the manifest to stdout after the run
    #[arg(long)]
    print_manifest: bool,

    /// Increase log verbosity
    #[arg(long, short = 'v', action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Cli {
    fn log_filter(&self) -> EnvFilter {
        let default = match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    }

    fn options(&self) -> imageset_core::Result<PipelineOptions> {
        let mut options = match &self.config {
            Some(path) => PipelineOptions::from_json_file(path)?,
            None => PipelineOptions::default(),
        };
        if let Some(input) = &self.input {
            options.input_dir.clone_from(input);
        }
        if let Some(output) = &self.output {
            options.output_dir.clone_from(output);
        }
        if let Some(manifest) = &self.manifest {
            options.manifest_path.clone_from(manifest);
        }
        if let Some(root) = &self.root {
            options.path_root = Some(root.clone());
        }
        if !self.widths.is_empty() || !self.formats.is_empty() {
            let widths = if self.widths.is_empty() {
                options.targets.widths().to_vec()
            } else {
                self.widths.clone()
            };
            let formats = if self.formats.is_empty() {
                options.targets.formats().to_vec()
            } else {
                self.formats.clone()
            };
            options.targets = TargetSpec::new(widths, formats)?;
        }
        if let Some(jobs) = self.jobs {
            options.workers = Some(jobs);
        }
        if self.in_place {
            options.mode = OutputMode::InPlace;
        }
        options.delete_originals |= self.delete_originals;
        options.incremental |= self.incremental;
        options.validate()?;
        Ok(options)
    }
}

fn run(cli: &Cli) -> imageset_core::Result<()> {
    let options = cli.options()?;
    let mut pipeline = Pipeline::with_image_codec(options)?;
    let report = pipeline.run()?;

    for diag in &report.diagnostics {
        tracing::debug!(target = "imageset::cli", kind = diag.kind(), "{diag}");
    }
    if cli.print_manifest {
        print!("{}", report.manifest.to_json_pretty()?);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter())
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(target = "imageset::cli", error = %err, "run failed");
            eprintln!("imageset: {err}");
            ExitCode::FAILURE
        }
    }
}
