//! Deterministic codec used by the integration tests.
//!
//! A "source image" is a text file holding `WIDTHxHEIGHT`, optionally followed
//! by `fail=<width>:<format>` tokens naming units whose encode should fail.
//! Anything else fails to probe, like a corrupt raster would.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use imageset_core::{
    CodecAdapter, CodecError, Dimensions, OutputFormat, PipelineOptions, PipelineOptionsBuilder,
};

#[derive(Debug, Default)]
pub struct FakeCodec {
    pub probes: AtomicUsize,
    pub encodes: AtomicUsize,
}

impl FakeCodec {
    pub fn encode_count(&self) -> usize {
        self.encodes.load(Ordering::SeqCst)
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    fn parse(path: &Path) -> Result<(Dimensions, Vec<String>), CodecError> {
        let text = std::fs::read_to_string(path)?;
        let mut tokens = text.split_whitespace();
        let size = tokens
            .next()
            .ok_or_else(|| CodecError::Decode("empty file".into()))?;
        let (w, h) = size
            .split_once('x')
            .ok_or_else(|| CodecError::Decode(format!("bad header '{size}'")))?;
        let parse = |v: &str| {
            v.parse::<u32>()
                .map_err(|err| CodecError::Decode(err.to_string()))
        };
        let failures = tokens
            .filter_map(|t| t.strip_prefix("fail=").map(str::to_string))
            .collect();
        Ok((Dimensions::new(parse(w)?, parse(h)?), failures))
    }
}

impl CodecAdapter for FakeCodec {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn probe(&self, path: &Path) -> Result<Dimensions, CodecError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Self::parse(path).map(|(dims, _)| dims)
    }

    fn encode(
        &self,
        path: &Path,
        width: u32,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        self.encodes.fetch_add(1, Ordering::SeqCst);
        let (dims, failures) = Self::parse(path)?;
        if failures.contains(&format!("{width}:{format}")) {
            return Err(CodecError::Encode(format!("injected failure at {width}px")));
        }
        let height = dims.scaled_height(width);
        Ok(format!("{width}x{height} {format} q{quality}").into_bytes())
    }
}

/// Scratch layout: `<root>/in`, `<root>/out`, `<root>/.cache/image-manifest.json`.
pub struct Site {
    pub dir: tempfile::TempDir,
}

impl Site {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("in")).expect("mkdir in");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn input(&self) -> PathBuf {
        self.root().join("in")
    }

    pub fn output(&self) -> PathBuf {
        self.root().join("out")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root().join(".cache").join("image-manifest.json")
    }

    pub fn add_source(&self, name: &str, contents: &str) {
        std::fs::write(self.input().join(name), contents).expect("write source");
    }

    pub fn options(&self) -> PipelineOptionsBuilder {
        PipelineOptions::builder()
            .input_dir(self.input())
            .output_dir(self.output())
            .manifest_path(self.manifest_path())
            .path_root(self.root())
    }
}
