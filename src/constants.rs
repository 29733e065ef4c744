//! Defaults shared by the pipeline components.

/// Width ladder used when no widths are configured.
pub const DEFAULT_TARGET_WIDTHS: [u32; 5] = [320, 640, 960, 1280, 1920];

pub const DEFAULT_WEBP_QUALITY: u8 = 70;
pub const DEFAULT_AVIF_QUALITY: u8 = 45;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;
pub const DEFAULT_PNG_QUALITY: u8 = 100;

/// Lower-case extensions of decodable source rasters. Disjoint from output formats.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Manifest location relative to the working directory.
pub const DEFAULT_MANIFEST_PATH: &str = ".cache/image-manifest.json";

pub const DEFAULT_INPUT_DIR: &str = "assets/images";
pub const DEFAULT_OUTPUT_DIR: &str = "assets/images-processed";

/// Jobs queued per worker before submission blocks.
pub const QUEUE_DEPTH_PER_WORKER: usize = 4;
