use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::codec::CodecAdapter;
use crate::error::CodecError;

/// Intrinsic pixel size reported by a codec probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height that keeps the aspect ratio at `target_width`, never below one pixel.
    #[must_use]
    pub fn scaled_height(&self, target_width: u32) -> u32 {
        if self.width == 0 || target_width == self.width {
            return self.height.max(1);
        }
        let scaled = (u64::from(self.height) * u64::from(target_width)
            + u64::from(self.width) / 2)
            / u64::from(self.width);
        u32::try_from(scaled).unwrap_or(u32::MAX).max(1)
    }
}

/// A source raster discovered by the scanner. Its dimensions are probed on
/// first use and cached for the rest of the run.
#[derive(Debug)]
pub struct SourceImage {
    filename: String,
    path: PathBuf,
    dimensions: OnceCell<Dimensions>,
}

impl SourceImage {
    pub fn new(dir: &Path, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        Self {
            path: dir.join(&filename),
            filename,
            dimensions: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Filename without its original extension.
    #[must_use]
    pub fn base_name(&self) -> &str {
        self.filename
            .rsplit_once('.')
            .map_or(self.filename.as_str(), |(stem, _)| stem)
    }

    /// Lower-case original extension.
    #[must_use]
    pub fn extension(&self) -> String {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default()
    }

    pub fn dimensions(&self, codec: &dyn CodecAdapter) -> Result<Dimensions, CodecError> {
        self.dimensions
            .get_or_try_init(|| codec.probe(&self.path))
            .copied()
    }

    #[must_use]
    pub fn cached_dimensions(&self) -> Option<Dimensions> {
        self.dimensions.get().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_strips_only_last_extension() {
        let dir = Path::new("/in");
        assert_eq!(SourceImage::new(dir, "photo.png").base_name(), "photo");
        assert_eq!(SourceImage::new(dir, "a.b.JPG").base_name(), "a.b");
        assert_eq!(SourceImage::new(dir, "a.b.JPG").extension(), "jpg");
    }

    #[test]
    fn scaled_height_preserves_aspect_ratio() {
        let dims = Dimensions::new(1000, 750);
        assert_eq!(dims.scaled_height(320), 240);
        assert_eq!(dims.scaled_height(1000), 750);
        assert_eq!(Dimensions::new(4000, 1).scaled_height(320), 1);
    }
}
