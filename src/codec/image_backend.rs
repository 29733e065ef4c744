use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};

use super::CodecAdapter;
use crate::error::CodecError;
use crate::types::{Dimensions, OutputFormat};

/// Production adapter backed by the pure-Rust `image` crate.
///
/// WebP output is lossless (the `image` encoder has no lossy mode), so the
/// configured WebP quality has no effect. AVIF requires the `avif` feature.
#[derive(Debug, Clone, Copy)]
pub struct ImageCodec {
    filter: FilterType,
}

impl ImageCodec {
    #[must_use]
    pub fn new() -> Self {
        Self {
            filter: FilterType::Lanczos3,
        }
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }

    fn decode(path: &Path) -> Result<DynamicImage, CodecError> {
        let reader = ImageReader::open(path)?.with_guessed_format()?;
        Ok(reader.decode()?)
    }

    fn resize(&self, image: &DynamicImage, width: u32) -> DynamicImage {
        let source = Dimensions::new(image.width(), image.height());
        if width >= source.width {
            return image.clone();
        }
        image.resize_exact(width, source.scaled_height(width), self.filter)
    }
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecAdapter for ImageCodec {
    fn name(&self) -> &'static str {
        "image"
    }

    fn probe(&self, path: &Path) -> Result<Dimensions, CodecError> {
        let (width, height) = image::image_dimensions(path)?;
        Ok(Dimensions::new(width, height))
    }

    fn encode(
        &self,
        path: &Path,
        width: u32,
        format: OutputFormat,
        quality: u8,
    ) -> Result<Vec<u8>, CodecError> {
        if !self.supports(format) {
            return Err(CodecError::Unsupported(format));
        }
        let decoded = Self::decode(path)?;
        let resized = self.resize(&decoded, width);
        let mut buf = Vec::new();
        match format {
            OutputFormat::Jpeg => {
                let rgb = DynamicImage::ImageRgb8(resized.to_rgb8());
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, quality))?;
            }
            OutputFormat::Png => {
                let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
                rgba.write_with_encoder(PngEncoder::new(&mut buf))?;
            }
            OutputFormat::Webp => {
                let rgba = DynamicImage::ImageRgba8(resized.to_rgba8());
                rgba.write_with_encoder(WebPEncoder::new_lossless(&mut buf))?;
            }
            OutputFormat::Avif => encode_avif(&resized, quality, &mut buf)?,
        }
        Ok(buf)
    }

    fn supports(&self, format: OutputFormat) -> bool {
        match format {
            OutputFormat::Avif => cfg!(feature = "avif"),
            OutputFormat::Webp | OutputFormat::Jpeg | OutputFormat::Png => true,
        }
    }
}

#[cfg(feature = "avif")]
fn encode_avif(image: &DynamicImage, quality: u8, buf: &mut Vec<u8>) -> Result<(), CodecError> {
    use image::codecs::avif::AvifEncoder;

    const AVIF_SPEED: u8 = 6;
    let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
    rgba.write_with_encoder(AvifEncoder::new_with_speed_quality(buf, AVIF_SPEED, quality))?;
    Ok(())
}

#[cfg(not(feature = "avif"))]
fn encode_avif(_image: &DynamicImage, _quality: u8, _buf: &mut Vec<u8>) -> Result<(), CodecError> {
    Err(CodecError::Unsupported(OutputFormat::Avif))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::tempdir;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
        });
        img.save(path).expect("write png");
    }

    #[test]
    fn probe_reports_intrinsic_size() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("wide.png");
        write_png(&path, 64, 32);
        let dims = ImageCodec::new().probe(&path).expect("probe");
        assert_eq!(dims, Dimensions::new(64, 32));
    }

    #[test]
    fn encode_resizes_and_keeps_aspect() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("wide.png");
        write_png(&path, 64, 32);

        let codec = ImageCodec::new();
        for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp] {
            let bytes = codec.encode(&path, 16, format, 80).expect("encode");
            let decoded = image::load_from_memory(&bytes).expect("decode output");
            assert_eq!((decoded.width(), decoded.height()), (16, 8), "{format}");
        }
    }

    #[test]
    fn corrupt_source_is_a_decode_error() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"definitely not a png").expect("write");
        let codec = ImageCodec::new();
        assert!(codec.probe(&path).is_err());
        assert!(codec.encode(&path, 10, OutputFormat::Jpeg, 80).is_err());
    }

    #[test]
    #[cfg(not(feature = "avif"))]
    fn avif_without_feature_is_unsupported() {
        let dir = tempdir().expect("tmp");
        let path = dir.path().join("small.png");
        write_png(&path, 8, 8);
        let err = ImageCodec::new()
            .encode(&path, 8, OutputFormat::Avif, 45)
            .expect_err("avif disabled");
        assert!(matches!(err, CodecError::Unsupported(OutputFormat::Avif)));
    }
}
