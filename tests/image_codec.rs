//! End-to-end runs through the `image` crate codec on real rasters.

#![cfg(feature = "image-codec")]

use std::path::Path;

use image::{Rgb, RgbImage};
use imageset_core::{OutputFormat, Pipeline, PipelineOptions, UnitError};
use tempfile::TempDir;

fn write_png(path: &Path, width: u32, height: u32) {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90])
    });
    img.save(path).expect("write png");
}

fn options(dir: &TempDir) -> PipelineOptions {
    PipelineOptions::builder()
        .input_dir(dir.path().join("images"))
        .output_dir(dir.path().join("processed"))
        .manifest_path(dir.path().join(".cache/image-manifest.json"))
        .path_root(dir.path())
        .widths([32, 64, 128])
        .format(OutputFormat::Jpeg, 80)
        .format(OutputFormat::Png, 100)
        .format(OutputFormat::Webp, 70)
        .workers(2)
        .build()
        .expect("options")
}

#[test]
fn real_images_are_resized_without_upscaling() {
    let dir = TempDir::new().expect("tmp");
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).expect("mkdir");
    write_png(&images.join("landscape.png"), 100, 50);
    write_png(&images.join("thumb.png"), 20, 20);

    let report = Pipeline::with_image_codec(options(&dir))
        .expect("pipeline")
        .run()
        .expect("run");
    assert!(report.is_clean(), "{:?}", report.diagnostics);

    assert_eq!(report.manifest.widths("landscape.png", "jpg"), vec![32, 64, 100]);
    assert_eq!(report.manifest.widths("landscape.png", "webp"), vec![32, 64, 100]);
    assert_eq!(report.manifest.widths("thumb.png", "png"), vec![20]);

    let out = dir.path().join("processed");
    let (w, h) = image::image_dimensions(out.join("landscape-64.jpg")).expect("jpg dims");
    assert_eq!((w, h), (64, 32));
    let (w, h) = image::image_dimensions(out.join("landscape-100.webp")).expect("webp dims");
    assert_eq!((w, h), (100, 50));
    let (w, h) = image::image_dimensions(out.join("thumb-20.png")).expect("png dims");
    assert_eq!((w, h), (20, 20));
    assert_eq!(
        report.manifest.get("thumb.png").expect("thumb")["png"][0].path,
        "processed/thumb-20.png"
    );
}

#[test]
fn undecodable_file_is_reported_and_skipped() {
    let dir = TempDir::new().expect("tmp");
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).expect("mkdir");
    write_png(&images.join("good.png"), 40, 40);
    std::fs::write(images.join("bad.jpg"), b"\xff\xd8 truncated").expect("write");

    let report = Pipeline::with_image_codec(options(&dir))
        .expect("pipeline")
        .run()
        .expect("run");

    assert!(report.manifest.contains("good.png"));
    assert!(!report.manifest.contains("bad.jpg"));
    assert!(matches!(
        report.diagnostics.as_slice(),
        [UnitError::MetadataUnavailable { source_file, .. }] if source_file == "bad.jpg"
    ));
}

#[test]
#[cfg(not(feature = "avif"))]
fn avif_without_encoder_fails_per_unit() {
    let dir = TempDir::new().expect("tmp");
    let images = dir.path().join("images");
    std::fs::create_dir_all(&images).expect("mkdir");
    write_png(&images.join("pic.png"), 40, 30);

    let options = PipelineOptions::builder()
        .input_dir(&images)
        .output_dir(dir.path().join("processed"))
        .manifest_path(dir.path().join("manifest.json"))
        .path_root(dir.path())
        .widths([32])
        .format(OutputFormat::Avif, 45)
        .format(OutputFormat::Jpeg, 80)
        .build()
        .expect("options");
    let report = Pipeline::with_image_codec(options)
        .expect("pipeline")
        .run()
        .expect("run");

    assert_eq!(report.manifest.widths("pic.png", "jpg"), vec![32, 40]);
    assert!(report.manifest.widths("pic.png", "avif").is_empty());
    assert_eq!(report.diagnostics.len(), 2);
    assert!(
        report
            .diagnostics
            .iter()
            .all(|d| matches!(d, UnitError::EncodeFailure { format: OutputFormat::Avif, .. }))
    );
}
