//! Exit-status behaviour of the `imageset` binary.

#![cfg(feature = "image-codec")]

use assert_cmd::Command;
use image::{Rgb, RgbImage};
use predicates::prelude::*;
use tempfile::TempDir;

fn imageset(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("imageset").expect("binary");
    cmd.current_dir(dir.path()).env_remove("IMAGES_DIR").env_remove("RUST_LOG");
    cmd
}

#[test]
fn missing_input_directory_exits_non_zero() {
    let dir = TempDir::new().expect("tmp");
    imageset(&dir)
        .args(["--input", "nope", "--output", "out"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unreadable"));
    assert!(!dir.path().join(".cache/image-manifest.json").exists());
}

#[test]
fn empty_directory_exits_zero_with_empty_manifest() {
    let dir = TempDir::new().expect("tmp");
    std::fs::create_dir(dir.path().join("images")).expect("mkdir");
    imageset(&dir)
        .args(["--input", "images", "--output", "out"])
        .assert()
        .success()
        .stderr(predicate::str::contains("0 processed"));
    let manifest =
        std::fs::read_to_string(dir.path().join(".cache/image-manifest.json")).expect("manifest");
    assert_eq!(manifest, "{}\n");
}

#[test]
fn corrupt_file_still_exits_zero_and_prints_manifest() {
    let dir = TempDir::new().expect("tmp");
    let images = dir.path().join("images");
    std::fs::create_dir(&images).expect("mkdir");
    RgbImage::from_pixel(24, 12, Rgb([10, 20, 30]))
        .save(images.join("ok.png"))
        .expect("png");
    std::fs::write(images.join("broken.png"), b"nope").expect("write");

    imageset(&dir)
        .env("IMAGES_DIR", "images")
        .args(["--output", "out", "-w", "16", "-f", "jpeg:75", "--print-manifest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"out/ok-16.jpg\""))
        .stdout(predicate::str::contains("broken.png").not());
}

#[test]
fn invalid_format_is_rejected() {
    let dir = TempDir::new().expect("tmp");
    imageset(&dir).args(["-f", "bmp"]).assert().failure();
}
