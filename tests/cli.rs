//! End-to-end tests driving the compiled binary against fixture PNGs built
//! at test time with the `image` crate.

use assert_cmd::Command;
use image::{Rgba, RgbaImage};
use predicates::prelude::*;
use std::path::Path;

fn write_png(path: &Path, w: u32, h: u32, pixel: Rgba<u8>) {
    RgbaImage::from_pixel(w, h, pixel).save(path).unwrap();
}

fn atlaspack() -> Command {
    Command::cargo_bin("atlaspack").unwrap()
}

#[test]
fn packs_two_sprites_into_an_xml_and_png_atlas() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_png(&input.path().join("red.png"), 8, 8, Rgba([255, 0, 0, 255]));
    write_png(&input.path().join("blue.png"), 8, 8, Rgba([0, 0, 255, 255]));

    atlaspack()
        .arg("-o")
        .arg(output.path().join("atlas"))
        .arg("-i")
        .arg(input.path())
        .arg("-x")
        .assert()
        .success();

    assert!(output.path().join("atlas.png").exists());
    let xml = std::fs::read_to_string(output.path().join("atlas.xml")).unwrap();
    assert!(xml.contains("<atlas"));
    assert!(xml.contains("n=\"red\""));
    assert!(xml.contains("n=\"blue\""));
}

#[test]
fn duplicate_bitmaps_share_a_placement_with_unique_flag() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_png(&input.path().join("a.png"), 4, 4, Rgba([9, 9, 9, 255]));
    write_png(&input.path().join("b.png"), 4, 4, Rgba([9, 9, 9, 255]));

    atlaspack()
        .arg("-o")
        .arg(output.path().join("atlas"))
        .arg("-i")
        .arg(input.path())
        .arg("-u")
        .arg("-j")
        .assert()
        .success();

    let contents = std::fs::read_to_string(output.path().join("atlas.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let images = value["Images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0]["X"], images[1]["X"]);
    assert_eq!(images[0]["Y"], images[1]["Y"]);
}

#[test]
fn second_run_without_changes_is_a_cache_hit() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_png(&input.path().join("a.png"), 4, 4, Rgba([1, 2, 3, 255]));

    let out_prefix = output.path().join("atlas");
    atlaspack().arg("-o").arg(&out_prefix).arg("-i").arg(input.path()).arg("-j").assert().success();

    atlaspack()
        .arg("-o")
        .arg(&out_prefix)
        .arg("-i")
        .arg(input.path())
        .arg("-j")
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("atlas is unchanged"));
}

#[test]
fn missing_input_directory_is_skipped_not_fatal() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_png(&input.path().join("a.png"), 4, 4, Rgba([1, 2, 3, 255]));
    let missing = input.path().join("does-not-exist");

    atlaspack()
        .arg("-o")
        .arg(output.path().join("atlas"))
        .arg("-i")
        .arg(format!("{},{}", input.path().display(), missing.display()))
        .arg("-j")
        .arg("-v")
        .assert()
        .success()
        .stderr(predicate::str::contains("cannot open input"));

    assert!(output.path().join("atlas.json").exists());
}

#[test]
fn invalid_padding_is_rejected() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_png(&input.path().join("a.png"), 4, 4, Rgba([1, 2, 3, 255]));

    atlaspack()
        .arg("-o")
        .arg(output.path().join("atlas"))
        .arg("-i")
        .arg(input.path())
        .arg("-P")
        .arg("99")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid padding"));
}
