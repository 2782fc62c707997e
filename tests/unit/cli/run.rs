use std::path::{Path, PathBuf};

use super::*;
use crate::backend::caps::StaticCapabilities;

fn fixture_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from("target").join("cli_run").join(name);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_rgb(path: &Path, w: u32, h: u32) {
    let img = image::RgbImage::from_fn(w, h, |x, y| {
        image::Rgb([(x * 10) as u8, (y * 10) as u8, ((x + y) * 5) as u8])
    });
    img.save(path).unwrap();
}

fn write_mask(path: &Path, w: u32, h: u32) {
    let img = image::GrayImage::from_fn(w, h, |x, y| {
        let hole = (w / 3..w / 2).contains(&x) && (h / 3..h / 2).contains(&y);
        image::Luma([if hole { 255 } else { 0 }])
    });
    img.save(path).unwrap();
}

fn run_cli(items: &[&str], caps: &dyn CapabilityProvider) -> (u8, String) {
    let args: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    let mut out = Vec::new();
    let status = run(&args, caps, &mut out);
    (status, String::from_utf8(out).unwrap())
}

#[test]
fn no_arguments_prints_usage() {
    let (status, out) = run_cli(&[], &StaticCapabilities::cpu_only());
    assert_eq!(status, EXIT_FAILURE);
    assert!(out.starts_with("usage: patchsynth [options]"));
    assert!(out.contains("-backend [cpu|gpu]"));
}

#[test]
fn bad_patch_size_fails_without_output() {
    let dir = fixture_dir("bad_patch");
    let output = dir.join("never.png");
    let _ = std::fs::remove_file(&output);
    let output_arg = output.to_string_lossy().to_string();

    for size in ["4", "1"] {
        let (status, out) = run_cli(
            &["-patchsize", size, "-output", output_arg.as_str()],
            &StaticCapabilities::cpu_only(),
        );
        assert_eq!(status, EXIT_FAILURE);
        assert!(out.starts_with("error: patchsize"), "{out}");
    }
    assert!(!output.exists());
}

#[test]
fn unavailable_gpu_fails_before_decoding() {
    let (status, out) = run_cli(
        &["-albedo", "target/cli_run/missing.png", "-backend", "gpu"],
        &StaticCapabilities::cpu_only(),
    );
    assert_eq!(status, EXIT_FAILURE);
    assert_eq!(out, "error: the gpu backend is not available!\n");
}

#[test]
fn missing_input_reports_decoder_failure() {
    let (status, out) = run_cli(
        &["-albedo", "target/cli_run/missing.png"],
        &StaticCapabilities::cpu_only(),
    );
    assert_eq!(status, EXIT_FAILURE);
    assert!(out.starts_with("error: failed to load 'target/cli_run/missing.png'"));
}

#[test]
fn shape_mismatch_is_reported() {
    let dir = fixture_dir("mismatch");
    let src = dir.join("src.png");
    let mask = dir.join("mask.png");
    write_mask(&src, 8, 8);
    write_mask(&mask, 9, 8);

    let src_arg = src.to_string_lossy().to_string();
    let mask_arg = mask.to_string_lossy().to_string();
    let (status, out) = run_cli(
        &["-albedo", src_arg.as_str(), "-mask", mask_arg.as_str()],
        &StaticCapabilities::cpu_only(),
    );
    assert_eq!(status, EXIT_FAILURE);
    assert_eq!(
        out,
        "error: shape mismatch, source shape is 8x8x1, mask shape is 9x8x1\n"
    );
}

#[test]
fn successful_run_prints_summary_and_writes_result() {
    let dir = fixture_dir("success");
    let src = dir.join("albedo.png");
    let mask = dir.join("mask.png");
    let expected_out = dir.join("albedo_inpainted.png");
    let _ = std::fs::remove_file(&expected_out);
    write_rgb(&src, 24, 24);
    write_mask(&mask, 24, 24);

    let src_arg = src.to_string_lossy().to_string();
    let mask_arg = mask.to_string_lossy().to_string();
    let (status, out) = run_cli(
        &[
            "-albedo",
            src_arg.as_str(),
            "-mask",
            mask_arg.as_str(),
            "-searchvoteiters",
            "1",
            "-patchmatchiters",
            "1",
            "-pyramidlevels",
            "9",
        ],
        &StaticCapabilities::cpu_only(),
    );
    assert_eq!(status, EXIT_SUCCESS, "{out}");

    let expected = format!(
        "uniformity: 3500\n\
         patchsize: 5\n\
         pyramidlevels: 2\n\
         searchvoteiters: 1\n\
         patchmatchiters: 1\n\
         stopthreshold: 5\n\
         extrapass3x3: no\n\
         backend: cpu\n\
         result was written to {}\n",
        expected_out.display()
    );
    assert_eq!(out, expected);

    let written = image::open(&expected_out).unwrap();
    assert_eq!((written.width(), written.height()), (24, 24));
    assert_eq!(written.color(), image::ColorType::Rgb8);
}

#[test]
fn summary_formats_like_the_cli_contract() {
    let summary = RunSummary {
        uniformity: 3500.4,
        patch_size: 7,
        pyramid_levels: 0,
        search_vote_iters: 6,
        patch_match_iters: 4,
        stop_threshold: 5,
        extra_pass_3x3: true,
        backend: ResolvedBackend::Gpu,
    };
    let text = summary.to_string();
    assert!(text.starts_with("uniformity: 3500\npatchsize: 7\npyramidlevels: 0\n"));
    assert!(text.ends_with("extrapass3x3: yes\nbackend: gpu\n"));
}
