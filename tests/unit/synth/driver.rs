use super::*;
use crate::{
    config::ChannelLimits, inpaint::inpaint_job, job::assemble::JobParams,
    synth::vote::CpuVoter,
};

fn gradient(w: u32, h: u32, channels: usize) -> CompactImage {
    let mut data = Vec::with_capacity(w as usize * h as usize * channels);
    for y in 0..h {
        for x in 0..w {
            for c in 0..channels {
                data.push(((x * 9 + y * 5 + c as u32 * 40) % 256) as u8);
            }
        }
    }
    CompactImage::new(w, h, channels, data).unwrap()
}

fn square_mask(w: u32, h: u32) -> CompactImage {
    let data = (0..h)
        .flat_map(|y| (0..w).map(move |x| x >= w / 3 && x < w / 2 && y >= h / 3 && y < h / 2))
        .map(|inside| if inside { 255 } else { 0 })
        .collect();
    CompactImage::new(w, h, 1, data).unwrap()
}

fn job(source: CompactImage, mask: CompactImage, params: JobParams) -> SynthesisJob {
    inpaint_job(source, mask, &params, &ChannelLimits::default()).unwrap()
}

fn quick() -> JobParams {
    JobParams {
        level: LevelParams {
            search_vote_iters: 2,
            patch_match_iters: 2,
            stop_threshold: 5,
        },
        ..JobParams::default()
    }
}

fn run(job: &SynthesisJob, seed: u64) -> SynthOutput {
    let mut out = SynthOutput::for_job(job);
    run_pyramid(job, &mut CpuVoter, seed, &mut out).unwrap();
    out
}

#[test]
fn solid_source_synthesizes_solid_output() {
    let src = CompactImage::filled(32, 32, 3, 90).unwrap();
    let job = job(src, square_mask(32, 32), quick());
    assert_eq!(job.num_pyramid_levels(), 2);

    let out = run(&job, 7);
    assert_eq!(out.image().dimensions(), (32, 32));
    assert_eq!(out.image().channels(), 3);
    assert!(out.image().as_bytes().iter().all(|&v| v == 90));
}

#[test]
fn fixed_seed_is_deterministic() {
    let job = job(gradient(40, 30, 3), square_mask(40, 30), quick());
    let a = run(&job, 11);
    let b = run(&job, 11);
    assert_eq!(a.image(), b.image());
}

#[test]
fn output_stays_within_source_value_range() {
    let src = gradient(36, 36, 1);
    let (lo, hi) = src
        .as_bytes()
        .iter()
        .fold((u8::MAX, u8::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let job = job(src, square_mask(36, 36), quick());
    let out = run(&job, 3);
    assert!(out.image().as_bytes().iter().all(|&v| v >= lo && v <= hi));
}

#[test]
fn requested_field_is_reported_within_source() {
    let params = JobParams {
        want_nnf: true,
        extra_pass_3x3: true,
        ..quick()
    };
    let job = job(gradient(28, 24, 3), square_mask(28, 24), params);
    let out = run(&job, 5);

    let nnf = out.nnf().expect("field requested");
    assert_eq!((nnf.width(), nnf.height()), (28, 24));
    assert!(
        nnf.as_slice()
            .iter()
            .all(|&[x, y]| (0..28).contains(&x) && (0..24).contains(&y))
    );
}

#[test]
fn empty_schedule_runs_one_full_resolution_pass() {
    let src = CompactImage::filled(8, 8, 1, 40).unwrap();
    let job = job(src, square_mask(8, 8), quick());
    assert_eq!(job.num_pyramid_levels(), 0);

    let out = run(&job, 1);
    assert_eq!(out.image().dimensions(), (8, 8));
    assert!(out.image().as_bytes().iter().all(|&v| v == 40));
}

#[test]
fn zero_iterations_still_vote_once() {
    let params = JobParams {
        pyramid_levels: Some(1),
        level: LevelParams {
            search_vote_iters: 0,
            patch_match_iters: 0,
            stop_threshold: 0,
        },
        ..JobParams::default()
    };
    let src = CompactImage::filled(64, 64, 1, 128).unwrap();
    let job = job(src, CompactImage::filled(64, 64, 1, 0).unwrap(), params);
    let out = run(&job, 2);
    assert!(out.image().as_bytes().iter().all(|&v| v == 128));
}

#[test]
fn settled_pixels_are_frozen() {
    let before = CompactImage::new(3, 1, 2, vec![10, 10, 50, 50, 0, 0]).unwrap();
    let after = CompactImage::new(3, 1, 2, vec![12, 14, 50, 80, 200, 0]).unwrap();
    let mut active = vec![true, true, false];

    let remaining = freeze_settled(&before, &after, &mut active, 5);
    assert_eq!(remaining, 1);
    assert_eq!(active, vec![false, true, false]);

    let mut active = vec![true, true, true];
    assert_eq!(freeze_settled(&before, &after, &mut active, 5), 2);
    assert_eq!(active, vec![false, true, true]);
}
