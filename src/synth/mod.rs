//! Reference coarse-to-fine PatchMatch synthesis shared by the CPU and GPU backends.
//!
//! Backends differ only in the [`vote::Voter`] they plug in; the search always runs on the host.

pub(crate) mod nnf;
pub(crate) mod search;
pub(crate) mod vote;

use crate::{
    foundation::{error::SynthResult, rng::Rng64},
    job::{SynthOutput, SynthesisJob, VoteMode},
    pyramid::schedule::{LevelParams, pyramid_level_size},
    raster::{channels::CompactImage, resample::resample_area},
    synth::{
        nnf::{CenterBounds, Nnf},
        search::{CostWeights, SearchCtx, patch_match},
        vote::{VoteInput, Voter},
    },
};

/// Patch size of the optional full-resolution refinement pass.
pub const EXTRA_PASS_PATCH_SIZE: u32 = 3;

/// Job images resampled to one pyramid level.
pub(crate) struct LevelImages {
    pub(crate) source_style: CompactImage,
    pub(crate) source_guide: CompactImage,
    pub(crate) target_guide: CompactImage,
    pub(crate) modulation: Option<CompactImage>,
}

impl LevelImages {
    fn for_exponent(job: &SynthesisJob, exponent: u32) -> Self {
        let (sw, sh) = level_dims(job.source_size(), exponent);
        let (tw, th) = level_dims(job.target_size(), exponent);
        Self {
            source_style: resample_area(job.source_style(), sw, sh),
            source_guide: resample_area(job.source_guide(), sw, sh),
            target_guide: resample_area(job.target_guide(), tw, th),
            modulation: job.target_modulation().map(|m| resample_area(m, tw, th)),
        }
    }

    fn source_size(&self) -> (u32, u32) {
        self.source_style.dimensions()
    }

    fn target_size(&self) -> (u32, u32) {
        self.target_guide.dimensions()
    }
}

/// Level size, never collapsing below one pixel when target and source differ in size.
fn level_dims(base: (u32, u32), exponent: u32) -> (u32, u32) {
    let (w, h) = pyramid_level_size(base, exponent);
    (w.max(1), h.max(1))
}

/// Mutable state carried through the search/vote rounds of one level.
struct LevelState {
    nnf: Nnf,
    estimate: CompactImage,
}

/// Execute every scheduled level, coarsest first, and write the final image (and field, when
/// requested) into `output`.
#[tracing::instrument(level = "debug", skip_all, fields(levels = job.schedule().len()))]
pub(crate) fn run_pyramid(
    job: &SynthesisJob,
    voter: &mut dyn Voter,
    seed: u64,
    output: &mut SynthOutput,
) -> SynthResult<()> {
    let weights = CostWeights {
        style: job.style_weights().as_slice(),
        guide: job.guide_weights().as_slice(),
        uniformity: job.uniformity(),
    };

    let mut carried: Option<(Nnf, (u32, u32))> = None;
    let mut last: Option<(LevelImages, LevelState, LevelParams)> = None;

    for (index, pass) in job.schedule().passes().into_iter().enumerate() {
        let level = LevelImages::for_exponent(job, pass.exponent);
        let (tw, th) = level.target_size();
        let bounds = CenterBounds::new(level.source_size(), job.patch_size());

        let nnf = match carried.take() {
            None => Nnf::random(tw, th, bounds, seed),
            Some((prev, prev_source)) => {
                prev.upscale(tw, th, prev_source, level.source_size(), bounds)
            }
        };
        let estimate = voter.vote(&VoteInput {
            source_style: &level.source_style,
            nnf: &nnf,
            errors: None,
            patch_size: job.patch_size(),
            mode: VoteMode::Plain,
        })?;

        let mut state = LevelState { nnf, estimate };
        let mut active = vec![true; tw as usize * th as usize];
        for round in 0..pass.params.search_vote_iters {
            let remaining = search_vote_round(
                job,
                voter,
                &level,
                &mut state,
                &mut active,
                RoundParams {
                    weights,
                    patch_size: job.patch_size(),
                    patch_match_iters: pass.params.patch_match_iters,
                    stop_threshold: pass.params.stop_threshold,
                    seed: round_seed(seed, index as u64, u64::from(round)),
                },
            )?;
            tracing::trace!(level = index, round, remaining, "search/vote round done");
            if remaining == 0 {
                tracing::debug!(level = index, round, "level converged");
                break;
            }
        }

        carried = Some((state.nnf.clone(), level.source_size()));
        last = Some((level, state, pass.params));
    }

    let Some((level, mut state, params)) = last else {
        return Ok(());
    };

    if job.extra_pass_3x3() {
        let mut active = vec![true; state.nnf.as_slice().len()];
        search_vote_round(
            job,
            voter,
            &level,
            &mut state,
            &mut active,
            RoundParams {
                weights,
                patch_size: EXTRA_PASS_PATCH_SIZE,
                patch_match_iters: params.patch_match_iters,
                stop_threshold: params.stop_threshold,
                seed: round_seed(seed, u64::MAX, 0),
            },
        )?;
    }

    output.write_image(state.estimate)?;
    output.write_nnf(state.nnf)?;
    Ok(())
}

#[derive(Clone, Copy)]
struct RoundParams<'a> {
    weights: CostWeights<'a>,
    patch_size: u32,
    patch_match_iters: u32,
    stop_threshold: u32,
    seed: u64,
}

/// One search followed by one vote. Returns how many pixels are still active.
fn search_vote_round(
    job: &SynthesisJob,
    voter: &mut dyn Voter,
    level: &LevelImages,
    state: &mut LevelState,
    active: &mut [bool],
    params: RoundParams<'_>,
) -> SynthResult<usize> {
    let nnf = std::mem::replace(&mut state.nnf, Nnf::from_field(0, 0, Vec::new()));
    let (nnf, errors) = {
        let ctx = SearchCtx::new(
            level,
            &state.estimate,
            params.weights,
            params.patch_size,
            &nnf,
        );
        patch_match(&ctx, nnf, active, params.patch_match_iters, params.seed)
    };

    let voted = voter.vote(&VoteInput {
        source_style: &level.source_style,
        nnf: &nnf,
        errors: Some(&errors),
        patch_size: params.patch_size,
        mode: job.vote_mode(),
    })?;

    let remaining = freeze_settled(&state.estimate, &voted, active, params.stop_threshold);
    state.nnf = nnf;
    state.estimate = voted;
    Ok(remaining)
}

/// Deactivate pixels whose largest channel change is within `threshold`; returns the number of
/// pixels left active.
fn freeze_settled(
    before: &CompactImage,
    after: &CompactImage,
    active: &mut [bool],
    threshold: u32,
) -> usize {
    let c = before.channels();
    let mut remaining = 0;
    for ((flag, old), new) in active
        .iter_mut()
        .zip(before.as_bytes().chunks_exact(c))
        .zip(after.as_bytes().chunks_exact(c))
    {
        if !*flag {
            continue;
        }
        let change = old
            .iter()
            .zip(new)
            .map(|(a, b)| u32::from(a.abs_diff(*b)))
            .max()
            .unwrap_or(0);
        if change <= threshold {
            *flag = false;
        } else {
            remaining += 1;
        }
    }
    remaining
}

fn round_seed(seed: u64, level: u64, round: u64) -> u64 {
    Rng64::new(seed ^ level.rotate_left(32) ^ round).next_u64()
}

#[cfg(test)]
#[path = "../../tests/unit/synth/driver.rs"]
mod tests;
